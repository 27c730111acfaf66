//! Overlay Placement Layer
//!
//! Proposes where a clickable marker should sit for each product and renders
//! debug annotations. All coordinates stay in image pixels; scaling to a
//! screen is left to whoever draws the markers.

pub mod annotate;

pub use annotate::{annotate, AnnotationStyle};

use serde::{Deserialize, Serialize};

use crate::vision::Rect;

/// Label box assumed when a record has no source geometry
pub const DEFAULT_LABEL_BOX: Rect = Rect::new(0, 0, 100, 50);

/// Marker placement settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Distance from the label's top edge up to the marker center
    pub lift: i32,
    /// Half the marker's side length
    pub half_extent: i32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            lift: 40,
            half_extent: 25,
        }
    }
}

impl AnchorConfig {
    /// Square marker centered above the label
    pub fn anchor_for(&self, label: &Rect) -> Rect {
        let cx = label.center_x();
        let cy = label.top - self.lift;
        Rect::new(
            cx - self.half_extent,
            cy - self.half_extent,
            cx + self.half_extent,
            cy + self.half_extent,
        )
    }

    /// Anchor for an optional label box, falling back to [`DEFAULT_LABEL_BOX`]
    pub fn anchor_or_default(&self, label: Option<&Rect>) -> Rect {
        self.anchor_for(label.unwrap_or(&DEFAULT_LABEL_BOX))
    }
}

/// Marker rectangle above a label with the default placement
pub fn anchor_for(label: &Rect) -> Rect {
    AnchorConfig::default().anchor_for(label)
}
