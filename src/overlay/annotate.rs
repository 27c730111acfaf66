//! Debug rendering of detected regions and product anchors

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;

use crate::analysis::AnalysisResult;
use crate::capture::Frame;
use crate::vision::Rect;

/// Colors used for annotation
#[derive(Debug, Clone, Copy)]
pub struct AnnotationStyle {
    pub region: Rgb<u8>,
    pub fair: Rgb<u8>,
    pub deceptive: Rgb<u8>,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            region: Rgb([0, 120, 255]),
            fair: Rgb([0, 200, 0]),
            deceptive: Rgb([230, 0, 0]),
        }
    }
}

/// Copy of the frame with label regions and product anchors outlined
pub fn annotate(
    frame: &Frame,
    regions: &[Rect],
    result: Option<&AnalysisResult>,
    style: &AnnotationStyle,
) -> RgbImage {
    let mut canvas = frame.image().clone();

    for region in regions {
        outline(&mut canvas, region, style.region);
    }

    for product in result.map(|r| r.products.as_slice()).unwrap_or_default() {
        let color = if product.is_deceptive {
            style.deceptive
        } else {
            style.fair
        };
        outline(&mut canvas, &product.anchor, color);
    }

    canvas
}

fn outline(canvas: &mut RgbImage, rect: &Rect, color: Rgb<u8>) {
    if rect.is_empty() {
        return;
    }
    let shape = imageproc::rect::Rect::at(rect.left, rect.top)
        .of_size(rect.width() as u32, rect.height() as u32);
    draw_hollow_rect_mut(canvas, shape, color);
}
