//! shelf-price - Shelf price label analysis
//!
//! Runs the label analysis pipeline on a photograph and the OCR output
//! recorded for it.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use shelf_price::capture::load_frame;
use shelf_price::config::{self, AppConfig};
use shelf_price::overlay::{annotate, AnnotationStyle};
use shelf_price::pipeline::AnalysisPipeline;
use shelf_price::vision::JsonBlockRecognizer;

/// shelf-price - Shelf price label analysis
#[derive(Parser, Debug)]
#[command(name = "shelf-price")]
#[command(about = "Reads shelf price labels and flags deceptive per-kilogram pricing")]
struct Args {
    /// Photograph of the shelf label(s)
    #[arg(short, long)]
    image: PathBuf,

    /// OCR output for the photograph (JSON array of text blocks)
    #[arg(short, long)]
    blocks: PathBuf,

    /// Configuration file (defaults to the per-user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write an annotated copy of the image to this path
    #[arg(long)]
    annotate: Option<PathBuf>,

    /// Disable parallel region probing and extraction
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = load_or_default_config(args.config.as_deref());

    let frame = load_frame(&args.image, &config.capture)
        .with_context(|| format!("Failed to load image {:?}", args.image))?;

    let recognizer = Arc::new(JsonBlockRecognizer::new(&args.blocks));
    let mut pipeline = AnalysisPipeline::new(&config, recognizer);
    if args.sequential {
        pipeline.set_parallel(false);
    }

    // Regions are detected once and shared by analysis and annotation
    let regions = pipeline.detect_regions(&frame);
    let result = pipeline
        .recognize(&frame)
        .await
        .and_then(|blocks| pipeline.analyze_blocks(&blocks, &regions));
    match &result {
        Some(result) => println!("{}", serde_json::to_string_pretty(result)?),
        None => println!("no result"),
    }

    if let Some(path) = &args.annotate {
        let canvas = annotate(&frame, &regions, result.as_ref(), &AnnotationStyle::default());
        canvas
            .save(path)
            .with_context(|| format!("Failed to save annotated image {:?}", path))?;
        info!("Saved annotated image to {:?}", path);
    }

    Ok(())
}

/// Load configuration from the given file, the per-user file, or defaults
fn load_or_default_config(explicit: Option<&Path>) -> AppConfig {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(config::default_config_path);

    if let Some(path) = path {
        if path.exists() {
            match config::load_config(&path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    return config;
                }
                Err(e) => info!("Ignoring configuration {:?}: {:#}", path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
