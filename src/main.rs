use anyhow::Context;
use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use refmeasure::measurement::annotate::LabelFont;
use refmeasure::{MeasureConfig, MeasurementPipeline};

/// The reference object must be the leftmost object in the photo.
#[derive(Parser)]
#[command(name = "refmeasure")]
#[command(about = "Measure objects in a photo against a reference of known width")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Width of the leftmost reference object in millimeters
    #[arg(long, default_value_t = 20.0, value_parser = parse_reference_width)]
    reference_width: f64,

    /// Lower Canny threshold
    #[arg(long, default_value_t = 50)]
    canny_low: u8,

    /// Upper Canny threshold
    #[arg(long, default_value_t = 100)]
    canny_high: u8,

    /// Gaussian blur kernel size
    #[arg(long, default_value_t = 9, value_parser = parse_blur_kernel)]
    blur_kernel: u32,

    /// Ignore contours enclosing fewer pixels than this
    #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u32).range(0..=20000))]
    min_area: u32,

    /// Write the annotated image here
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the binary edge map here
    #[arg(long, value_name = "FILE")]
    edges_out: Option<PathBuf>,

    /// Save intermediate stage images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// TrueType font for labels instead of the bundled DejaVu Sans
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Label font size in pixels
    #[arg(long, default_value_t = 20.0)]
    font_size: f32,

    /// Print measurements as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_reference_width(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if (1.0..=300.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("reference width must be between 1 and 300 mm, got {}", value))
    }
}

fn parse_blur_kernel(s: &str) -> Result<u32, String> {
    let value: u32 = s.parse().map_err(|e| format!("{}", e))?;
    if [3, 5, 7, 9, 11].contains(&value) {
        Ok(value)
    } else {
        Err(format!("blur kernel must be one of 3, 5, 7, 9, 11, got {}", value))
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    tracing::info!(path = %args.image_path.display(), "loading image");

    // Load image
    let img = ImageReader::open(&args.image_path)
        .with_context(|| format!("Failed to open {}", args.image_path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    let config = MeasureConfig::new()
        .with_reference_width(args.reference_width)
        .with_thresholds(args.canny_low, args.canny_high)
        .with_blur_kernel(args.blur_kernel)
        .with_min_contour_area(args.min_area);

    let mut pipeline = MeasurementPipeline::new(config);

    let font = match &args.font {
        Some(font_path) => {
            let bytes = std::fs::read(font_path)
                .with_context(|| format!("Failed to read font {}", font_path.display()))?;
            LabelFont::from_font_bytes(bytes, args.font_size)?
        }
        None => LabelFont::bundled(args.font_size)?,
    };
    pipeline = pipeline.with_font(font);

    // Enable debug mode if requested
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let report = pipeline.measure(&img)?;

    if let Some(path) = &args.output {
        report
            .annotated
            .save(path)
            .with_context(|| format!("Failed to save annotated image to {}", path.display()))?;
    }
    if let Some(path) = &args.edges_out {
        report
            .edges
            .save(path)
            .with_context(|| format!("Failed to save edge map to {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.measurements)?);
        return Ok(());
    }

    match &report.measurements {
        None => println!("No objects detected."),
        Some(measurements) => {
            println!("=== Measurements (left to right) ===");
            for m in measurements {
                let role = if m.is_reference { " (reference)" } else { "" };
                println!(
                    "  Object {}: {:.1} mm x {:.1} mm{}",
                    m.index + 1,
                    m.width_mm,
                    m.height_mm,
                    role
                );
            }
            if let Some(scale) = report.scale {
                println!("Scale: {:.4} mm/px", scale.mm_per_pixel());
            }
        }
    }

    Ok(())
}
