use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::RgbaImage;
use subject_lift::output::{FileSink, OutputSink};
use subject_lift::pipeline::{Pipeline, Settled, Workbench};
use subject_lift::segmentation::{InstanceId, InstanceSplitter, MaskProvider, MatteFileProvider};
use subject_lift::source::{decode_image, FileSource, ImageSource};
use subject_lift::Color;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to lift subjects from
    #[arg(short, long)]
    input: PathBuf,

    /// Replacement background; without it subjects land on a transparent canvas
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Precomputed foreground matte (grayscale, white = foreground)
    #[arg(long, conflicts_with = "model")]
    matte: Option<PathBuf>,

    /// Path to a salient object matting model (ONNX file)
    /// Requires the `onnx` feature
    #[arg(long)]
    model: Option<PathBuf>,

    /// Square input resolution of the matting model
    #[arg(long, default_value_t = 320)]
    model_size: u32,

    /// Subjects to highlight for the combined preview (repeatable)
    /// Defaults to every detected subject when nothing is selected
    #[arg(long = "highlight")]
    highlight: Vec<u32>,

    /// Subject to cut out and composite on its own
    #[arg(long)]
    extract: Option<u32>,

    /// Color of the mask preview, as #rrggbb or #rrggbbaa
    #[arg(long, default_value_t = Color::TEAL)]
    preview_color: Color,

    /// Minimum matte coverage for a pixel to join a subject region
    #[arg(long, default_value_t = 0.05)]
    coverage_floor: f32,

    /// Regions smaller than this many pixels are ignored
    #[arg(long, default_value_t = 64)]
    min_area: u32,

    /// Directory for preview.png, composite.png and cutout.png
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("subject-lift starting");

    let pipeline = create_pipeline(&args)?;
    tracing::info!("Using {} mask provider", pipeline.provider_name());

    let mut source = FileSource::new(&args.input);
    let bytes = source
        .pick()
        .await?
        .context("No image was picked")?;

    let mut bench = Workbench::new();
    if bench.load(&pipeline, &bytes).await != Settled::Applied {
        bail!(
            "Error while analyzing objects within the image: {}",
            bench.message().unwrap_or("unknown error")
        );
    }

    let detected = list_subjects(&bench);

    let highlight: Vec<InstanceId> = if args.highlight.is_empty() && args.extract.is_none() {
        detected
    } else {
        args.highlight.iter().copied().map(InstanceId).collect()
    };
    for id in highlight {
        bench.highlight(id);
    }
    if let Some(id) = args.extract {
        bench.select_for_extraction(InstanceId(id));
    }
    if let Some(message) = bench.dismiss_message() {
        bail!(message);
    }

    let background = match &args.background {
        Some(path) => Some(load_background(path).await?),
        None => None,
    };

    let mut sink = FileSink::new(&args.out_dir)?;

    if let Some(preview) = bench.preview(args.preview_color) {
        sink.write_image("preview", &preview)?;
    }
    if let Some(composite) = bench.composite(background.as_ref()) {
        sink.write_image("composite", &composite)?;
    }
    if bench.selection().extracted().is_some() {
        if let Some(cutout) = bench.extract() {
            sink.write_image("cutout", &cutout)?;
        }
    }

    if let Some(message) = bench.dismiss_message() {
        bail!(message);
    }

    tracing::info!("Done, wrote {} images", sink.written().len());
    Ok(())
}

fn create_pipeline(args: &Args) -> Result<Pipeline> {
    let splitter = InstanceSplitter::new(args.coverage_floor, args.min_area);

    let provider: Arc<dyn MaskProvider> = if let Some(matte_path) = &args.matte {
        let provider = MatteFileProvider::open(matte_path, splitter)
            .context("Failed to load matte")?;
        Arc::new(provider)
    } else if let Some(model_path) = &args.model {
        create_model_provider(model_path, args.model_size, splitter)?
    } else {
        bail!("No mask provider configured, pass --matte or --model")
    };

    Ok(Pipeline::with_provider(provider))
}

#[cfg(feature = "onnx")]
fn create_model_provider(
    model_path: &std::path::Path,
    model_size: u32,
    splitter: InstanceSplitter,
) -> Result<Arc<dyn MaskProvider>> {
    use subject_lift::segmentation::OnnxMatteProvider;

    let provider = OnnxMatteProvider::new(model_path, model_size, splitter)
        .context("Failed to load matting model")?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "onnx"))]
fn create_model_provider(
    model_path: &std::path::Path,
    _model_size: u32,
    _splitter: InstanceSplitter,
) -> Result<Arc<dyn MaskProvider>> {
    bail!(
        "Cannot load {}: built without the `onnx` feature",
        model_path.display()
    )
}

/// Log detected subjects left to right and return their ids
fn list_subjects(bench: &Workbench) -> Vec<InstanceId> {
    let Some(analysis) = bench.analysis() else {
        return Vec::new();
    };

    tracing::info!("Detected {} subjects", analysis.instances().len());
    analysis
        .by_position()
        .into_iter()
        .map(|instance| {
            match instance.bounds() {
                Some(b) => tracing::info!(
                    "Subject {}: position x {} y {}, size {}x{}, {} pixels",
                    instance.id,
                    b.x,
                    b.y,
                    b.width,
                    b.height,
                    instance.mask.area()
                ),
                None => tracing::info!("Subject {}: empty mask", instance.id),
            }
            instance.id
        })
        .collect()
}

async fn load_background(path: &std::path::Path) -> Result<RgbaImage> {
    let bytes = FileSource::new(path)
        .pick()
        .await?
        .context("No background was picked")?;
    let background = decode_image(&bytes)
        .with_context(|| format!("Failed to decode background {}", path.display()))?;
    tracing::info!(
        "Background: {}x{}",
        background.width(),
        background.height()
    );
    Ok(background)
}
