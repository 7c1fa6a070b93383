use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use offrender_core::{RenderConfig, SceneDescription};
use offrender_encode::PngWriter;
use offrender_render::{OffscreenPipeline, OsMesa};

#[derive(Parser)]
#[command(
    name = "offrender",
    version,
    about = "Render the reference scene offscreen with OSMesa and save it as PNG"
)]
struct Cli {
    /// Destination PNG [default: /dev/shm/render.png, or render.png in the temp directory]
    output: Option<PathBuf>,
}

/// `/dev/shm/render.png` where shared memory is mounted, else the temp directory.
fn default_output_path() -> PathBuf {
    default_output_in(Path::new("/dev/shm"))
}

fn default_output_in(shm: &Path) -> PathBuf {
    if shm.is_dir() {
        shm.join("render.png")
    } else {
        std::env::temp_dir().join("render.png")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let output = cli.output.unwrap_or_else(default_output_path);
    render_to(&output)
}

fn render_to(output: &Path) -> Result<()> {
    let start = Instant::now();
    let config = RenderConfig::default();
    let scene = SceneDescription::reference();

    let osmesa = OsMesa::load().context("failed to load the OSMesa library")?;
    let ctx = OffscreenPipeline::new(config)
        .run(Box::new(osmesa), &scene)
        .context("offscreen render failed")?;

    PngWriter::write(ctx.pixels(), output)
        .with_context(|| format!("failed to save {}", output.display()))?;

    tracing::info!(
        "Rendered {}x{} in {:.1}ms",
        ctx.width(),
        ctx.height(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
