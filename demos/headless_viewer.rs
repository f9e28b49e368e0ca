//! Headless viewer: mount the viewer island offscreen, orbit the camera for a
//! number of frames and save the last one as a PNG.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use ultrav_gpu::RenderSettings;
use ultrav_io::DefaultFetcher;
use ultrav_viewer::island::{DEFAULT_HDR_URL, DEFAULT_MODEL_URL};
use ultrav_viewer::{CanvasSurface, ViewerConfig, ViewerIsland, ViewerState, WgpuBackend};

#[derive(Parser, Debug)]
#[command(name = "headless_viewer")]
#[command(about = "Render the Ultra-V viewer offscreen and save a snapshot")]
struct Cli {
    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Frames to render while orbiting
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Model URL or path (glTF, GLB or OBJ)
    #[arg(long, default_value = DEFAULT_MODEL_URL)]
    model: String,

    /// Environment map URL or path (Radiance HDR)
    #[arg(long, default_value = DEFAULT_HDR_URL)]
    hdr: String,

    /// Where to write the PNG
    #[arg(long, default_value = "viewer.png")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = ViewerConfig {
        model_url: cli.model.clone(),
        hdr_url: cli.hdr.clone(),
        // Frames are driven by hand below
        frame_interval: Duration::from_secs(3600),
        ..ViewerConfig::default()
    };
    let mut island = ViewerIsland::new(
        config,
        Arc::new(WgpuBackend::new(RenderSettings::default())),
        Arc::new(DefaultFetcher::new()),
    );

    let surface = CanvasSurface::new(cli.width, cli.height);
    let state = island.mount(Some(&surface));
    if state != ViewerState::Rendering {
        bail!("Viewer did not start (state {:?}); see the log for the reason", state);
    }

    println!("Loading {} and {}", cli.model, cli.hdr);
    let started = Instant::now();
    while !island.loads_finished() {
        if started.elapsed() > Duration::from_secs(120) {
            bail!("Timed out waiting for assets");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let models = island.scene().map(|scene| scene.read().models.len()).unwrap_or(0);
    println!("Assets ready in {:.2?} ({} model(s) in scene)", started.elapsed(), models);

    let controls = island.controls().context("Viewer has no controls")?;
    let step = std::f32::consts::TAU / cli.frames.max(1) as f32;
    for _ in 0..cli.frames {
        // Every change re-renders through the controls' change listener
        controls.rotate(step, 0.0);
    }

    let snapshot = island
        .snapshot()?
        .context("Renderer does not support read-back")?;
    let image = image::RgbaImage::from_raw(snapshot.width, snapshot.height, snapshot.rgba)
        .context("Snapshot has an unexpected size")?;
    image
        .save(&cli.out)
        .with_context(|| format!("Failed to write {}", cli.out.display()))?;

    let stats = island.frame_stats();
    island.unmount();

    println!(
        "Wrote {}x{} snapshot to {} ({} orbit frames, {} slow loop frames)",
        image.width(),
        image.height(),
        cli.out.display(),
        cli.frames,
        stats.slow
    );
    Ok(())
}
