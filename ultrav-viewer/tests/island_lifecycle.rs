//! Mount/unmount lifecycle of the viewer island against an in-memory backend

use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use ultrav_core::{Camera, Error, Material, Renderer, Result, Scene};
use ultrav_io::{AssetFetcher, MemoryFetcher};
use ultrav_viewer::model_manager::MODEL_MATERIAL;
use ultrav_viewer::{
    CanvasSurface, CapabilityProbe, FrameCounts, GraphicsBackend, ViewerConfig, ViewerIsland, ViewerState,
};

const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

fn sky_hdr() -> Vec<u8> {
    let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1\n".to_vec();
    bytes.extend_from_slice(&[128, 128, 128, 129]);
    bytes
}

#[derive(Default)]
struct RenderLog {
    renders: AtomicUsize,
    disposed: AtomicBool,
}

struct FakeRenderer {
    log: Arc<RenderLog>,
    size: (u32, u32),
}

impl Renderer for FakeRenderer {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, _scene: &Scene, _camera: &Camera) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::Gpu("renderer disposed".to_string()));
        }
        self.log.renders.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn dispose(&mut self) {
        self.log.disposed.store(true, Ordering::SeqCst);
    }

    fn is_disposed(&self) -> bool {
        self.log.disposed.load(Ordering::SeqCst)
    }
}

enum Probe {
    Supported,
    Unsupported,
    Panics,
}

struct FakeBackend {
    probe: Probe,
    fail_renderer: bool,
    log: Arc<RenderLog>,
}

impl FakeBackend {
    fn new(probe: Probe) -> Self {
        Self {
            probe,
            fail_renderer: false,
            log: Arc::new(RenderLog::default()),
        }
    }
}

impl CapabilityProbe for FakeBackend {
    fn probe(&self) -> Result<bool> {
        match self.probe {
            Probe::Supported => Ok(true),
            Probe::Unsupported => Ok(false),
            Probe::Panics => panic!("no context"),
        }
    }
}

impl GraphicsBackend for FakeBackend {
    fn create_renderer(&self, surface: &CanvasSurface) -> Result<Box<dyn Renderer>> {
        if self.fail_renderer {
            return Err(Error::Gpu("out of memory".to_string()));
        }
        self.log.disposed.store(false, Ordering::SeqCst);
        Ok(Box::new(FakeRenderer {
            log: self.log.clone(),
            size: (surface.width, surface.height),
        }))
    }
}

/// Holds every fetch until released
struct GatedFetcher {
    inner: MemoryFetcher,
    gate: Arc<Notify>,
}

impl AssetFetcher for GatedFetcher {
    fn fetch<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            self.gate.notified().await;
            self.inner.fetch(location).await
        })
    }
}

fn config() -> ViewerConfig {
    ViewerConfig {
        model_url: "model.obj".to_string(),
        hdr_url: "sky.hdr".to_string(),
        frame_interval: Duration::from_millis(5),
        ..ViewerConfig::default()
    }
}

fn assets() -> MemoryFetcher {
    MemoryFetcher::new()
        .with("model.obj", TRIANGLE_OBJ)
        .with("sky.hdr", sky_hdr())
}

fn surface() -> CanvasSurface {
    CanvasSurface::new(1280, 720)
}

async fn wait_for_loads(island: &ViewerIsland) {
    for _ in 0..200 {
        if island.loads_finished() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("asset loads did not finish");
}

#[tokio::test]
async fn test_mount_without_surface_is_noop() {
    let mut island = ViewerIsland::new(
        config(),
        Arc::new(FakeBackend::new(Probe::Supported)),
        Arc::new(assets()),
    );
    assert_eq!(island.mount(None), ViewerState::Unmounted);
    assert!(island.scene().is_none());
}

#[tokio::test]
async fn test_unsupported_gpu_aborts() {
    let backend = Arc::new(FakeBackend::new(Probe::Unsupported));
    let log = backend.log.clone();
    let mut island = ViewerIsland::new(config(), backend, Arc::new(assets()));

    assert_eq!(island.mount(Some(&surface())), ViewerState::Aborted);
    assert!(island.scene().is_none());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(log.renders.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_probe_panic_aborts() {
    let mut island = ViewerIsland::new(
        config(),
        Arc::new(FakeBackend::new(Probe::Panics)),
        Arc::new(assets()),
    );
    assert_eq!(island.mount(Some(&surface())), ViewerState::Aborted);
}

#[tokio::test]
async fn test_low_end_device_aborts() {
    let mut island = ViewerIsland::new(
        config(),
        Arc::new(FakeBackend::new(Probe::Supported)),
        Arc::new(assets()),
    );
    let small = CanvasSurface::new(799, 600);
    assert_eq!(island.mount(Some(&small)), ViewerState::Aborted);
}

#[tokio::test]
async fn test_renderer_failure_aborts() {
    let mut backend = FakeBackend::new(Probe::Supported);
    backend.fail_renderer = true;
    let mut island = ViewerIsland::new(config(), Arc::new(backend), Arc::new(assets()));
    assert_eq!(island.mount(Some(&surface())), ViewerState::Aborted);
}

#[tokio::test]
async fn test_mount_loads_and_renders() {
    let backend = Arc::new(FakeBackend::new(Probe::Supported));
    let log = backend.log.clone();
    let mut island = ViewerIsland::new(config(), backend, Arc::new(assets()));

    assert_eq!(island.mount(Some(&surface())), ViewerState::Rendering);
    wait_for_loads(&island).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    let scene = island.scene().unwrap();
    {
        let scene = scene.read();
        assert_eq!(scene.lights.len(), 2);
        assert_eq!(scene.models.len(), 1);
        assert!(scene.environment.is_some());
        for (_, mesh) in scene.world_meshes() {
            assert_eq!(mesh.material, Material::Standard(MODEL_MATERIAL));
        }
    }

    assert!(log.renders.load(Ordering::SeqCst) > 0);
    assert!(island.frame_stats().rendered > 0);
    assert_eq!(island.frame_stats().failed, 0);
}

#[tokio::test]
async fn test_unmount_disposes_and_stops_frames() {
    let backend = Arc::new(FakeBackend::new(Probe::Supported));
    let log = backend.log.clone();
    let mut island = ViewerIsland::new(config(), backend, Arc::new(assets()));

    island.mount(Some(&surface()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    island.unmount();

    assert_eq!(island.state(), ViewerState::Disposed);
    assert!(log.disposed.load(Ordering::SeqCst));
    assert!(island.scene().is_none());
    assert!(island.render_now().is_err());

    let rendered = log.renders.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(log.renders.load(Ordering::SeqCst), rendered);
}

#[tokio::test]
async fn test_load_after_unmount_leaves_scene_untouched() {
    let gate = Arc::new(Notify::new());
    let fetcher = GatedFetcher {
        inner: assets(),
        gate: gate.clone(),
    };
    let mut island = ViewerIsland::new(
        config(),
        Arc::new(FakeBackend::new(Probe::Supported)),
        Arc::new(fetcher),
    );

    island.mount(Some(&surface()));
    let scene = island.scene().unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    island.unmount();

    gate.notify_waiters();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let scene = scene.read();
    assert!(scene.models.is_empty());
    assert!(scene.environment.is_none());
}

#[tokio::test]
async fn test_controls_trigger_render() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(FakeBackend::new(Probe::Supported));
    let log = backend.log.clone();
    let mut island = ViewerIsland::new(
        ViewerConfig {
            frame_interval: Duration::from_secs(3600),
            ..config()
        },
        backend,
        Arc::new(GatedFetcher {
            inner: assets(),
            gate,
        }),
    );

    island.mount(Some(&surface()));
    tokio::time::sleep(Duration::from_millis(10)).await;
    let before = log.renders.load(Ordering::SeqCst);

    let controls = island.controls().unwrap();
    controls.rotate(0.2, 0.0);
    controls.zoom(0.9);

    assert_eq!(log.renders.load(Ordering::SeqCst), before + 2);
    let camera = island.camera().unwrap();
    assert!((camera.read().distance() - 4.5).abs() < 1e-4);
}

#[tokio::test]
async fn test_remount_after_dispose() {
    let mut island = ViewerIsland::new(
        config(),
        Arc::new(FakeBackend::new(Probe::Supported)),
        Arc::new(assets()),
    );
    island.mount(Some(&surface()));
    island.unmount();
    assert_eq!(island.mount(Some(&surface())), ViewerState::Rendering);
    island.unmount();
}

#[tokio::test]
async fn test_remount_starts_fresh_frame_counts() {
    let mut island = ViewerIsland::new(
        config(),
        Arc::new(FakeBackend::new(Probe::Supported)),
        Arc::new(assets()),
    );
    island.mount(Some(&surface()));
    wait_for_loads(&island).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    island.unmount();
    let first = island.frame_stats();
    assert!(first.rendered > 0);
    assert_eq!(island.frame_stats(), first);

    assert_eq!(island.mount(Some(&surface())), ViewerState::Rendering);
    assert_eq!(island.frame_stats(), FrameCounts::default());
    island.unmount();
}
