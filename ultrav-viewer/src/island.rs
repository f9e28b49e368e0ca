//! Viewer island: mounts the 3D viewer onto a surface and drives it until unmount

use crate::backend::{CanvasSurface, GraphicsBackend};
use crate::controls::OrbitControls;
use crate::device_detection::{DeviceDetection, LowEndThresholds};
use crate::lighting::Lighting;
use crate::model_manager::ModelManager;
use crate::post_processing::{Composer, PostProcessing, PostProcessingConfig};
use crate::scene_setup::{SceneContext, SceneSetup, SharedCamera, SharedScene};
use crate::session::MountSession;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use ultrav_core::{Error, FrameSnapshot, Outcome, Result};
use ultrav_io::AssetFetcher;

pub const DEFAULT_MODEL_URL: &str =
    "https://cdn.jsdelivr.net/gh/mrdoob/three.js@master/examples/models/gltf/DamagedHelmet/glTF/DamagedHelmet.gltf";
pub const DEFAULT_HDR_URL: &str =
    "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/1k/abandoned_greenhouse_1k.hdr";

/// Lifecycle of the island
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Unmounted,
    CheckingCapability,
    /// Capability check failed; nothing is rendered until the next mount
    Aborted,
    Initializing,
    Rendering,
    Disposed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub model_url: String,
    pub hdr_url: String,
    pub frame_interval: Duration,
    pub slow_frame_threshold: Duration,
    pub low_end: LowEndThresholds,
    pub post_processing: PostProcessingConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.to_string(),
            hdr_url: DEFAULT_HDR_URL.to_string(),
            frame_interval: Duration::from_millis(16),
            slow_frame_threshold: Duration::from_millis(100),
            low_end: LowEndThresholds::default(),
            post_processing: PostProcessingConfig::default(),
        }
    }
}

/// Frame counters at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounts {
    pub rendered: u64,
    pub slow: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct FrameStats {
    rendered: AtomicU64,
    slow: AtomicU64,
    failed: AtomicU64,
}

impl FrameStats {
    fn record(&self, elapsed: Duration, threshold: Duration, result: &Result<()>) {
        match result {
            Ok(()) => {
                self.rendered.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Frame render failed: {}", e);
            }
        }
        if elapsed > threshold {
            self.slow.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Slow frame: {:.1} ms", elapsed.as_secs_f64() * 1000.0);
        }
    }

    fn counts(&self) -> FrameCounts {
        FrameCounts {
            rendered: self.rendered.load(Ordering::Relaxed),
            slow: self.slow.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Everything owned by one successful mount
struct Mounted {
    session: MountSession,
    context: SceneContext,
    composer: Arc<Composer>,
    controls: OrbitControls,
    frame_task: JoinHandle<()>,
    load_tasks: Vec<JoinHandle<()>>,
}

pub struct ViewerIsland {
    config: ViewerConfig,
    backend: Arc<dyn GraphicsBackend>,
    fetcher: Arc<dyn AssetFetcher>,
    state: ViewerState,
    mounted: Option<Mounted>,
    stats: Arc<FrameStats>,
    sessions: u64,
}

impl ViewerIsland {
    pub fn new(
        config: ViewerConfig,
        backend: Arc<dyn GraphicsBackend>,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        Self {
            config,
            backend,
            fetcher,
            state: ViewerState::Unmounted,
            mounted: None,
            stats: Arc::new(FrameStats::default()),
            sessions: 0,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Mount onto `surface`.
    ///
    /// Without a surface nothing happens. Must be called from within a
    /// tokio runtime; the frame loop and asset loads run as tasks on it.
    pub fn mount(&mut self, surface: Option<&CanvasSurface>) -> ViewerState {
        let Some(surface) = surface else {
            tracing::debug!("No surface to mount onto");
            return self.state;
        };
        if self.mounted.is_some() {
            tracing::debug!("Viewer already mounted");
            return self.state;
        }

        self.state = ViewerState::CheckingCapability;
        if let Outcome::Error(reason) = DeviceDetection::is_gpu_supported(self.backend.as_ref()) {
            tracing::warn!("Viewer disabled: {}", reason);
            self.state = ViewerState::Aborted;
            return self.state;
        }
        if DeviceDetection::is_low_end_device(surface.viewport(), &self.config.low_end) {
            tracing::warn!(
                "Viewer disabled: {}x{} viewport is below {}x{}",
                surface.width,
                surface.height,
                self.config.low_end.min_width,
                self.config.low_end.min_height
            );
            self.state = ViewerState::Aborted;
            return self.state;
        }

        self.state = ViewerState::Initializing;
        match self.initialize(surface) {
            Ok(mounted) => {
                tracing::debug!("Viewer session {} rendering", mounted.session.id());
                self.mounted = Some(mounted);
                self.state = ViewerState::Rendering;
            }
            Err(e) => {
                tracing::warn!("Viewer initialization failed: {}", e);
                self.state = ViewerState::Aborted;
            }
        }
        self.state
    }

    fn initialize(&mut self, surface: &CanvasSurface) -> Result<Mounted> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Unsupported(format!("Viewer needs a tokio runtime: {}", e)))?;

        self.sessions += 1;
        let session = MountSession::new(self.sessions);
        self.stats = Arc::new(FrameStats::default());
        let context = SceneSetup::setup(self.backend.as_ref(), surface)?;

        let mut load_tasks = Vec::with_capacity(2);
        load_tasks.push(Lighting::setup(
            &context.scene,
            &self.config.hdr_url,
            self.fetcher.clone(),
            &session,
        ));

        let composer = Arc::new(PostProcessing::setup(
            &context.scene,
            &context.camera,
            &context.renderer,
            &self.config.post_processing,
        ));

        let mut controls = OrbitControls::new(context.camera.clone());
        {
            let composer = composer.clone();
            let session = session.clone();
            controls.add_change_listener(move || {
                if !session.is_alive() {
                    return;
                }
                if let Err(e) = composer.render() {
                    tracing::warn!("Render after camera change failed: {}", e);
                }
            });
        }

        {
            let scene = context.scene.clone();
            let fetcher = self.fetcher.clone();
            let url = self.config.model_url.clone();
            let session = session.clone();
            load_tasks.push(runtime.spawn(async move {
                // The outcome is logged by the manager
                let _ = ModelManager::load_model(&scene, fetcher.as_ref(), &url, &session).await;
            }));
        }

        let frame_task = runtime.spawn(frame_loop(
            composer.clone(),
            session.clone(),
            self.stats.clone(),
            self.config.frame_interval,
            self.config.slow_frame_threshold,
        ));

        Ok(Mounted {
            session,
            context,
            composer,
            controls,
            frame_task,
            load_tasks,
        })
    }

    /// Tear down the current mount. The renderer is disposed and no task of
    /// the session touches the scene afterwards.
    pub fn unmount(&mut self) {
        let Some(mounted) = self.mounted.take() else {
            if self.state != ViewerState::Unmounted {
                self.state = ViewerState::Disposed;
            }
            return;
        };

        mounted.session.end(&mounted.context.scene);
        mounted.frame_task.abort();
        for task in &mounted.load_tasks {
            task.abort();
        }
        mounted.context.renderer.lock().dispose();

        tracing::debug!("Viewer session {} disposed", mounted.session.id());
        self.state = ViewerState::Disposed;
    }

    /// Render one frame immediately
    pub fn render_now(&self) -> Result<()> {
        self.mounted()?.composer.render()
    }

    /// Read back the last rendered frame, if the renderer supports it
    pub fn snapshot(&self) -> Result<Option<FrameSnapshot>> {
        self.mounted()?.context.renderer.lock().snapshot()
    }

    pub fn scene(&self) -> Option<SharedScene> {
        self.mounted.as_ref().map(|m| m.context.scene.clone())
    }

    pub fn camera(&self) -> Option<SharedCamera> {
        self.mounted.as_ref().map(|m| m.context.camera.clone())
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.mounted.as_ref().map(|m| &m.controls)
    }

    /// Whether the current session's asset loads have all finished
    pub fn loads_finished(&self) -> bool {
        self.mounted
            .as_ref()
            .map(|m| m.load_tasks.iter().all(|t| t.is_finished()))
            .unwrap_or(true)
    }

    /// Frame counters of the current or most recent session
    pub fn frame_stats(&self) -> FrameCounts {
        self.stats.counts()
    }

    fn mounted(&self) -> Result<&Mounted> {
        self.mounted
            .as_ref()
            .ok_or_else(|| Error::Visualization("Viewer is not mounted".to_string()))
    }
}

impl Drop for ViewerIsland {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn frame_loop(
    composer: Arc<Composer>,
    session: MountSession,
    stats: Arc<FrameStats>,
    interval: Duration,
    slow_threshold: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if !session.is_alive() {
            break;
        }
        let started = Instant::now();
        let result = composer.render();
        stats.record(started.elapsed(), slow_threshold, &result);
    }
}
