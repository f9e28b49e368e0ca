//! 3D viewer island
//! 
//! This crate wires a scene, camera and renderer to a drawing surface and
//! drives them through a mount/unmount lifecycle:
//! - Device capability detection
//! - Scene, lighting and environment map setup
//! - Model loading with a standard material
//! - Post-processing composer
//! - Orbit camera controls
//! - The per-frame render loop

pub mod backend;
pub mod session;
pub mod device_detection;
pub mod scene_setup;
pub mod lighting;
pub mod model_manager;
pub mod post_processing;
pub mod controls;
pub mod island;

pub use backend::*;
pub use session::MountSession;
pub use device_detection::{CapabilityProbe, DeviceDetection, LowEndThresholds};
pub use scene_setup::{SceneContext, SceneSetup, SharedCamera, SharedRenderer, SharedScene};
pub use lighting::Lighting;
pub use model_manager::ModelManager;
pub use post_processing::{BloomSettings, Composer, Pass, PostProcessing, PostProcessingConfig, SsaoSettings};
pub use controls::OrbitControls;
pub use island::{FrameCounts, ViewerConfig, ViewerIsland, ViewerState};
