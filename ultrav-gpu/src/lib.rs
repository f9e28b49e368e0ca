//! # ultrav GPU
//!
//! wgpu backend for the viewer: device setup, a capability probe, and an
//! offscreen scene renderer implementing [`ultrav_core::Renderer`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ultrav_gpu::{SceneRenderer, RenderSettings};
//! use ultrav_core::{Camera, Renderer, Scene};
//!
//! fn example() -> ultrav_core::Result<()> {
//!     let mut renderer = SceneRenderer::new(800, 600, RenderSettings::default())?;
//!     renderer.render(&Scene::new(), &Camera::default())?;
//!     let frame = renderer.snapshot()?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod renderer;
pub mod shaders;

pub use device::{probe_adapter, GpuContext};
pub use renderer::{MeshVertex, RenderSettings, SceneRenderer};
