//! # Ultra-V
//!
//! A small web front end with a 3D model viewer island.
//!
//! This is the umbrella crate that provides convenient access to all Ultra-V
//! functionality. Use it to get everything in one place, or depend on the
//! individual crates for more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Scene graph, camera, meshes and the `Outcome` helpers
//! - **I/O**: Asset fetching plus glTF, OBJ and HDR loading
//! - **GPU**: Offscreen wgpu scene renderer
//! - **Viewer**: The viewer island and its setup components
//! - **Web**: HTTP server with the landing page and localized contact form
//!
//! ## Quick Start
//!
//! ```rust
//! use ultrav::prelude::*;
//!
//! let outcome = ok(3);
//! assert!(outcome.is_ok());
//!
//! let camera = Camera::default();
//! assert_eq!(camera.distance(), 5.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io, viewer and web
//! - `io`: Asset fetching and model/environment loaders
//! - `gpu`: wgpu renderer (pulled in by `viewer` as well)
//! - `viewer`: Viewer island
//! - `web`: HTTP server
//! - `all`: Enables all features

// Re-export core functionality
pub use ultrav_core::*;

// Re-export sub-crates
#[cfg(feature = "io")]
pub use ultrav_io as io;

#[cfg(feature = "gpu")]
pub use ultrav_gpu as gpu;

#[cfg(feature = "viewer")]
pub use ultrav_viewer as viewer;

#[cfg(feature = "web")]
pub use ultrav_web as web;

/// Convenient imports for common use cases
pub mod prelude {
    pub use ultrav_core::*;

    #[cfg(feature = "io")]
    pub use ultrav_io::{load_model, AssetFetcher, DefaultFetcher, MemoryFetcher};

    #[cfg(feature = "gpu")]
    pub use ultrav_gpu::{RenderSettings, SceneRenderer};

    #[cfg(feature = "viewer")]
    pub use ultrav_viewer::{CanvasSurface, ViewerConfig, ViewerIsland, ViewerState, WgpuBackend};

    #[cfg(feature = "web")]
    pub use ultrav_web::{create_router, run_server, AppState, ServerConfig, Translations};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_core() {
        let outcome: Outcome<i32> = error("nope");
        assert!(outcome.is_error());
        assert_eq!(Camera::default().distance(), 5.0);
    }
}
