//! Scene, camera and renderer construction

use crate::backend::{CanvasSurface, GraphicsBackend};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use ultrav_core::{Camera, Point3, Renderer, Result, Scene, Vector3};

pub type SharedScene = Arc<RwLock<Scene>>;
pub type SharedCamera = Arc<RwLock<Camera>>;
pub type SharedRenderer = Arc<Mutex<Box<dyn Renderer>>>;

pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// The three objects every other viewer component works against
#[derive(Clone)]
pub struct SceneContext {
    pub scene: SharedScene,
    pub camera: SharedCamera,
    pub renderer: SharedRenderer,
}

pub struct SceneSetup;

impl SceneSetup {
    pub fn setup(backend: &dyn GraphicsBackend, surface: &CanvasSurface) -> Result<SceneContext> {
        let renderer = backend.create_renderer(surface)?;
        let camera = Self::create_camera(surface);

        tracing::debug!(
            "Scene set up for {}x{} surface (pixel ratio {})",
            surface.width,
            surface.height,
            surface.pixel_ratio
        );

        Ok(SceneContext {
            scene: Arc::new(RwLock::new(Scene::new())),
            camera: Arc::new(RwLock::new(camera)),
            renderer: Arc::new(Mutex::new(renderer)),
        })
    }

    /// Perspective camera five units back from the origin
    pub fn create_camera(surface: &CanvasSurface) -> Camera {
        Camera::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            CAMERA_FOV_DEGREES.to_radians(),
            surface.aspect_ratio(),
            CAMERA_NEAR,
            CAMERA_FAR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_parameters() {
        let camera = SceneSetup::create_camera(&CanvasSurface::new(1600, 900));
        assert_relative_eq!(camera.fov, 75.0f32.to_radians());
        assert_relative_eq!(camera.aspect_ratio, 16.0 / 9.0);
        assert_relative_eq!(camera.near, 0.1);
        assert_relative_eq!(camera.far, 1000.0);
        assert_relative_eq!(camera.position, Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(camera.distance(), 5.0);
    }

    #[test]
    fn test_zero_height_surface() {
        let camera = SceneSetup::create_camera(&CanvasSurface::new(800, 0));
        assert_relative_eq!(camera.aspect_ratio, 1.0);
    }
}
