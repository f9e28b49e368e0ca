//! Drawing surfaces and the graphics backend seam

use crate::device_detection::{CapabilityProbe, WgpuProbe};
use serde::{Deserialize, Serialize};
use ultrav_core::{Renderer, Result};
use ultrav_gpu::{RenderSettings, SceneRenderer};

/// Size of the visible area the viewer is embedded in, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// The drawing surface a viewer mounts onto
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSurface {
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical pixel
    pub pixel_ratio: f32,
}

impl CanvasSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// The surface fills the viewport
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Graphics library behind the viewer
pub trait GraphicsBackend: CapabilityProbe + Send + Sync {
    /// Create a renderer bound to `surface`
    fn create_renderer(&self, surface: &CanvasSurface) -> Result<Box<dyn Renderer>>;
}

/// wgpu implementation
#[derive(Debug, Clone, Default)]
pub struct WgpuBackend {
    pub settings: RenderSettings,
}

impl WgpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }
}

impl CapabilityProbe for WgpuBackend {
    fn probe(&self) -> Result<bool> {
        WgpuProbe.probe()
    }
}

impl GraphicsBackend for WgpuBackend {
    fn create_renderer(&self, surface: &CanvasSurface) -> Result<Box<dyn Renderer>> {
        let settings = RenderSettings {
            pixel_ratio: surface.pixel_ratio,
            ..self.settings.clone()
        };
        let renderer = SceneRenderer::new(surface.width, surface.height, settings)?;
        Ok(Box::new(renderer))
    }
}
