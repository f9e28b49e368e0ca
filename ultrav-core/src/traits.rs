//! Core traits for ultrav

use crate::{camera::Camera, scene::Scene, Result};

/// RGBA8 pixels read back from a renderer's target
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// A device-backed renderer bound to one drawing surface.
///
/// Implemented by the wgpu renderer; the viewer only talks to this trait.
pub trait Renderer: Send {
    /// Size of the render target in physical pixels
    fn size(&self) -> (u32, u32);

    /// Draw the scene from the camera's point of view
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()>;

    /// Release device resources. Rendering after this is an error.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;

    /// Read back the last rendered frame, if the target supports it
    fn snapshot(&mut self) -> Result<Option<FrameSnapshot>> {
        Ok(None)
    }
}
