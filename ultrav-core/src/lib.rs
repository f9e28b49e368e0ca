//! Core data structures and traits for ultrav
//! 
//! This crate provides the types shared by the viewer and the web front end:
//! the scene graph, camera, triangle meshes, the `Outcome` wrapper and the
//! renderer trait implemented by the GPU backend.

pub mod outcome;
pub mod mesh;
pub mod scene;
pub mod camera;
pub mod traits;
pub mod error;

pub use outcome::*;
pub use mesh::*;
pub use scene::*;
pub use camera::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, UnitQuaternion};

pub type Point3f = Point3<f32>;
pub type Vector3f = Vector3<f32>;

/// Linear RGB color
pub type Color = [f32; 3];

/// Convert a packed 0xRRGGBB value into a linear [`Color`]
pub fn color_from_hex(hex: u32) -> Color {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
