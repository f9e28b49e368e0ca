//! Scene graph: nodes, materials, lights and the environment map

use crate::{Color, Matrix4, Point3f, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Physically based material used for all loaded model meshes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardMaterial {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

/// Surface material of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Unlit flat color
    Basic { color: Color },
    Standard(StandardMaterial),
}

impl Material {
    pub fn base_color(&self) -> Color {
        match self {
            Material::Basic { color } => *color,
            Material::Standard(m) => m.color,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Basic { color: [0.8, 0.8, 0.8] }
    }
}

/// Geometry plus material, placed in the scene by its owning [`Node`]
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<TriangleMesh>,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: TriangleMesh, material: Material) -> Self {
        Self {
            geometry: Arc::new(geometry),
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// A node in the scene graph. A loaded model is a tree of nodes.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Transform relative to the parent node
    pub transform: Matrix4<f32>,
    pub mesh: Option<Mesh>,
    pub children: Vec<Node>,
}

impl Node {
    /// Create an empty group node
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::group(name)
        }
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Visit this node and every descendant, depth first
    pub fn traverse(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    /// Mutable depth-first traversal
    pub fn traverse_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Meshes in this subtree paired with their world transforms
    pub fn world_meshes(&self, parent: &Matrix4<f32>) -> Vec<(Matrix4<f32>, &Mesh)> {
        let world = parent * self.transform;
        let mut out = Vec::new();
        if let Some(mesh) = &self.mesh {
            out.push((world, mesh));
        }
        for child in &self.children {
            out.extend(child.world_meshes(&world));
        }
        out
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |node| {
            if node.mesh.is_some() {
                count += 1;
            }
        });
        count
    }
}

/// Light sources supported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        position: Point3f,
        cast_shadow: bool,
    },
}

/// How an environment texture is projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureMapping {
    Uv,
    EquirectangularReflection,
}

/// Panoramic HDR texture used for reflections and the background
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    /// Linear RGB texels, row major
    pub texels: Vec<Color>,
    pub mapping: TextureMapping,
}

impl EnvironmentMap {
    pub fn new(width: u32, height: u32, texels: Vec<Color>) -> Self {
        Self {
            width,
            height,
            texels,
            mapping: TextureMapping::Uv,
        }
    }

    /// Mean radiance over all texels
    pub fn average_radiance(&self) -> Color {
        if self.texels.is_empty() {
            return [0.0, 0.0, 0.0];
        }
        let mut sum = [0.0f64; 3];
        for t in &self.texels {
            for c in 0..3 {
                sum[c] += t[c] as f64;
            }
        }
        let n = self.texels.len() as f64;
        [(sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32]
    }
}

/// What the renderer clears the frame to
#[derive(Debug, Clone)]
pub enum Background {
    Color(Color),
    Environment(Arc<EnvironmentMap>),
}

/// Root of everything the renderer draws
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub models: Vec<Arc<Node>>,
    pub lights: Vec<Light>,
    pub environment: Option<Arc<EnvironmentMap>>,
    pub background: Option<Background>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_model(&mut self, model: Arc<Node>) {
        self.models.push(model);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Every mesh in the scene with its world transform
    pub fn world_meshes(&self) -> Vec<(Matrix4<f32>, &Mesh)> {
        let identity = Matrix4::identity();
        self.models
            .iter()
            .flat_map(|m| m.world_meshes(&identity))
            .collect()
    }

    /// Drop every model, light and texture
    pub fn clear(&mut self) {
        self.models.clear();
        self.lights.clear();
        self.environment = None;
        self.background = None;
    }
}
