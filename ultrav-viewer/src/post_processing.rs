//! Post-processing composer

use crate::scene_setup::{SharedCamera, SharedRenderer, SharedScene};
use serde::{Deserialize, Serialize};
use ultrav_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomSettings {
    pub enabled: bool,
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 0.7,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

/// Screen-space ambient occlusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SsaoSettings {
    pub enabled: bool,
    pub kernel_radius: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            kernel_radius: 8.0,
            min_distance: 0.005,
            max_distance: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PostProcessingConfig {
    pub bloom: BloomSettings,
    pub ssao: SsaoSettings,
}

/// One stage of the composer chain
#[derive(Clone)]
pub enum Pass {
    /// Draw the scene from the camera
    Render { scene: SharedScene, camera: SharedCamera },
}

impl Pass {
    pub fn name(&self) -> &'static str {
        match self {
            Pass::Render { .. } => "render",
        }
    }
}

/// Runs its passes in order against one renderer
pub struct Composer {
    renderer: SharedRenderer,
    passes: Vec<Pass>,
}

impl Composer {
    pub fn new(renderer: SharedRenderer) -> Self {
        Self {
            renderer,
            passes: Vec::new(),
        }
    }

    pub fn add_pass(&mut self, pass: Pass) {
        self.passes.push(pass);
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn renderer(&self) -> &SharedRenderer {
        &self.renderer
    }

    pub fn render(&self) -> Result<()> {
        if self.passes.is_empty() {
            return Err(Error::Visualization("Composer has no passes".to_string()));
        }
        for pass in &self.passes {
            match pass {
                Pass::Render { scene, camera } => {
                    let camera = camera.read().clone();
                    let mut renderer = self.renderer.lock();
                    let scene = scene.read();
                    renderer.render(&scene, &camera)?;
                }
            }
        }
        Ok(())
    }
}

pub struct PostProcessing;

impl PostProcessing {
    /// Build a composer with a single render pass.
    ///
    /// Bloom and SSAO have no pass implementation; enabling them only logs.
    pub fn setup(
        scene: &SharedScene,
        camera: &SharedCamera,
        renderer: &SharedRenderer,
        config: &PostProcessingConfig,
    ) -> Composer {
        let mut composer = Composer::new(renderer.clone());
        composer.add_pass(Pass::Render {
            scene: scene.clone(),
            camera: camera.clone(),
        });

        if config.bloom.enabled {
            tracing::warn!(
                "Bloom (strength {}, radius {}, threshold {}) is not available, skipping",
                config.bloom.strength,
                config.bloom.radius,
                config.bloom.threshold
            );
        }
        if config.ssao.enabled {
            tracing::warn!("SSAO is not available, skipping");
        }

        composer
    }
}
