//! Orbit camera controls

use crate::scene_setup::SharedCamera;
use nalgebra::Vector3;
use std::f32::consts::PI;

const POLAR_EPSILON: f32 = 1e-4;

type ChangeListener = Box<dyn Fn() + Send + Sync>;

/// Orbits the camera around its target
pub struct OrbitControls {
    camera: SharedCamera,
    listeners: Vec<ChangeListener>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
}

impl OrbitControls {
    pub fn new(camera: SharedCamera) -> Self {
        Self {
            camera,
            listeners: Vec::new(),
            min_distance: 0.5,
            max_distance: 500.0,
            rotate_speed: 1.0,
        }
    }

    /// Register a callback run after every camera change
    pub fn add_change_listener(&mut self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Rotate by `delta_azimuth` around the up axis and `delta_polar` towards it, in radians
    pub fn rotate(&self, delta_azimuth: f32, delta_polar: f32) {
        {
            let mut camera = self.camera.write();
            let offset = camera.position - camera.target;
            let radius = offset.norm();
            if radius <= f32::EPSILON {
                return;
            }

            let theta = offset.x.atan2(offset.z) + delta_azimuth * self.rotate_speed;
            let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + delta_polar * self.rotate_speed)
                .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

            let offset = Vector3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
            camera.position = camera.target + offset;
        }
        self.notify();
    }

    /// Scale the camera's distance to its target by `factor`; values below 1 zoom in
    pub fn zoom(&self, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        {
            let mut camera = self.camera.write();
            let offset = camera.position - camera.target;
            let distance = offset.norm();
            if distance <= f32::EPSILON {
                return;
            }
            let target_distance = (distance * factor).clamp(self.min_distance, self.max_distance);
            camera.position = camera.target + offset * (target_distance / distance);
        }
        self.notify();
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener();
        }
    }
}
