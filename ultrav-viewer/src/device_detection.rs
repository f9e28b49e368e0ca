//! Device capability detection

use crate::backend::Viewport;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use ultrav_core::outcome::{self, Outcome};
use ultrav_core::Result;

/// Something that can tell whether a rendering context is obtainable
pub trait CapabilityProbe {
    fn probe(&self) -> Result<bool>;
}

/// Requests a wgpu adapter without a surface
#[derive(Debug, Clone, Copy, Default)]
pub struct WgpuProbe;

impl CapabilityProbe for WgpuProbe {
    fn probe(&self) -> Result<bool> {
        ultrav_gpu::probe_adapter()
    }
}

/// Viewports smaller than this in either dimension are considered low-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowEndThresholds {
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for LowEndThresholds {
    fn default() -> Self {
        Self {
            min_width: 800,
            min_height: 600,
        }
    }
}

pub struct DeviceDetection;

impl DeviceDetection {
    /// Ask `probe` whether GPU rendering is available.
    ///
    /// Probe errors and panics are folded into the returned outcome.
    pub fn is_gpu_supported(probe: &dyn CapabilityProbe) -> Outcome<bool> {
        match panic::catch_unwind(AssertUnwindSafe(|| probe.probe())) {
            Ok(Ok(true)) => Outcome::Ok(true),
            Ok(Ok(false)) => outcome::error("GPU rendering is not supported on this device."),
            Ok(Err(e)) => outcome::error(format!("Error checking GPU support: {}", e)),
            Err(payload) => outcome::error(format!(
                "Error checking GPU support: {}",
                panic_message(payload.as_ref())
            )),
        }
    }

    pub fn is_low_end_device(viewport: Viewport, thresholds: &LowEndThresholds) -> bool {
        viewport.width < thresholds.min_width || viewport.height < thresholds.min_height
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "probe panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ultrav_core::Error;

    struct FixedProbe(Result<bool>);

    impl CapabilityProbe for FixedProbe {
        fn probe(&self) -> Result<bool> {
            match &self.0 {
                Ok(v) => Ok(*v),
                Err(e) => Err(Error::Gpu(e.to_string())),
            }
        }
    }

    struct PanickingProbe;

    impl CapabilityProbe for PanickingProbe {
        fn probe(&self) -> Result<bool> {
            panic!("context creation blew up")
        }
    }

    fn viewport(width: u32, height: u32) -> Viewport {
        Viewport { width, height }
    }

    #[test]
    fn test_supported() {
        let outcome = DeviceDetection::is_gpu_supported(&FixedProbe(Ok(true)));
        assert_eq!(outcome, Outcome::Ok(true));
    }

    #[test]
    fn test_unsupported() {
        let outcome = DeviceDetection::is_gpu_supported(&FixedProbe(Ok(false)));
        assert!(outcome.is_error());
        assert_eq!(
            outcome.error_message(),
            Some("GPU rendering is not supported on this device.")
        );
    }

    #[test]
    fn test_probe_error() {
        let probe = FixedProbe(Err(Error::Gpu("no backend".to_string())));
        let outcome = DeviceDetection::is_gpu_supported(&probe);
        let message = outcome.error_message().unwrap();
        assert!(message.starts_with("Error checking GPU support: "));
        assert!(message.contains("no backend"));
    }

    #[test]
    fn test_probe_panic_is_caught() {
        let outcome = DeviceDetection::is_gpu_supported(&PanickingProbe);
        assert!(outcome.is_error());
        assert!(outcome
            .error_message()
            .unwrap()
            .contains("context creation blew up"));
    }

    #[test]
    fn test_low_end_boundaries() {
        let thresholds = LowEndThresholds::default();
        assert!(DeviceDetection::is_low_end_device(viewport(799, 600), &thresholds));
        assert!(!DeviceDetection::is_low_end_device(viewport(800, 600), &thresholds));
        assert!(DeviceDetection::is_low_end_device(viewport(800, 599), &thresholds));
        assert!(!DeviceDetection::is_low_end_device(viewport(1920, 1080), &thresholds));
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = LowEndThresholds {
            min_width: 100,
            min_height: 100,
        };
        assert!(!DeviceDetection::is_low_end_device(viewport(320, 240), &thresholds));
    }
}
