//! Scene lighting and the HDR environment map

use crate::scene_setup::SharedScene;
use crate::session::MountSession;
use std::sync::Arc;
use tokio::task::JoinHandle;
use ultrav_core::{color_from_hex, Background, Light, Point3, TextureMapping};
use ultrav_io::AssetFetcher;

pub const AMBIENT_COLOR: u32 = 0x404040;
pub const AMBIENT_INTENSITY: f32 = 1.0;
pub const DIRECTIONAL_INTENSITY: f32 = 0.5;

pub struct Lighting;

impl Lighting {
    /// Add the fixed lights and start loading the environment map.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// tracks the environment load.
    pub fn setup(
        scene: &SharedScene,
        hdr_url: &str,
        fetcher: Arc<dyn AssetFetcher>,
        session: &MountSession,
    ) -> JoinHandle<()> {
        {
            let mut scene = scene.write();
            for light in Self::default_lights() {
                scene.add_light(light);
            }
        }

        let scene = scene.clone();
        let url = hdr_url.to_string();
        let session = session.clone();
        tokio::spawn(async move {
            Self::load_environment(&scene, &url, fetcher.as_ref(), &session).await;
        })
    }

    /// Ambient fill plus a white shadow-casting directional light
    pub fn default_lights() -> [Light; 2] {
        [
            Light::Ambient {
                color: color_from_hex(AMBIENT_COLOR),
                intensity: AMBIENT_INTENSITY,
            },
            Light::Directional {
                color: [1.0, 1.0, 1.0],
                intensity: DIRECTIONAL_INTENSITY,
                position: Point3::new(10.0, 10.0, 10.0),
                cast_shadow: true,
            },
        ]
    }

    /// Fetch the panorama and install it as environment and background.
    ///
    /// Returns whether the map was applied. Failures are logged, not returned.
    pub async fn load_environment(
        scene: &SharedScene,
        url: &str,
        fetcher: &dyn AssetFetcher,
        session: &MountSession,
    ) -> bool {
        let mut environment = match ultrav_io::load_hdr(fetcher, url).await {
            Ok(environment) => environment,
            Err(e) => {
                tracing::warn!("Failed to load environment map {}: {}", url, e);
                return false;
            }
        };
        environment.mapping = TextureMapping::EquirectangularReflection;
        let environment = Arc::new(environment);

        let applied = session.with_live(scene, |scene| {
            scene.environment = Some(environment.clone());
            scene.background = Some(Background::Environment(environment.clone()));
        });

        match applied {
            Some(()) => {
                tracing::info!(
                    "Environment map {} applied ({}x{})",
                    url,
                    environment.width,
                    environment.height
                );
                true
            }
            None => {
                tracing::debug!("Viewer unmounted before environment map {} arrived", url);
                false
            }
        }
    }
}
