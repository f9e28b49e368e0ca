//! Model loading and preparation

use crate::scene_setup::SharedScene;
use crate::session::MountSession;
use std::sync::Arc;
use ultrav_core::outcome::{self, Outcome};
use ultrav_core::{Material, Node, StandardMaterial};
use ultrav_io::AssetFetcher;

/// Material every loaded mesh is drawn with
pub const MODEL_MATERIAL: StandardMaterial = StandardMaterial {
    color: [1.0, 1.0, 1.0],
    roughness: 0.5,
    metalness: 0.5,
};

pub struct ModelManager;

impl ModelManager {
    /// Load the model at `url`, prepare it and add it to the scene.
    ///
    /// Never fails past this boundary: errors come back as
    /// `Outcome::Error("Failed to load model: ...")`. If the session ended
    /// while the asset was in flight the scene is left untouched.
    pub async fn load_model(
        scene: &SharedScene,
        fetcher: &dyn AssetFetcher,
        url: &str,
        session: &MountSession,
    ) -> Outcome<Arc<Node>> {
        let mut model = match ultrav_io::load_model(fetcher, url).await {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!("Failed to load model {}: {}", url, e);
                return outcome::error(format!("Failed to load model: {}", e));
            }
        };

        Self::prepare(&mut model);
        let model = Arc::new(model);

        let attached = session.with_live(scene, |scene| scene.add_model(model.clone()));
        if attached.is_none() {
            tracing::debug!("Viewer unmounted before model {} arrived", url);
            return outcome::error("Failed to load model: viewer was unmounted");
        }

        tracing::info!("Loaded model {} ({} meshes)", url, model.mesh_count());
        outcome::ok(model)
    }

    /// Give every mesh the standard material and turn shadows on
    pub fn prepare(model: &mut Node) {
        model.traverse_mut(&mut |node| {
            if let Some(mesh) = node.mesh.as_mut() {
                mesh.material = Material::Standard(MODEL_MATERIAL);
                mesh.cast_shadow = true;
                mesh.receive_shadow = true;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;
    use ultrav_core::Scene;
    use ultrav_io::MemoryFetcher;

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn shared_scene() -> SharedScene {
        Arc::new(RwLock::new(Scene::new()))
    }

    #[tokio::test]
    async fn test_materials_replaced() {
        let scene = shared_scene();
        let fetcher = MemoryFetcher::new().with("tri.obj", TRIANGLE_OBJ);
        let session = MountSession::new(1);

        let outcome = ModelManager::load_model(&scene, &fetcher, "tri.obj", &session).await;
        let model = outcome.value().unwrap().clone();

        let mut meshes = 0;
        model.traverse(&mut |node| {
            if let Some(mesh) = &node.mesh {
                meshes += 1;
                assert_eq!(mesh.material, Material::Standard(MODEL_MATERIAL));
                assert!(mesh.cast_shadow);
                assert!(mesh.receive_shadow);
            }
        });
        assert_eq!(meshes, 1);
        assert_eq!(scene.read().models.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_model_is_error_outcome() {
        let scene = shared_scene();
        let session = MountSession::new(1);

        let outcome =
            ModelManager::load_model(&scene, &MemoryFetcher::new(), "nope.gltf", &session).await;
        assert!(outcome.is_error());
        assert!(outcome
            .error_message()
            .unwrap()
            .starts_with("Failed to load model: "));
        assert!(scene.read().models.is_empty());
    }

    #[tokio::test]
    async fn test_late_completion_not_attached() {
        let scene = shared_scene();
        let fetcher = MemoryFetcher::new().with("tri.obj", TRIANGLE_OBJ);
        let session = MountSession::new(1);
        session.end(&scene);

        let outcome = ModelManager::load_model(&scene, &fetcher, "tri.obj", &session).await;
        assert!(outcome.is_error());
        assert!(scene.read().models.is_empty());
    }

    #[test]
    fn test_prepare_walks_children() {
        use ultrav_core::{Mesh, TriangleMesh};

        let triangle = || {
            TriangleMesh::from_vertices_and_faces(
                vec![
                    ultrav_core::Point3::new(0.0, 0.0, 0.0),
                    ultrav_core::Point3::new(1.0, 0.0, 0.0),
                    ultrav_core::Point3::new(0.0, 1.0, 0.0),
                ],
                vec![[0, 1, 2]],
            )
        };
        let mut root = Node::with_mesh("root", Mesh::new(triangle(), Material::default()));
        let mut child = Node::group("child");
        child.add_child(Node::with_mesh("leaf", Mesh::new(triangle(), Material::default())));
        root.add_child(child);

        ModelManager::prepare(&mut root);

        let mut standard = 0;
        root.traverse(&mut |node| {
            if let Some(mesh) = &node.mesh {
                assert!(matches!(mesh.material, Material::Standard(_)));
                standard += 1;
            }
        });
        assert_eq!(standard, 2);
    }
}
