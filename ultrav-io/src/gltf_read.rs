//! glTF 2.0 import (`.gltf` with external or embedded buffers, and `.glb`)

use crate::fetch::{resolve_uri, AssetFetcher};
use crate::IoError;
use nalgebra::Matrix4;
use ultrav_core::{Material, Mesh, Node, Point3f, Result, StandardMaterial, TriangleMesh, Vector3f};

/// Where a glTF buffer's bytes come from
enum BufferSource {
    /// The binary chunk of a `.glb`
    Blob,
    Uri(String),
}

/// Fetch a glTF asset and every buffer it references, then build a node tree
pub async fn load_gltf(fetcher: &dyn AssetFetcher, url: &str) -> Result<Node> {
    let bytes = fetcher.fetch(url).await?;

    let (sources, blob) = {
        let gltf = gltf::Gltf::from_slice(&bytes).map_err(IoError::from)?;
        let sources: Vec<BufferSource> = gltf
            .document
            .buffers()
            .map(|buffer| match buffer.source() {
                gltf::buffer::Source::Bin => BufferSource::Blob,
                gltf::buffer::Source::Uri(uri) => BufferSource::Uri(resolve_uri(url, uri)),
            })
            .collect();
        (sources, gltf.blob.clone())
    };

    let mut buffers = Vec::with_capacity(sources.len());
    for source in sources {
        let data = match source {
            BufferSource::Blob => blob.clone().ok_or_else(|| IoError::ParseError {
                message: "glTF references a binary chunk but none is present".to_string(),
            })?,
            BufferSource::Uri(location) => fetcher.fetch(&location).await?,
        };
        buffers.push(data);
    }

    let gltf = gltf::Gltf::from_slice(&bytes).map_err(IoError::from)?;
    build_model(&gltf.document, &buffers, crate::fetch::file_name(url))
}

/// Build a node tree from a parsed document and its resolved buffers
pub fn build_model(document: &gltf::Document, buffers: &[Vec<u8>], name: &str) -> Result<Node> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| IoError::ParseError {
            message: "glTF contains no scenes".to_string(),
        })?;

    let mut root = Node::group(name);
    for node in scene.nodes() {
        root.add_child(convert_node(&node, buffers)?);
    }

    if root.mesh_count() == 0 {
        return Err(IoError::ParseError {
            message: "glTF contains no mesh primitives".to_string(),
        }
        .into());
    }
    Ok(root)
}

fn convert_node(node: &gltf::Node, buffers: &[Vec<u8>]) -> Result<Node> {
    let mut out = Node::group(node.name().unwrap_or("node"));
    out.transform = Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let primitives: Vec<Mesh> = mesh
            .primitives()
            .filter(|p| p.mode() == gltf::mesh::Mode::Triangles)
            .map(|p| convert_primitive(&p, buffers))
            .collect::<Result<_>>()?;

        // A single primitive lives on the node itself, several become children
        if primitives.len() == 1 {
            out.mesh = primitives.into_iter().next();
        } else {
            let mesh_name = mesh.name().unwrap_or("primitive").to_string();
            for (i, primitive) in primitives.into_iter().enumerate() {
                out.add_child(Node::with_mesh(format!("{}_{}", mesh_name, i), primitive));
            }
        }
    }

    for child in node.children() {
        out.add_child(convert_node(&child, buffers)?);
    }
    Ok(out)
}

fn convert_primitive(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Result<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.as_slice()));

    let vertices: Vec<Point3f> = reader
        .read_positions()
        .ok_or_else(|| IoError::ParseError {
            message: "primitive without POSITION attribute".to_string(),
        })?
        .map(|p| Point3f::new(p[0], p[1], p[2]))
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(IoError::ParseError {
            message: format!("index {} out of range for {} vertices", bad, vertices.len()),
        }
        .into());
    }
    let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

    let mut geometry = TriangleMesh::from_vertices_and_faces(vertices, faces);
    if let Some(normals) = reader.read_normals() {
        geometry.set_normals(normals.map(|n| Vector3f::new(n[0], n[1], n[2])).collect());
    }
    if let Some(uvs) = reader.read_tex_coords(0) {
        geometry.set_uvs(uvs.into_f32().collect());
    }
    geometry.ensure_normals();

    let pbr = primitive.material().pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let material = Material::Standard(StandardMaterial {
        color: [r, g, b],
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
    });

    Ok(Mesh::new(geometry, material))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use base64::Engine as _;

    /// One triangle: three positions followed by three u16 indices (padded)
    fn triangle_buffer() -> Vec<u8> {
        let mut bytes = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    fn triangle_gltf(buffer_uri: &str) -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [ {{ "nodes": [0] }} ],
  "nodes": [ {{ "name": "tri", "mesh": 0, "translation": [0.0, 2.0, 0.0] }} ],
  "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }} ] }} ],
  "materials": [ {{ "pbrMetallicRoughness": {{ "baseColorFactor": [1.0, 0.0, 0.0, 1.0], "metallicFactor": 0.0, "roughnessFactor": 0.25 }} }} ],
  "buffers": [ {{ "byteLength": 44, "uri": "{uri}" }} ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
            uri = buffer_uri
        )
    }

    #[tokio::test]
    async fn test_load_with_external_buffer() {
        let fetcher = MemoryFetcher::new()
            .with("models/tri.gltf", triangle_gltf("tri.bin").into_bytes())
            .with("models/tri.bin", triangle_buffer());

        let model = load_gltf(&fetcher, "models/tri.gltf").await.unwrap();
        assert_eq!(model.name, "tri.gltf");
        assert_eq!(model.mesh_count(), 1);

        let node = &model.children[0];
        assert_eq!(node.name, "tri");
        assert_eq!(node.transform[(1, 3)], 2.0);
        let mesh = node.mesh.as_ref().unwrap();
        assert_eq!(mesh.geometry.face_count(), 1);
        assert!(mesh.geometry.normals.is_some());
        match mesh.material {
            Material::Standard(m) => {
                assert_eq!(m.color, [1.0, 0.0, 0.0]);
                assert_eq!(m.roughness, 0.25);
            }
            other => panic!("unexpected material {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_with_data_uri() {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(triangle_buffer())
        );
        let fetcher = MemoryFetcher::new().with("tri.gltf", triangle_gltf(&uri).into_bytes());
        let model = load_gltf(&fetcher, "tri.gltf").await.unwrap();
        assert_eq!(model.mesh_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_buffer_is_an_error() {
        let fetcher = MemoryFetcher::new().with("tri.gltf", triangle_gltf("gone.bin").into_bytes());
        assert!(load_gltf(&fetcher, "tri.gltf").await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_is_an_error() {
        let fetcher = MemoryFetcher::new().with("bad.gltf", b"not json".to_vec());
        assert!(load_gltf(&fetcher, "bad.gltf").await.is_err());
    }
}
