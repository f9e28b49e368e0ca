//! OBJ format support

use crate::fetch::{file_name, AssetFetcher};
use crate::IoError;
use obj::{IndexTuple, ObjData};
use ultrav_core::{Material, Mesh, Node, Point3f, Result, TriangleMesh};

/// Fetch and parse a Wavefront OBJ model
pub async fn load_obj(fetcher: &dyn AssetFetcher, url: &str) -> Result<Node> {
    let bytes = fetcher.fetch(url).await?;
    parse_obj(&bytes, file_name(url))
}

/// Parse OBJ text into a single-mesh node.
///
/// Every object and group is merged into one mesh. Polygons with more than
/// three corners are fan-triangulated around their first corner.
pub fn parse_obj(bytes: &[u8], name: &str) -> Result<Node> {
    let data = ObjData::load_buf(bytes).map_err(|e| IoError::ParseError {
        message: format!("OBJ: {:?}", e),
    })?;

    let vertices: Vec<Point3f> = data
        .position
        .iter()
        .map(|p| Point3f::new(p[0], p[1], p[2]))
        .collect();

    let mut faces: Vec<[u32; 3]> = Vec::new();
    for object in &data.objects {
        for group in &object.groups {
            for polygon in &group.polys {
                triangulate_fan(&polygon.0, vertices.len(), &mut faces)?;
            }
        }
    }

    if faces.is_empty() {
        return Err(IoError::ParseError {
            message: "OBJ contains no faces".to_string(),
        }
        .into());
    }

    let mut geometry = TriangleMesh::from_vertices_and_faces(vertices, faces);
    geometry.ensure_normals();

    let mesh_name = data
        .objects
        .iter()
        .map(|o| o.name.as_str())
        .find(|n| !n.is_empty())
        .unwrap_or("mesh")
        .to_string();

    let mut root = Node::group(name);
    root.add_child(Node::with_mesh(mesh_name, Mesh::new(geometry, Material::default())));
    Ok(root)
}

fn triangulate_fan(corners: &[IndexTuple], vertex_count: usize, faces: &mut Vec<[u32; 3]>) -> Result<()> {
    let mut indices = Vec::with_capacity(corners.len());
    for corner in corners {
        let index = corner.0;
        if index >= vertex_count {
            return Err(IoError::ParseError {
                message: format!("OBJ face references vertex {} of {}", index + 1, vertex_count),
            }
            .into());
        }
        let index = u32::try_from(index).map_err(|_| IoError::ParseError {
            message: format!("OBJ vertex index {} out of range", index),
        })?;
        indices.push(index);
    }

    if let Some((&first, rest)) = indices.split_first() {
        for pair in rest.windows(2) {
            faces.push([first, pair[0], pair[1]]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "o quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3\nf 1 3 4\n";

    #[test]
    fn test_parse_quad() {
        let model = parse_obj(QUAD.as_bytes(), "quad.obj").unwrap();
        assert_eq!(model.name, "quad.obj");
        assert_eq!(model.mesh_count(), 1);
        let mesh = model.children[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.geometry.face_count(), 2);
        assert!(mesh.geometry.normals.is_some());
        assert_eq!(mesh.material, Material::default());
    }

    #[test]
    fn test_polygon_faces_are_fan_triangulated() {
        let quad = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let model = parse_obj(quad.as_bytes(), "quad.obj").unwrap();
        let mesh = model.children[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.geometry.faces, vec![[0, 1, 2], [0, 2, 3]]);

        let pentagon = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let model = parse_obj(pentagon.as_bytes(), "pentagon.obj").unwrap();
        assert_eq!(model.children[0].mesh.as_ref().unwrap().geometry.face_count(), 3);
    }

    #[test]
    fn test_no_faces_is_an_error() {
        assert!(parse_obj(b"v 0 0 0\n", "points.obj").is_err());
    }
}
