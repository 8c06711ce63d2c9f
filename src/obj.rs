use std::collections::HashMap;

use glam::Vec3;

use crate::error::ObjError;
use crate::mesh::MeshData;

/// Named mesh declared by an `o` or `g` statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjObject {
    pub name: String,
    pub mesh: MeshData,
}

/// All meshes of an OBJ file, in declaration order. Groups without faces
/// are dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjModel {
    pub objects: Vec<ObjObject>,
}

impl ObjModel {
    /// The mesh the cells are instanced from.
    pub fn first_mesh(&self) -> Option<&MeshData> {
        self.objects.first().map(|object| &object.mesh)
    }

    pub fn into_first_mesh(self) -> Option<MeshData> {
        self.objects.into_iter().next().map(|object| object.mesh)
    }
}

/// Parses an OBJ file from memory into per-object interleaved meshes.
///
/// Vertex indices are global across objects as the format requires.
/// Polygons are fan triangulated and objects without normals get smooth
/// normals computed from their faces.
pub fn load_obj_from_str(data: &str) -> Result<ObjModel, ObjError> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut pending: Vec<PendingObject> = vec![PendingObject::default()];

    for (line_no, line) in data.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(parse_vec3(parts, line_no, "vertex")?),
            "vn" => normals.push(parse_vec3(parts, line_no, "normal")?),
            "f" => {
                let polygon = parse_face(parts, line_no)?;
                if let Some(object) = pending.last_mut() {
                    triangulate_face(&polygon, &mut object.faces);
                }
            }
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                match pending.last_mut() {
                    Some(current) if current.faces.is_empty() => current.name = name,
                    _ => pending.push(PendingObject {
                        name,
                        faces: Vec::new(),
                    }),
                }
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(ObjError::NoVertices);
    }

    let mut objects = Vec::new();
    for object in pending.into_iter().filter(|o| !o.faces.is_empty()) {
        let mut mesh = build_mesh(&positions, &normals, &object.faces)?;
        if mesh.needs_normals() {
            mesh.compute_normals();
        }
        objects.push(ObjObject {
            name: object.name,
            mesh,
        });
    }
    Ok(ObjModel { objects })
}

#[derive(Debug, Default)]
struct PendingObject {
    name: String,
    faces: Vec<[FaceIndex; 3]>,
}

fn parse_vec3<'a>(
    mut parts: impl Iterator<Item = &'a str>,
    line: usize,
    what: &'static str,
) -> Result<Vec3, ObjError> {
    let mut component = || -> Result<f32, ObjError> {
        parts
            .next()
            .ok_or(ObjError::MissingComponent { line, what })?
            .parse::<f32>()
            .map_err(|source| ObjError::InvalidFloat { line, source })
    };
    Ok(Vec3::new(component()?, component()?, component()?))
}

fn parse_face<'a>(
    parts: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec<FaceIndex>, ObjError> {
    let mut indices = Vec::new();
    for part in parts {
        let mut segments = part.split('/');
        let v = segments
            .next()
            .unwrap_or_default()
            .parse::<i32>()
            .map_err(|source| ObjError::InvalidIndex { line, source })?;
        // texture coordinates are not used by the renderer
        let _ = segments.next();
        let vn = match segments.next() {
            Some(s) if !s.is_empty() => s
                .parse::<i32>()
                .map_err(|source| ObjError::InvalidIndex { line, source })?,
            _ => 0,
        };
        indices.push(FaceIndex { v, vn });
    }
    if indices.len() < 3 {
        return Err(ObjError::DegenerateFace { line });
    }
    Ok(indices)
}

fn triangulate_face(polygon: &[FaceIndex], faces: &mut Vec<[FaceIndex; 3]>) {
    for i in 1..(polygon.len() - 1) {
        faces.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    position: usize,
    normal: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct FaceIndex {
    v: i32,
    vn: i32,
}

fn build_mesh(
    positions: &[Vec3],
    normals: &[Vec3],
    faces: &[[FaceIndex; 3]],
) -> Result<MeshData, ObjError> {
    let mut lookup: HashMap<Key, u32> = HashMap::new();
    let mut mesh = MeshData::default();

    for face in faces {
        for idx in face {
            let position = fix_index(idx.v, positions.len()).ok_or(ObjError::IndexOutOfRange {
                index: idx.v,
                count: positions.len(),
            })?;
            let normal = fix_index(idx.vn, normals.len());
            let key = Key { position, normal };
            let index = match lookup.get(&key) {
                Some(&index) => index,
                None => {
                    let normal = normal.map(|i| normals[i]).unwrap_or(Vec3::ZERO);
                    let index = mesh.push_vertex(positions[position], normal);
                    lookup.insert(key, index);
                    index
                }
            };
            mesh.indices.push(index);
        }
    }

    Ok(mesh)
}

/// Resolves 1-based and negative (relative) OBJ indices.
fn fix_index(index: i32, len: usize) -> Option<usize> {
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let abs = index.unsigned_abs() as usize;
        (abs <= len).then_some(len - abs)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_triangle() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let model = load_obj_from_str(obj).unwrap();
        let mesh = model.first_mesh().unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices.len(), 18);
    }

    #[test]
    fn computes_missing_normals() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj).unwrap().into_first_mesh().unwrap();
        for i in 0..mesh.vertex_count() {
            assert!((mesh.normal(i) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn keeps_declared_normals() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\nf 1//1 2//1 3//1\n";
        let mesh = load_obj_from_str(obj).unwrap().into_first_mesh().unwrap();
        assert_eq!(mesh.normal(0), Vec3::Y);
    }

    #[test]
    fn triangulates_quads_with_relative_indices() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf -4/1 -3/2 -2/3 -1/4\n";
        let mesh = load_obj_from_str(obj).unwrap().into_first_mesh().unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn first_mesh_is_first_object_with_faces() {
        let obj = "\
o Empty
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
g Cell
f 1 2 3
o Other
f 1 2 4
f 2 3 4
";
        let model = load_obj_from_str(obj).unwrap();
        assert_eq!(model.objects.len(), 2);
        assert_eq!(model.objects[0].name, "Cell");
        assert_eq!(model.first_mesh().unwrap().triangle_count(), 1);
        assert_eq!(model.objects[1].mesh.triangle_count(), 2);
    }

    #[test]
    fn vertices_without_faces_yield_no_objects() {
        let model = load_obj_from_str("v 0 0 0\nv 1 0 0\n").unwrap();
        assert!(model.first_mesh().is_none());
    }

    #[test]
    fn reports_bad_lines() {
        assert!(matches!(
            load_obj_from_str("v 0 0\n"),
            Err(ObjError::MissingComponent { line: 1, .. })
        ));
        assert!(matches!(
            load_obj_from_str("v 0 0 0\nv 1 x 0\n"),
            Err(ObjError::InvalidFloat { line: 2, .. })
        ));
        assert!(matches!(
            load_obj_from_str("v 0 0 0\nf 1 2\n"),
            Err(ObjError::DegenerateFace { line: 2 })
        ));
        assert!(matches!(
            load_obj_from_str("v 0 0 0\nf 1 2 3\n"),
            Err(ObjError::IndexOutOfRange { index: 2, count: 1 })
        ));
        assert!(matches!(load_obj_from_str("# empty\n"), Err(ObjError::NoVertices)));
    }
}
