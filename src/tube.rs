use std::f32::consts::TAU;

use glam::{Mat3, Vec3};

use crate::mesh::MeshData;
use crate::path::CatmullRomPath;

/// Parallel transport frames sampled along a path.
#[derive(Debug, Clone, PartialEq)]
pub struct FrenetFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

/// Computes `segments + 1` frames at evenly spaced arc lengths.
///
/// The first normal is seeded perpendicular to the tangent's smallest
/// component; each following frame rotates the previous one by the turn
/// between consecutive tangents so the tube does not twist.
pub fn frenet_frames(path: &CatmullRomPath, segments: u32) -> FrenetFrames {
    let segments = segments.max(1);
    let tangents: Vec<Vec3> = (0..=segments)
        .map(|i| path.tangent_at(i as f32 / segments as f32))
        .collect();

    let mut normals = Vec::with_capacity(tangents.len());
    let mut binormals = Vec::with_capacity(tangents.len());

    let first = tangents[0];
    let seed = smallest_axis(first);
    let normal = first.cross(first.cross(seed).normalize_or_zero());
    normals.push(normal);
    binormals.push(first.cross(normal));

    for i in 1..tangents.len() {
        let mut normal = normals[i - 1];
        let axis = tangents[i - 1].cross(tangents[i]);
        if axis.length() > f32::EPSILON {
            let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
            normal = Mat3::from_axis_angle(axis.normalize(), theta) * normal;
        }
        normals.push(normal);
        binormals.push(tangents[i].cross(normal));
    }

    FrenetFrames {
        tangents,
        normals,
        binormals,
    }
}

fn smallest_axis(tangent: Vec3) -> Vec3 {
    let abs = tangent.abs();
    let mut min = f32::MAX;
    let mut axis = Vec3::X;
    if abs.x <= min {
        min = abs.x;
        axis = Vec3::X;
    }
    if abs.y <= min {
        min = abs.y;
        axis = Vec3::Y;
    }
    if abs.z <= min {
        axis = Vec3::Z;
    }
    axis
}

/// Sweeps a circle of `radius` along the path.
///
/// Produces `(tubular + 1) * (radial + 1)` vertices: the seam column is
/// duplicated so every ring closes, and the ends stay open.
pub fn tube_mesh(path: &CatmullRomPath, tubular: u32, radius: f32, radial: u32) -> MeshData {
    let tubular = tubular.max(1);
    let radial = radial.max(3);
    let frames = frenet_frames(path, tubular);
    let mut mesh = MeshData::default();

    for i in 0..=tubular {
        let center = path.point_at(i as f32 / tubular as f32);
        let n = frames.normals[i as usize];
        let b = frames.binormals[i as usize];
        for j in 0..=radial {
            let angle = j as f32 / radial as f32 * TAU;
            let normal = (n * -angle.cos() + b * angle.sin()).normalize_or_zero();
            mesh.push_vertex(center + normal * radius, normal);
        }
    }

    let ring = radial + 1;
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = ring * (j - 1) + (i - 1);
            let b = ring * j + (i - 1);
            let c = ring * j + i;
            let d = ring * (j - 1) + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}
