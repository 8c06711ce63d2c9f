use glam::Vec3;

/// Floats per interleaved vertex: `position.xyz` followed by `normal.xyz`.
pub const VERTEX_STRIDE: usize = 6;

/// GPU ready triangle mesh with interleaved vertex data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * VERTEX_STRIDE;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * VERTEX_STRIDE + 3;
        Vec3::from_slice(&self.vertices[base..base + 3])
    }

    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
        index
    }

    /// True when any vertex carries a zero normal.
    pub fn needs_normals(&self) -> bool {
        self.vertices
            .chunks_exact(VERTEX_STRIDE)
            .any(|chunk| chunk[3] == 0.0 && chunk[4] == 0.0 && chunk[5] == 0.0)
    }

    /// Replaces every normal with the area weighted average of its faces.
    pub fn compute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertex_count()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let p0 = self.position(i0);
            let normal = (self.position(i1) - p0).cross(self.position(i2) - p0);
            if normal.length_squared() > f32::EPSILON * f32::EPSILON {
                accum[i0] += normal;
                accum[i1] += normal;
                accum[i2] += normal;
            }
        }

        for (i, normal) in accum.into_iter().enumerate() {
            let normal = normal.normalize_or_zero();
            let base = i * VERTEX_STRIDE + 3;
            self.vertices[base..base + 3].copy_from_slice(&normal.to_array());
        }
    }
}
