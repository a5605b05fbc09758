//! Parametric mesh builders producing flat vertex/index data for upload.

use bytemuck::{Pod, Zeroable};

/// Vertex layout shared by every mesh in the demo (position + UV)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Triangle-list mesh data ready for buffer upload.
///
/// Invariants: every index is below the vertex count and the index count is
/// a multiple of 3.
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build a flat rectangular grid over the XZ plane.
///
/// `m x n` cells become `(m + 1) * (n + 1)` vertices in row-major order,
/// positions interpolated across the `width x depth` footprint (x grows from
/// -width/2, z shrinks from +depth/2) with UVs spanning `[0, 1]^2`. Each
/// cell emits two counter-clockwise triangles. `m` and `n` must be >= 1.
pub fn grid(width: f32, depth: f32, m: usize, n: usize) -> MeshData {
    let rows = m + 1;
    let cols = n + 1;

    let half_w = width * 0.5;
    let half_d = depth * 0.5;
    let dx = width / n as f32;
    let dz = depth / m as f32;
    let du = 1.0 / n as f32;
    let dv = 1.0 / m as f32;

    let mut vertices = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        let z = half_d - i as f32 * dz;
        for j in 0..cols {
            let x = -half_w + j as f32 * dx;
            vertices.push(MeshVertex {
                position: [x, 0.0, z],
                uv: [j as f32 * du, i as f32 * dv],
            });
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(rows, cols),
    }
}

/// Triangle-list indices for an existing `rows x cols` row-major vertex
/// grid (two CCW triangles per quad cell). Used directly by the wave mesh,
/// whose vertex data comes from the simulator instead of a builder.
pub fn grid_indices(rows: usize, cols: usize) -> Vec<u32> {
    let stride = cols as u32;
    let mut indices = Vec::with_capacity((rows - 1) * (cols - 1) * 6);
    for i in 0..(rows - 1) as u32 {
        for j in 0..(cols - 1) as u32 {
            indices.extend_from_slice(&[
                i * stride + j,
                i * stride + j + 1,
                (i + 1) * stride + j,
                (i + 1) * stride + j,
                i * stride + j + 1,
                (i + 1) * stride + j + 1,
            ]);
        }
    }
    indices
}

/// Build an axis-aligned cuboid centred at the origin: 24 vertices
/// (4 per face, each with its own UVs) and 36 indices.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let w = width * 0.5;
    let h = height * 0.5;
    let d = depth * 0.5;

    // Per face: four corners in CCW order seen from outside.
    let faces: [[[f32; 3]; 4]; 6] = [
        // front (-z)
        [[-w, -h, -d], [-w, h, -d], [w, h, -d], [w, -h, -d]],
        // back (+z)
        [[-w, -h, d], [w, -h, d], [w, h, d], [-w, h, d]],
        // top (+y)
        [[-w, h, -d], [-w, h, d], [w, h, d], [w, h, -d]],
        // bottom (-y)
        [[-w, -h, -d], [w, -h, -d], [w, -h, d], [-w, -h, d]],
        // left (-x)
        [[-w, -h, d], [-w, h, d], [-w, h, -d], [-w, -h, -d]],
        // right (+x)
        [[w, -h, -d], [w, h, -d], [w, h, d], [w, -h, d]],
    ];
    let face_uvs: [[f32; 2]; 4] = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (f, corners) in faces.iter().enumerate() {
        let base = (f * 4) as u32;
        for (c, &position) in corners.iter().enumerate() {
            vertices.push(MeshVertex {
                position,
                uv: face_uvs[c],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_counts() {
        let mesh = grid(160.0, 160.0, 50, 50);
        assert_eq!(mesh.vertices.len(), 2601);
        assert_eq!(mesh.indices.len(), 15000);
        assert_eq!(mesh.triangle_count(), 5000);
    }

    #[test]
    fn test_grid_indices_in_bounds() {
        for (m, n) in [(1, 1), (2, 5), (32, 32), (50, 50)] {
            let mesh = grid(100.0, 80.0, m, n);
            let vertex_count = ((m + 1) * (n + 1)) as u32;
            assert_eq!(mesh.vertices.len() as u32, vertex_count);
            assert_eq!(mesh.indices.len(), 6 * m * n);
            assert_eq!(mesh.indices.len() % 3, 0);
            for &i in &mesh.indices {
                assert!(i < vertex_count);
            }
        }
    }

    #[test]
    fn test_grid_cell_triangles_share_an_edge() {
        // The two triangles of every quad must share exactly two vertices.
        let mesh = grid(10.0, 10.0, 4, 3);
        for quad in mesh.indices.chunks(6) {
            let a = &quad[0..3];
            let b = &quad[3..6];
            let shared = a.iter().filter(|i| b.contains(i)).count();
            assert_eq!(shared, 2);
        }
    }

    #[test]
    fn test_grid_footprint_and_uvs() {
        let mesh = grid(160.0, 160.0, 2, 2);
        // Corner vertices sit on the footprint boundary.
        assert_eq!(mesh.vertices[0].position, [-80.0, 0.0, 80.0]);
        assert_eq!(mesh.vertices[8].position, [80.0, 0.0, -80.0]);
        assert_eq!(mesh.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(mesh.vertices[8].uv, [1.0, 1.0]);
        // Centre vertex at the origin.
        assert_eq!(mesh.vertices[4].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_grid_indices_standalone() {
        let indices = grid_indices(160, 160);
        assert_eq!(indices.len(), 159 * 159 * 6);
        for &i in &indices {
            assert!(i < 160 * 160);
        }
    }

    #[test]
    fn test_cuboid_counts() {
        let mesh = cuboid(1.0, 1.0, 1.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for &i in &mesh.indices {
            assert!(i < 24);
        }
    }

    #[test]
    fn test_cuboid_extents() {
        let mesh = cuboid(2.0, 4.0, 6.0);
        for v in &mesh.vertices {
            assert_eq!(v.position[0].abs(), 1.0);
            assert_eq!(v.position[1].abs(), 2.0);
            assert_eq!(v.position[2].abs(), 3.0);
        }
    }
}
