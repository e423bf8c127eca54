//! Base meshes shared by every instance: a unit cube and a unit-diameter
//! UV sphere, both centered at the origin with per-vertex normals.

use bytemuck::{Pod, Zeroable};

/// Mesh vertex — object-space position and normal.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x3,  // normal
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Unit cube: 24 vertices (4 per face, so normals stay flat), 36 indices.
pub fn cube() -> (Vec<Vertex>, Vec<u16>) {
    const H: f32 = 0.5;
    // (normal, four corners counter-clockwise seen from outside)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-H, -H, H], [H, -H, H], [H, H, H], [-H, H, H]]),
        ([0.0, 0.0, -1.0], [[H, -H, -H], [-H, -H, -H], [-H, H, -H], [H, H, -H]]),
        ([1.0, 0.0, 0.0], [[H, -H, H], [H, -H, -H], [H, H, -H], [H, H, H]]),
        ([-1.0, 0.0, 0.0], [[-H, -H, -H], [-H, -H, H], [-H, H, H], [-H, H, -H]]),
        ([0.0, 1.0, 0.0], [[-H, H, H], [H, H, H], [H, H, -H], [-H, H, -H]]),
        ([0.0, -1.0, 0.0], [[-H, -H, -H], [H, -H, -H], [H, -H, H], [-H, -H, H]]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        for position in corners {
            vertices.push(Vertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// UV sphere of diameter 1.
pub fn sphere(stacks: u16, sectors: u16) -> (Vec<Vertex>, Vec<u16>) {
    use std::f32::consts::PI;
    const RADIUS: f32 = 0.5;

    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        let y = phi.cos();
        let ring = phi.sin();
        for j in 0..=sectors {
            let theta = 2.0 * PI * j as f32 / sectors as f32;
            let n = [ring * theta.cos(), y, ring * theta.sin()];
            vertices.push(Vertex {
                position: [n[0] * RADIUS, n[1] * RADIUS, n[2] * RADIUS],
                normal: n,
            });
        }
    }

    let mut indices = Vec::with_capacity((stacks * sectors * 6) as usize);
    let row = sectors + 1;
    for i in 0..stacks {
        for j in 0..sectors {
            let a = i * row + j;
            let b = a + row;
            // Degenerate triangles at the poles are harmless.
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_counts() {
        let (vertices, indices) = cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn sphere_stays_on_radius() {
        let (vertices, indices) = sphere(12, 16);
        assert_eq!(indices.len() % 3, 0);
        for v in &vertices {
            let r2: f32 = v.position.iter().map(|c| c * c).sum();
            assert!((r2.sqrt() - 0.5).abs() < 1e-5);
        }
    }
}
