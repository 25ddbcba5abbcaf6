//! The fixed scene both passes render: a floor, one giant cube, and a grid
//! of small cubes to cast and catch shadows on.

use std::{mem, sync::Arc};

use glam::{Mat4, Vec3};
use umbra::util::bind_merge::BindGroupBuilder;
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    BindGroup, Buffer, BufferAddress, BufferUsages, Device, VertexAttribute, VertexBufferLayout, VertexStepMode,
};

use crate::{common::WholeFrameInterfaces, uniforms::ObjectUniform};

#[derive(Debug, Copy, Clone)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

unsafe impl bytemuck::Zeroable for Vertex {}
unsafe impl bytemuck::Pod for Vertex {}

impl Vertex {
    const ATTRIBUTES: [VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// An uploaded mesh, shareable between scene objects.
pub struct GpuMesh {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

fn upload_mesh(device: &Device, label: &str, vertices: &[Vertex], indices: &[u16]) -> GpuMesh {
    let vertex_buffer = device.create_buffer_init(&BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(vertices),
        usage: BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(indices),
        usage: BufferUsages::INDEX,
    });
    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: indices.len() as u32,
    }
}

// Each face as (outward normal, right, down) seen from outside the cube,
// with right x down = normal. That winding is front-facing under the
// clockwise convention the pipelines use.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::NEG_Z, Vec3::X, Vec3::NEG_Y),
    (Vec3::Z, Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::X, Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Z, Vec3::NEG_Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
];

/// A cube spanning -1..1 on every axis.
pub fn cube_mesh(device: &Device) -> GpuMesh {
    let mut vertices = Vec::with_capacity(24);
    let mut indices: Vec<u16> = Vec::with_capacity(36);

    for (normal, right, down) in CUBE_FACES {
        let base = vertices.len() as u16;
        let corner = normal - right - down;
        for offset in [Vec3::ZERO, right * 2.0, right * 2.0 + down * 2.0, down * 2.0] {
            vertices.push(Vertex {
                position: (corner + offset).to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    upload_mesh(device, "cube mesh", &vertices, &indices)
}

/// A flat floor quad in the xz plane facing +Y.
pub fn plane_mesh(device: &Device, half_extent: f32) -> GpuMesh {
    let h = half_extent;
    let vertices = [
        Vertex {
            position: [-h, 0.0, h],
            normal: [0.0, 1.0, 0.0],
        },
        Vertex {
            position: [h, 0.0, h],
            normal: [0.0, 1.0, 0.0],
        },
        Vertex {
            position: [h, 0.0, -h],
            normal: [0.0, 1.0, 0.0],
        },
        Vertex {
            position: [-h, 0.0, -h],
            normal: [0.0, 1.0, 0.0],
        },
    ];
    let indices = [0u16, 1, 2, 0, 2, 3];

    upload_mesh(device, "floor mesh", &vertices, &indices)
}

/// One drawable: a mesh, where it sits, and its uploaded model matrix.
///
/// The same list is handed to the shadow pass and the forward pass, so the
/// two can never disagree about what is in the world.
pub struct SceneObject {
    pub mesh: Arc<GpuMesh>,
    pub transform: Mat4,
    pub bind_group: BindGroup,
}

impl SceneObject {
    pub fn new(device: &Device, interfaces: &WholeFrameInterfaces, mesh: Arc<GpuMesh>, transform: Mat4) -> Self {
        let uniform = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("object uniform"),
            contents: bytemuck::bytes_of(&ObjectUniform { model: transform }),
            usage: BufferUsages::UNIFORM,
        });
        let bind_group = BindGroupBuilder::new()
            .append_buffer(&uniform)
            .build(device, Some("object bg"), &interfaces.object_bgl);

        Self {
            mesh,
            transform,
            bind_group,
        }
    }
}

/// Spacing of the small cube grid.
const GRID_STEP: usize = 8;
/// The grid covers -GRID_RANGE..=GRID_RANGE on x and z.
const GRID_RANGE: i32 = 50;

/// Builds the fixed object list: the floor, a giant cube in the distance,
/// and the grid of small cubes.
pub fn sample_scene(device: &Device, interfaces: &WholeFrameInterfaces) -> Vec<SceneObject> {
    profiling::scope!("sample_scene");

    let cube = Arc::new(cube_mesh(device));
    let floor = Arc::new(plane_mesh(device, 60.0));

    let mut objects = Vec::new();

    objects.push(SceneObject::new(
        device,
        interfaces,
        floor,
        Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
    ));

    objects.push(SceneObject::new(
        device,
        interfaces,
        Arc::clone(&cube),
        Mat4::from_translation(Vec3::new(0.0, 5.0, -50.0)) * Mat4::from_scale(Vec3::splat(10.0)),
    ));

    for x in (-GRID_RANGE..=GRID_RANGE).step_by(GRID_STEP) {
        for z in (-GRID_RANGE..=GRID_RANGE).step_by(GRID_STEP) {
            objects.push(SceneObject::new(
                device,
                interfaces,
                Arc::clone(&cube),
                Mat4::from_translation(Vec3::new(x as f32, 0.0, z as f32)),
            ));
        }
    }

    log::info!("Scene built: {} objects", objects.len());

    objects
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::CUBE_FACES;

    #[test]
    fn cube_faces_wind_outward() {
        for (normal, right, down) in CUBE_FACES {
            assert_eq!(right.cross(down), normal);
            assert_eq!(normal.length_squared(), 1.0);
        }
    }

    #[test]
    fn grid_object_count() {
        let steps = ((-super::GRID_RANGE..=super::GRID_RANGE).step_by(super::GRID_STEP)).count();
        assert_eq!(steps, 13);
        // floor + giant + grid
        assert_eq!(2 + steps * steps, 171);
    }
}
