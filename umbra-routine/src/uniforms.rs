//! The CPU-side layouts of the per-frame uniform buffers.

use glam::{Mat4, Vec4};
use umbra::{managers::CameraManager, types::DirectionalLight};
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    Buffer, BufferUsages, Device, Queue,
};

/// Camera data consumed by both passes. The shadow pass binds one of these
/// filled from the light's fitted camera, the forward pass one filled from
/// whichever camera is being viewed through.
#[derive(Debug, Copy, Clone)]
#[repr(C, align(16))]
pub struct CameraUniform {
    view: Mat4,
    proj: Mat4,
    view_proj: Mat4,
    position: Vec4,
}

unsafe impl bytemuck::Zeroable for CameraUniform {}
unsafe impl bytemuck::Pod for CameraUniform {}

impl CameraUniform {
    pub fn from_camera(camera: &CameraManager) -> Self {
        Self {
            view: camera.view(),
            proj: camera.proj(),
            view_proj: camera.view_proj(),
            position: camera.location().extend(1.0),
        }
    }
}

/// Directional light data for the forward pass: the travel direction for
/// shading plus the light's view/projection for shadow map lookups.
#[derive(Debug, Copy, Clone)]
#[repr(C, align(16))]
pub struct LightUniform {
    view: Mat4,
    proj: Mat4,
    view_proj: Mat4,
    direction: Vec4,
    /// rgb is the color, w the intensity multiplier.
    color: Vec4,
}

unsafe impl bytemuck::Zeroable for LightUniform {}
unsafe impl bytemuck::Pod for LightUniform {}

impl LightUniform {
    pub fn new(light: &DirectionalLight, shadow_camera: &CameraManager) -> Self {
        Self {
            view: shadow_camera.view(),
            proj: shadow_camera.proj(),
            view_proj: shadow_camera.view_proj(),
            direction: light.direction.normalize().extend(0.0),
            color: light.color.extend(light.intensity),
        }
    }
}

/// Per-object model matrix. Written once, the scene is static.
#[derive(Debug, Copy, Clone)]
#[repr(C, align(16))]
pub struct ObjectUniform {
    pub model: Mat4,
}

unsafe impl bytemuck::Zeroable for ObjectUniform {}
unsafe impl bytemuck::Pod for ObjectUniform {}

/// The uniform buffers rewritten every frame.
pub struct FrameUniformBuffers {
    /// Camera buffer for the shadow pass (the light's fitted camera).
    pub shadow_camera: Buffer,
    /// Camera buffer for the forward pass (the active viewing camera).
    pub forward_camera: Buffer,
    pub light: Buffer,
}

impl FrameUniformBuffers {
    pub fn new(device: &Device) -> Self {
        profiling::scope!("FrameUniformBuffers::new");

        let create = |label, size| {
            device.create_buffer_init(&BufferInitDescriptor {
                label: Some(label),
                contents: &vec![0; size],
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            })
        };

        Self {
            shadow_camera: create("shadow camera uniform", std::mem::size_of::<CameraUniform>()),
            forward_camera: create("forward camera uniform", std::mem::size_of::<CameraUniform>()),
            light: create("light uniform", std::mem::size_of::<LightUniform>()),
        }
    }

    /// Uploads this frame's camera and light state.
    pub fn update(
        &self,
        queue: &Queue,
        active_camera: &CameraManager,
        light: &DirectionalLight,
        shadow_camera: &CameraManager,
    ) {
        profiling::scope!("FrameUniformBuffers::update");

        queue.write_buffer(
            &self.shadow_camera,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(shadow_camera)),
        );
        queue.write_buffer(
            &self.forward_camera,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(active_camera)),
        );
        queue.write_buffer(&self.light, 0, bytemuck::bytes_of(&LightUniform::new(light, shadow_camera)));
    }
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use super::{CameraUniform, LightUniform, ObjectUniform};

    // The WGSL structs mirror these layouts; a size drift here means the
    // shaders read garbage.
    #[test]
    fn uniform_sizes_match_shader_expectations() {
        assert_eq!(size_of::<CameraUniform>(), 3 * 64 + 16);
        assert_eq!(size_of::<LightUniform>(), 3 * 64 + 2 * 16);
        assert_eq!(size_of::<ObjectUniform>(), 64);
    }
}
