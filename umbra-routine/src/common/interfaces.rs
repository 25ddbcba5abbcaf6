use std::{mem, num::NonZeroU64};

use umbra::util::bind_merge::BindGroupLayoutBuilder;
use wgpu::{
    BindGroupLayout, BindingType, BufferBindingType, Device, SamplerBindingType, ShaderStages, TextureSampleType,
    TextureViewDimension,
};

use crate::uniforms::{CameraUniform, LightUniform, ObjectUniform};

/// Interfaces which are used throughout the whole frame.
///
/// The shadow layout is a prefix of the forward layout: the forward pass adds
/// the light buffer and the shadow map bindings on top of the shared camera
/// buffer. Keeping the shadow layout free of the shadow map itself is what
/// rules out read/write cycles while rendering into it.
pub struct WholeFrameInterfaces {
    /// Camera uniform only; bound during the shadow pass.
    pub shadow_uniform_bgl: BindGroupLayout,
    /// Camera + light + shadow map + comparison sampler; bound during the
    /// forward pass.
    pub forward_uniform_bgl: BindGroupLayout,
    /// Per-object model matrix.
    pub object_bgl: BindGroupLayout,
}

impl WholeFrameInterfaces {
    pub fn new(device: &Device) -> Self {
        profiling::scope!("WholeFrameInterfaces::new");

        let mut uniform_bglb = BindGroupLayoutBuilder::new();

        uniform_bglb.append(
            ShaderStages::VERTEX_FRAGMENT,
            BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(mem::size_of::<CameraUniform>() as _),
            },
            None,
        );

        let shadow_uniform_bgl = uniform_bglb.build(device, Some("shadow uniform bgl"));

        uniform_bglb
            .append(
                ShaderStages::VERTEX_FRAGMENT,
                BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<LightUniform>() as _),
                },
                None,
            )
            .append(
                ShaderStages::FRAGMENT,
                BindingType::Texture {
                    sample_type: TextureSampleType::Depth,
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                None,
            )
            .append(
                ShaderStages::FRAGMENT,
                BindingType::Sampler(SamplerBindingType::Comparison),
                None,
            );

        let forward_uniform_bgl = uniform_bglb.build(device, Some("forward uniform bgl"));

        let object_bgl = BindGroupLayoutBuilder::new()
            .append(
                ShaderStages::VERTEX,
                BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<ObjectUniform>() as _),
                },
                None,
            )
            .build(device, Some("object bgl"));

        Self {
            shadow_uniform_bgl,
            forward_uniform_bgl,
            object_bgl,
        }
    }
}
