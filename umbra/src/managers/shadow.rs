use wgpu::{
    AddressMode, CompareFunction, Device, Extent3d, FilterMode, Sampler, SamplerBorderColor, SamplerDescriptor,
    TextureDescriptor, TextureDimension, TextureUsages, TextureView, TextureViewDescriptor,
};

use crate::SHADOW_DEPTH_FORMAT;

/// The off-screen depth target the shadow pass renders into.
///
/// One texture, two views: the attachment view is written by the shadow pass
/// and the read view is sampled by the forward pass. They alias the same
/// memory, so a frame must never cite both at once; the frame schedule in
/// umbra-routine enforces that phase separation.
///
/// Created once at startup with a fixed resolution. Window resizes never
/// touch it.
pub struct ShadowTarget {
    /// Bound as the sole attachment during the shadow pass.
    pub depth_view: TextureView,
    /// Bound to the fragment stage during the forward pass.
    pub read_view: TextureView,
    /// Less-comparison sampler with an opaque white border, so samples that
    /// fall outside the light frustum read as fully lit.
    pub sampler: Sampler,
    /// Per-side size in texels.
    pub resolution: u32,
}

impl ShadowTarget {
    pub fn new(device: &Device, resolution: u32) -> Self {
        profiling::scope!("ShadowTarget::new");

        let texture = device.create_texture(&TextureDescriptor {
            label: Some("shadow texture"),
            size: Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: SHADOW_DEPTH_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
        });

        let depth_view = texture.create_view(&TextureViewDescriptor {
            label: Some("shadow attachment view"),
            ..TextureViewDescriptor::default()
        });
        let read_view = texture.create_view(&TextureViewDescriptor {
            label: Some("shadow read view"),
            ..TextureViewDescriptor::default()
        });

        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("shadow comparison sampler"),
            address_mode_u: AddressMode::ClampToBorder,
            address_mode_v: AddressMode::ClampToBorder,
            address_mode_w: AddressMode::ClampToBorder,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: FilterMode::Nearest,
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            compare: Some(CompareFunction::Less),
            anisotropy_clamp: None,
            border_color: Some(SamplerBorderColor::OpaqueWhite),
        });

        log::info!("Shadow target created at {0}x{0}", resolution);

        Self {
            depth_view,
            read_view,
            sampler,
            resolution,
        }
    }
}
