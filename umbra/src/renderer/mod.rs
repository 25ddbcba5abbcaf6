use std::sync::Arc;

use glam::UVec2;
use umbra_types::Handedness;
use wgpu::{
    Device, Extent3d, PresentMode, Queue, Surface, SurfaceConfiguration, SurfaceError, SurfaceTexture,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
};

use crate::{setup::InstanceAdapterDevice, WINDOW_DEPTH_FORMAT};

pub mod error;

use error::RendererInitializationError;

/// Owns the window surface, its configuration, and the window depth buffer.
///
/// The shadow map target deliberately lives elsewhere
/// ([`crate::managers::ShadowTarget`]): it is fixed-size and survives window
/// resizes untouched, while everything here tracks the window.
pub struct Renderer {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    surface: Surface,
    config: SurfaceConfiguration,
    depth_view: TextureView,
    handedness: Handedness,
}

impl Renderer {
    /// Configures the given surface and creates the window depth buffer.
    pub fn new(
        iad: &InstanceAdapterDevice,
        surface: Surface,
        size: UVec2,
        handedness: Handedness,
    ) -> Result<Self, RendererInitializationError> {
        profiling::scope!("Renderer::new");

        let size = validate_surface_size(size).ok_or(RendererInitializationError::ZeroSizedSurface { size })?;

        let format = surface
            .get_supported_formats(&iad.adapter)
            .first()
            .copied()
            .ok_or(RendererInitializationError::IncompatibleSurface)?;

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.x,
            height: size.y,
            present_mode: PresentMode::Fifo,
        };
        surface.configure(&iad.device, &config);

        let depth_view = create_window_depth(&iad.device, size);

        log::info!("Surface configured at {}x{} ({:?})", size.x, size.y, format);

        Ok(Self {
            device: Arc::clone(&iad.device),
            queue: Arc::clone(&iad.queue),
            surface,
            config,
            depth_view,
            handedness,
        })
    }

    /// Reconfigures the swapchain and window depth buffer.
    ///
    /// A request with a zero dimension is ignored; minimized windows report a
    /// 0x0 client area and must not tear down the current targets.
    pub fn resize(&mut self, size: UVec2) {
        let size = match validate_surface_size(size) {
            Some(size) => size,
            None => return,
        };
        if size.x == self.config.width && size.y == self.config.height {
            return;
        }

        profiling::scope!("Renderer::resize");
        self.config.width = size.x;
        self.config.height = size.y;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_window_depth(&self.device, size);
        log::debug!("Surface resized to {}x{}", size.x, size.y);
    }

    /// Acquires the next backbuffer texture to render into.
    pub fn acquire_frame(&self) -> Result<SurfaceTexture, SurfaceError> {
        self.surface.get_current_texture()
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.config.width, self.config.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.config.format
    }

    /// Depth buffer matching the current window size.
    pub fn window_depth_view(&self) -> &TextureView {
        &self.depth_view
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }
}

/// Returns `None` unless both dimensions are positive.
pub fn validate_surface_size(size: UVec2) -> Option<UVec2> {
    (size.x > 0 && size.y > 0).then(|| size)
}

fn create_window_depth(device: &Device, size: UVec2) -> TextureView {
    profiling::scope!("window depth creation");

    let texture = device.create_texture(&TextureDescriptor {
        label: Some("window depth texture"),
        size: Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: WINDOW_DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
    });

    texture.create_view(&TextureViewDescriptor {
        label: Some("window depth view"),
        ..TextureViewDescriptor::default()
    })
}

#[cfg(test)]
mod tests {
    use glam::UVec2;

    use super::validate_surface_size;

    #[test]
    fn zero_sized_resize_ignored() {
        assert_eq!(validate_surface_size(UVec2::new(0, 600)), None);
        assert_eq!(validate_surface_size(UVec2::new(800, 0)), None);
        assert_eq!(validate_surface_size(UVec2::ZERO), None);
    }

    #[test]
    fn positive_size_accepted() {
        assert_eq!(
            validate_surface_size(UVec2::new(800, 600)),
            Some(UVec2::new(800, 600))
        );
    }
}
