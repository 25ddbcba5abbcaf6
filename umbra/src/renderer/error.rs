use glam::UVec2;
use thiserror::Error;
use wgpu::Features;

/// Reason why the renderer failed to initialize.
#[derive(Error, Debug)]
pub enum RendererInitializationError {
    #[error("No supported adapter found")]
    MissingAdapter,
    #[error("Device is missing required features: {features:?}")]
    MissingDeviceFeatures { features: Features },
    #[error("Device 2d texture limit of {device_limit} is below the required {required_limit}")]
    LowDeviceLimit { device_limit: u32, required_limit: u32 },
    #[error("Requesting a device failed")]
    RequestDeviceFailed,
    #[error("Surface reports no compatible texture formats")]
    IncompatibleSurface,
    #[error("Surface of {}x{} has a zero dimension", size.x, size.y)]
    ZeroSizedSurface { size: UVec2 },
}
