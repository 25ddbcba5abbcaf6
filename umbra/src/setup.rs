use std::sync::Arc;

use wgpu::{
    Adapter, Backends, Device, DeviceDescriptor, Features, Instance, Limits, PowerPreference, Queue,
    RequestAdapterOptions, Surface,
};

use crate::{RendererInitializationError, SHADOW_DIMENSIONS};

/// Features umbra cannot run without.
///
/// Clamp-to-border addressing backs the shadow sampler's white border, which
/// is what makes samples outside the light frustum read as fully lit.
pub const REQUIRED_FEATURES: Features = Features::ADDRESS_MODE_CLAMP_TO_BORDER;

/// Features umbra will use if the adapter offers them.
///
/// Depth clip control lets the shadow pass disable depth clipping so casters
/// behind the light's near plane still land in the map.
pub const OPTIONAL_FEATURES: Features = Features::DEPTH_CLIP_CONTROL;

/// Check that all required features are present in the feature set given,
/// returning the set to request from the device.
pub fn check_features(device: Features) -> Result<Features, RendererInitializationError> {
    let missing = REQUIRED_FEATURES - device;
    if !missing.is_empty() {
        return Err(RendererInitializationError::MissingDeviceFeatures { features: missing });
    }
    Ok(REQUIRED_FEATURES | (OPTIONAL_FEATURES & device))
}

/// Check that the adapter can hold the default shadow map at all.
pub fn check_limits(adapter_limits: &Limits) -> Result<(), RendererInitializationError> {
    if adapter_limits.max_texture_dimension_2d < SHADOW_DIMENSIONS {
        return Err(RendererInitializationError::LowDeviceLimit {
            device_limit: adapter_limits.max_texture_dimension_2d,
            required_limit: SHADOW_DIMENSIONS,
        });
    }
    Ok(())
}

/// Instance, adapter, device, and queue bundle everything else is built from.
pub struct InstanceAdapterDevice {
    pub instance: Arc<Instance>,
    pub adapter: Arc<Adapter>,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    /// Features actually enabled on the device.
    pub features: Features,
}

impl InstanceAdapterDevice {
    /// True when the shadow pass may render with depth clipping disabled.
    pub fn unclipped_depth_supported(&self) -> bool {
        self.features.contains(Features::DEPTH_CLIP_CONTROL)
    }
}

/// Creates the instance, adapter, and device umbra runs on.
///
/// Any failure here is fatal: there is no degraded mode and no retry, callers
/// are expected to report the error and abort startup.
///
/// ```no_run
/// let iad = pollster::block_on(umbra::create_iad(None)).unwrap();
/// ```
pub async fn create_iad(
    compatible_surface: Option<&Surface>,
) -> Result<InstanceAdapterDevice, RendererInitializationError> {
    profiling::scope!("create_iad");

    let instance = Instance::new(Backends::PRIMARY);

    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface,
        })
        .await
        .ok_or(RendererInitializationError::MissingAdapter)?;

    let info = adapter.get_info();
    log::info!("Chosen adapter: {} ({:?})", info.name, info.backend);

    let features = check_features(adapter.features())?;
    check_limits(&adapter.limits())?;

    let (device, queue) = adapter
        .request_device(
            &DeviceDescriptor {
                label: Some("umbra device"),
                features,
                limits: Limits::default(),
            },
            None,
        )
        .await
        .map_err(|_| RendererInitializationError::RequestDeviceFailed)?;

    Ok(InstanceAdapterDevice {
        instance: Arc::new(instance),
        adapter: Arc::new(adapter),
        device: Arc::new(device),
        queue: Arc::new(queue),
        features,
    })
}

#[cfg(test)]
mod tests {
    use wgpu::{Features, Limits};

    use super::{check_features, check_limits, OPTIONAL_FEATURES, REQUIRED_FEATURES};

    #[test]
    fn missing_required_features_rejected() {
        assert!(check_features(Features::empty()).is_err());
    }

    #[test]
    fn small_texture_limit_rejected() {
        let limits = Limits {
            max_texture_dimension_2d: 2048,
            ..Limits::default()
        };
        assert!(check_limits(&limits).is_err());
        assert!(check_limits(&Limits::default()).is_ok());
    }

    #[test]
    fn optional_features_passed_through() {
        let offered = REQUIRED_FEATURES | OPTIONAL_FEATURES | Features::PUSH_CONSTANTS;
        let requested = check_features(offered).unwrap();
        assert!(requested.contains(REQUIRED_FEATURES));
        assert!(requested.contains(OPTIONAL_FEATURES));
        assert!(!requested.contains(Features::PUSH_CONSTANTS));
    }
}
