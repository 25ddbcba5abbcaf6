//! Type declarations for the umbra shadow mapping renderer.
//!
//! This is reexported in the umbra crate proper and includes all the
//! "surface" api arguments.

/// Reexport of the glam version umbra is using.
pub use glam;
use glam::{Mat4, Vec3, Vec3A};

/// Describes how the camera should look at the scene.
#[derive(Debug, Default, Copy, Clone)]
pub struct Camera {
    pub projection: CameraProjection,
    /// How the camera's view matrix is obtained.
    pub view: CameraView,
}

/// Describes how the world should be projected into the camera.
#[derive(Debug, Copy, Clone)]
pub enum CameraProjection {
    Orthographic {
        /// Size assumes the location is at the center of the camera area.
        size: Vec3A,
    },
    Perspective {
        /// Vertical field of view in degrees.
        vfov: f32,
        /// Near plane distance.
        near: f32,
        /// Far plane distance. Finite, as the shadow fit walks the full
        /// depth range back into world space.
        far: f32,
    },
    Raw(Mat4),
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self::Perspective {
            vfov: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Describes where the camera is and where it looks.
#[derive(Debug, Copy, Clone)]
pub enum CameraView {
    /// Free-look camera: a location plus pitch/yaw angles in radians,
    /// rotating the +Z looking direction in YXZ order.
    FreeLook {
        location: Vec3A,
        pitch: f32,
        yaw: f32,
    },
    /// An already-built view matrix.
    Raw(Mat4),
}

impl Default for CameraView {
    fn default() -> Self {
        Self::FreeLook {
            location: Vec3A::ZERO,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

/// Describes a directional light (sun light) and its shadow map.
#[derive(Debug, Copy, Clone)]
pub struct DirectionalLight {
    /// Color of the light.
    pub color: Vec3,
    /// Constant multiplier for the light.
    pub intensity: f32,
    /// Direction the light travels. Does not need to be normalized.
    pub direction: Vec3,
    /// Per-side resolution of the shadow map texture (in pixels).
    pub resolution: u32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            direction: Vec3::new(0.7, -0.6, 0.4),
            resolution: 4096,
        }
    }
}

/// Which camera the forward pass renders from.
///
/// The shadow fit always follows the free camera, so the other two modes
/// let you inspect the fitted volume from outside.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CameraMode {
    /// Render from the free-look camera driving the shadow fit.
    Free,
    /// Render from a detached observer camera.
    Visual,
    /// Render from the light's fitted shadow camera itself.
    Shadow,
}

impl Default for CameraMode {
    fn default() -> Self {
        Self::Free
    }
}

/// Describes the "Handedness" of a given coordinate system. Affects math
/// done in the space.
///
/// +X right, +Y up, +Z _into_ the screen is left handed.
/// +X right, +Y up, +Z _out of_ the screen is right handed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Default for Handedness {
    fn default() -> Self {
        Self::Left
    }
}
