use glam::{Mat4, Vec3};
use umbra_types::{Camera, CameraProjection, CameraView, DirectionalLight, Handedness};

use crate::{managers::CameraManager, util::frustum};

/// Minimum light-space span of the fitted orthographic volume on any axis.
///
/// A collapsed span (coplanar corners, or a singular source view-projection)
/// would otherwise produce a zero-volume projection full of non-finite
/// values.
pub const MIN_SHADOW_EXTENT: f32 = 0.01;

/// Radius of the fixed orbit used by [`orbit_shadow_camera`].
const ORBIT_RADIUS: f32 = 10.0;

// Squared cross-product length below which the light direction counts as
// parallel to world up.
const UP_PARALLEL_EPSILON: f32 = 1e-4;

/// Manages the directional light and the shadow camera fitted to it.
///
/// The fit is stateless: [`DirectionalLightManager::ready`] rebuilds the
/// shadow camera from scratch every frame the user camera can have moved.
pub struct DirectionalLightManager {
    light: DirectionalLight,
    shadow_camera: CameraManager,
}

impl DirectionalLightManager {
    pub fn new(light: DirectionalLight, handedness: Handedness) -> Self {
        // Until the first ready() the fixed orbit stands in.
        Self {
            shadow_camera: orbit_shadow_camera(&light, handedness),
            light,
        }
    }

    pub fn light(&self) -> &DirectionalLight {
        &self.light
    }

    pub fn set_light(&mut self, light: DirectionalLight) {
        self.light = light;
    }

    /// Refits the shadow camera to the given user camera's frustum.
    pub fn ready(&mut self, user_camera: &CameraManager) {
        profiling::scope!("Directional Light Ready");

        self.shadow_camera = fit_shadow_camera(&self.light, user_camera);
    }

    /// The light's current view/projection pair.
    pub fn shadow_camera(&self) -> &CameraManager {
        &self.shadow_camera
    }
}

/// Fits a light view and a tight orthographic projection around the user
/// camera's view frustum.
///
/// Every point the user camera can see ends up inside the returned camera's
/// volume, which is what keeps the whole shadow map resolution spent on
/// visible geometry. Works for any source camera that yields a view and
/// projection, the fit never looks at anything else.
pub fn fit_shadow_camera(light: &DirectionalLight, user_camera: &CameraManager) -> CameraManager {
    profiling::scope!("fit_shadow_camera");

    let inv_view_proj = user_camera.view_proj().inverse();
    if !inv_view_proj.is_finite() {
        // A singular source (zero-sized viewport, degenerate raw matrix) has
        // no frustum to fit; the fixed orbit at least keeps the scene lit.
        log::warn!("source camera view-projection is singular, falling back to the orbit fit");
        return orbit_shadow_camera(light, user_camera.handedness());
    }

    let corners = frustum::world_space_corners(inv_view_proj);
    let center = frustum::corner_centroid(&corners);

    let direction = light.direction.normalize();
    let look_at = match user_camera.handedness() {
        Handedness::Left => Mat4::look_at_lh,
        Handedness::Right => Mat4::look_at_rh,
    };
    let light_view = look_at(center, center + direction, light_up_vector(direction));

    let (min, max) = clamp_extents(frustum::view_space_extents(light_view, &corners));

    let light_proj = match user_camera.handedness() {
        Handedness::Left => Mat4::orthographic_lh(min.x, max.x, min.y, max.y, min.z, max.z),
        Handedness::Right => Mat4::orthographic_rh(min.x, max.x, min.y, max.y, min.z, max.z),
    };

    CameraManager::new(
        Camera {
            projection: CameraProjection::Raw(light_proj),
            view: CameraView::Raw(light_view),
        },
        user_camera.handedness(),
        None,
    )
}

/// Static fallback fit: a fixed-radius orbit facing along the light with a
/// symmetric orthographic volume. Covers scenes with no moving camera.
pub fn orbit_shadow_camera(light: &DirectionalLight, handedness: Handedness) -> CameraManager {
    let direction = light.direction.normalize();
    let eye = -direction * ORBIT_RADIUS;

    let look_at = match handedness {
        Handedness::Left => Mat4::look_at_lh,
        Handedness::Right => Mat4::look_at_rh,
    };
    let light_view = look_at(eye, eye + direction, light_up_vector(direction));

    let half = ORBIT_RADIUS;
    let light_proj = match handedness {
        Handedness::Left => Mat4::orthographic_lh(-half, half, -half, half, 1.0, 2.0 * half),
        Handedness::Right => Mat4::orthographic_rh(-half, half, -half, half, 1.0, 2.0 * half),
    };

    CameraManager::new(
        Camera {
            projection: CameraProjection::Raw(light_proj),
            view: CameraView::Raw(light_view),
        },
        handedness,
        None,
    )
}

/// World up, unless the light shines straight up or down.
fn light_up_vector(direction: Vec3) -> Vec3 {
    if direction.cross(Vec3::Y).length_squared() < UP_PARALLEL_EPSILON {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

/// Widens any collapsed axis to [`MIN_SHADOW_EXTENT`] around its midpoint.
fn clamp_extents((mut min, mut max): (Vec3, Vec3)) -> (Vec3, Vec3) {
    for axis in 0..3 {
        let span = max[axis] - min[axis];
        if span < MIN_SHADOW_EXTENT {
            let mid = (max[axis] + min[axis]) * 0.5;
            min[axis] = mid - MIN_SHADOW_EXTENT * 0.5;
            max[axis] = mid + MIN_SHADOW_EXTENT * 0.5;
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3, Vec3A};
    use umbra_types::{Camera, CameraProjection, CameraView, DirectionalLight, Handedness};

    use crate::{managers::CameraManager, util::frustum};

    use super::{fit_shadow_camera, orbit_shadow_camera, MIN_SHADOW_EXTENT};

    // The concrete scenario: camera at (0, 5, -10) looking toward +Z,
    // 800x600, 50 degree fov, near 0.01, far 100.
    fn scenario_camera() -> CameraManager {
        CameraManager::new(
            Camera {
                projection: CameraProjection::Perspective {
                    vfov: 50.0,
                    near: 0.01,
                    far: 100.0,
                },
                view: CameraView::FreeLook {
                    location: Vec3A::new(0.0, 5.0, -10.0),
                    pitch: 0.0,
                    yaw: 0.0,
                },
            },
            Handedness::Left,
            Some(800.0 / 600.0),
        )
    }

    fn scenario_light() -> DirectionalLight {
        DirectionalLight {
            direction: Vec3::new(0.7, -0.6, 0.4),
            ..DirectionalLight::default()
        }
    }

    #[test]
    fn light_view_centered_on_corner_centroid() {
        let user = scenario_camera();
        let fitted = fit_shadow_camera(&scenario_light(), &user);

        let corners = frustum::world_space_corners(user.view_proj().inverse());
        let center = frustum::corner_centroid(&corners);

        // The eye of a look-to matrix is where its inverse sends the origin.
        let eye = fitted.view().inverse().transform_point3(Vec3::ZERO);
        assert!(
            eye.abs_diff_eq(center, 1e-2),
            "light eye {eye} not at centroid {center}"
        );
        assert!(fitted.location().abs_diff_eq(center, 1e-2));
    }

    #[test]
    fn fitted_volume_contains_every_corner() {
        let user = scenario_camera();
        let fitted = fit_shadow_camera(&scenario_light(), &user);

        let corners = frustum::world_space_corners(user.view_proj().inverse());
        let (min, max) = frustum::view_space_extents(fitted.view(), &corners);

        for corner in corners {
            let p = fitted.view().transform_point3(corner);
            assert!(
                p.cmpge(min - 1e-3).all() && p.cmple(max + 1e-3).all(),
                "corner {p} escapes [{min}, {max}]"
            );
        }
    }

    #[test]
    fn fitted_extents_positive_and_finite() {
        let user = scenario_camera();
        let fitted = fit_shadow_camera(&scenario_light(), &user);

        let corners = frustum::world_space_corners(user.view_proj().inverse());
        let (min, max) = frustum::view_space_extents(fitted.view(), &corners);

        assert!(min.is_finite() && max.is_finite());
        assert!((max - min).cmpgt(Vec3::ZERO).all());
        assert!(fitted.proj().is_finite());
        assert!(fitted.view().is_finite());
    }

    #[test]
    fn straight_down_light_stays_finite() {
        let light = DirectionalLight {
            direction: Vec3::new(0.0, -1.0, 0.0),
            ..DirectionalLight::default()
        };
        let fitted = fit_shadow_camera(&light, &scenario_camera());
        assert!(fitted.view().is_finite());
        assert!(fitted.proj().is_finite());
        assert_ne!(fitted.view().determinant(), 0.0);
    }

    #[test]
    fn collapsed_source_frustum_clamped() {
        // A source whose view-projection blows the world up by 1e9: the
        // recovered frustum corners collapse to a point, and every
        // light-space extent falls below the clamp.
        let flat = CameraManager::new(
            Camera {
                projection: CameraProjection::Raw(Mat4::from_scale(Vec3::splat(1e9))),
                view: CameraView::Raw(Mat4::IDENTITY),
            },
            Handedness::Left,
            None,
        );
        let fitted = fit_shadow_camera(&scenario_light(), &flat);

        // The clamp is what keeps the projection invertible: a zero span
        // would zero out a row and make this inverse non-finite.
        assert!(fitted.proj().is_finite());
        let inv = fitted.proj().inverse();
        assert!(inv.is_finite());

        // Opposite NDC corners land MIN_SHADOW_EXTENT apart on every axis.
        let a = inv.transform_point3(Vec3::new(-1.0, -1.0, 0.0));
        let b = inv.transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!((b - a).abs().cmpge(Vec3::splat(MIN_SHADOW_EXTENT * 0.99)).all());
    }

    #[test]
    fn singular_source_falls_back_to_orbit() {
        let singular = CameraManager::new(
            Camera {
                projection: CameraProjection::Raw(Mat4::ZERO),
                view: CameraView::Raw(Mat4::IDENTITY),
            },
            Handedness::Left,
            None,
        );
        let fitted = fit_shadow_camera(&scenario_light(), &singular);
        let orbit = orbit_shadow_camera(&scenario_light(), Handedness::Left);
        assert_eq!(fitted.view(), orbit.view());
        assert_eq!(fitted.proj(), orbit.proj());
    }

    #[test]
    fn orbit_camera_sits_on_fixed_radius() {
        let fitted = orbit_shadow_camera(&scenario_light(), Handedness::Left);
        assert!((fitted.location().length() - 10.0).abs() < 1e-4);
        assert!(fitted.proj().is_finite());
    }
}
