use glam::{EulerRot, Mat3A, Mat4, Vec3, Vec3A};
use umbra_types::{Camera, CameraProjection, CameraView, Handedness};

/// Manages a camera's location and projection settings.
///
/// Any camera in the system is one of these: the free-look camera the user
/// flies around, the detached visual camera, and the fitted shadow camera all
/// reduce to a view/projection pair plus a location.
#[derive(Debug, Clone, Copy)]
pub struct CameraManager {
    handedness: Handedness,
    view: Mat4,
    proj: Mat4,
    inv_view: Mat4,
    data: Camera,
    aspect_ratio: f32,
}

impl CameraManager {
    /// Builds a new camera, using the given aspect ratio. If no aspect ratio
    /// is given it is assumed that no aspect ratio scaling should be done.
    pub fn new(data: Camera, handedness: Handedness, aspect_ratio: Option<f32>) -> Self {
        profiling::scope!("CameraManager::new");

        let aspect_ratio = aspect_ratio.unwrap_or(1.0);
        let proj = compute_projection_matrix(data, handedness, aspect_ratio);
        let view = compute_view_matrix(data, handedness);

        Self {
            handedness,
            view,
            proj,
            inv_view: view.inverse(),
            data,
            aspect_ratio,
        }
    }

    /// Sets the camera data, rebuilding the matrices with the current aspect
    /// ratio.
    pub fn set_data(&mut self, data: Camera) {
        self.set_aspect_data(data, self.aspect_ratio)
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: Option<f32>) {
        self.set_aspect_data(self.data, aspect_ratio.unwrap_or(1.0));
    }

    pub fn set_aspect_data(&mut self, data: Camera, aspect_ratio: f32) {
        self.proj = compute_projection_matrix(data, self.handedness, aspect_ratio);
        self.view = compute_view_matrix(data, self.handedness);
        self.inv_view = self.view.inverse();
        self.data = data;
        self.aspect_ratio = aspect_ratio;
    }

    pub fn get_data(&self) -> Camera {
        self.data
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn proj(&self) -> Mat4 {
        self.proj
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }

    /// Camera position in world space.
    pub fn location(&self) -> Vec3 {
        self.inv_view.w_axis.truncate()
    }
}

fn compute_view_matrix(data: Camera, handedness: Handedness) -> Mat4 {
    match data.view {
        CameraView::FreeLook { location, pitch, yaw } => {
            let look_offset = Mat3A::from_euler(EulerRot::YXZ, yaw, pitch, 0.0) * Vec3A::Z;
            let look_at = match handedness {
                Handedness::Left => Mat4::look_at_lh,
                Handedness::Right => Mat4::look_at_rh,
            };
            look_at(Vec3::from(location), Vec3::from(location + look_offset), Vec3::Y)
        }
        CameraView::Raw(view) => view,
    }
}

fn compute_projection_matrix(data: Camera, handedness: Handedness, aspect_ratio: f32) -> Mat4 {
    match data.projection {
        CameraProjection::Orthographic { size } => {
            let half = size * 0.5;
            if handedness == Handedness::Left {
                Mat4::orthographic_lh(-half.x, half.x, -half.y, half.y, -half.z, half.z)
            } else {
                Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, -half.z, half.z)
            }
        }
        CameraProjection::Perspective { vfov, near, far } => {
            if handedness == Handedness::Left {
                Mat4::perspective_lh(vfov.to_radians(), aspect_ratio, near, far)
            } else {
                Mat4::perspective_rh(vfov.to_radians(), aspect_ratio, near, far)
            }
        }
        CameraProjection::Raw(proj) => proj,
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3, Vec3A};
    use umbra_types::{Camera, CameraProjection, CameraView, Handedness};

    use super::CameraManager;

    fn free_camera(location: Vec3A, pitch: f32, yaw: f32) -> CameraManager {
        CameraManager::new(
            Camera {
                projection: CameraProjection::Perspective {
                    vfov: 50.0,
                    near: 0.01,
                    far: 100.0,
                },
                view: CameraView::FreeLook { location, pitch, yaw },
            },
            Handedness::Left,
            Some(800.0 / 600.0),
        )
    }

    #[test]
    fn location_survives_view_construction() {
        let camera = free_camera(Vec3A::new(0.0, 5.0, -10.0), 0.0, 0.0);
        assert!(camera.location().abs_diff_eq(Vec3::new(0.0, 5.0, -10.0), 1e-5));
    }

    #[test]
    fn zero_angles_look_down_positive_z() {
        let camera = free_camera(Vec3A::ZERO, 0.0, 0.0);
        // A point straight ahead lands on the view space +Z axis.
        let ahead = camera.view().transform_point3(Vec3::new(0.0, 0.0, 7.0));
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, 7.0), 1e-5));
    }

    #[test]
    fn raw_view_passed_through() {
        let view = Mat4::look_at_lh(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
        let camera = CameraManager::new(
            Camera {
                projection: CameraProjection::Raw(Mat4::IDENTITY),
                view: CameraView::Raw(view),
            },
            Handedness::Left,
            None,
        );
        assert_eq!(camera.view(), view);
        assert!(camera.location().abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
    }
}
