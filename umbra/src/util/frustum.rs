//! Frustum corner math used to fit the shadow camera.

use glam::{Mat4, Vec3};

/// Canonical clip-space corners of a 0..1 depth frustum.
///
/// Indices 0-3 are the near face, 4-7 the far face, with both faces
/// enumerating their corners in the same x/y order. Edge lists built for
/// visualization rely on this ordering.
pub const NDC_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, 1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
];

/// Recovers the world space corners of a camera frustum from the inverse of
/// its view-projection matrix, perspective divide included.
pub fn world_space_corners(inv_view_proj: Mat4) -> [Vec3; 8] {
    NDC_CORNERS.map(|corner| inv_view_proj.project_point3(corner))
}

/// Arithmetic mean of the corners.
pub fn corner_centroid(corners: &[Vec3; 8]) -> Vec3 {
    corners.iter().copied().fold(Vec3::ZERO, |acc, corner| acc + corner) / 8.0
}

/// Component-wise bounds of the corners after transforming them by `view`.
pub fn view_space_extents(view: Mat4, corners: &[Vec3; 8]) -> (Vec3, Vec3) {
    let first = view.transform_point3(corners[0]);
    let mut min = first;
    let mut max = first;
    for &corner in &corners[1..] {
        let transformed = view.transform_point3(corner);
        min = min.min(transformed);
        max = max.max(transformed);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::{corner_centroid, view_space_extents, world_space_corners, NDC_CORNERS};

    fn test_view_proj() -> Mat4 {
        let proj = Mat4::perspective_lh(50_f32.to_radians(), 800.0 / 600.0, 0.01, 100.0);
        let view = Mat4::look_at_lh(Vec3::new(0.0, 5.0, -10.0), Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        proj * view
    }

    #[test]
    fn corner_ordering_near_then_far() {
        for (i, corner) in NDC_CORNERS.iter().enumerate() {
            assert_eq!(corner.z, if i < 4 { 0.0 } else { 1.0 });
            // Both faces walk x/y identically.
            assert_eq!(corner.x, NDC_CORNERS[i % 4].x);
            assert_eq!(corner.y, NDC_CORNERS[i % 4].y);
        }
    }

    #[test]
    fn corners_round_trip_through_view_proj() {
        let view_proj = test_view_proj();
        let corners = world_space_corners(view_proj.inverse());

        for (world, ndc) in corners.iter().zip(NDC_CORNERS) {
            let back = view_proj.project_point3(*world);
            assert!(
                back.abs_diff_eq(ndc, 1e-3),
                "corner {back} did not return to {ndc}"
            );
        }
    }

    #[test]
    fn centroid_is_mean_of_corners() {
        let corners = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::ONE,
        ];
        assert!(corner_centroid(&corners).abs_diff_eq(Vec3::splat(0.5), 1e-6));
    }

    #[test]
    fn extents_bound_every_corner() {
        let view_proj = test_view_proj();
        let corners = world_space_corners(view_proj.inverse());
        let view = Mat4::look_at_lh(Vec3::new(3.0, 4.0, -2.0), Vec3::ZERO, Vec3::Y);

        let (min, max) = view_space_extents(view, &corners);
        for corner in corners {
            let p = view.transform_point3(corner);
            assert!(p.cmpge(min - 1e-4).all() && p.cmple(max + 1e-4).all());
        }
    }
}
