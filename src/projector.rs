//! Screen ↔ world conversions for a perspective camera.
//!
//! Everything here is a pure function of its arguments. Screen space is CSS
//! pixels with the origin at the top-left and y growing downward; world space
//! has y growing upward, so every vertical conversion flips sign.
//!
//! [`world_to_screen`] and [`screen_to_world_delta`] are inverse-consistent:
//! the pixel offset between two projected points at the same depth, fed back
//! through `screen_to_world_delta` at that depth, reproduces their world
//! offset in the camera's image plane.

#[cfg(test)]
#[path = "projector_test.rs"]
mod projector_test;

use crate::camera::{PerspectiveCamera, Point, Vec3, Viewport};

/// Depths at or below this are treated as behind the eye.
const MIN_DEPTH: f64 = 1e-9;

/// World units covered by one vertical pixel at `depth`.
///
/// This is the perspective relation `2·tan(fov/2)·depth / viewport_height`.
#[must_use]
pub fn world_per_pixel_y(depth: f64, fov_rad: f64, viewport_height: f64) -> f64 {
    2.0 * (fov_rad * 0.5).tan() * depth / viewport_height.max(1.0)
}

/// Convert a pixel displacement at `depth` into an image-plane world
/// displacement `(dx, dy)`.
///
/// The vertical scale is [`world_per_pixel_y`]. The horizontal scale is the
/// vertical one times `aspect`, spread over the viewport width rather than its
/// height, which keeps the conversion exact even when the camera's aspect
/// differs from the viewport's. The y component is negated because screen y
/// grows downward.
#[must_use]
pub fn screen_to_world_delta(
    dx_px: f64,
    dy_px: f64,
    depth: f64,
    fov_rad: f64,
    aspect: f64,
    viewport: Viewport,
) -> (f64, f64) {
    let per_px_y = world_per_pixel_y(depth, fov_rad, viewport.height);
    let per_px_x = world_per_pixel_y(depth, fov_rad, viewport.width) * aspect;
    (dx_px * per_px_x, -dy_px * per_px_y)
}

/// Map a screen pixel to normalized device coordinates in `[-1, 1]`.
#[must_use]
pub fn screen_to_ndc(screen: Point, viewport: Viewport) -> (f64, f64) {
    (screen.x / viewport.width * 2.0 - 1.0, -(screen.y / viewport.height) * 2.0 + 1.0)
}

/// Map normalized device coordinates back to a screen pixel.
#[must_use]
pub fn ndc_to_screen(ndc_x: f64, ndc_y: f64, viewport: Viewport) -> Point {
    Point::new((ndc_x + 1.0) * 0.5 * viewport.width, (1.0 - ndc_y) * 0.5 * viewport.height)
}

/// Project a world point to screen pixels.
///
/// Returns `None` when the point is at or behind the camera plane.
#[must_use]
pub fn world_to_screen(position: Vec3, camera: &PerspectiveCamera, viewport: Viewport) -> Option<Point> {
    let view = camera.world_to_view(position);
    if view.z <= MIN_DEPTH {
        return None;
    }
    let half_height = (camera.fov_rad() * 0.5).tan() * view.z;
    let half_width = half_height * camera.aspect;
    Some(ndc_to_screen(view.x / half_width, view.y / half_height, viewport))
}

/// Cast a ray from the eye through `screen` and intersect it with the plane
/// `z = plane_z`.
///
/// Returns `None` when the ray runs parallel to the plane or the plane lies
/// behind the camera.
#[must_use]
pub fn unproject_to_plane(
    screen: Point,
    camera: &PerspectiveCamera,
    viewport: Viewport,
    plane_z: f64,
) -> Option<Vec3> {
    let (ndc_x, ndc_y) = screen_to_ndc(screen, viewport);
    let tan_half = (camera.fov_rad() * 0.5).tan();
    let basis = camera.basis();
    let dir = basis.right * (ndc_x * tan_half * camera.aspect) + basis.up * (ndc_y * tan_half) + basis.forward;

    if dir.z.abs() < MIN_DEPTH {
        return None;
    }
    let t = (plane_z - camera.position.z) / dir.z;
    if t <= 0.0 {
        return None;
    }
    Some(camera.position + dir * t)
}
