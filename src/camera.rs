#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_DISTANCE, CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR};

/// Lengths below this are treated as zero when normalising.
const LENGTH_EPSILON: f64 = 1e-12;

/// A point or displacement in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len < LENGTH_EPSILON { None } else { Some(self * (1.0 / len)) }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// A point in screen space (CSS pixels, origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other` in pixels.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Size of the rendering surface in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Build a viewport, clamping each side to at least one pixel so that
    /// projections never divide by zero.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.max(1.0), height: height.max(1.0) }
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Orthonormal camera frame: `right` and `up` span the image plane, `forward`
/// points from the eye into the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

/// A perspective camera looking from `position` towards `target`.
///
/// `fov_deg` is the vertical field of view. `aspect` is the horizontal over
/// vertical extent of the image plane and normally tracks the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_deg: CAMERA_FOV_DEG,
            aspect: 1.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl PerspectiveCamera {
    /// Vertical field of view in radians.
    #[must_use]
    pub fn fov_rad(&self) -> f64 {
        self.fov_deg.to_radians()
    }

    /// The camera's view frame. Falls back to world axes when the camera sits
    /// on its target or looks straight along `up`.
    #[must_use]
    pub fn basis(&self) -> CameraBasis {
        let forward = (self.target - self.position).normalized().unwrap_or(Vec3::new(0.0, 0.0, -1.0));
        let right = forward.cross(self.up).normalized().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        CameraBasis { right, up, forward }
    }

    /// Express a world point in camera space: `x` right, `y` up, `z` the
    /// depth in front of the eye.
    #[must_use]
    pub fn world_to_view(&self, world: Vec3) -> Vec3 {
        let basis = self.basis();
        let rel = world - self.position;
        Vec3::new(rel.dot(basis.right), rel.dot(basis.up), rel.dot(basis.forward))
    }

    /// Inverse of [`Self::world_to_view`].
    #[must_use]
    pub fn view_to_world(&self, view: Vec3) -> Vec3 {
        let basis = self.basis();
        self.position + basis.right * view.x + basis.up * view.y + basis.forward * view.z
    }

    /// Perspective depth of `world` along the viewing direction.
    #[must_use]
    pub fn depth_of(&self, world: Vec3) -> f64 {
        (world - self.position).dot(self.basis().forward)
    }

    /// Re-derive the aspect ratio from a resized viewport.
    pub fn fit_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }
}
