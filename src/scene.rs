//! Scene host: camera, viewport, and the per-frame tick.
//!
//! The host owns no notes. It answers "where is the camera" and "how big is
//! the surface" for the drag controller and projector, tracks resizes, and
//! advances a gentle hover parallax once per animation frame. While a note is
//! held both the parallax target and the camera itself stay put: drag deltas
//! are converted against a fixed camera.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::Serialize;

use crate::camera::{PerspectiveCamera, Point, Vec3, Viewport};
use crate::config::{BoardConfig, ParallaxConfig};
use crate::projector;

/// Snapshot handed to the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    /// Frames ticked so far, starting at 1.
    pub number: u64,
    pub camera: PerspectiveCamera,
    pub viewport: Viewport,
}

/// Camera and viewport owner.
#[derive(Debug, Clone)]
pub struct SceneHost {
    camera: PerspectiveCamera,
    base_position: Vec3,
    viewport: Viewport,
    parallax: ParallaxConfig,
    target_offset: (f64, f64),
    current_offset: (f64, f64),
    dragging: bool,
    frames: u64,
}

impl SceneHost {
    #[must_use]
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            camera: config.camera,
            base_position: config.camera.position,
            viewport: Viewport::default(),
            parallax: config.parallax,
            target_offset: (0.0, 0.0),
            current_offset: (0.0, 0.0),
            dragging: false,
            frames: 0,
        }
    }

    #[must_use]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames ticked so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Adopt a new container size. Returns `true` if anything changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.camera.fit_viewport(viewport);
        true
    }

    /// Pointer hovering at `screen` steers the parallax target.
    pub fn hover(&mut self, screen: Point) {
        if self.is_frozen() {
            return;
        }
        let x = screen.x / self.viewport.width - 0.5;
        let y = screen.y / self.viewport.height - 0.5;
        self.target_offset = (x * self.parallax.strength_x, -y * self.parallax.strength_y);
    }

    /// Pointer left the board: drift back to centre.
    pub fn leave(&mut self) {
        self.target_offset = (0.0, 0.0);
        self.dragging = false;
    }

    /// Tell the host whether any note is held.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Advance one animation frame and return what to draw with.
    pub fn tick(&mut self) -> Frame {
        if !self.is_frozen() {
            let lerp = self.parallax.lerp.clamp(0.0, 1.0);
            self.current_offset.0 += (self.target_offset.0 - self.current_offset.0) * lerp;
            self.current_offset.1 += (self.target_offset.1 - self.current_offset.1) * lerp;
        }

        self.camera.position = Vec3::new(
            self.base_position.x + self.current_offset.0,
            self.base_position.y + self.current_offset.1,
            self.base_position.z,
        );
        self.frames += 1;
        Frame { number: self.frames, camera: self.camera, viewport: self.viewport }
    }

    /// Current parallax offset applied to the camera.
    #[must_use]
    pub fn parallax_offset(&self) -> (f64, f64) {
        self.current_offset
    }

    fn is_frozen(&self) -> bool {
        self.dragging && self.parallax.disable_on_drag
    }

    /// Project a world point onto the viewport.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Option<Point> {
        projector::world_to_screen(world, &self.camera, self.viewport)
    }

    /// World point under `screen` on the plane `z = plane_z`.
    #[must_use]
    pub fn unproject(&self, screen: Point, plane_z: f64) -> Option<Vec3> {
        projector::unproject_to_plane(screen, &self.camera, self.viewport, plane_z)
    }
}
