#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{PerspectiveCamera, Point, Vec3, Viewport};
use crate::consts::NOTE_SIZE;
use crate::note::{Note, NoteId};
use crate::projector::unproject_to_plane;

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub note_id: NoteId,
    /// Where the pointer ray met the note's plane.
    pub world: Vec3,
}

/// Find the topmost note under `screen`.
///
/// Notes later in `notes` are drawn on top, so they are tested first. Each
/// note is a `NOTE_SIZE` square centred on its position and rotated by
/// `rotation_z`.
#[must_use]
pub fn hit_test(screen: Point, notes: &[Note], camera: &PerspectiveCamera, viewport: Viewport) -> Option<Hit> {
    notes.iter().rev().find_map(|note| {
        let world = unproject_to_plane(screen, camera, viewport, note.position.z)?;
        contains(note, world).then(|| Hit { note_id: note.id.clone(), world })
    })
}

/// Whether `world` (on the note's plane) lies inside the note's square.
#[must_use]
pub fn contains(note: &Note, world: Vec3) -> bool {
    let dx = world.x - note.position.x;
    let dy = world.y - note.position.y;
    let (sin, cos) = (-note.rotation_z).sin_cos();
    let local_x = dx * cos - dy * sin;
    let local_y = dx * sin + dy * cos;
    let half = NOTE_SIZE * 0.5;
    local_x.abs() <= half && local_y.abs() <= half
}
