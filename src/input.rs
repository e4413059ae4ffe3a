//! Input model: pointer buttons, event targets, and per-gesture drag state.
//!
//! The host classifies each pointer-down by which part of a note it landed
//! on (`PointerTarget`) so that typing in the text area or pressing an action
//! button never starts a drag. `Gesture` is everything the drag controller
//! remembers between pointer-down and pointer-up for one pointer.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::note::{NoteId, Position};

/// Browser pointer id.
pub type PointerId = i32;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button, pen contact, or single-finger touch.
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `PointerEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// Which part of a note widget a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerTarget {
    /// The paper itself; dragging is allowed.
    #[default]
    Surface,
    /// The text-input region.
    TextInput,
    /// One of the note's action buttons (rotate, delete, colour, done).
    ActionButton,
    /// Any other element marked as not draggable.
    NoDrag,
}

impl PointerTarget {
    /// Whether a pointer-down here may start a drag.
    #[must_use]
    pub fn allows_drag(self) -> bool {
        matches!(self, Self::Surface)
    }
}

/// A pointer-down as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDown {
    pub pointer_id: PointerId,
    pub button: Button,
    pub screen: Point,
    /// The note under the pointer, if any.
    pub note_id: Option<NoteId>,
    pub target: PointerTarget,
}

/// One active drag, from pointer-down until release or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    /// Note being dragged.
    pub note_id: NoteId,
    /// Pointer that owns the gesture.
    pub pointer_id: PointerId,
    /// Screen position at pointer-down.
    pub start_screen: Point,
    /// Most recent screen position seen.
    pub last_screen: Point,
    /// Note position at pointer-down; `z` is the resting depth to restore.
    pub start_position: Position,
    /// Where the note is drawn right now. `z` is the lifted depth.
    pub live_position: Position,
    /// Perspective depth captured at pointer-down.
    pub depth: f64,
    /// Farthest the pointer has strayed from `start_screen`, in pixels.
    pub max_travel_px: f64,
}

impl Gesture {
    /// Resting position for the current live x/y.
    #[must_use]
    pub fn resting_position(&self) -> Position {
        Position::new(self.live_position.x, self.live_position.y, self.start_position.z)
    }
}

/// Drag state of a single note widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// Not held by any pointer.
    #[default]
    Idle,
    /// Held by the pointer recorded in the gesture.
    Dragging(Gesture),
}
