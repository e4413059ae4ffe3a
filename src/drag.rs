//! Drag controller: turns pointer gestures on note widgets into positions.
//!
//! DESIGN
//! ======
//! Each note widget is bound once for its lifetime. A primary-button
//! pointer-down on a bound note's surface starts a `Gesture` keyed by pointer
//! id; every pointer-move recomputes the live position from the total screen
//! delta since pointer-down, converted at the depth captured at pointer-down.
//! Live positions are visual only. Release yields exactly one
//! `DragEvent::Committed` carrying the resting position. A drag never rotates
//! the note, so the commit carries no rotation. Cancel yields
//! `DragEvent::Cancelled` carrying the untouched start position. Either way
//! the lifted depth never outlives the gesture.
//!
//! Several pointers may drag several notes at once, but a note is held by at
//! most one pointer and a pointer holds at most one note.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::camera::{PerspectiveCamera, Point, Viewport};
use crate::config::DragConfig;
use crate::input::{Button, Gesture, InputState, PointerDown, PointerId};
use crate::note::{Note, NoteId, Position};
use crate::projector::screen_to_world_delta;

/// What a pointer event did to a note.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// The note was picked up and raised to `lifted`.
    Started { note_id: NoteId, pointer_id: PointerId, lifted: Position },
    /// The note follows the pointer; `live` is visual only.
    Moved { note_id: NoteId, live: Position },
    /// The note was released at `position` (resting depth restored).
    /// `clicked` is set when the pointer never left the click slop.
    Committed { note_id: NoteId, pointer_id: PointerId, position: Position, clicked: bool },
    /// The gesture was abandoned; the note is back at `restored`.
    Cancelled { note_id: NoteId, pointer_id: PointerId, restored: Position },
}

impl DragEvent {
    #[must_use]
    pub fn note_id(&self) -> &NoteId {
        match self {
            Self::Started { note_id, .. }
            | Self::Moved { note_id, .. }
            | Self::Committed { note_id, .. }
            | Self::Cancelled { note_id, .. } => note_id,
        }
    }
}

/// Per-pointer drag state machine.
#[derive(Debug, Clone)]
pub struct DragController {
    config: DragConfig,
    gestures: BTreeMap<PointerId, Gesture>,
    bound: HashSet<NoteId>,
    front_counter: u64,
}

impl DragController {
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self { config, gestures: BTreeMap::new(), bound: HashSet::new(), front_counter: 0 }
    }

    // --- Binding ---

    /// Make a note draggable. Returns `false` if it was already bound.
    pub fn bind(&mut self, id: NoteId) -> bool {
        self.bound.insert(id)
    }

    /// Forget a note, dropping any gesture that holds it. The dropped gesture
    /// is returned so the caller can restore the widget if it still exists.
    pub fn unbind(&mut self, id: &NoteId) -> Option<Gesture> {
        self.bound.remove(id);
        let pointer_id = self.pointer_holding(id)?;
        self.gestures.remove(&pointer_id)
    }

    #[must_use]
    pub fn is_bound(&self, id: &NoteId) -> bool {
        self.bound.contains(id)
    }

    // --- Pointer events ---

    /// Try to start a gesture. `note` must be the note under the pointer.
    ///
    /// Ignored unless the primary button went down on the note's draggable
    /// surface, the note is bound and free, and this pointer is not already
    /// dragging something.
    pub fn pointer_down(&mut self, down: &PointerDown, note: &Note, camera: &PerspectiveCamera) -> Option<DragEvent> {
        if down.button != Button::Primary || !down.target.allows_drag() {
            return None;
        }
        if down.note_id.as_ref() != Some(&note.id) || !self.bound.contains(&note.id) {
            return None;
        }
        if self.gestures.contains_key(&down.pointer_id) || self.pointer_holding(&note.id).is_some() {
            return None;
        }

        self.front_counter += 1;
        #[allow(clippy::cast_precision_loss)]
        let stack = self.config.stack_step * self.front_counter as f64;
        let lifted = Position::new(
            note.position.x,
            note.position.y,
            note.position.z + self.config.lift_height + stack,
        );

        let gesture = Gesture {
            note_id: note.id.clone(),
            pointer_id: down.pointer_id,
            start_screen: down.screen,
            last_screen: down.screen,
            start_position: note.position,
            live_position: lifted,
            depth: camera.depth_of(note.position),
            max_travel_px: 0.0,
        };
        debug!(id = %note.id, pointer = down.pointer_id, depth = gesture.depth, "drag started");
        self.gestures.insert(down.pointer_id, gesture);

        Some(DragEvent::Started { note_id: note.id.clone(), pointer_id: down.pointer_id, lifted })
    }

    /// Follow the pointer. Returns `None` if this pointer is not dragging.
    pub fn pointer_move(
        &mut self,
        pointer_id: PointerId,
        screen: Point,
        camera: &PerspectiveCamera,
        viewport: Viewport,
    ) -> Option<DragEvent> {
        let gesture = self.gestures.get_mut(&pointer_id)?;
        track(gesture, screen, camera, viewport);
        Some(DragEvent::Moved { note_id: gesture.note_id.clone(), live: gesture.live_position })
    }

    /// Release the pointer at `screen` and commit the final position.
    pub fn pointer_up(
        &mut self,
        pointer_id: PointerId,
        screen: Point,
        camera: &PerspectiveCamera,
        viewport: Viewport,
    ) -> Option<DragEvent> {
        let mut gesture = self.gestures.remove(&pointer_id)?;
        track(&mut gesture, screen, camera, viewport);

        let position = gesture.resting_position();
        let clicked = gesture.max_travel_px <= self.config.click_slop_px;
        debug!(id = %gesture.note_id, pointer = pointer_id, x = position.x, y = position.y, clicked, "drag committed");

        Some(DragEvent::Committed { note_id: gesture.note_id, pointer_id, position, clicked })
    }

    /// Abandon this pointer's gesture and put the note back where it was.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) -> Option<DragEvent> {
        let gesture = self.gestures.remove(&pointer_id)?;
        debug!(id = %gesture.note_id, pointer = pointer_id, "drag cancelled");
        Some(DragEvent::Cancelled { note_id: gesture.note_id, pointer_id, restored: gesture.start_position })
    }

    /// Abandon every gesture, e.g. when the window loses focus.
    pub fn cancel_all(&mut self) -> Vec<DragEvent> {
        let pointers: Vec<PointerId> = self.gestures.keys().copied().collect();
        pointers.into_iter().filter_map(|p| self.pointer_cancel(p)).collect()
    }

    // --- Queries ---

    /// Drag state of one note.
    #[must_use]
    pub fn state_of(&self, id: &NoteId) -> InputState {
        self.gestures
            .values()
            .find(|g| &g.note_id == id)
            .map_or(InputState::Idle, |g| InputState::Dragging(g.clone()))
    }

    /// Where a held note is drawn right now.
    #[must_use]
    pub fn live_position(&self, id: &NoteId) -> Option<Position> {
        self.gestures.values().find(|g| &g.note_id == id).map(|g| g.live_position)
    }

    /// The gesture owned by `pointer_id`.
    #[must_use]
    pub fn gesture(&self, pointer_id: PointerId) -> Option<&Gesture> {
        self.gestures.get(&pointer_id)
    }

    /// Whether any note is being dragged.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.gestures.is_empty()
    }

    /// How many notes have been lifted so far.
    #[must_use]
    pub fn front_counter(&self) -> u64 {
        self.front_counter
    }

    fn pointer_holding(&self, id: &NoteId) -> Option<PointerId> {
        self.gestures.iter().find(|(_, g)| &g.note_id == id).map(|(p, _)| *p)
    }
}

/// Move the gesture's live position to follow `screen`.
fn track(gesture: &mut Gesture, screen: Point, camera: &PerspectiveCamera, viewport: Viewport) {
    gesture.last_screen = screen;
    gesture.max_travel_px = gesture.max_travel_px.max(gesture.start_screen.distance_to(screen));

    let (dx, dy) = screen_to_world_delta(
        screen.x - gesture.start_screen.x,
        screen.y - gesture.start_screen.y,
        gesture.depth,
        camera.fov_rad(),
        camera.aspect,
        viewport,
    );
    gesture.live_position.x = gesture.start_position.x + dx;
    gesture.live_position.y = gesture.start_position.y + dy;
}
