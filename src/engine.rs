//! Board engine: the note store, scene host, drag controller, and widget
//! layer wired together behind one event-driven API.
//!
//! Every input handler returns a list of [`Action`]s for the host to apply
//! (capture a pointer, change the cursor, redraw). `EngineCore` has no
//! browser dependencies so the whole board can be driven from tests.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;

use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::camera::Point;
use crate::config::BoardConfig;
use crate::drag::{DragController, DragEvent};
use crate::hit::hit_test;
use crate::input::{InputState, PointerDown, PointerId, PointerTarget};
use crate::note::{NewNote, Note, NoteColor, NoteId, NotePatch, Position};
use crate::scene::{Frame, SceneHost};
use crate::storage::{FileStorage, NoteStorage, StorageError};
use crate::store::NoteStore;
use crate::text::{TextCommitGate, TextEvent};
use crate::widget::{NoteView, NoteWidget, NotesLayer};

pub const CURSOR_GRAB: &str = "grab";
pub const CURSOR_GRABBING: &str = "grabbing";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    NoteCreated { note: Note },
    NoteUpdated { id: NoteId, patch: NotePatch },
    NoteDeleted { id: NoteId },
    /// A drag picked the note up; draw it at `position`.
    NoteLifted { id: NoteId, position: Position },
    /// Live drag position, not persisted.
    NoteMoved { id: NoteId, position: Position },
    /// The gesture ended; the note rests at `position`.
    NoteDropped { id: NoteId, position: Position },
    NoteSelected { id: Option<NoteId> },
    SetCursor { cursor: String },
    CapturePointer { pointer_id: PointerId },
    ReleasePointer { pointer_id: PointerId },
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the DOM.
pub struct EngineCore<S: NoteStorage, W: NoteWidget = NoteView> {
    store: NoteStore<S>,
    scene: SceneHost,
    drag: DragController,
    layer: NotesLayer<W>,
    text: HashMap<NoteId, TextCommitGate>,
    selected: Option<NoteId>,
    click_slop_px: f64,
    rotate_jitter: f64,
}

impl<W: NoteWidget> EngineCore<FileStorage, W> {
    /// Open a file-backed board in [`BoardConfig::storage_dir`].
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created.
    pub fn from_config(config: &BoardConfig) -> Result<Self, StorageError> {
        let dir = config.storage_dir();
        let storage = FileStorage::open(&dir)?;
        info!(dir = %dir.display(), "file storage opened");
        Ok(Self::new(storage, config))
    }
}

impl<S: NoteStorage, W: NoteWidget> EngineCore<S, W> {
    /// Load the board from `storage`.
    pub fn new(storage: S, config: &BoardConfig) -> Self {
        Self::from_store(NoteStore::open(storage, config), config)
    }

    /// Load the board with a fixed generator for ids and spawn placement.
    pub fn with_rng(storage: S, config: &BoardConfig, rng: StdRng) -> Self {
        Self::from_store(NoteStore::open_with_rng(storage, config, rng), config)
    }

    fn from_store(store: NoteStore<S>, config: &BoardConfig) -> Self {
        let mut core = Self {
            store,
            scene: SceneHost::new(config),
            drag: DragController::new(config.drag),
            layer: NotesLayer::new(),
            text: HashMap::new(),
            selected: None,
            click_slop_px: config.drag.click_slop_px,
            rotate_jitter: config.rotate_jitter,
        };
        core.sync_layer();
        core
    }

    // --- Viewport / frame ---

    /// Adopt a new container size.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        if self.scene.resize(width, height) {
            debug!(width, height, "viewport resized");
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Advance one animation frame.
    pub fn tick(&mut self) -> Frame {
        self.scene.tick()
    }

    // --- Pointer input ---

    /// Primary entry for a pointer going down anywhere on the board.
    ///
    /// When the host could not tell which note is under the pointer
    /// (`note_id` is `None`), the engine hit-tests the note rectangles.
    pub fn pointer_down(&mut self, mut down: PointerDown) -> Vec<Action> {
        if down.note_id.is_none() && down.target == PointerTarget::Surface {
            down.note_id = hit_test(down.screen, self.store.list(), self.scene.camera(), self.scene.viewport())
                .map(|hit| hit.note_id);
        }
        let Some(id) = down.note_id.clone() else {
            return self.select(None);
        };
        let Some(note) = self.store.get(&id) else {
            debug!(%id, "pointer down on unknown note ignored");
            return Vec::new();
        };
        let Some(event) = self.drag.pointer_down(&down, note, self.scene.camera()) else {
            return Vec::new();
        };

        self.layer.dispatch(&event);
        self.scene.set_dragging(true);
        let DragEvent::Started { note_id, pointer_id, lifted } = event else {
            return Vec::new();
        };
        vec![
            Action::CapturePointer { pointer_id },
            Action::SetCursor { cursor: CURSOR_GRABBING.into() },
            Action::NoteLifted { id: note_id, position: lifted },
            Action::RenderNeeded,
        ]
    }

    /// Pointer moved. Drives hover parallax and any drag this pointer owns.
    pub fn pointer_move(&mut self, pointer_id: PointerId, screen: Point) -> Vec<Action> {
        self.scene.hover(screen);
        let Some(event) =
            self.drag.pointer_move(pointer_id, screen, self.scene.camera(), self.scene.viewport())
        else {
            return Vec::new();
        };
        self.layer.dispatch(&event);

        let mut actions = Vec::new();
        let travelled = self.drag.gesture(pointer_id).is_some_and(|g| g.max_travel_px > self.click_slop_px);
        if travelled && self.selected.is_some() {
            actions.extend(self.select(None));
        }
        if let DragEvent::Moved { note_id, live } = event {
            actions.push(Action::NoteMoved { id: note_id, position: live });
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Pointer released. Commits the dragged note's position exactly once.
    pub fn pointer_up(&mut self, pointer_id: PointerId, screen: Point) -> Vec<Action> {
        let Some(event) = self.drag.pointer_up(pointer_id, screen, self.scene.camera(), self.scene.viewport())
        else {
            return Vec::new();
        };
        self.scene.set_dragging(self.drag.is_active());
        self.layer.dispatch(&event);
        let DragEvent::Committed { note_id, position, clicked, .. } = event else {
            return Vec::new();
        };

        let mut actions = vec![
            Action::ReleasePointer { pointer_id },
            Action::SetCursor { cursor: CURSOR_GRAB.into() },
            Action::NoteDropped { id: note_id.clone(), position },
        ];
        let patch = NotePatch { position: Some(position), ..Default::default() };
        if self.store.update(&note_id, &patch) {
            self.sync_layer();
            actions.push(Action::NoteUpdated { id: note_id.clone(), patch });
        }
        if clicked {
            actions.extend(self.select(Some(note_id)));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The browser cancelled the pointer. The drag is discarded.
    pub fn pointer_cancel(&mut self, pointer_id: PointerId) -> Vec<Action> {
        let Some(event) = self.drag.pointer_cancel(pointer_id) else {
            return Vec::new();
        };
        self.scene.set_dragging(self.drag.is_active());
        self.cancelled_actions(&event)
    }

    /// Pointer left the board: the parallax drifts back to centre. Captured
    /// drags keep going.
    pub fn pointer_leave(&mut self) -> Vec<Action> {
        self.scene.leave();
        self.scene.set_dragging(self.drag.is_active());
        Vec::new()
    }

    /// Discard every drag in progress, e.g. when the window loses focus.
    pub fn cancel_all(&mut self) -> Vec<Action> {
        let events = self.drag.cancel_all();
        self.scene.set_dragging(false);
        events.iter().flat_map(|event| self.cancelled_actions(event)).collect()
    }

    fn cancelled_actions(&mut self, event: &DragEvent) -> Vec<Action> {
        self.layer.dispatch(event);
        let DragEvent::Cancelled { note_id, pointer_id, restored } = event else {
            return Vec::new();
        };
        vec![
            Action::ReleasePointer { pointer_id: *pointer_id },
            Action::SetCursor { cursor: CURSOR_GRAB.into() },
            Action::NoteDropped { id: note_id.clone(), position: *restored },
            Action::RenderNeeded,
        ]
    }

    // --- Note actions ---

    /// Create a note; absent fields take store defaults.
    pub fn add_note(&mut self, new: NewNote) -> Vec<Action> {
        let note = self.store.add(new).clone();
        self.sync_layer();
        vec![Action::NoteCreated { note }, Action::RenderNeeded]
    }

    /// Feed an event from a note's text field. Commits when the gate opens
    /// and the text differs from what is stored.
    pub fn text_event(&mut self, id: &NoteId, event: TextEvent) -> Vec<Action> {
        if !self.store.contains(id) {
            self.text.remove(id);
            return Vec::new();
        }
        let Some(text) = self.text.entry(id.clone()).or_default().handle(event) else {
            return Vec::new();
        };
        self.apply(id, NotePatch { text: Some(text), ..Default::default() })
    }

    /// Commit `text` as if the field had settled.
    pub fn set_text(&mut self, id: &NoteId, text: impl Into<String>) -> Vec<Action> {
        self.text_event(id, TextEvent::Input(text.into()))
    }

    pub fn toggle_completed(&mut self, id: &NoteId) -> Vec<Action> {
        let Some(note) = self.store.get(id) else {
            return Vec::new();
        };
        let completed = !note.completed;
        self.apply(id, NotePatch { completed: Some(completed), ..Default::default() })
    }

    pub fn set_color(&mut self, id: &NoteId, color: NoteColor) -> Vec<Action> {
        self.apply(id, NotePatch { color: Some(color), ..Default::default() })
    }

    /// Advance to the next paper colour.
    pub fn cycle_color(&mut self, id: &NoteId) -> Vec<Action> {
        let Some(note) = self.store.get(id) else {
            return Vec::new();
        };
        let color = note.color.next();
        self.apply(id, NotePatch { color: Some(color), ..Default::default() })
    }

    /// Nudge the note's tilt by a small random amount.
    pub fn rotate_jitter(&mut self, id: &NoteId) -> Vec<Action> {
        let Some(rotation_z) = self.store.rotate_jitter(id, self.rotate_jitter) else {
            return Vec::new();
        };
        self.sync_layer();
        vec![
            Action::NoteUpdated { id: id.clone(), patch: NotePatch { rotation_z: Some(rotation_z), ..Default::default() } },
            Action::RenderNeeded,
        ]
    }

    /// Delete a note. Any drag holding it is dropped without a commit.
    /// Deleting an unknown id does nothing.
    pub fn delete_note(&mut self, id: &NoteId) -> Vec<Action> {
        let held_by = match self.drag.state_of(id) {
            InputState::Dragging(gesture) => Some(gesture.pointer_id),
            InputState::Idle => None,
        };
        if !self.store.remove(id) {
            return Vec::new();
        }
        self.sync_layer();
        self.text.remove(id);
        self.scene.set_dragging(self.drag.is_active());

        let mut actions = Vec::new();
        if let Some(pointer_id) = held_by {
            actions.push(Action::ReleasePointer { pointer_id });
            actions.push(Action::SetCursor { cursor: CURSOR_GRAB.into() });
        }
        if self.selected.as_ref() == Some(id) {
            actions.extend(self.select(None));
        }
        actions.push(Action::NoteDeleted { id: id.clone() });
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Queries ---

    /// All notes in draw order.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        self.store.list()
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.store.get(id)
    }

    /// The selected note, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&NoteId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    #[must_use]
    pub fn scene(&self) -> &SceneHost {
        &self.scene
    }

    #[must_use]
    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    #[must_use]
    pub fn layer(&self) -> &NotesLayer<W> {
        &self.layer
    }

    /// Whether the text field of `id` is mid-composition.
    #[must_use]
    pub fn is_composing(&self, id: &NoteId) -> bool {
        self.text.get(id).is_some_and(TextCommitGate::is_composing)
    }

    // --- Internals ---

    /// Apply `patch` if it would change the note.
    fn apply(&mut self, id: &NoteId, patch: NotePatch) -> Vec<Action> {
        let Some(note) = self.store.get(id) else {
            debug!(%id, "action on unknown note ignored");
            return Vec::new();
        };
        let mut preview = note.clone();
        if !patch.apply_to(&mut preview) {
            return Vec::new();
        }
        self.store.update(id, &patch);
        self.sync_layer();
        vec![Action::NoteUpdated { id: id.clone(), patch }, Action::RenderNeeded]
    }

    fn select(&mut self, id: Option<NoteId>) -> Vec<Action> {
        if self.selected == id {
            return Vec::new();
        }
        match &id {
            Some(id) => info!(%id, "note selected"),
            None => debug!("selection cleared"),
        }
        self.selected.clone_from(&id);
        vec![Action::NoteSelected { id }]
    }

    fn sync_layer(&mut self) {
        let changes = self.layer.reconcile(self.store.list(), &mut self.drag);
        if !changes.is_empty() {
            debug!(
                mounted = changes.mounted.len(),
                synced = changes.synced.len(),
                unmounted = changes.unmounted.len(),
                "layer reconciled"
            );
        }
    }
}
