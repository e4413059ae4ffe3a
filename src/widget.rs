//! Note widgets and the layer that keeps one widget per stored note.
//!
//! A widget is whatever draws a note: a DOM element, a mesh, or the plain
//! [`NoteView`] snapshot the web façade hands to JavaScript. Widgets expose
//! capability hooks for the drag controller instead of wiring listeners
//! themselves. [`NotesLayer::reconcile`] mounts a widget for each new note and
//! binds it to the controller exactly once, syncs widgets whose note changed,
//! and unbinds widgets whose note is gone.

#[cfg(test)]
#[path = "widget_test.rs"]
mod widget_test;

use std::collections::HashMap;

use serde::Serialize;

use crate::drag::{DragController, DragEvent};
use crate::note::{Note, NoteColor, NoteId, Position};

/// Capability hooks a rendered note exposes.
pub trait NoteWidget {
    /// Build the widget for `note`.
    fn mount(note: &Note) -> Self
    where
        Self: Sized;

    fn note_id(&self) -> &NoteId;

    /// The stored note changed; redraw from it.
    fn sync(&mut self, note: &Note);

    /// Picked up and raised to `lifted`.
    fn on_drag_start(&mut self, lifted: Position);

    /// Following the pointer. `live` is visual only.
    fn on_drag_move(&mut self, live: Position);

    /// Released or cancelled; back at resting depth at `resting`.
    fn on_drag_end(&mut self, resting: Position);
}

/// Render-ready snapshot of one note.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: NoteId,
    pub text: String,
    pub color: NoteColor,
    /// Paper colour as CSS hex.
    pub fill: &'static str,
    /// Where the note is drawn, lifted while held.
    pub position: Position,
    pub rotation_z: f64,
    pub completed: bool,
    pub lifted: bool,
}

impl NoteWidget for NoteView {
    fn mount(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            text: note.text.clone(),
            color: note.color,
            fill: note.color.hex(),
            position: note.position,
            rotation_z: note.rotation_z,
            completed: note.completed,
            lifted: false,
        }
    }

    fn note_id(&self) -> &NoteId {
        &self.id
    }

    fn sync(&mut self, note: &Note) {
        self.text.clone_from(&note.text);
        self.color = note.color;
        self.fill = note.color.hex();
        self.rotation_z = note.rotation_z;
        self.completed = note.completed;
        if !self.lifted {
            self.position = note.position;
        }
    }

    fn on_drag_start(&mut self, lifted: Position) {
        self.lifted = true;
        self.position = lifted;
    }

    fn on_drag_move(&mut self, live: Position) {
        self.position = live;
    }

    fn on_drag_end(&mut self, resting: Position) {
        self.lifted = false;
        self.position = resting;
    }
}

/// What a reconcile pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerChanges {
    pub mounted: Vec<NoteId>,
    pub synced: Vec<NoteId>,
    pub unmounted: Vec<NoteId>,
}

impl LayerChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.synced.is_empty() && self.unmounted.is_empty()
    }
}

struct Mounted<W> {
    /// Note as last synced into the widget.
    note: Note,
    widget: W,
}

/// One widget per note, in store order.
pub struct NotesLayer<W: NoteWidget> {
    mounted: Vec<Mounted<W>>,
}

impl<W: NoteWidget> Default for NotesLayer<W> {
    fn default() -> Self {
        Self { mounted: Vec::new() }
    }
}

impl<W: NoteWidget> NotesLayer<W> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the widget list in line with `notes`.
    pub fn reconcile(&mut self, notes: &[Note], drag: &mut DragController) -> LayerChanges {
        let previous_order: Vec<NoteId> = self.mounted.iter().map(|m| m.note.id.clone()).collect();
        let mut previous: HashMap<NoteId, Mounted<W>> =
            self.mounted.drain(..).map(|m| (m.note.id.clone(), m)).collect();

        let mut changes = LayerChanges::default();
        let mut mounted = Vec::with_capacity(notes.len());
        for note in notes {
            match previous.remove(&note.id) {
                Some(mut entry) => {
                    if entry.note != *note {
                        entry.widget.sync(note);
                        entry.note = note.clone();
                        changes.synced.push(note.id.clone());
                    }
                    mounted.push(entry);
                }
                None => {
                    let widget = W::mount(note);
                    drag.bind(widget.note_id().clone());
                    changes.mounted.push(note.id.clone());
                    mounted.push(Mounted { note: note.clone(), widget });
                }
            }
        }

        for id in previous_order {
            if previous.remove(&id).is_some() {
                drag.unbind(&id);
                changes.unmounted.push(id);
            }
        }

        self.mounted = mounted;
        changes
    }

    /// Route a drag event to its widget's hook. Returns `false` if no widget
    /// is mounted for the note.
    pub fn dispatch(&mut self, event: &DragEvent) -> bool {
        let Some(entry) = self.mounted.iter_mut().find(|m| &m.note.id == event.note_id()) else {
            return false;
        };
        match event {
            DragEvent::Started { lifted, .. } => entry.widget.on_drag_start(*lifted),
            DragEvent::Moved { live, .. } => entry.widget.on_drag_move(*live),
            DragEvent::Committed { position, .. } => entry.widget.on_drag_end(*position),
            DragEvent::Cancelled { restored, .. } => entry.widget.on_drag_end(*restored),
        }
        true
    }

    #[must_use]
    pub fn widget(&self, id: &NoteId) -> Option<&W> {
        self.mounted.iter().find(|m| &m.note.id == id).map(|m| &m.widget)
    }

    /// Widgets in draw order (last is on top).
    pub fn widgets(&self) -> impl Iterator<Item = &W> {
        self.mounted.iter().map(|m| &m.widget)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }
}
