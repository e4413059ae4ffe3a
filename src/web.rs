//! Browser façade over [`EngineCore`].
//!
//! The page creates one `Corkboard` for the board's root element and forwards
//! its pointer events, text-field events, and resize/animation-frame ticks.
//! Every method returns the resulting actions as a JSON array; pointer
//! capture is applied here so the page only has to redraw.

use serde::Serialize;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, PointerEvent};

use crate::camera::Point;
use crate::config::BoardConfig;
use crate::engine::{Action, EngineCore};
use crate::input::{Button, PointerDown, PointerTarget};
use crate::logging;
use crate::note::{NewNote, NoteColor, NoteId};
use crate::scene::Frame;
use crate::storage::{LocalStorage, MemoryStorage, NoteStorage};
use crate::text::TextEvent;
use crate::widget::NoteView;

/// Elements inside a note that take text input.
const TEXT_INPUT_SELECTOR: &str = "textarea, input, [contenteditable]";
/// Elements inside a note that act on click.
const ACTION_BUTTON_SELECTOR: &str = "button";
/// Anything else the page marks as not draggable.
const NO_DRAG_SELECTOR: &str = "[data-nodrag]";

#[derive(Serialize)]
struct FrameView<'a> {
    frame: Frame,
    notes: Vec<&'a NoteView>,
}

/// The board as seen from JavaScript.
#[wasm_bindgen]
pub struct Corkboard {
    core: EngineCore<Box<dyn NoteStorage>>,
    root: Element,
}

#[wasm_bindgen]
impl Corkboard {
    /// Mount the board on `root`, loading notes from `localStorage`.
    #[wasm_bindgen(constructor)]
    pub fn new(root: Element) -> Corkboard {
        console_error_panic_hook::set_once();
        logging::init();

        let config = BoardConfig::default();
        let storage: Box<dyn NoteStorage> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                warn!(error = %e, "localStorage unavailable; notes will not survive reload");
                Box::new(MemoryStorage::new())
            }
        };
        let mut core = EngineCore::new(storage, &config);
        let rect = root.get_bounding_client_rect();
        core.resize(rect.width(), rect.height());
        info!(count = core.notes().len(), "corkboard mounted");

        Self { core, root }
    }

    // --- Pointer events ---

    /// `note_id` is the note whose element received the event, or `None` to
    /// hit-test against the note rectangles.
    pub fn pointer_down(&mut self, ev: &PointerEvent, note_id: Option<String>) -> String {
        let down = PointerDown {
            pointer_id: ev.pointer_id(),
            button: Button::from_dom(ev.button()),
            screen: self.local_point(ev),
            note_id: note_id.map(NoteId::new),
            target: event_target(ev),
        };
        let actions = self.core.pointer_down(down);
        self.finish(actions)
    }

    pub fn pointer_move(&mut self, ev: &PointerEvent) -> String {
        let actions = self.core.pointer_move(ev.pointer_id(), self.local_point(ev));
        self.finish(actions)
    }

    pub fn pointer_up(&mut self, ev: &PointerEvent) -> String {
        let actions = self.core.pointer_up(ev.pointer_id(), self.local_point(ev));
        self.finish(actions)
    }

    pub fn pointer_cancel(&mut self, ev: &PointerEvent) -> String {
        let actions = self.core.pointer_cancel(ev.pointer_id());
        self.finish(actions)
    }

    pub fn pointer_leave(&mut self) -> String {
        let actions = self.core.pointer_leave();
        self.finish(actions)
    }

    /// Window lost focus: drop every drag.
    pub fn blur_window(&mut self) -> String {
        let actions = self.core.cancel_all();
        self.finish(actions)
    }

    // --- Frame ---

    pub fn resize(&mut self, width: f64, height: f64) -> String {
        let actions = self.core.resize(width, height);
        self.finish(actions)
    }

    /// Advance one animation frame; returns the camera and notes to draw.
    pub fn tick(&mut self) -> String {
        let frame = self.core.tick();
        let view = FrameView { frame, notes: self.core.layer().widgets().collect() };
        to_json(&view, "{}")
    }

    // --- Note actions ---

    /// Add a note, optionally preset to a colour name.
    pub fn add_note(&mut self, color: Option<String>) -> String {
        let new = NewNote { color: color.as_deref().and_then(NoteColor::parse), ..Default::default() };
        let actions = self.core.add_note(new);
        self.finish(actions)
    }

    pub fn text_input(&mut self, id: &str, text: String) -> String {
        let actions = self.core.text_event(&NoteId::new(id), TextEvent::Input(text));
        self.finish(actions)
    }

    pub fn composition_start(&mut self, id: &str) -> String {
        let actions = self.core.text_event(&NoteId::new(id), TextEvent::CompositionStart);
        self.finish(actions)
    }

    pub fn composition_end(&mut self, id: &str, text: String) -> String {
        let actions = self.core.text_event(&NoteId::new(id), TextEvent::CompositionEnd(text));
        self.finish(actions)
    }

    pub fn text_blur(&mut self, id: &str, text: String) -> String {
        let actions = self.core.text_event(&NoteId::new(id), TextEvent::Blur(text));
        self.finish(actions)
    }

    pub fn toggle_completed(&mut self, id: &str) -> String {
        let actions = self.core.toggle_completed(&NoteId::new(id));
        self.finish(actions)
    }

    pub fn cycle_color(&mut self, id: &str) -> String {
        let actions = self.core.cycle_color(&NoteId::new(id));
        self.finish(actions)
    }

    /// Set a colour by name. Unknown names do nothing.
    pub fn set_color(&mut self, id: &str, color: &str) -> String {
        let actions = match NoteColor::parse(color) {
            Some(color) => self.core.set_color(&NoteId::new(id), color),
            None => {
                debug!(%id, color, "unknown colour ignored");
                Vec::new()
            }
        };
        self.finish(actions)
    }

    pub fn rotate_jitter(&mut self, id: &str) -> String {
        let actions = self.core.rotate_jitter(&NoteId::new(id));
        self.finish(actions)
    }

    pub fn delete_note(&mut self, id: &str) -> String {
        let actions = self.core.delete_note(&NoteId::new(id));
        self.finish(actions)
    }

    /// The stored notes as JSON.
    pub fn notes(&self) -> String {
        to_json(self.core.notes(), "[]")
    }

    /// The selected note id, if any.
    pub fn selection(&self) -> Option<String> {
        self.core.selection().map(ToString::to_string)
    }
}

impl Corkboard {
    /// Pointer position relative to the board's top-left corner.
    fn local_point(&self, ev: &PointerEvent) -> Point {
        let rect = self.root.get_bounding_client_rect();
        Point::new(f64::from(ev.client_x()) - rect.left(), f64::from(ev.client_y()) - rect.top())
    }

    /// Apply pointer capture and serialise the actions for the page.
    fn finish(&self, actions: Vec<Action>) -> String {
        for action in &actions {
            let result = match action {
                Action::CapturePointer { pointer_id } => self.root.set_pointer_capture(*pointer_id),
                Action::ReleasePointer { pointer_id } => self.root.release_pointer_capture(*pointer_id),
                _ => continue,
            };
            if let Err(e) = result {
                debug!(error = ?e, "pointer capture change rejected");
            }
        }
        to_json(&actions, "[]")
    }
}

/// Classify where inside a note a pointer-down landed.
#[must_use]
pub fn classify_target(element: &Element) -> PointerTarget {
    let within = |selector: &str| matches!(element.closest(selector), Ok(Some(_)));
    if within(TEXT_INPUT_SELECTOR) {
        PointerTarget::TextInput
    } else if within(ACTION_BUTTON_SELECTOR) {
        PointerTarget::ActionButton
    } else if within(NO_DRAG_SELECTOR) {
        PointerTarget::NoDrag
    } else {
        PointerTarget::Surface
    }
}

fn event_target(ev: &PointerEvent) -> PointerTarget {
    match ev.target().map(|target| target.dyn_into::<Element>()) {
        Some(Ok(element)) => classify_target(&element),
        _ => PointerTarget::Surface,
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to serialize for host");
            fallback.to_string()
        }
    }
}
