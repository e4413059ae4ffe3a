//! Note store: the single source of truth for the note collection.
//!
//! DESIGN
//! ======
//! `NoteStore` owns an ordered `Vec<Note>` and a storage backend. All mutation
//! goes through `add`, `update`, and `remove`; each one changes memory first,
//! then writes the whole collection to storage. A failed write is logged and
//! swallowed so the in-memory state never rolls back. Insertion order is never
//! disturbed by updates because stacking on screen follows list order.
//!
//! Loading is forgiving: missing or corrupt storage yields an empty board,
//! records with missing fields are backfilled with the same defaults `add`
//! uses, and duplicate ids are replaced with fresh ones while the first
//! occurrence keeps its id.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::{BoardConfig, SpawnConfig};
use crate::note::{NewNote, Note, NoteId, NotePatch, Position, StoredNote};
use crate::storage::{NoteStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored notes are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored notes are not a JSON array")]
    NotAnArray,
}

/// Ordered, persisted collection of notes.
pub struct NoteStore<S: NoteStorage> {
    notes: Vec<Note>,
    storage: S,
    key: String,
    spawn: SpawnConfig,
    rng: StdRng,
}

impl<S: NoteStorage> NoteStore<S> {
    /// Load the collection from `storage` using an OS-seeded generator for
    /// ids and spawn placement.
    pub fn open(storage: S, config: &BoardConfig) -> Self {
        Self::open_with_rng(storage, config, StdRng::from_os_rng())
    }

    /// Load the collection from `storage` with an explicit generator.
    pub fn open_with_rng(storage: S, config: &BoardConfig, rng: StdRng) -> Self {
        let mut store = Self {
            notes: Vec::new(),
            storage,
            key: config.storage_key.clone(),
            spawn: config.spawn,
            rng,
        };

        match store.read_stored() {
            Ok(records) => {
                let reassigned = store.hydrate(records);
                info!(count = store.notes.len(), reassigned, key = %store.key, "notes loaded");
                if reassigned > 0 {
                    store.persist();
                }
            }
            Err(e) => warn!(error = %e, key = %store.key, "failed to load notes; starting empty"),
        }
        store
    }

    // --- Mutations ---

    /// Append a note built from `new` plus defaults and persist.
    pub fn add(&mut self, new: NewNote) -> &Note {
        let note = Note {
            id: self.fresh_id(&HashSet::new()),
            text: new.text.unwrap_or_default(),
            color: new.color.unwrap_or_default(),
            position: new.position.unwrap_or_else(|| self.spawn_position()),
            rotation_z: new.rotation_z.unwrap_or_else(|| self.spawn_tilt()),
            created_at: now_millis(),
            completed: new.completed.unwrap_or(false),
        };
        info!(id = %note.id, color = note.color.name(), "note added");

        let index = self.notes.len();
        self.notes.push(note);
        self.persist();
        &self.notes[index]
    }

    /// Merge `patch` into the note with `id` and persist.
    ///
    /// Returns `false` (and touches nothing) when no such note exists.
    pub fn update(&mut self, id: &NoteId, patch: &NotePatch) -> bool {
        let Some(note) = self.notes.iter_mut().find(|n| &n.id == id) else {
            debug!(%id, "update for unknown note ignored");
            return false;
        };
        if patch.apply_to(note) {
            self.persist();
        }
        true
    }

    /// Remove the note with `id` and persist. Removing an unknown id is a
    /// no-op that returns `false`.
    pub fn remove(&mut self, id: &NoteId) -> bool {
        let Some(index) = self.notes.iter().position(|n| &n.id == id) else {
            debug!(%id, "remove for unknown note ignored");
            return false;
        };
        self.notes.remove(index);
        info!(%id, "note removed");
        self.persist();
        true
    }

    /// Add a random tilt in `±span` radians to the note's rotation.
    ///
    /// Returns the new rotation, or `None` when the note does not exist.
    pub fn rotate_jitter(&mut self, id: &NoteId, span: f64) -> Option<f64> {
        let current = self.get(id)?.rotation_z;
        let rotation_z = current + spread(&mut self.rng, span);
        self.update(id, &NotePatch { rotation_z: Some(rotation_z), ..Default::default() });
        Some(rotation_z)
    }

    // --- Queries ---

    /// All notes in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &NoteId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The storage backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the storage backend.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // --- Internals ---

    fn read_stored(&self) -> Result<Vec<StoredNote>, LoadError> {
        let Some(raw) = self.storage.read(&self.key)? else {
            return Ok(Vec::new());
        };
        let serde_json::Value::Array(items) = serde_json::from_str(&raw)? else {
            return Err(LoadError::NotAnArray);
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                warn!(index, "skipping stored note that is not an object");
                continue;
            }
            match serde_json::from_value::<StoredNote>(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!(index, error = %e, "skipping unreadable stored note"),
            }
        }
        Ok(records)
    }

    /// Backfill and de-duplicate loaded records. Returns how many ids had to
    /// be reassigned.
    fn hydrate(&mut self, records: Vec<StoredNote>) -> usize {
        let stored_ids: HashSet<NoteId> = records.iter().filter_map(StoredNote::id).collect();
        let mut seen: HashSet<NoteId> = HashSet::with_capacity(records.len());
        let mut reassigned = 0;
        let mut notes = Vec::with_capacity(records.len());

        for record in records {
            let id = match record.id() {
                Some(id) if !seen.contains(&id) => id,
                stale => {
                    let fresh = loop {
                        let candidate = self.fresh_id(&stored_ids);
                        if !seen.contains(&candidate) {
                            break candidate;
                        }
                    };
                    if let Some(stale) = stale {
                        debug!(%stale, %fresh, "duplicate note id reassigned");
                    }
                    reassigned += 1;
                    fresh
                }
            };
            seen.insert(id.clone());
            notes.push(self.backfill(record, id));
        }

        self.notes = notes;
        reassigned
    }

    fn backfill(&mut self, record: StoredNote, id: NoteId) -> Note {
        let color = record.color_or_default();
        let completed = record.completed_or_default();
        #[allow(clippy::cast_possible_truncation)]
        let created_at = record
            .created_at
            .filter(|ms| ms.is_finite())
            .map_or_else(now_millis, |ms| ms as i64);
        Note {
            id,
            text: record.text.unwrap_or_default(),
            color,
            position: record.position.unwrap_or_else(|| self.spawn_position()),
            rotation_z: record.rotation_z.unwrap_or_else(|| self.spawn_tilt()),
            created_at,
            completed,
        }
    }

    /// A random id that collides with neither the live notes nor `reserved`.
    fn fresh_id(&mut self, reserved: &HashSet<NoteId>) -> NoteId {
        loop {
            let id = NoteId::random(&mut self.rng);
            if !reserved.contains(&id) && !self.notes.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }

    fn spawn_position(&mut self) -> Position {
        Position::new(
            spread(&mut self.rng, self.spawn.half_width),
            spread(&mut self.rng, self.spawn.half_height),
            self.spawn.resting_z,
        )
    }

    fn spawn_tilt(&mut self) -> f64 {
        spread(&mut self.rng, self.spawn.max_tilt)
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.notes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize notes");
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.key, &raw) {
            warn!(error = %e, key = %self.key, count = self.notes.len(), "failed to persist notes");
        }
    }
}

/// Uniform sample in `[-half, half]`; zero when `half` is zero or not finite.
fn spread(rng: &mut StdRng, half: f64) -> f64 {
    let half = half.abs();
    if half.is_finite() && half > 0.0 { rng.random_range(-half..=half) } else { 0.0 }
}

/// Milliseconds since the Unix epoch.
#[cfg(all(feature = "web", target_arch = "wasm32"))]
fn now_millis() -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let ms = js_sys::Date::now() as i64;
    ms
}

/// Milliseconds since the Unix epoch.
#[cfg(not(all(feature = "web", target_arch = "wasm32")))]
fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}
