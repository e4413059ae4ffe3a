//! Note model: the persisted record, its colours, and the sparse input types.
//!
//! `Note` is the one entity the board persists. `NewNote` and `NotePatch` are
//! the explicit optional-field inputs for creating and editing notes; missing
//! fields are defaulted by the store, never guessed at by callers.
//! `StoredNote` is the lenient shape used when reading whatever is already in
//! storage, so older or hand-edited records still load.

#[cfg(test)]
#[path = "note_test.rs"]
mod note_test;

use std::fmt;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::camera::Vec3;

/// World-space position of a note's centre.
pub type Position = Vec3;

/// Opaque, immutable note identifier.
///
/// Freshly generated ids are UUID strings, but anything already in storage is
/// accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generate a random v4 UUID id from `rng`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill(&mut bytes);
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for NoteId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

/// Paper colour of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Mint,
}

impl NoteColor {
    /// Every colour, in cycling order.
    pub const ALL: [NoteColor; 3] = [NoteColor::Yellow, NoteColor::Pink, NoteColor::Mint];

    /// The colour after this one: yellow → pink → mint → yellow.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Yellow => Self::Pink,
            Self::Pink => Self::Mint,
            Self::Mint => Self::Yellow,
        }
    }

    /// Lowercase name as stored on disk.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Mint => "mint",
        }
    }

    /// Paper colour as a CSS hex string.
    #[must_use]
    pub fn hex(self) -> &'static str {
        match self {
            Self::Yellow => "#FFEB74",
            Self::Pink => "#FFC3D1",
            Self::Mint => "#BFF3E0",
        }
    }

    /// Parse a stored colour name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == raw)
    }
}

/// A sticky note as held in memory and written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique within the collection; never changes after creation.
    pub id: NoteId,
    /// Free-form user text.
    pub text: String,
    /// Paper colour.
    pub color: NoteColor,
    /// Centre of the note in world space; `z` is the resting depth.
    pub position: Position,
    /// Tilt about the viewing axis, in radians.
    pub rotation_z: f64,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Task-completion flag.
    pub completed: bool,
}

/// Input for creating a note. Absent fields are filled with store defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl NewNote {
    /// A new note preset to `color`, everything else defaulted.
    #[must_use]
    pub fn with_color(color: NoteColor) -> Self {
        Self { color: Some(color), ..Default::default() }
    }
}

/// Sparse update for a note. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl NotePatch {
    /// Returns `true` if no field would be touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.color.is_none()
            && self.position.is_none()
            && self.rotation_z.is_none()
            && self.completed.is_none()
    }

    /// Merge the present fields into `note`. Returns whether anything changed.
    pub fn apply_to(&self, note: &mut Note) -> bool {
        let before = note.clone();
        if let Some(ref text) = self.text {
            note.text.clone_from(text);
        }
        if let Some(color) = self.color {
            note.color = color;
        }
        if let Some(position) = self.position {
            note.position = position;
        }
        if let Some(rotation_z) = self.rotation_z {
            note.rotation_z = rotation_z;
        }
        if let Some(completed) = self.completed {
            note.completed = completed;
        }
        *note != before
    }
}

/// Lenient on-disk record. Every field is optional, unknown keys are ignored,
/// and a field holding the wrong type reads as absent; the store backfills
/// what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredNote {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub position: Option<Position>,
    #[serde(deserialize_with = "lenient")]
    pub rotation_z: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub created_at: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub completed: Option<bool>,
    /// Older records carried the completion flag under this name.
    #[serde(deserialize_with = "lenient")]
    pub done: Option<bool>,
}

/// Any JSON value; `None` unless it reads as `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(_) => None,
    })
}

impl StoredNote {
    /// The stored colour, falling back to yellow when absent or unknown.
    #[must_use]
    pub fn color_or_default(&self) -> NoteColor {
        self.color.as_deref().and_then(NoteColor::parse).unwrap_or_default()
    }

    /// The stored completion flag under either key, defaulting to `false`.
    #[must_use]
    pub fn completed_or_default(&self) -> bool {
        self.completed.or(self.done).unwrap_or(false)
    }

    /// The stored id, ignoring empty strings.
    #[must_use]
    pub fn id(&self) -> Option<NoteId> {
        self.id.as_deref().filter(|raw| !raw.is_empty()).map(NoteId::new)
    }
}
