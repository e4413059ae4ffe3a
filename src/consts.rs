//! Shared numeric constants for the corkboard crate.

// ── Persistence ─────────────────────────────────────────────────

/// Storage key holding the JSON array of notes.
pub const DEFAULT_STORAGE_KEY: &str = "notes";

/// Directory for file-backed storage when none is configured.
pub const DEFAULT_STORAGE_DIR: &str = ".corkboard";

// ── Note geometry ───────────────────────────────────────────────

/// Side length of a note's square face, in world units.
pub const NOTE_SIZE: f64 = 180.0;

/// Board-plane depth a note rests at when nobody is holding it.
pub const RESTING_Z: f64 = 0.0;

/// How far above its resting depth a note is raised while dragged.
pub const LIFT_HEIGHT: f64 = 20.0;

/// Extra depth per bring-to-front step so the latest lifted note wins.
pub const STACK_STEP: f64 = 0.01;

// ── Spawning ────────────────────────────────────────────────────

/// Half-width of the rectangle new notes are scattered into.
pub const SPAWN_HALF_WIDTH: f64 = 400.0;

/// Half-height of the rectangle new notes are scattered into.
pub const SPAWN_HALF_HEIGHT: f64 = 220.0;

/// Maximum absolute tilt (radians) given to a freshly added note.
pub const SPAWN_MAX_TILT: f64 = 0.15;

/// Maximum absolute tilt delta (radians) applied by one rotate-jitter.
pub const ROTATE_JITTER: f64 = 0.1;

// ── Input ───────────────────────────────────────────────────────

/// Pointer travel in pixels below which a gesture counts as a click.
pub const CLICK_SLOP_PX: f64 = 5.0;

// ── Camera ──────────────────────────────────────────────────────

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEG: f64 = 45.0;

/// Distance of the camera from the board plane.
pub const CAMERA_DISTANCE: f64 = 1000.0;

/// Near clip plane.
pub const CAMERA_NEAR: f64 = 1.0;

/// Far clip plane.
pub const CAMERA_FAR: f64 = 5000.0;

/// Horizontal parallax drift at the viewport edge, in world units.
pub const PARALLAX_STRENGTH_X: f64 = 25.0;

/// Vertical parallax drift at the viewport edge, in world units.
pub const PARALLAX_STRENGTH_Y: f64 = 15.0;

/// Fraction of the remaining parallax offset closed each frame.
pub const PARALLAX_LERP: f64 = 0.04;
