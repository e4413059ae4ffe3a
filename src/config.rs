//! Board configuration with defaults and optional environment overrides.
//!
//! Everything has a working default; a browser host never needs to configure
//! anything beyond the viewport. Native hosts (tests, tooling) may override a
//! handful of values through `CORKBOARD_*` environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::consts::{
    CLICK_SLOP_PX, DEFAULT_STORAGE_DIR, DEFAULT_STORAGE_KEY, LIFT_HEIGHT, PARALLAX_LERP, PARALLAX_STRENGTH_X, PARALLAX_STRENGTH_Y,
    RESTING_Z, ROTATE_JITTER, SPAWN_HALF_HEIGHT, SPAWN_HALF_WIDTH, SPAWN_MAX_TILT, STACK_STEP,
};

pub const ENV_STORAGE_KEY: &str = "CORKBOARD_STORAGE_KEY";
pub const ENV_STORAGE_PATH: &str = "CORKBOARD_STORAGE_PATH";
pub const ENV_SPAWN_HALF_WIDTH: &str = "CORKBOARD_SPAWN_HALF_WIDTH";
pub const ENV_SPAWN_HALF_HEIGHT: &str = "CORKBOARD_SPAWN_HALF_HEIGHT";
pub const ENV_CLICK_SLOP_PX: &str = "CORKBOARD_CLICK_SLOP_PX";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Where and how new notes are scattered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// New notes land with `|x| <= half_width`.
    pub half_width: f64,
    /// New notes land with `|y| <= half_height`.
    pub half_height: f64,
    /// New notes get `|rotation_z| <= max_tilt`.
    pub max_tilt: f64,
    /// Depth new notes rest at.
    pub resting_z: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            half_width: SPAWN_HALF_WIDTH,
            half_height: SPAWN_HALF_HEIGHT,
            max_tilt: SPAWN_MAX_TILT,
            resting_z: RESTING_Z,
        }
    }
}

/// Drag gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Height above the resting depth while held.
    pub lift_height: f64,
    /// Extra height per bring-to-front step.
    pub stack_step: f64,
    /// Pointer travel below which the gesture also counts as a click.
    pub click_slop_px: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self { lift_height: LIFT_HEIGHT, stack_step: STACK_STEP, click_slop_px: CLICK_SLOP_PX }
    }
}

/// Hover parallax applied to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub strength_x: f64,
    pub strength_y: f64,
    /// Fraction of the remaining offset closed per frame, in `0..=1`.
    pub lerp: f64,
    /// Freeze the parallax target while a note is held.
    pub disable_on_drag: bool,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            strength_x: PARALLAX_STRENGTH_X,
            strength_y: PARALLAX_STRENGTH_Y,
            lerp: PARALLAX_LERP,
            disable_on_drag: true,
        }
    }
}

/// Complete board configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Storage key for the note array.
    pub storage_key: String,
    /// Directory for file-backed storage on native hosts.
    pub storage_path: Option<PathBuf>,
    pub spawn: SpawnConfig,
    /// Maximum tilt delta applied by one rotate-jitter action.
    pub rotate_jitter: f64,
    pub drag: DragConfig,
    /// Camera the scene host starts from; its `position` is the parallax base.
    pub camera: PerspectiveCamera,
    pub parallax: ParallaxConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_path: None,
            spawn: SpawnConfig::default(),
            rotate_jitter: ROTATE_JITTER,
            drag: DragConfig::default(),
            camera: PerspectiveCamera::default(),
            parallax: ParallaxConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Directory for file-backed storage: `storage_path`, or `.corkboard`.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `CORKBOARD_STORAGE_KEY`: storage key (default `notes`)
    /// - `CORKBOARD_STORAGE_PATH`: directory for file-backed storage
    /// - `CORKBOARD_SPAWN_HALF_WIDTH`, `CORKBOARD_SPAWN_HALF_HEIGHT`: spawn rectangle
    /// - `CORKBOARD_CLICK_SLOP_PX`: click-versus-drag threshold
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a numeric override does not parse or
    /// is negative.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` on an unparsable or negative number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(key) = lookup(ENV_STORAGE_KEY).filter(|k| !k.trim().is_empty()) {
            cfg.storage_key = key.trim().to_string();
        }
        cfg.storage_path = lookup(ENV_STORAGE_PATH).filter(|p| !p.trim().is_empty()).map(PathBuf::from);
        cfg.spawn.half_width = parse_non_negative(&lookup, ENV_SPAWN_HALF_WIDTH, cfg.spawn.half_width)?;
        cfg.spawn.half_height = parse_non_negative(&lookup, ENV_SPAWN_HALF_HEIGHT, cfg.spawn.half_height)?;
        cfg.drag.click_slop_px = parse_non_negative(&lookup, ENV_CLICK_SLOP_PX, cfg.drag.click_slop_px)?;
        Ok(cfg)
    }
}

fn parse_non_negative(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ConfigError::Invalid { var, value: raw }),
    }
}
