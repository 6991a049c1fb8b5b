//! Engine configuration.
//!
//! DESIGN
//! ======
//! Every knob has a compiled-in default from [`crate::consts`]. Hosts either
//! build an [`EngineConfig`] directly, deserialize one (missing fields fall
//! back to defaults), or call [`EngineConfig::from_env`] which reads
//! `NOESIS_*` variables and ignores values that fail to parse.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCALE, GRID_SNAP_STEP, PICK_TOLERANCE_PX, ZOOM_STEP};
use crate::viewport::Point;

/// How model positions produced by clicks and drags are quantized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SnapPolicy {
    /// Positions are used as-is.
    #[default]
    Off,
    /// Positions are rounded to the nearest multiple of `step` on both axes.
    Grid { step: f64 },
}

impl SnapPolicy {
    /// Grid snap with the default half-unit step.
    #[must_use]
    pub fn grid() -> Self {
        Self::Grid { step: GRID_SNAP_STEP }
    }

    /// Quantize a model-space point according to this policy.
    #[must_use]
    pub fn apply(self, p: Point) -> Point {
        match self {
            Self::Off => p,
            Self::Grid { step } if step.is_finite() && step > 0.0 => {
                Point::new((p.x / step).round() * step, (p.y / step).round() * step)
            }
            Self::Grid { .. } => p,
        }
    }

    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::Grid { .. })
    }
}

/// Tunable engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pick tolerance in screen pixels.
    pub pick_tolerance_px: f64,
    /// Snap policy for clicks and point drags.
    pub snap: SnapPolicy,
    /// Zoom multiplier per wheel notch (> 1).
    pub zoom_step: f64,
    /// Scale of the viewport at startup, in pixels per model unit.
    pub initial_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pick_tolerance_px: PICK_TOLERANCE_PX,
            snap: SnapPolicy::Off,
            zoom_step: ZOOM_STEP,
            initial_scale: DEFAULT_SCALE,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `NOESIS_PICK_TOLERANCE_PX`, `NOESIS_SNAP`,
    /// `NOESIS_SNAP_STEP`, `NOESIS_ZOOM_STEP` and `NOESIS_INITIAL_SCALE`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let snap_step = env_parse("NOESIS_SNAP_STEP", GRID_SNAP_STEP);
        let snap = if env_parse("NOESIS_SNAP", false) {
            SnapPolicy::Grid { step: snap_step }
        } else {
            SnapPolicy::Off
        };

        Self {
            pick_tolerance_px: env_parse("NOESIS_PICK_TOLERANCE_PX", defaults.pick_tolerance_px),
            snap,
            zoom_step: env_parse("NOESIS_ZOOM_STEP", defaults.zoom_step),
            initial_scale: env_parse("NOESIS_INITIAL_SCALE", defaults.initial_scale),
        }
        .sanitized()
    }

    /// Replace out-of-range values with their defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let snap = match self.snap {
            SnapPolicy::Grid { step } => SnapPolicy::Grid { step: positive(step, GRID_SNAP_STEP) },
            SnapPolicy::Off => SnapPolicy::Off,
        };
        Self {
            pick_tolerance_px: positive(self.pick_tolerance_px, defaults.pick_tolerance_px),
            snap,
            zoom_step: if self.zoom_step.is_finite() && self.zoom_step > 1.0 {
                self.zoom_step
            } else {
                defaults.zoom_step
            },
            initial_scale: positive(self.initial_scale, defaults.initial_scale),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(v) => v.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
