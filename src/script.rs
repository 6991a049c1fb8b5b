//! Replay scripts: one JSON input event per line, applied to an engine core.
//!
//! ```text
//! # segment from two empty clicks
//! {"event":"tool","tool":"segment"}
//! {"event":"pointer_down","x":400,"y":300}
//! {"event":"pointer_down","x":500,"y":300}
//! ```
//!
//! Coordinates are screen pixels. Blank lines and lines starting with `#`
//! are skipped.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::collections::HashSet;

use geometry::config::SnapPolicy;
use geometry::engine::{Action, EngineCore};
use geometry::input::{Button, Key, Modifiers, Tool, WheelDelta};
use geometry::store::ObjectId;
use geometry::viewport::Point;
use serde::Deserialize;

/// One scripted host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerLeave,
    Wheel {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Tool {
        tool: Tool,
    },
    Resize {
        width: f64,
        height: f64,
    },
    /// Grid snap with `step`, or off when `step` is absent.
    Snap {
        #[serde(default)]
        step: Option<f64>,
    },
    ToggleVisibility {
        id: ObjectId,
    },
    Delete {
        ids: Vec<ObjectId>,
    },
}

/// Parse one script line. Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns the JSON error when the line is not a known event.
pub fn parse_line(line: &str) -> Result<Option<ScriptEvent>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}

/// Feed one event to the engine and return the actions it produced.
pub fn apply(core: &mut EngineCore, event: &ScriptEvent) -> Vec<Action> {
    match event {
        ScriptEvent::PointerDown { x, y, button, modifiers } => core.on_pointer_down(Point::new(*x, *y), *button, *modifiers),
        ScriptEvent::PointerMove { x, y, modifiers } => core.on_pointer_move(Point::new(*x, *y), *modifiers),
        ScriptEvent::PointerUp { x, y, button, modifiers } => core.on_pointer_up(Point::new(*x, *y), *button, *modifiers),
        ScriptEvent::PointerLeave => core.on_pointer_leave(),
        ScriptEvent::Wheel { x, y, dx, dy } => {
            core.on_wheel(Point::new(*x, *y), WheelDelta { dx: *dx, dy: *dy }, Modifiers::default())
        }
        ScriptEvent::Key { key, modifiers } => core.on_key_down(key, *modifiers),
        ScriptEvent::Tool { tool } => core.set_tool(*tool),
        ScriptEvent::Resize { width, height } => {
            core.set_viewport(*width, *height);
            Vec::new()
        }
        ScriptEvent::Snap { step } => {
            core.set_snap(step.map_or(SnapPolicy::Off, |step| SnapPolicy::Grid { step }));
            Vec::new()
        }
        ScriptEvent::ToggleVisibility { id } => {
            core.toggle_visibility(*id);
            Vec::new()
        }
        ScriptEvent::Delete { ids } => {
            let ids: HashSet<ObjectId> = ids.iter().copied().collect();
            let removed = core.delete(&ids);
            if removed.is_empty() {
                return Vec::new();
            }
            vec![Action::ObjectsDeleted { ids: removed }]
        }
    }
}
