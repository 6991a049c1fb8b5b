//! Input model: tools, modifier keys, mouse buttons, and the gesture state.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `UiState` is the persistent selection/hover state the renderer reads.
//! `InputState` is the session tracked between pointer-down and pointer-up in
//! select mode; exactly one of point-drag or pan is active per session.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::store::ObjectId;
use crate::viewport::Point;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select, drag points, pan (default).
    #[default]
    Select,
    /// One click places one point.
    Point,
    /// Unbounded line through two points.
    Line,
    /// Segment between two points.
    Segment,
    /// Circle from a center and a point on the rim.
    Circle,
    /// Distance annotation between two points.
    Distance,
    /// Polygon through any number of clicked vertices.
    Polygon,
}

impl Tool {
    /// Whether this tool builds its object from exactly two point clicks.
    #[must_use]
    pub fn is_two_phase(self) -> bool {
        matches!(self, Self::Line | Self::Segment | Self::Circle | Self::Distance)
    }

    /// Whether clicks with this tool construct objects.
    #[must_use]
    pub fn is_construction(self) -> bool {
        !matches!(self, Self::Select)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held; extends or toggles the selection.
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape" || self.0 == "Esc"
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.0 == "Delete" || self.0 == "Backspace"
    }

    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.0 == "Enter"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down = zoom out).
    pub dy: f64,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Selected object ids.
    pub selection: BTreeSet<ObjectId>,
    /// Object under the pointer in select mode, if any.
    pub hovered: Option<ObjectId>,
}

impl UiState {
    /// Replace the selection with `id`, or toggle `id` when `toggle` is set.
    /// Returns whether the selection changed.
    pub fn select(&mut self, id: ObjectId, toggle: bool) -> bool {
        if toggle {
            if !self.selection.remove(&id) {
                self.selection.insert(id);
            }
            return true;
        }
        if self.selection.len() == 1 && self.selection.contains(&id) {
            return false;
        }
        self.selection.clear();
        self.selection.insert(id);
        true
    }

    /// Add `id` to the selection without removing anything.
    pub fn extend(&mut self, id: ObjectId) -> bool {
        self.selection.insert(id)
    }

    /// Clear the selection. Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let had = !self.selection.is_empty();
        self.selection.clear();
        had
    }
}

/// Gesture session between pointer-down and pointer-up in select mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Panning the viewport by dragging empty canvas.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute the pan delta.
        last_screen: Point,
    },
    /// Dragging a point to a new position.
    DraggingPoint {
        /// Id of the point being dragged.
        id: ObjectId,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
