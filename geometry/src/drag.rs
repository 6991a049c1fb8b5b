//! Select-mode pointer sessions: dragging a point, selecting, or panning.
//!
//! On pointer-down the picked object decides the session:
//! - a point is selected and starts a point drag;
//! - any other object is selected (shift toggles) and no session starts;
//! - empty canvas clears the selection (unless shift is held) and starts a pan.
//!
//! Pointer-up and pointer-leave both go through [`end`], so a pointer that
//! leaves the canvas with a button held cannot leave a drag or pan stuck.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use tracing::debug;

use crate::config::SnapPolicy;
use crate::input::{InputState, Modifiers, UiState};
use crate::pick;
use crate::store::{GeoObject, GeometryStore};
use crate::viewport::{Point, Viewport};

/// Result of a select-mode pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStart {
    /// The session to track until pointer-up.
    pub session: InputState,
    pub selection_changed: bool,
}

/// Decide what a primary pointer-down in select mode does.
pub fn begin(
    screen: Point,
    modifiers: Modifiers,
    store: &GeometryStore,
    viewport: &Viewport,
    ui: &mut UiState,
    tolerance_px: f64,
) -> DragStart {
    let Some(id) = pick::pick(screen, store, viewport, tolerance_px) else {
        let selection_changed = !modifiers.shift && ui.clear_selection();
        debug!(x = screen.x, y = screen.y, "pan started");
        return DragStart { session: InputState::Panning { last_screen: screen }, selection_changed };
    };

    if store.get(id).is_some_and(GeoObject::is_point) {
        let selection_changed = if modifiers.shift { ui.extend(id) } else { ui.select(id, false) };
        debug!(%id, "point drag started");
        DragStart { session: InputState::DraggingPoint { id }, selection_changed }
    } else {
        let selection_changed = ui.select(id, modifiers.shift);
        DragStart { session: InputState::Idle, selection_changed }
    }
}

/// Apply a pointer move to the active session. Returns whether the store or
/// viewport changed.
pub fn update(
    session: &mut InputState,
    screen: Point,
    store: &mut GeometryStore,
    viewport: &mut Viewport,
    snap: SnapPolicy,
) -> bool {
    match session {
        InputState::Idle => false,
        InputState::Panning { last_screen } => {
            viewport.pan_by_screen(screen.x - last_screen.x, screen.y - last_screen.y);
            *last_screen = screen;
            true
        }
        InputState::DraggingPoint { id } => {
            let id = *id;
            let to = snap.apply(viewport.to_model(screen));
            if store.move_point(id, to) {
                true
            } else {
                debug!(%id, "dragged point vanished; ending drag");
                *session = InputState::Idle;
                false
            }
        }
    }
}

/// End the active session. Returns whether one was active.
pub fn end(session: &mut InputState) -> bool {
    let was_active = !session.is_idle();
    if was_active {
        debug!(?session, "pointer session ended");
    }
    *session = InputState::Idle;
    was_active
}
