//! Engine: routes input events to the drag controller and construction tools.
//!
//! `EngineCore` holds all state and logic and has no rendering dependency, so
//! it is driven directly by tests and by the replay CLI. `Engine` pairs a core
//! with a [`Renderer`] and redraws at most once per frame tick, only when an
//! event marked the state dirty.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};

use crate::config::{EngineConfig, SnapPolicy};
use crate::construct::{ConstructionMachine, Preview};
use crate::deps;
use crate::drag;
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::pick;
use crate::render::{self, Renderer, Scene};
use crate::store::{GeoObject, GeometryStore, ObjectId, ObjectKind};
use crate::viewport::{Point, Viewport};

/// Notifications returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ObjectCreated { id: ObjectId, kind: ObjectKind },
    ObjectsDeleted { ids: Vec<ObjectId> },
    SelectionChanged,
    SetCursor(String),
}

/// Core engine state: everything except the renderer.
#[derive(Debug)]
pub struct EngineCore {
    pub store: GeometryStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub construction: ConstructionMachine,
    pub config: EngineConfig,
    dirty: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let config = config.sanitized();
        Self {
            store: GeometryStore::new(),
            viewport: Viewport::new(0.0, 0.0, config.initial_scale),
            ui: UiState::default(),
            input: InputState::default(),
            construction: ConstructionMachine::new(),
            config,
            dirty: true,
        }
    }

    // --- Viewport / settings ---

    /// Update the canvas size from the host layout.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
        self.mark_dirty();
    }

    /// Switch tools. Any partial construction and any pointer session is dropped.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        if tool == self.ui.tool {
            return Vec::new();
        }
        info!(from = ?self.ui.tool, to = ?tool, "tool switched");
        self.construction.reset();
        drag::end(&mut self.input);
        self.ui.tool = tool;
        self.ui.hovered = None;
        self.mark_dirty();
        vec![Action::SetCursor(idle_cursor(tool).to_owned())]
    }

    /// Change the snap policy for subsequent clicks and drags.
    pub fn set_snap(&mut self, snap: SnapPolicy) {
        self.config = EngineConfig { snap, ..self.config }.sanitized();
    }

    /// Show or hide an object. Returns the new visibility.
    pub fn toggle_visibility(&mut self, id: ObjectId) -> Option<bool> {
        let visible = self.store.toggle_visibility(id)?;
        if !visible && self.ui.hovered == Some(id) {
            self.ui.hovered = None;
        }
        self.mark_dirty();
        Some(visible)
    }

    // --- Deletion ---

    /// Delete the selection together with everything that depends on it.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.ui.selection.is_empty() {
            return Vec::new();
        }
        let ids: HashSet<ObjectId> = self.ui.selection.iter().copied().collect();
        let removed = self.delete(&ids);
        vec![Action::ObjectsDeleted { ids: removed }, Action::SelectionChanged]
    }

    /// Delete `ids` and their dependents. Returns the removed ids in insertion order.
    pub fn delete(&mut self, ids: &HashSet<ObjectId>) -> Vec<ObjectId> {
        let expanded = deps::cascade(&self.store, ids);
        let removed = self.store.remove(&expanded);
        let removed_set: HashSet<ObjectId> = removed.iter().copied().collect();

        self.ui.selection.retain(|id| !removed_set.contains(id));
        if self.ui.hovered.is_some_and(|id| removed_set.contains(&id)) {
            self.ui.hovered = None;
        }
        if let InputState::DraggingPoint { id, .. } = self.input {
            if removed_set.contains(&id) {
                drag::end(&mut self.input);
            }
        }
        self.construction.forget_removed(&removed_set);

        info!(requested = ids.len(), removed = removed.len(), "cascade delete");
        self.mark_dirty();
        removed
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        match button {
            Button::Primary => {}
            Button::Middle => {
                drag::end(&mut self.input);
                self.input = InputState::Panning { last_screen: screen };
                return vec![Action::SetCursor("grabbing".to_owned())];
            }
            Button::Secondary => return Vec::new(),
        }

        if self.ui.tool.is_construction() {
            let created = self.construction.on_click(self.ui.tool, screen, &mut self.store, &self.viewport, &self.config);
            self.mark_dirty();
            return created
                .into_iter()
                .filter_map(|id| self.store.get(id).map(|obj| Action::ObjectCreated { id, kind: obj.kind() }))
                .collect();
        }

        let start = drag::begin(screen, modifiers, &self.store, &self.viewport, &mut self.ui, self.config.pick_tolerance_px);
        self.input = start.session;

        let mut actions = Vec::new();
        if start.selection_changed {
            self.mark_dirty();
            actions.push(Action::SelectionChanged);
        }
        if !self.input.is_idle() {
            actions.push(Action::SetCursor("grabbing".to_owned()));
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point, _modifiers: Modifiers) -> Vec<Action> {
        if !self.input.is_idle() {
            if drag::update(&mut self.input, screen, &mut self.store, &mut self.viewport, self.config.snap) {
                self.mark_dirty();
            }
            return Vec::new();
        }

        if self.ui.tool.is_construction() {
            self.construction.on_pointer_move(self.viewport.to_model(screen), self.config.snap);
            if !self.construction.is_idle() {
                self.mark_dirty();
            }
            return Vec::new();
        }

        let hovered = pick::pick(screen, &self.store, &self.viewport, self.config.pick_tolerance_px);
        if hovered == self.ui.hovered {
            return Vec::new();
        }
        self.ui.hovered = hovered;
        self.mark_dirty();
        vec![Action::SetCursor(self.hover_cursor().to_owned())]
    }

    pub fn on_pointer_up(&mut self, _screen: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.end_session()
    }

    /// The pointer left the canvas. Treated exactly like a pointer-up.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = self.end_session();
        if self.ui.hovered.take().is_some() {
            self.mark_dirty();
        }
        self.construction.on_pointer_leave();
        actions.retain(|a| !matches!(a, Action::SetCursor(_)));
        actions
    }

    /// Zoom around the canvas center: wheel up zooms in, wheel down zooms out.
    pub fn on_wheel(&mut self, _screen: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let factor = if delta.dy < 0.0 {
            self.config.zoom_step
        } else if delta.dy > 0.0 {
            1.0 / self.config.zoom_step
        } else {
            return Vec::new();
        };
        if self.viewport.zoom(factor) {
            debug!(scale = self.viewport.scale, "zoomed");
            self.mark_dirty();
        }
        Vec::new()
    }

    pub fn on_key_down(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.is_escape() {
            if self.construction.cancel() {
                self.mark_dirty();
                return Vec::new();
            }
            if self.ui.clear_selection() {
                self.mark_dirty();
                return vec![Action::SelectionChanged];
            }
            return Vec::new();
        }
        if key.is_delete() {
            return self.delete_selected();
        }
        if key.is_enter() {
            if let Some(id) = self.construction.finish_polygon(&mut self.store) {
                self.mark_dirty();
                return vec![Action::ObjectCreated { id, kind: ObjectKind::Polygon }];
            }
        }
        Vec::new()
    }

    // --- Frame ---

    /// Whether state changed since the last [`take_dirty`](Self::take_dirty).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Build the renderer's view of the current state.
    #[must_use]
    pub fn scene(&self) -> Scene {
        render::build_scene(&self.store, &self.viewport, &self.ui, self.preview())
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<ObjectId> {
        &self.ui.selection
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    /// Look up an object by id.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GeoObject> {
        self.store.get(id)
    }

    /// Live value of a distance annotation.
    #[must_use]
    pub fn distance(&self, id: ObjectId) -> Option<f64> {
        self.store.distance(id)
    }

    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        self.construction.preview(&self.store, &self.viewport)
    }

    // --- Internals ---

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn end_session(&mut self) -> Vec<Action> {
        if !drag::end(&mut self.input) {
            return Vec::new();
        }
        self.mark_dirty();
        vec![Action::SetCursor(self.hover_cursor().to_owned())]
    }

    fn hover_cursor(&self) -> &'static str {
        if self.ui.tool.is_construction() {
            return idle_cursor(self.ui.tool);
        }
        match self.ui.hovered.and_then(|id| self.store.get(id)) {
            Some(obj) if obj.is_point() => "move",
            Some(_) => "pointer",
            None => idle_cursor(self.ui.tool),
        }
    }
}

fn idle_cursor(tool: Tool) -> &'static str {
    if tool.is_construction() { "crosshair" } else { "default" }
}

/// An engine core paired with the renderer that draws it.
pub struct Engine<R: Renderer> {
    renderer: R,
    pub core: EngineCore,
}

impl<R: Renderer> Engine<R> {
    #[must_use]
    pub fn new(renderer: R, config: EngineConfig) -> Self {
        Self { renderer, core: EngineCore::with_config(config) }
    }

    /// Frame tick: draw once if anything changed since the last tick.
    /// Returns whether a frame was drawn.
    ///
    /// # Errors
    ///
    /// Propagates the renderer's error; the state stays dirty so the next tick retries.
    pub fn frame(&mut self) -> Result<bool, R::Error> {
        if !self.core.is_dirty() {
            return Ok(false);
        }
        let scene = self.core.scene();
        self.renderer.draw(&scene)?;
        self.core.take_dirty();
        Ok(true)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
