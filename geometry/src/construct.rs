//! Construction tools: the multi-step workflow that turns clicks into objects.
//!
//! DESIGN
//! ======
//! The point tool is stateless: one click, one point. Line, segment, circle
//! and distance are two-phase: the first click captures an anchor point and
//! moves the machine to `AwaitingSecondPoint`; the second click resolves the
//! other point, emits the object and returns to `Idle` in the same tool so
//! constructions can be chained. The polygon tool collects vertices until the
//! first vertex is clicked again (or Enter is pressed).
//!
//! Every click that needs a point reference goes through
//! [`resolve_point_or_create`]: an existing point under the pointer is reused,
//! otherwise a new point is created at the snapped click position.
//!
//! Escape and tool switches discard the partial state. Points created by
//! earlier clicks of the aborted construction stay in the store.

#[cfg(test)]
#[path = "construct_test.rs"]
mod construct_test;

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::{EngineConfig, SnapPolicy};
use crate::consts::{MIN_POLYGON_VERTICES, POLYGON_FILL};
use crate::input::Tool;
use crate::pick;
use crate::render::Geometry;
use crate::store::{GeometryStore, ObjectId, StoreError};
use crate::viewport::{Point, Viewport};

/// Where the active tool is in its workflow.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConstructionState {
    /// Waiting for the first click.
    #[default]
    Idle,
    /// A two-phase tool has its anchor and waits for the second point.
    AwaitingSecondPoint { tool: Tool, anchor: ObjectId },
    /// The polygon tool is collecting vertices.
    CollectingVertices { vertices: Vec<ObjectId> },
}

/// Live, uncommitted geometry of the construction in progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub tool: Tool,
    pub geometry: Geometry,
}

/// A point reference produced by [`resolve_point_or_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRef {
    pub id: ObjectId,
    /// Whether the point was created by this click.
    pub created: bool,
}

/// Reuse the point under `screen`, or create one at the snapped model position.
///
/// With snapping on, a point already sitting at the snapped position is reused
/// as well, so two clicks snapping to the same grid node share one point.
pub fn resolve_point_or_create(
    store: &mut GeometryStore,
    viewport: &Viewport,
    screen: Point,
    snap: SnapPolicy,
    tolerance_px: f64,
) -> PointRef {
    if let Some(id) = pick::pick_point(screen, store, viewport, tolerance_px) {
        return PointRef { id, created: false };
    }
    let at = snap.apply(viewport.to_model(screen));
    if snap.is_on() {
        if let Some(id) = pick::pick_point(viewport.to_screen(at), store, viewport, tolerance_px) {
            return PointRef { id, created: false };
        }
    }
    PointRef { id: store.add_point(at.x, at.y, None, None), created: true }
}

/// State machine driving the construction tools.
#[derive(Debug, Clone, Default)]
pub struct ConstructionMachine {
    state: ConstructionState,
    /// Last snapped model position of the pointer, for the preview.
    cursor: Option<Point>,
}

impl ConstructionMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &ConstructionState {
        &self.state
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, ConstructionState::Idle)
    }

    /// Handle a primary click with `tool`. Returns every object created, in
    /// creation order (implicit points first, then the finished object).
    pub fn on_click(
        &mut self,
        tool: Tool,
        screen: Point,
        store: &mut GeometryStore,
        viewport: &Viewport,
        config: &EngineConfig,
    ) -> Vec<ObjectId> {
        self.cursor = Some(config.snap.apply(viewport.to_model(screen)));
        match tool {
            Tool::Point => {
                let at = config.snap.apply(viewport.to_model(screen));
                vec![store.add_point(at.x, at.y, None, None)]
            }
            Tool::Polygon => self.polygon_click(screen, store, viewport, config),
            _ if tool.is_two_phase() => self.two_phase_click(tool, screen, store, viewport, config),
            _ => Vec::new(),
        }
    }

    /// Track the pointer for the live preview.
    pub fn on_pointer_move(&mut self, model: Point, snap: SnapPolicy) {
        self.cursor = Some(snap.apply(model));
    }

    /// Hide the preview until the pointer comes back.
    pub fn on_pointer_leave(&mut self) {
        self.cursor = None;
    }

    /// Close the polygon under construction. Returns the polygon id, or `None`
    /// when no polygon is in progress or it has too few vertices.
    pub fn finish_polygon(&mut self, store: &mut GeometryStore) -> Option<ObjectId> {
        let ConstructionState::CollectingVertices { vertices } = &self.state else {
            return None;
        };
        if vertices.len() < MIN_POLYGON_VERTICES {
            return None;
        }
        let vertices = vertices.clone();
        self.state = ConstructionState::Idle;
        emit(store.add_polygon(&vertices), Tool::Polygon)
    }

    /// Discard any partial construction (Escape). Returns whether anything was discarded.
    pub fn cancel(&mut self) -> bool {
        let discarded = !self.is_idle();
        if discarded {
            debug!(state = ?self.state, "construction cancelled");
        }
        self.state = ConstructionState::Idle;
        discarded
    }

    /// Drop the partial construction if it refers to any of the removed ids.
    pub fn forget_removed(&mut self, removed: &HashSet<ObjectId>) {
        let stale = match &self.state {
            ConstructionState::Idle => false,
            ConstructionState::AwaitingSecondPoint { anchor, .. } => removed.contains(anchor),
            ConstructionState::CollectingVertices { vertices } => vertices.iter().any(|v| removed.contains(v)),
        };
        if stale {
            self.cancel();
        }
    }

    /// Forget partial state and the pointer (tool switch).
    pub fn reset(&mut self) {
        self.cancel();
        self.cursor = None;
    }

    /// Preview of the object the next click would complete, if any.
    #[must_use]
    pub fn preview(&self, store: &GeometryStore, viewport: &Viewport) -> Option<Preview> {
        let cursor = self.cursor?;
        match &self.state {
            ConstructionState::Idle => None,
            ConstructionState::AwaitingSecondPoint { tool, anchor } => {
                let a = store.point_position(*anchor)?;
                let geometry = match tool {
                    Tool::Line => Geometry::line(a, cursor, viewport),
                    Tool::Segment => Geometry::Segment { a, b: cursor },
                    Tool::Circle => Geometry::Circle { center: a, radius: a.distance(cursor) },
                    Tool::Distance => Geometry::distance(a, cursor),
                    Tool::Select | Tool::Point | Tool::Polygon => return None,
                };
                Some(Preview { tool: *tool, geometry })
            }
            ConstructionState::CollectingVertices { vertices } => {
                let mut points = vertices
                    .iter()
                    .map(|id| store.point_position(*id))
                    .collect::<Option<Vec<_>>>()?;
                points.push(cursor);
                Some(Preview {
                    tool: Tool::Polygon,
                    geometry: Geometry::Polygon { vertices: points, fill: POLYGON_FILL.to_owned() },
                })
            }
        }
    }

    fn two_phase_click(
        &mut self,
        tool: Tool,
        screen: Point,
        store: &mut GeometryStore,
        viewport: &Viewport,
        config: &EngineConfig,
    ) -> Vec<ObjectId> {
        let mut created = Vec::new();
        let point = resolve_point_or_create(store, viewport, screen, config.snap, config.pick_tolerance_px);
        if point.created {
            created.push(point.id);
        }

        match std::mem::take(&mut self.state) {
            ConstructionState::AwaitingSecondPoint { tool: pending, anchor } if pending == tool => {
                created.extend(emit(complete(tool, anchor, point.id, store), tool));
            }
            _ => {
                debug!(?tool, anchor = %point.id, "awaiting second point");
                self.state = ConstructionState::AwaitingSecondPoint { tool, anchor: point.id };
            }
        }
        created
    }

    fn polygon_click(
        &mut self,
        screen: Point,
        store: &mut GeometryStore,
        viewport: &Viewport,
        config: &EngineConfig,
    ) -> Vec<ObjectId> {
        let mut created = Vec::new();
        let point = resolve_point_or_create(store, viewport, screen, config.snap, config.pick_tolerance_px);
        if point.created {
            created.push(point.id);
        }

        if !matches!(self.state, ConstructionState::CollectingVertices { .. }) {
            debug!(first = %point.id, "collecting polygon vertices");
            self.state = ConstructionState::CollectingVertices { vertices: vec![point.id] };
            return created;
        }

        let mut closes = false;
        if let ConstructionState::CollectingVertices { vertices } = &mut self.state {
            if vertices.last() == Some(&point.id) {
                return created;
            }
            if vertices.first() == Some(&point.id) {
                if vertices.len() < MIN_POLYGON_VERTICES {
                    return created;
                }
                closes = true;
            } else {
                vertices.push(point.id);
            }
        }
        if closes {
            created.extend(self.finish_polygon(store));
        }
        created
    }
}

/// Build the finished two-phase object from its two point references.
fn complete(tool: Tool, anchor: ObjectId, second: ObjectId, store: &mut GeometryStore) -> Result<ObjectId, StoreError> {
    match tool {
        Tool::Line => store.add_line(anchor, second),
        Tool::Segment => store.add_segment(anchor, second),
        Tool::Distance => store.add_distance(anchor, second),
        Tool::Circle => {
            if anchor == second {
                return Err(StoreError::SamePoint(anchor));
            }
            let center = store.point_position(anchor).ok_or(StoreError::MissingPoint(anchor))?;
            let rim = store.point_position(second).ok_or(StoreError::MissingPoint(second))?;
            store.add_circle(anchor, center.distance(rim))
        }
        Tool::Select | Tool::Point | Tool::Polygon => Err(StoreError::MissingPoint(anchor)),
    }
}

/// Log the outcome of a construction; failures are silent no-ops for the user.
fn emit(result: Result<ObjectId, StoreError>, tool: Tool) -> Option<ObjectId> {
    match result {
        Ok(id) => {
            debug!(?tool, %id, "construction completed");
            Some(id)
        }
        Err(error) => {
            debug!(?tool, %error, "construction discarded");
            None
        }
    }
}
