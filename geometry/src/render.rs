//! Scene description: the read-only view of engine state handed to the renderer.
//!
//! The engine never draws. Every frame the host asks for a [`Scene`], which
//! resolves each visible object's point references into model coordinates,
//! tags it with selection/hover state, and carries the viewport and any
//! in-progress construction preview. A [`Renderer`] turns that into pixels.
//!
//! Objects whose references no longer resolve are left out of the scene
//! instead of failing the frame.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::construct::Preview;
use crate::input::UiState;
use crate::store::{GeoObject, GeometryStore, ObjectId, ObjectKind, Shape};
use crate::viewport::{Point, Viewport};

/// Resolved model-space geometry of one drawable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Geometry {
    Point {
        at: Point,
    },
    /// Unbounded line through `a` and `b`; `ends` reach past the visible area.
    Line {
        a: Point,
        b: Point,
        ends: [Point; 2],
    },
    Segment {
        a: Point,
        b: Point,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Polygon {
        vertices: Vec<Point>,
        fill: String,
    },
    /// Distance readout; `text` is the value with two decimals.
    Distance {
        a: Point,
        b: Point,
        value: f64,
        text: String,
    },
}

impl Geometry {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Point { .. } => ObjectKind::Point,
            Self::Line { .. } => ObjectKind::Line,
            Self::Segment { .. } => ObjectKind::Segment,
            Self::Circle { .. } => ObjectKind::Circle,
            Self::Polygon { .. } => ObjectKind::Polygon,
            Self::Distance { .. } => ObjectKind::Distance,
        }
    }

    pub(crate) fn line(a: Point, b: Point, viewport: &Viewport) -> Self {
        Self::Line { a, b, ends: extend_to_view(a, b, viewport) }
    }

    pub(crate) fn distance(a: Point, b: Point) -> Self {
        let value = a.distance(b);
        Self::Distance { a, b, value, text: format!("{value:.2}") }
    }
}

/// One visible object with its resolved geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneItem {
    pub id: ObjectId,
    pub label: String,
    pub color: String,
    pub selected: bool,
    pub hovered: bool,
    #[serde(flatten)]
    pub geometry: Geometry,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub viewport: Viewport,
    /// Visible objects in insertion order (first drawn first).
    pub items: Vec<SceneItem>,
    pub selection: Vec<ObjectId>,
    pub hovered: Option<ObjectId>,
    /// Dashed preview of the construction in progress.
    pub preview: Option<Preview>,
}

impl Scene {
    /// Look up a drawn item by object id.
    #[must_use]
    pub fn item(&self, id: ObjectId) -> Option<&SceneItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// A consumer that draws scenes. Implementations must not mutate engine state.
pub trait Renderer {
    type Error;

    /// Draw one frame.
    ///
    /// # Errors
    ///
    /// Whatever the drawing backend reports.
    fn draw(&mut self, scene: &Scene) -> Result<(), Self::Error>;
}

/// Build the scene for the current state.
#[must_use]
pub fn build_scene(store: &GeometryStore, viewport: &Viewport, ui: &UiState, preview: Option<Preview>) -> Scene {
    let items = store
        .visible()
        .filter_map(|obj| {
            let geometry = resolve(obj, store, viewport)?;
            Some(SceneItem {
                id: obj.id,
                label: obj.label.clone(),
                color: obj.color.clone(),
                selected: ui.selection.contains(&obj.id),
                hovered: ui.hovered == Some(obj.id),
                geometry,
            })
        })
        .collect();

    Scene {
        viewport: *viewport,
        items,
        selection: ui.selection.iter().copied().collect(),
        hovered: ui.hovered,
        preview,
    }
}

/// Resolve an object's references into model-space geometry.
///
/// Returns `None` when any referenced point is missing.
#[must_use]
pub fn resolve(obj: &GeoObject, store: &GeometryStore, viewport: &Viewport) -> Option<Geometry> {
    let geometry = match &obj.shape {
        Shape::Point { x, y } => Geometry::Point { at: Point::new(*x, *y) },
        Shape::Line { p1, p2 } => Geometry::line(store.point_position(*p1)?, store.point_position(*p2)?, viewport),
        Shape::Segment { p1, p2 } => Geometry::Segment { a: store.point_position(*p1)?, b: store.point_position(*p2)? },
        Shape::Circle { center, radius } => Geometry::Circle { center: store.point_position(*center)?, radius: *radius },
        Shape::Polygon { points, fill } => Geometry::Polygon {
            vertices: points
                .iter()
                .map(|id| store.point_position(*id))
                .collect::<Option<Vec<_>>>()?,
            fill: fill.clone(),
        },
        Shape::Distance { p1, p2 } => Geometry::distance(store.point_position(*p1)?, store.point_position(*p2)?),
    };
    Some(geometry)
}

/// Two points on the line through `a` and `b` that lie outside the visible area.
fn extend_to_view(a: Point, b: Point, viewport: &Viewport) -> [Point; 2] {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len <= 0.0 {
        return [a, a];
    }
    let (min, max) = viewport.visible_bounds();
    let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    let reach = a.distance(center) + min.distance(max) + 1.0;
    let (ux, uy) = (dx / len, dy / len);
    [
        Point::new(a.x - ux * reach, a.y - uy * reach),
        Point::new(a.x + ux * reach, a.y + uy * reach),
    ]
}
