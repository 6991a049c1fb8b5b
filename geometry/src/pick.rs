#[cfg(test)]
#[path = "pick_test.rs"]
mod pick_test;

use crate::store::{GeoObject, GeometryStore, ObjectId, Shape};
use crate::viewport::{Point, Viewport};

/// Return the topmost visible object under `screen`, if any.
///
/// Objects are scanned in reverse insertion order and the first match wins;
/// there is no priority by kind. Points match when their projected pixel is
/// closer than `tolerance_px`; lines, segments and circles compare the model
/// distance against `tolerance_px / scale`. Polygons and distance annotations
/// never match. Objects whose points are missing are skipped.
#[must_use]
pub fn pick(screen: Point, store: &GeometryStore, viewport: &Viewport, tolerance_px: f64) -> Option<ObjectId> {
    pick_where(screen, store, viewport, tolerance_px, |_| true)
}

/// Like [`pick`], restricted to points.
#[must_use]
pub fn pick_point(screen: Point, store: &GeometryStore, viewport: &Viewport, tolerance_px: f64) -> Option<ObjectId> {
    pick_where(screen, store, viewport, tolerance_px, GeoObject::is_point)
}

fn pick_where<F>(screen: Point, store: &GeometryStore, viewport: &Viewport, tolerance_px: f64, accept: F) -> Option<ObjectId>
where
    F: Fn(&GeoObject) -> bool,
{
    let probe = Probe {
        screen,
        model: viewport.to_model(screen),
        tolerance_px,
        tolerance_model: viewport.screen_dist_to_model(tolerance_px),
    };
    store
        .visible()
        .rev()
        .filter(|obj| accept(obj))
        .find(|obj| probe.hits(obj, store, viewport))
        .map(|obj| obj.id)
}

/// Pointer position in both spaces plus the tolerance in both units.
struct Probe {
    screen: Point,
    model: Point,
    tolerance_px: f64,
    tolerance_model: f64,
}

impl Probe {
    fn hits(&self, obj: &GeoObject, store: &GeometryStore, viewport: &Viewport) -> bool {
        match &obj.shape {
            Shape::Point { x, y } => viewport.to_screen(Point::new(*x, *y)).distance(self.screen) < self.tolerance_px,
            Shape::Line { p1, p2 } => match (store.point_position(*p1), store.point_position(*p2)) {
                (Some(a), Some(b)) => dist_to_line(self.model, a, b) < self.tolerance_model,
                _ => false,
            },
            Shape::Segment { p1, p2 } => match (store.point_position(*p1), store.point_position(*p2)) {
                (Some(a), Some(b)) => dist_to_segment(self.model, a, b) < self.tolerance_model,
                _ => false,
            },
            Shape::Circle { center, radius } => store
                .point_position(*center)
                .is_some_and(|c| (self.model.distance(c) - radius).abs() < self.tolerance_model),
            Shape::Polygon { .. } | Shape::Distance { .. } => false,
        }
    }
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the distance to `a` when the two points coincide.
#[must_use]
pub fn dist_to_line(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len <= 0.0 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

/// Distance from `p` to the segment `[a, b]`, using the foot of the
/// perpendicular clamped to `t ∈ [0, 1]`.
#[must_use]
pub fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
