#![allow(clippy::float_cmp)]

use super::*;
use crate::store::{ObjectKind, Shape};

// =============================================================
// Helpers
// =============================================================

fn viewport() -> Viewport {
    Viewport::new(800.0, 600.0, 50.0)
}

fn at(vp: &Viewport, x: f64, y: f64) -> Point {
    vp.to_screen(Point::new(x, y))
}

struct Bench {
    store: GeometryStore,
    vp: Viewport,
    cfg: EngineConfig,
    machine: ConstructionMachine,
}

impl Bench {
    fn new() -> Self {
        Self {
            store: GeometryStore::new(),
            vp: viewport(),
            cfg: EngineConfig::default(),
            machine: ConstructionMachine::new(),
        }
    }

    fn click(&mut self, tool: Tool, x: f64, y: f64) -> Vec<ObjectId> {
        let screen = at(&self.vp, x, y);
        self.machine.on_click(tool, screen, &mut self.store, &self.vp, &self.cfg)
    }
}

// =============================================================
// resolve_point_or_create
// =============================================================

#[test]
fn resolve_reuses_point_under_pointer() {
    let vp = viewport();
    let mut store = GeometryStore::new();
    let a = store.add_point(1.0, 1.0, None, None);
    let screen = Point::new(at(&vp, 1.0, 1.0).x + 3.0, at(&vp, 1.0, 1.0).y);
    let r = resolve_point_or_create(&mut store, &vp, screen, SnapPolicy::Off, 10.0);
    assert_eq!(r, PointRef { id: a, created: false });
    assert_eq!(store.len(), 1);
}

#[test]
fn resolve_creates_point_on_empty_canvas() {
    let vp = viewport();
    let mut store = GeometryStore::new();
    let r = resolve_point_or_create(&mut store, &vp, at(&vp, 2.0, -1.0), SnapPolicy::Off, 10.0);
    assert!(r.created);
    let p = store.point_position(r.id).unwrap();
    assert!((p.x - 2.0).abs() < 1e-9 && (p.y + 1.0).abs() < 1e-9);
}

#[test]
fn resolve_applies_snap_to_new_points() {
    let vp = viewport();
    let mut store = GeometryStore::new();
    let r = resolve_point_or_create(&mut store, &vp, at(&vp, 1.2, 0.8), SnapPolicy::grid(), 10.0);
    assert_eq!(store.point_position(r.id), Some(Point::new(1.0, 1.0)));
}

#[test]
fn resolve_reuses_point_at_snapped_position() {
    let vp = viewport();
    let mut store = GeometryStore::new();
    let a = store.add_point(0.0, 0.0, None, None);
    // about 15px from `a`, outside the pick tolerance, but snaps onto it
    let r = resolve_point_or_create(&mut store, &vp, at(&vp, 0.22, 0.22), SnapPolicy::grid(), 10.0);
    assert_eq!(r, PointRef { id: a, created: false });
    assert_eq!(store.len(), 1);
}

#[test]
fn resolve_without_snap_creates_near_point() {
    let vp = viewport();
    let mut store = GeometryStore::new();
    store.add_point(0.0, 0.0, None, None);
    let r = resolve_point_or_create(&mut store, &vp, at(&vp, 0.22, 0.22), SnapPolicy::Off, 10.0);
    assert!(r.created);
    assert_eq!(store.len(), 2);
}

#[test]
fn resolve_ignores_lines_under_pointer() {
    let vp = viewport();
    let mut store = GeometryStore::new();
    let a = store.add_point(-3.0, 0.0, None, None);
    let b = store.add_point(3.0, 0.0, None, None);
    store.add_line(a, b).unwrap();
    let r = resolve_point_or_create(&mut store, &vp, at(&vp, 0.0, 0.0), SnapPolicy::Off, 10.0);
    assert!(r.created);
}

// =============================================================
// Point tool
// =============================================================

#[test]
fn point_tool_places_one_point_per_click() {
    let mut bench = Bench::new();
    assert_eq!(bench.click(Tool::Point, 0.0, 0.0).len(), 1);
    assert_eq!(bench.click(Tool::Point, 0.0, 0.0).len(), 1);
    assert_eq!(bench.store.count(ObjectKind::Point), 2);
    assert!(bench.machine.is_idle());
}

#[test]
fn select_tool_click_does_nothing() {
    let mut bench = Bench::new();
    assert!(bench.click(Tool::Select, 0.0, 0.0).is_empty());
    assert!(bench.store.is_empty());
}

// =============================================================
// Two-phase tools
// =============================================================

#[test]
fn first_click_enters_awaiting_second_point() {
    let mut bench = Bench::new();
    let created = bench.click(Tool::Line, 0.0, 0.0);
    assert_eq!(created.len(), 1);
    assert_eq!(
        bench.machine.state(),
        &ConstructionState::AwaitingSecondPoint { tool: Tool::Line, anchor: created[0] }
    );
}

#[test]
fn segment_from_two_empty_clicks() {
    let mut bench = Bench::new();
    let first = bench.click(Tool::Segment, 0.0, 0.0);
    let second = bench.click(Tool::Segment, 2.0, 0.0);
    assert_eq!(second.len(), 2);
    assert_eq!(
        bench.store.get(second[1]).unwrap().shape,
        Shape::Segment { p1: first[0], p2: second[0] }
    );
    assert!(bench.machine.is_idle());
}

#[test]
fn segment_reuses_existing_points() {
    let mut bench = Bench::new();
    let a = bench.store.add_point(0.0, 0.0, None, None);
    let b = bench.store.add_point(2.0, 0.0, None, None);
    assert!(bench.click(Tool::Segment, 0.0, 0.0).is_empty());
    let created = bench.click(Tool::Segment, 2.0, 0.0);
    assert_eq!(created.len(), 1);
    assert_eq!(bench.store.get(created[0]).unwrap().shape, Shape::Segment { p1: a, p2: b });
}

#[test]
fn chained_segments_start_fresh_anchor() {
    let mut bench = Bench::new();
    bench.click(Tool::Segment, 0.0, 0.0);
    bench.click(Tool::Segment, 2.0, 0.0);
    let third = bench.click(Tool::Segment, 4.0, 4.0);
    assert_eq!(third.len(), 1, "new anchor point");
    bench.click(Tool::Segment, 6.0, 4.0);
    assert_eq!(bench.store.count(ObjectKind::Point), 4);
    assert_eq!(bench.store.count(ObjectKind::Segment), 2);
}

#[test]
fn chained_segment_reuses_endpoint_when_clicked() {
    let mut bench = Bench::new();
    bench.click(Tool::Segment, 0.0, 0.0);
    let end = bench.click(Tool::Segment, 2.0, 0.0)[0];
    assert!(bench.click(Tool::Segment, 2.0, 0.0).is_empty());
    assert_eq!(
        bench.machine.state(),
        &ConstructionState::AwaitingSecondPoint { tool: Tool::Segment, anchor: end }
    );
}

#[test]
fn same_point_twice_is_a_silent_no_op() {
    let mut bench = Bench::new();
    bench.click(Tool::Line, 1.0, 1.0);
    let created = bench.click(Tool::Line, 1.0, 1.0);
    assert!(created.is_empty());
    assert_eq!(bench.store.count(ObjectKind::Line), 0);
    assert_eq!(bench.store.count(ObjectKind::Point), 1);
    assert!(bench.machine.is_idle());
}

#[test]
fn snapped_second_click_onto_anchor_builds_nothing() {
    let mut bench = Bench::new();
    bench.vp = Viewport::new(800.0, 600.0, 40.0);
    bench.cfg.snap = SnapPolicy::grid();
    bench.click(Tool::Segment, 0.0, 0.0);
    assert!(bench.click(Tool::Segment, 0.2, 0.2).is_empty());
    assert_eq!(bench.store.count(ObjectKind::Point), 1);
    assert_eq!(bench.store.count(ObjectKind::Segment), 0);
    assert!(bench.machine.is_idle());
}

#[test]
fn circle_radius_is_distance_at_click_time() {
    let mut bench = Bench::new();
    let center = bench.click(Tool::Circle, 0.0, 0.0)[0];
    let created = bench.click(Tool::Circle, 3.0, 4.0);
    let rim = created[0];
    match bench.store.get(created[1]).unwrap().shape {
        Shape::Circle { center: c, radius } => {
            assert_eq!(c, center);
            assert!((radius - 5.0).abs() < 1e-9);
        }
        ref other => panic!("expected circle, got {other:?}"),
    }

    // Dragging the rim point later does not resize the circle.
    bench.store.move_point(rim, Point::new(10.0, 0.0));
    let Shape::Circle { radius, .. } = bench.store.get(created[1]).unwrap().shape else {
        panic!("expected circle");
    };
    assert!((radius - 5.0).abs() < 1e-9);
}

#[test]
fn distance_tool_creates_annotation() {
    let mut bench = Bench::new();
    bench.click(Tool::Distance, 0.0, 0.0);
    let created = bench.click(Tool::Distance, 3.0, 4.0);
    let d = created[1];
    assert_eq!(bench.store.get(d).unwrap().kind(), ObjectKind::Distance);
    assert!((bench.store.distance(d).unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn deleted_anchor_fails_softly() {
    let mut bench = Bench::new();
    let anchor = bench.click(Tool::Segment, 0.0, 0.0)[0];
    bench.store.remove(&HashSet::from([anchor]));
    let created = bench.click(Tool::Segment, 2.0, 0.0);
    assert_eq!(created.len(), 1, "only the second point");
    assert_eq!(bench.store.count(ObjectKind::Segment), 0);
    assert!(bench.machine.is_idle());
}

// =============================================================
// Cancel / reset / forget
// =============================================================

#[test]
fn cancel_discards_partial_state() {
    let mut bench = Bench::new();
    bench.click(Tool::Circle, 0.0, 0.0);
    assert!(bench.machine.cancel());
    assert!(bench.machine.is_idle());
    assert!(!bench.machine.cancel());
    assert_eq!(bench.store.count(ObjectKind::Point), 1);
    assert_eq!(bench.store.count(ObjectKind::Circle), 0);
}

#[test]
fn reset_clears_preview() {
    let mut bench = Bench::new();
    bench.click(Tool::Segment, 0.0, 0.0);
    bench.machine.reset();
    bench.machine.on_pointer_move(Point::new(1.0, 1.0), SnapPolicy::Off);
    assert!(bench.machine.preview(&bench.store, &bench.vp).is_none());
}

#[test]
fn forget_removed_drops_stale_anchor() {
    let mut bench = Bench::new();
    let anchor = bench.click(Tool::Line, 0.0, 0.0)[0];
    bench.machine.forget_removed(&HashSet::from([anchor]));
    assert!(bench.machine.is_idle());
}

#[test]
fn forget_removed_keeps_unrelated_anchor() {
    let mut bench = Bench::new();
    let other = bench.store.add_point(9.0, 9.0, None, None);
    bench.click(Tool::Line, 0.0, 0.0);
    bench.machine.forget_removed(&HashSet::from([other]));
    assert!(!bench.machine.is_idle());
}

// =============================================================
// Preview
// =============================================================

#[test]
fn preview_follows_pointer() {
    let mut bench = Bench::new();
    bench.click(Tool::Segment, 0.0, 0.0);
    bench.machine.on_pointer_move(Point::new(2.0, 1.0), SnapPolicy::Off);
    let preview = bench.machine.preview(&bench.store, &bench.vp).unwrap();
    assert_eq!(preview.tool, Tool::Segment);
    match preview.geometry {
        Geometry::Segment { a, b } => {
            assert!(a.distance(Point::new(0.0, 0.0)) < 1e-9);
            assert_eq!(b, Point::new(2.0, 1.0));
        }
        other => panic!("expected segment preview, got {other:?}"),
    }
}

#[test]
fn circle_preview_uses_final_radius_formula() {
    let mut bench = Bench::new();
    bench.click(Tool::Circle, 0.0, 0.0);
    bench.machine.on_pointer_move(Point::new(3.0, 4.0), SnapPolicy::Off);
    let Some(Preview { geometry: Geometry::Circle { radius, .. }, .. }) = bench.machine.preview(&bench.store, &bench.vp) else {
        panic!("expected circle preview");
    };
    assert!((radius - 5.0).abs() < 1e-9);
}

#[test]
fn preview_snaps_cursor() {
    let mut bench = Bench::new();
    bench.click(Tool::Distance, 0.0, 0.0);
    bench.machine.on_pointer_move(Point::new(2.9, 4.1), SnapPolicy::grid());
    let Some(Preview { geometry: Geometry::Distance { value, text, .. }, .. }) =
        bench.machine.preview(&bench.store, &bench.vp)
    else {
        panic!("expected distance preview");
    };
    assert!((value - 5.0).abs() < 1e-9);
    assert_eq!(text, "5.00");
}

#[test]
fn idle_has_no_preview() {
    let mut bench = Bench::new();
    bench.machine.on_pointer_move(Point::new(1.0, 1.0), SnapPolicy::Off);
    assert!(bench.machine.preview(&bench.store, &bench.vp).is_none());
}

#[test]
fn pointer_leave_hides_preview() {
    let mut bench = Bench::new();
    bench.click(Tool::Line, 0.0, 0.0);
    bench.machine.on_pointer_leave();
    assert!(bench.machine.preview(&bench.store, &bench.vp).is_none());
    assert!(!bench.machine.is_idle());
}

// =============================================================
// Polygon tool
// =============================================================

#[test]
fn polygon_closes_on_first_vertex() {
    let mut bench = Bench::new();
    let a = bench.click(Tool::Polygon, 0.0, 0.0)[0];
    let b = bench.click(Tool::Polygon, 2.0, 0.0)[0];
    let c = bench.click(Tool::Polygon, 0.0, 2.0)[0];
    let created = bench.click(Tool::Polygon, 0.0, 0.0);
    assert_eq!(created.len(), 1);
    match &bench.store.get(created[0]).unwrap().shape {
        Shape::Polygon { points, .. } => assert_eq!(points, &vec![a, b, c]),
        other => panic!("expected polygon, got {other:?}"),
    }
    assert!(bench.machine.is_idle());
}

#[test]
fn polygon_ignores_repeated_last_vertex() {
    let mut bench = Bench::new();
    let a = bench.click(Tool::Polygon, 0.0, 0.0)[0];
    bench.click(Tool::Polygon, 0.0, 0.0);
    assert_eq!(bench.machine.state(), &ConstructionState::CollectingVertices { vertices: vec![a] });
}

#[test]
fn polygon_ignores_first_vertex_before_three() {
    let mut bench = Bench::new();
    let a = bench.click(Tool::Polygon, 0.0, 0.0)[0];
    let b = bench.click(Tool::Polygon, 2.0, 0.0)[0];
    assert!(bench.click(Tool::Polygon, 0.0, 0.0).is_empty());
    assert_eq!(bench.machine.state(), &ConstructionState::CollectingVertices { vertices: vec![a, b] });
}

#[test]
fn finish_polygon_needs_three_vertices() {
    let mut bench = Bench::new();
    bench.click(Tool::Polygon, 0.0, 0.0);
    bench.click(Tool::Polygon, 2.0, 0.0);
    assert!(bench.machine.finish_polygon(&mut bench.store).is_none());
    bench.click(Tool::Polygon, 2.0, 2.0);
    let id = bench.machine.finish_polygon(&mut bench.store).unwrap();
    assert_eq!(bench.store.get(id).unwrap().kind(), ObjectKind::Polygon);
}

#[test]
fn polygon_preview_includes_cursor() {
    let mut bench = Bench::new();
    bench.click(Tool::Polygon, 0.0, 0.0);
    bench.click(Tool::Polygon, 2.0, 0.0);
    bench.machine.on_pointer_move(Point::new(1.0, 3.0), SnapPolicy::Off);
    let Some(Preview { geometry: Geometry::Polygon { vertices, .. }, .. }) = bench.machine.preview(&bench.store, &bench.vp) else {
        panic!("expected polygon preview");
    };
    assert_eq!(vertices.len(), 3);
    assert_eq!(vertices[2], Point::new(1.0, 3.0));
}
