use super::*;
use geometry::store::ObjectKind;

fn run(core: &mut EngineCore, script: &str) -> Vec<Action> {
    script
        .lines()
        .filter_map(|line| parse_line(line).unwrap())
        .flat_map(|event| apply(core, &event))
        .collect()
}

fn core() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 600.0);
    core
}

// =============================================================
// parse_line
// =============================================================

#[test]
fn blank_and_comment_lines_are_skipped() {
    assert_eq!(parse_line("").unwrap(), None);
    assert_eq!(parse_line("   ").unwrap(), None);
    assert_eq!(parse_line("# set up a triangle").unwrap(), None);
}

#[test]
fn pointer_down_defaults_button_and_modifiers() {
    let event = parse_line(r#"{"event":"pointer_down","x":10,"y":20}"#).unwrap();
    assert_eq!(
        event,
        Some(ScriptEvent::PointerDown { x: 10.0, y: 20.0, button: Button::Primary, modifiers: Modifiers::default() })
    );
}

#[test]
fn modifiers_and_button_parse() {
    let event = parse_line(r#"{"event":"pointer_down","x":1,"y":2,"button":"middle","modifiers":{"shift":true}}"#).unwrap();
    let Some(ScriptEvent::PointerDown { button, modifiers, .. }) = event else {
        panic!("expected pointer_down");
    };
    assert_eq!(button, Button::Middle);
    assert!(modifiers.shift && !modifiers.ctrl);
}

#[test]
fn tool_key_and_snap_events_parse() {
    assert_eq!(parse_line(r#"{"event":"tool","tool":"circle"}"#).unwrap(), Some(ScriptEvent::Tool { tool: Tool::Circle }));
    assert_eq!(
        parse_line(r#"{"event":"key","key":"Escape"}"#).unwrap(),
        Some(ScriptEvent::Key { key: Key("Escape".into()), modifiers: Modifiers::default() })
    );
    assert_eq!(parse_line(r#"{"event":"snap"}"#).unwrap(), Some(ScriptEvent::Snap { step: None }));
    assert_eq!(parse_line(r#"{"event":"pointer_leave"}"#).unwrap(), Some(ScriptEvent::PointerLeave));
}

#[test]
fn unknown_event_is_an_error() {
    assert!(parse_line(r#"{"event":"teleport"}"#).is_err());
    assert!(parse_line("not json").is_err());
}

// =============================================================
// apply
// =============================================================

#[test]
fn segment_script_builds_two_points_and_a_segment() {
    let mut core = core();
    let actions = run(
        &mut core,
        r#"
        # two empty clicks
        {"event":"tool","tool":"segment"}
        {"event":"pointer_down","x":400,"y":300}
        {"event":"pointer_down","x":500,"y":300}
        "#,
    );
    let created = actions.iter().filter(|a| matches!(a, Action::ObjectCreated { .. })).count();
    assert_eq!(created, 3);
    assert_eq!(core.store.count(ObjectKind::Point), 2);
    assert_eq!(core.store.count(ObjectKind::Segment), 1);
}

#[test]
fn circle_escape_script_leaves_one_point() {
    let mut core = core();
    run(
        &mut core,
        r#"
        {"event":"tool","tool":"circle"}
        {"event":"pointer_down","x":400,"y":300}
        {"event":"key","key":"Escape"}
        {"event":"tool","tool":"select"}
        "#,
    );
    assert_eq!(core.store.count(ObjectKind::Point), 1);
    assert_eq!(core.store.count(ObjectKind::Circle), 0);
}

#[test]
fn delete_event_cascades() {
    let mut core = core();
    let a = core.store.add_point(0.0, 0.0, None, None);
    let b = core.store.add_point(1.0, 0.0, None, None);
    let s = core.store.add_segment(a, b).unwrap();
    let actions = apply(&mut core, &ScriptEvent::Delete { ids: vec![a] });
    assert_eq!(actions, vec![Action::ObjectsDeleted { ids: vec![a, s] }]);
    assert!(apply(&mut core, &ScriptEvent::Delete { ids: vec![a] }).is_empty());
}

#[test]
fn snap_event_toggles_grid() {
    let mut core = core();
    apply(&mut core, &ScriptEvent::Snap { step: Some(1.0) });
    assert_eq!(core.config.snap, SnapPolicy::Grid { step: 1.0 });
    apply(&mut core, &ScriptEvent::Snap { step: None });
    assert_eq!(core.config.snap, SnapPolicy::Off);
}

#[test]
fn resize_and_wheel_update_viewport() {
    let mut core = core();
    apply(&mut core, &ScriptEvent::Resize { width: 1024.0, height: 768.0 });
    assert!((core.viewport().width - 1024.0).abs() < 1e-9);
    let before = core.viewport().scale;
    apply(&mut core, &ScriptEvent::Wheel { x: 0.0, y: 0.0, dx: 0.0, dy: -1.0 });
    assert!(core.viewport().scale > before);
}

#[test]
fn toggle_visibility_hides_object() {
    let mut core = core();
    let a = core.store.add_point(0.0, 0.0, None, None);
    apply(&mut core, &ScriptEvent::ToggleVisibility { id: a });
    assert!(core.scene().item(a).is_none());
}
