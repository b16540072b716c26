//! Integration tests: undo/redo through pointer gestures (lm-editor).
//!
//! Drives an `EditorSession` with raw input events and verifies that every
//! structural commit is undoable back to the exact pre-commit scene.

use lm_core::model::*;
use lm_editor::{ArmedTool, EditorSession, InputEvent, Modifiers};
use pretty_assertions::assert_eq;

const CMD: Modifiers = Modifiers {
    meta: true,
    ..Modifiers::NONE
};
const CTRL: Modifiers = Modifiers {
    ctrl: true,
    ..Modifiers::NONE
};

/// 1000×1000 container with a square image: 1 percent = 10 px.
fn make_session() -> EditorSession {
    let mut session = EditorSession::default();
    session.set_container(1000.0, 1000.0);
    session.replace_image(512, 512);
    session
}

fn draw_line(session: &mut EditorSession, from: (f32, f32), to: (f32, f32)) {
    session.arm_tool(Some(ArmedTool::Line));
    session.handle_input(&InputEvent::mouse_down(from.0, from.1));
    session.handle_input(&InputEvent::mouse_move(to.0, to.1));
    session.handle_input(&InputEvent::mouse_up(to.0, to.1));
}

fn place(session: &mut EditorSession, kind: ElementKind, x: f32, y: f32) {
    session.arm_tool(Some(ArmedTool::Place(kind)));
    session.handle_input(&InputEvent::mouse_down(x, y));
    session.handle_input(&InputEvent::mouse_up(x, y));
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_removes_drawn_line() {
    let mut session = make_session();
    draw_line(&mut session, (100.0, 500.0), (900.0, 500.0));
    assert_eq!(session.scene().len(), 1);
    assert!(session.scene().has_linear_lights());
    assert_eq!(session.armed(), None, "tool should disarm after commit");

    session.handle_input(&InputEvent::key("z", CMD));
    assert!(session.scene().is_empty());
    assert_eq!(session.selection(), None);
}

#[test]
fn redo_reapplies_undone_draw() {
    let mut session = make_session();
    draw_line(&mut session, (100.0, 100.0), (300.0, 100.0));
    let drawn = session.scene().clone();

    session.handle_input(&InputEvent::key("z", CTRL));
    session.handle_input(&InputEvent::key("y", CTRL));
    assert_eq!(session.scene(), &drawn);

    session.handle_input(&InputEvent::key("z", CTRL));
    let cmd_shift = Modifiers {
        shift: true,
        ..CMD
    };
    session.handle_input(&InputEvent::key("Z", cmd_shift));
    assert_eq!(session.scene(), &drawn);
}

#[test]
fn new_commit_clears_redo() {
    let mut session = make_session();
    place(&mut session, ElementKind::Plant, 200.0, 200.0);
    session.undo();
    assert!(session.history().can_redo());

    place(&mut session, ElementKind::Vehicle, 800.0, 800.0);
    assert!(!session.history().can_redo());
    assert!(!session.redo());
    assert_eq!(session.scene().len(), 1);
    assert_eq!(session.scene().elements[0].kind, ElementKind::Vehicle);
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_is_one_undo_step() {
    let mut session = make_session();
    place(&mut session, ElementKind::person(), 500.0, 500.0);
    let id = session.scene().elements[0].id;

    session.handle_input(&InputEvent::mouse_down(500.0, 500.0));
    for x in [550.0, 600.0, 650.0, 700.0] {
        session.handle_input(&InputEvent::mouse_move(x, 500.0));
    }
    session.handle_input(&InputEvent::mouse_up(700.0, 500.0));
    assert_eq!(
        session.scene().get(id).unwrap().anchor(),
        ScenePoint::new(70.0, 50.0)
    );
    assert_eq!(session.history().undo_depth(), 2);

    session.undo();
    assert_eq!(
        session.scene().get(id).unwrap().anchor(),
        ScenePoint::new(50.0, 50.0),
        "drag should undo in one step"
    );
}

#[test]
fn dragging_segment_end_moves_only_end() {
    let mut session = make_session();
    draw_line(&mut session, (200.0, 200.0), (600.0, 200.0));
    let id = session.scene().elements[0].id;

    session.handle_input(&InputEvent::mouse_down(600.0, 200.0));
    session.handle_input(&InputEvent::mouse_move(600.0, 800.0));
    session.handle_input(&InputEvent::mouse_up(600.0, 800.0));

    assert_eq!(
        session.scene().get(id).unwrap().shape,
        Shape::segment(ScenePoint::new(20.0, 20.0), ScenePoint::new(60.0, 80.0))
    );
}

#[test]
fn drag_past_image_edge_clamps() {
    let mut session = make_session();
    place(&mut session, ElementKind::Animal, 900.0, 900.0);
    session.handle_input(&InputEvent::mouse_down(900.0, 900.0));
    session.handle_input(&InputEvent::mouse_move(1400.0, 1300.0));
    session.handle_input(&InputEvent::mouse_up(1400.0, 1300.0));
    assert_eq!(
        session.scene().elements[0].anchor(),
        ScenePoint::new(100.0, 100.0)
    );
}

// ─── Keyboard edits ─────────────────────────────────────────────────────

#[test]
fn delete_and_duplicate_shortcuts() {
    let mut session = make_session();
    place(&mut session, ElementKind::Furniture, 300.0, 300.0);
    let original = session.selection().unwrap();

    session.handle_input(&InputEvent::key("d", CTRL));
    assert_eq!(session.scene().len(), 2);
    let copy = session.selection().unwrap();
    assert_ne!(copy, original);

    session.handle_input(&InputEvent::key("Delete", Modifiers::NONE));
    assert_eq!(session.scene().len(), 1);
    assert_eq!(session.selection(), None);
    assert!(session.scene().contains(original));

    session.undo();
    session.undo();
    assert_eq!(session.scene().len(), 1);
    assert!(!session.scene().contains(copy));
}

#[test]
fn shortcut_arms_freehand_tool() {
    let mut session = make_session();
    session.handle_input(&InputEvent::key("f", Modifiers::NONE));
    assert_eq!(session.armed(), Some(ArmedTool::Freehand));

    session.handle_input(&InputEvent::mouse_down(100.0, 100.0));
    for (x, y) in [(200.0, 150.0), (300.0, 250.0), (400.0, 300.0)] {
        session.handle_input(&InputEvent::mouse_move(x, y));
    }
    session.handle_input(&InputEvent::mouse_up(400.0, 300.0));

    let el = &session.scene().elements[0];
    assert!(el.shape.is_path());
    assert_eq!(el.anchor(), ScenePoint::new(10.0, 10.0));
    assert_eq!(el.shape.end(), Some(ScenePoint::new(40.0, 30.0)));
}

#[test]
fn attribute_edits_survive_undo_of_later_commit() {
    let mut session = make_session();
    place(&mut session, ElementKind::person(), 500.0, 500.0);
    let id = session.selection().unwrap();
    session.set_pose(id, Pose::Sitting);
    session.set_label(id, "woman");

    place(&mut session, ElementKind::Plant, 100.0, 100.0);
    session.undo();

    let person = session.scene().get(id).unwrap();
    assert_eq!(person.kind, ElementKind::Person { pose: Pose::Sitting });
    assert_eq!(person.label, "woman");
}
