#![allow(clippy::float_cmp)]

use rand::SeedableRng;

use super::*;
use crate::camera::Vec3;
use crate::input::Button;
use crate::storage::MemoryStorage;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

type Core = EngineCore<MemoryStorage>;

fn core_with(storage: MemoryStorage) -> Core {
    let mut core = Core::with_rng(storage, &BoardConfig::default(), StdRng::seed_from_u64(3));
    core.resize(1200.0, 650.0);
    core
}

fn core() -> Core {
    core_with(MemoryStorage::new())
}

fn add_at(core: &mut Core, x: f64, y: f64) -> NoteId {
    let actions = core.add_note(NewNote { position: Some(Position::new(x, y, 0.0)), ..Default::default() });
    match &actions[0] {
        Action::NoteCreated { note } => note.id.clone(),
        other => panic!("expected NoteCreated, got {other:?}"),
    }
}

fn screen_of(core: &Core, world: Vec3) -> Point {
    core.scene().project(world).unwrap()
}

fn down_on(core: &mut Core, pointer_id: PointerId, screen: Point, note_id: Option<NoteId>) -> Vec<Action> {
    core.pointer_down(PointerDown {
        pointer_id,
        button: Button::Primary,
        screen,
        note_id,
        target: PointerTarget::Surface,
    })
}

fn count_updates(actions: &[Action]) -> usize {
    actions.iter().filter(|a| matches!(a, Action::NoteUpdated { .. })).count()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn new_core_mounts_loaded_notes() {
    let core = core_with(MemoryStorage::with_entry("notes", r#"[{"id":"a"},{"id":"b"}]"#));
    assert_eq!(core.notes().len(), 2);
    assert_eq!(core.layer().len(), 2);
    assert!(core.drag().is_bound(&NoteId::new("a")));
}

#[test]
fn resize_reports_render_only_on_change() {
    let mut core = core();
    assert_eq!(core.resize(1200.0, 650.0), Vec::new());
    assert_eq!(core.resize(800.0, 600.0), vec![Action::RenderNeeded]);
}

// =============================================================================
// Drag gesture
// =============================================================================

#[test]
fn drag_commits_exactly_once_with_last_position() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let writes_before = core.store().storage().write_count();

    let pt = screen_of(&core, Vec3::ZERO);
    let actions = down_on(&mut core, 1, pt, Some(id.clone()));
    assert!(actions.contains(&Action::CapturePointer { pointer_id: 1 }));
    assert!(actions.contains(&Action::SetCursor { cursor: "grabbing".into() }));

    let mut all = Vec::new();
    for x in [20.0, 60.0, 110.0, 90.0] {
        let pt = screen_of(&core, Vec3::new(x, -x, 0.0));
        all.extend(core.pointer_move(1, pt));
    }
    assert_eq!(count_updates(&all), 0);
    assert_eq!(core.store().storage().write_count(), writes_before);
    assert_eq!(core.note(&id).unwrap().position, Position::new(0.0, 0.0, 0.0));

    let release = screen_of(&core, Vec3::new(90.0, -90.0, 0.0));
    let actions = core.pointer_up(1, release);
    assert_eq!(count_updates(&actions), 1);
    assert!(actions.contains(&Action::ReleasePointer { pointer_id: 1 }));
    assert_eq!(core.store().storage().write_count(), writes_before + 1);

    let note = core.note(&id).unwrap();
    assert!(approx_eq(note.position.x, 90.0));
    assert!(approx_eq(note.position.y, -90.0));
    assert_eq!(note.position.z, 0.0);

    assert!(core.pointer_up(1, release).is_empty());
    assert_eq!(core.store().storage().write_count(), writes_before + 1);
}

#[test]
fn drag_commit_keeps_rotation_changed_mid_gesture() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let pt = screen_of(&core, Vec3::ZERO);
    down_on(&mut core, 1, pt, Some(id.clone()));
    core.pointer_move(1, Point::new(pt.x + 40.0, pt.y));

    assert_eq!(count_updates(&core.rotate_jitter(&id)), 1);
    let jittered = core.note(&id).unwrap().rotation_z;

    let actions = core.pointer_up(1, Point::new(pt.x + 40.0, pt.y));
    let patch = actions
        .iter()
        .find_map(|a| match a {
            Action::NoteUpdated { patch, .. } => Some(patch.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(patch.rotation_z, None);
    assert_eq!(core.note(&id).unwrap().rotation_z, jittered);
    assert!(core.note(&id).unwrap().position.x > 0.0);
}

#[test]
fn camera_does_not_drift_under_a_held_note() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    core.pointer_move(9, Point::new(1150.0, 40.0));
    for _ in 0..5 {
        core.tick();
    }

    let pt = screen_of(&core, Vec3::ZERO);
    down_on(&mut core, 1, pt, Some(id));
    let held = core.scene().camera().position;
    for step in 1..=20 {
        core.pointer_move(1, Point::new(pt.x + f64::from(step) * 3.0, pt.y));
        assert_eq!(core.tick().camera.position, held);
    }

    core.pointer_up(1, Point::new(pt.x + 60.0, pt.y));
    core.tick();
    assert_ne!(core.scene().camera().position, held);
}

#[test]
fn widget_follows_drag_and_settles() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let pt = screen_of(&core, Vec3::ZERO);
    down_on(&mut core, 1, pt, Some(id.clone()));
    assert!(core.layer().widget(&id).unwrap().lifted);

    let pt = screen_of(&core, Vec3::new(50.0, 0.0, 0.0));
    core.pointer_move(1, pt);
    let view = core.layer().widget(&id).unwrap();
    assert!(approx_eq(view.position.x, 50.0));
    assert!(view.position.z > 0.0);

    core.pointer_up(1, pt);
    let view = core.layer().widget(&id).unwrap();
    assert!(!view.lifted);
    assert_eq!(view.position.z, 0.0);
}

#[test]
fn cancel_discards_drag_and_restores_depth() {
    let mut core = core();
    let id = add_at(&mut core, 10.0, 10.0);
    let writes = core.store().storage().write_count();
    let pt = screen_of(&core, Vec3::new(10.0, 10.0, 0.0));
    down_on(&mut core, 1, pt, Some(id.clone()));
    core.pointer_move(1, Point::new(900.0, 100.0));

    let actions = core.pointer_cancel(1);
    assert!(actions.contains(&Action::NoteDropped { id: id.clone(), position: Position::new(10.0, 10.0, 0.0) }));
    assert_eq!(count_updates(&actions), 0);
    assert_eq!(core.store().storage().write_count(), writes);
    let view = core.layer().widget(&id).unwrap();
    assert!(!view.lifted);
    assert_eq!(view.position, Position::new(10.0, 10.0, 0.0));
}

#[test]
fn cancel_all_releases_every_pointer() {
    let mut core = core();
    let a = add_at(&mut core, -300.0, 0.0);
    let b = add_at(&mut core, 300.0, 0.0);
    let pt = screen_of(&core, Vec3::new(-300.0, 0.0, 0.0));
    down_on(&mut core, 1, pt, Some(a));
    let pt = screen_of(&core, Vec3::new(300.0, 0.0, 0.0));
    down_on(&mut core, 2, pt, Some(b));

    let actions = core.cancel_all();
    assert!(actions.contains(&Action::ReleasePointer { pointer_id: 1 }));
    assert!(actions.contains(&Action::ReleasePointer { pointer_id: 2 }));
    assert!(!core.drag().is_active());
}

#[test]
fn pointer_down_hit_tests_when_host_gives_no_note() {
    let mut core = core();
    let id = add_at(&mut core, 200.0, 100.0);
    let pt = screen_of(&core, Vec3::new(220.0, 90.0, 0.0));
    let actions = down_on(&mut core, 1, pt, None);
    assert!(actions.contains(&Action::CapturePointer { pointer_id: 1 }));
    assert!(matches!(core.drag().state_of(&id), InputState::Dragging(_)));
}

#[test]
fn text_input_target_does_not_drag() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let screen = screen_of(&core, Vec3::ZERO);
    let actions = core.pointer_down(PointerDown {
        pointer_id: 1,
        button: Button::Primary,
        screen,
        note_id: Some(id.clone()),
        target: PointerTarget::TextInput,
    });
    assert!(actions.is_empty());
    assert!(!core.drag().is_active());
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn click_selects_note() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let pt = screen_of(&core, Vec3::ZERO);
    down_on(&mut core, 1, pt, Some(id.clone()));
    let actions = core.pointer_up(1, Point::new(pt.x + 2.0, pt.y + 1.0));
    assert!(actions.contains(&Action::NoteSelected { id: Some(id.clone()) }));
    assert_eq!(core.selection(), Some(&id));
}

#[test]
fn empty_space_clears_selection() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let pt = screen_of(&core, Vec3::ZERO);
    down_on(&mut core, 1, pt, Some(id));
    core.pointer_up(1, pt);

    let empty = screen_of(&core, Vec3::new(450.0, 250.0, 0.0));
    let actions = down_on(&mut core, 1, empty, None);
    assert_eq!(actions, vec![Action::NoteSelected { id: None }]);
    assert!(core.selection().is_none());
}

#[test]
fn dragging_past_slop_clears_selection() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let pt = screen_of(&core, Vec3::ZERO);
    down_on(&mut core, 1, pt, Some(id.clone()));
    core.pointer_up(1, pt);
    assert!(core.selection().is_some());

    down_on(&mut core, 1, pt, Some(id));
    let actions = core.pointer_move(1, Point::new(pt.x + 40.0, pt.y));
    assert!(actions.contains(&Action::NoteSelected { id: None }));
    let actions = core.pointer_up(1, Point::new(pt.x + 40.0, pt.y));
    assert!(!actions.iter().any(|a| matches!(a, Action::NoteSelected { .. })));
}

// =============================================================================
// Note actions
// =============================================================================

#[test]
fn add_note_with_color_preset() {
    let mut core = core();
    let actions = core.add_note(NewNote::with_color(NoteColor::Pink));
    assert_eq!(core.notes()[0].color, NoteColor::Pink);
    assert_eq!(core.layer().len(), 1);
    assert!(actions.contains(&Action::RenderNeeded));
}

#[test]
fn text_commits_outside_composition_only() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);

    assert_eq!(count_updates(&core.set_text(&id, "h")), 1);
    assert!(core.text_event(&id, TextEvent::CompositionStart).is_empty());
    assert!(core.is_composing(&id));
    assert!(core.text_event(&id, TextEvent::Input("hに".into())).is_empty());
    assert_eq!(core.note(&id).unwrap().text, "h");

    let actions = core.text_event(&id, TextEvent::CompositionEnd("h日".into()));
    assert_eq!(count_updates(&actions), 1);
    assert_eq!(core.note(&id).unwrap().text, "h日");
    assert_eq!(core.layer().widget(&id).unwrap().text, "h日");
}

#[test]
fn unchanged_text_is_not_committed() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    core.set_text(&id, "same");
    let writes = core.store().storage().write_count();
    assert!(core.text_event(&id, TextEvent::Blur("same".into())).is_empty());
    assert_eq!(core.store().storage().write_count(), writes);
}

#[test]
fn toggle_completed_flips_flag() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    core.toggle_completed(&id);
    assert!(core.note(&id).unwrap().completed);
    core.toggle_completed(&id);
    assert!(!core.note(&id).unwrap().completed);
}

#[test]
fn cycle_and_set_color() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    core.cycle_color(&id);
    assert_eq!(core.note(&id).unwrap().color, NoteColor::Pink);
    core.cycle_color(&id);
    assert_eq!(core.note(&id).unwrap().color, NoteColor::Mint);
    core.set_color(&id, NoteColor::Yellow);
    assert_eq!(core.note(&id).unwrap().color, NoteColor::Yellow);
    assert!(core.set_color(&id, NoteColor::Yellow).is_empty());
}

#[test]
fn rotate_jitter_updates_rotation() {
    let mut core = core();
    let created = core.add_note(NewNote { rotation_z: Some(0.0), ..Default::default() });
    let Some(Action::NoteCreated { note }) = created.first() else {
        panic!("expected NoteCreated");
    };
    let id = note.id.clone();
    let actions = core.rotate_jitter(&id);
    assert_eq!(count_updates(&actions), 1);
    assert!(core.note(&id).unwrap().rotation_z.abs() <= 0.1 + 1e-12);
}

#[test]
fn delete_removes_note_and_widget() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let actions = core.delete_note(&id);
    assert!(actions.contains(&Action::NoteDeleted { id: id.clone() }));
    assert!(core.notes().is_empty());
    assert!(core.layer().is_empty());
    assert!(!core.drag().is_bound(&id));
    assert!(core.delete_note(&id).is_empty());
}

#[test]
fn delete_during_drag_releases_pointer_and_skips_commit() {
    let mut core = core();
    let id = add_at(&mut core, 0.0, 0.0);
    let pt = screen_of(&core, Vec3::ZERO);
    down_on(&mut core, 4, pt, Some(id.clone()));

    let actions = core.delete_note(&id);
    assert!(actions.contains(&Action::ReleasePointer { pointer_id: 4 }));
    assert!(!core.drag().is_active());

    let actions = core.pointer_up(4, Point::new(10.0, 10.0));
    assert!(actions.is_empty());
    assert!(core.notes().is_empty());
}

#[test]
fn actions_on_unknown_note_are_noops() {
    let mut core = core();
    let ghost = NoteId::new("ghost");
    assert!(core.set_text(&ghost, "x").is_empty());
    assert!(core.toggle_completed(&ghost).is_empty());
    assert!(core.cycle_color(&ghost).is_empty());
    assert!(core.rotate_jitter(&ghost).is_empty());
    assert!(core.delete_note(&ghost).is_empty());
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn actions_serialize_with_type_tag() {
    let json = serde_json::to_value(Action::CapturePointer { pointer_id: 7 }).unwrap();
    assert_eq!(json, serde_json::json!({"type": "capturePointer", "pointerId": 7}));
    let json = serde_json::to_value(Action::RenderNeeded).unwrap();
    assert_eq!(json, serde_json::json!({"type": "renderNeeded"}));
}
