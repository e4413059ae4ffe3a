//! End-to-end board flows against real file-backed storage.

use corkboard::camera::{Point, Vec3};
use corkboard::config::{BoardConfig, ENV_STORAGE_PATH};
use corkboard::engine::{Action, EngineCore};
use corkboard::input::{Button, PointerDown, PointerTarget};
use corkboard::note::{NewNote, NoteColor, NoteId};
use corkboard::storage::{FileStorage, NoteStorage};
use corkboard::text::TextEvent;

type Board = EngineCore<FileStorage>;

fn open(dir: &std::path::Path) -> Board {
    let path = dir.to_string_lossy().to_string();
    let config = BoardConfig::from_lookup(|key| (key == ENV_STORAGE_PATH).then(|| path.clone())).unwrap();
    let mut board = Board::from_config(&config).unwrap();
    board.resize(1200.0, 650.0);
    board
}

fn created_id(actions: &[Action]) -> NoteId {
    actions
        .iter()
        .find_map(|a| match a {
            Action::NoteCreated { note } => Some(note.id.clone()),
            _ => None,
        })
        .unwrap()
}

fn drag(board: &mut Board, id: &NoteId, from: Vec3, to: Vec3, steps: u32) -> Vec<Action> {
    let start = board.scene().project(from).unwrap();
    let end = board.scene().project(to).unwrap();
    let mut actions = board.pointer_down(PointerDown {
        pointer_id: 1,
        button: Button::Primary,
        screen: start,
        note_id: Some(id.clone()),
        target: PointerTarget::Surface,
    });
    for i in 1..=steps {
        let t = f64::from(i) / f64::from(steps);
        let pt = Point::new(start.x + (end.x - start.x) * t, start.y + (end.y - start.y) * t);
        actions.extend(board.pointer_move(1, pt));
    }
    actions.extend(board.pointer_up(1, end));
    actions
}

#[test]
fn scenario_add_edit_remove() {
    let dir = tempfile::tempdir().unwrap();
    let mut board = open(dir.path());

    let id = created_id(&board.add_note(NewNote::default()));
    assert_eq!(board.notes().len(), 1);
    let note = board.notes()[0].clone();
    assert_eq!(note.color, NoteColor::Yellow);
    assert_eq!(note.text, "");
    assert!(note.position.x.abs() <= 400.0 && note.position.y.abs() <= 220.0);

    board.set_text(&id, "buy milk");
    let edited = &board.notes()[0];
    assert_eq!(edited.text, "buy milk");
    assert_eq!(edited.color, note.color);
    assert_eq!(edited.position, note.position);
    assert_eq!(edited.created_at, note.created_at);

    board.delete_note(&id);
    assert!(board.notes().is_empty());
    assert_eq!(board.store().storage().read("notes").unwrap().as_deref(), Some("[]"));
}

#[test]
fn dragged_position_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let mut board = open(dir.path());
        let id = created_id(&board.add_note(NewNote {
            position: Some(Vec3::new(-100.0, 50.0, 0.0)),
            ..Default::default()
        }));
        let actions = drag(&mut board, &id, Vec3::new(-100.0, 50.0, 0.0), Vec3::new(240.0, -120.0, 0.0), 25);
        let commits = actions.iter().filter(|a| matches!(a, Action::NoteUpdated { .. })).count();
        assert_eq!(commits, 1);
        id
    };

    let board = open(dir.path());
    let note = board.note(&id).unwrap();
    assert!((note.position.x - 240.0).abs() < 1e-6);
    assert!((note.position.y + 120.0).abs() < 1e-6);
    assert_eq!(note.position.z, 0.0);
}

#[test]
fn order_and_fields_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let ids: Vec<NoteId> = {
        let mut board = open(dir.path());
        let a = created_id(&board.add_note(NewNote::with_color(NoteColor::Mint)));
        let b = created_id(&board.add_note(NewNote::default()));
        let c = created_id(&board.add_note(NewNote::with_color(NoteColor::Pink)));
        board.text_event(&b, TextEvent::CompositionStart);
        board.text_event(&b, TextEvent::Input("mid".into()));
        board.text_event(&b, TextEvent::Blur("final".into()));
        board.toggle_completed(&c);
        vec![a, b, c]
    };

    let board = open(dir.path());
    let loaded: Vec<NoteId> = board.notes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(loaded, ids);
    assert_eq!(board.notes()[0].color, NoteColor::Mint);
    assert_eq!(board.notes()[1].text, "final");
    assert!(board.notes()[2].completed);
}

#[test]
fn duplicate_ids_on_disk_are_repaired() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut storage = FileStorage::open(dir.path()).unwrap();
        storage
            .write("notes", r#"[{"id":"dup","text":"one"},{"id":"dup","text":"two"},{"id":"solo","done":true}]"#)
            .unwrap();
    }

    let board = open(dir.path());
    assert_eq!(board.notes().len(), 3);
    assert_eq!(board.notes()[0].id, NoteId::new("dup"));
    assert_eq!(board.notes()[0].text, "one");
    assert_ne!(board.notes()[1].id, NoteId::new("dup"));
    assert!(board.notes()[2].completed);

    let reloaded = open(dir.path());
    let ids: Vec<NoteId> = reloaded.notes().iter().map(|n| n.id.clone()).collect();
    let original: Vec<NoteId> = board.notes().iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids, original);
}

#[test]
fn corrupt_file_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut storage = FileStorage::open(dir.path()).unwrap();
        storage.write("notes", "not json at all").unwrap();
    }
    let mut board = open(dir.path());
    assert!(board.notes().is_empty());

    board.add_note(NewNote::default());
    let reloaded = open(dir.path());
    assert_eq!(reloaded.notes().len(), 1);
}
