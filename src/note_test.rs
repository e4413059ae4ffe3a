#![allow(clippy::float_cmp)]

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

fn sample() -> Note {
    Note {
        id: NoteId::new("n1"),
        text: "hello".into(),
        color: NoteColor::Pink,
        position: Vec3::new(1.0, 2.0, 0.0),
        rotation_z: 0.1,
        created_at: 1_700_000_000_000,
        completed: false,
    }
}

// --- NoteId ---

#[test]
fn random_ids_are_uuids_and_distinct() {
    let mut rng = StdRng::seed_from_u64(7);
    let a = NoteId::random(&mut rng);
    let b = NoteId::random(&mut rng);
    assert_ne!(a, b);
    let parsed = Uuid::parse_str(a.as_str()).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
}

#[test]
fn id_serializes_as_plain_string() {
    assert_eq!(serde_json::to_string(&NoteId::new("abc")).unwrap(), r#""abc""#);
}

// --- NoteColor ---

#[test]
fn color_cycles_through_all() {
    assert_eq!(NoteColor::Yellow.next(), NoteColor::Pink);
    assert_eq!(NoteColor::Pink.next(), NoteColor::Mint);
    assert_eq!(NoteColor::Mint.next(), NoteColor::Yellow);
}

#[test]
fn color_default_is_yellow() {
    assert_eq!(NoteColor::default(), NoteColor::Yellow);
}

#[test]
fn color_parse_and_hex() {
    assert_eq!(NoteColor::parse("mint"), Some(NoteColor::Mint));
    assert_eq!(NoteColor::parse("purple"), None);
    assert_eq!(NoteColor::Yellow.hex(), "#FFEB74");
}

// --- Note serde ---

#[test]
fn note_uses_camel_case_keys() {
    let json = serde_json::to_value(sample()).unwrap();
    assert_eq!(json["rotationZ"], 0.1);
    assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
    assert_eq!(json["color"], "pink");
    assert_eq!(json["position"]["y"], 2.0);
    assert!(json.get("rotation_z").is_none());
}

// --- NotePatch ---

#[test]
fn patch_applies_only_present_fields() {
    let mut note = sample();
    let patch = NotePatch { text: Some("buy milk".into()), ..Default::default() };
    assert!(patch.apply_to(&mut note));
    assert_eq!(note.text, "buy milk");
    assert_eq!(note.color, NoteColor::Pink);
    assert_eq!(note.position, Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn patch_reports_no_change() {
    let mut note = sample();
    let patch = NotePatch { text: Some("hello".into()), color: Some(NoteColor::Pink), ..Default::default() };
    assert!(!patch.apply_to(&mut note));
    assert!(NotePatch::default().is_empty());
    assert!(!patch.is_empty());
}

#[test]
fn patch_serialization_skips_absent_fields() {
    let patch = NotePatch { completed: Some(true), ..Default::default() };
    assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"completed":true}"#);
}

// --- StoredNote ---

#[test]
fn stored_note_tolerates_missing_and_extra_fields() {
    let stored: StoredNote = serde_json::from_str(r#"{"id":"x","extra":42}"#).unwrap();
    assert_eq!(stored.id(), Some(NoteId::new("x")));
    assert!(stored.text.is_none());
    assert_eq!(stored.color_or_default(), NoteColor::Yellow);
    assert!(!stored.completed_or_default());
}

#[test]
fn stored_note_wrong_typed_fields_read_as_absent() {
    let raw = r#"{"id":7,"text":"kept","rotationZ":"0.1","createdAt":"soon","position":[1,2],"completed":null,"done":true}"#;
    let stored: StoredNote = serde_json::from_str(raw).unwrap();
    assert!(stored.id().is_none());
    assert_eq!(stored.text.as_deref(), Some("kept"));
    assert!(stored.rotation_z.is_none());
    assert!(stored.created_at.is_none());
    assert!(stored.position.is_none());
    assert!(stored.completed.is_none());
    assert!(stored.completed_or_default());
}

#[test]
fn stored_note_reads_legacy_done() {
    let stored: StoredNote = serde_json::from_str(r#"{"done":true}"#).unwrap();
    assert!(stored.completed_or_default());
}

#[test]
fn stored_note_prefers_completed_over_done() {
    let stored: StoredNote = serde_json::from_str(r#"{"completed":false,"done":true}"#).unwrap();
    assert!(!stored.completed_or_default());
}

#[test]
fn stored_note_unknown_color_is_yellow() {
    let stored: StoredNote = serde_json::from_str(r#"{"color":"chartreuse"}"#).unwrap();
    assert_eq!(stored.color_or_default(), NoteColor::Yellow);
}

#[test]
fn stored_note_empty_id_is_absent() {
    let stored: StoredNote = serde_json::from_str(r#"{"id":""}"#).unwrap();
    assert!(stored.id().is_none());
}
