use super::*;
use crate::state::test_helpers::dummy_draft;
use uuid::Uuid;

fn xs(log: &StrokeLog) -> Vec<f64> {
    log.all().iter().map(|s| s.points[0].x).collect()
}

#[test]
fn append_assigns_id_and_timestamp() {
    let mut log = StrokeLog::new(10);
    let stroke = log.append(dummy_draft(Uuid::new_v4(), 1.0, 1.0));

    let (millis, suffix) = stroke.id.split_once('-').expect("id has a dash");
    assert_eq!(millis.parse::<i64>().unwrap(), stroke.timestamp);
    assert_eq!(suffix.len(), 9);
    assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert!(stroke.timestamp > 0);
}

#[test]
fn append_keeps_supplied_id_and_timestamp() {
    let mut log = StrokeLog::new(10);
    let mut draft = dummy_draft(Uuid::new_v4(), 1.0, 1.0);
    draft.id = Some("given".into());
    draft.timestamp = Some(123);

    let stroke = log.append(draft);
    assert_eq!(stroke.id, "given");
    assert_eq!(stroke.timestamp, 123);
}

#[test]
fn ids_differ_between_appends() {
    let mut log = StrokeLog::new(10);
    let user = Uuid::new_v4();
    let a = log.append(dummy_draft(user, 0.0, 0.0));
    let b = log.append(dummy_draft(user, 0.0, 0.0));
    assert_ne!(a.id, b.id);
}

#[test]
fn all_returns_strokes_in_append_order() {
    let mut log = StrokeLog::new(10);
    let user = Uuid::new_v4();
    for x in 0..5 {
        log.append(dummy_draft(user, f64::from(x), 0.0));
    }
    assert_eq!(xs(&log), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn all_is_a_copy() {
    let mut log = StrokeLog::new(10);
    log.append(dummy_draft(Uuid::new_v4(), 1.0, 1.0));
    let mut copy = log.all();
    copy.clear();
    assert_eq!(log.len(), 1);
}

#[test]
fn overflow_truncates_to_newest_half_capacity() {
    let mut log = StrokeLog::new(10);
    let user = Uuid::new_v4();
    for x in 0..11 {
        log.append(dummy_draft(user, f64::from(x), 0.0));
    }
    assert_eq!(log.len(), 5);
    assert_eq!(xs(&log), vec![6.0, 7.0, 8.0, 9.0, 10.0]);
}

#[test]
fn filling_to_capacity_does_not_truncate() {
    let mut log = StrokeLog::new(1000);
    let user = Uuid::new_v4();
    for x in 0..1000 {
        log.append(dummy_draft(user, f64::from(x), 0.0));
    }
    assert_eq!(log.len(), 1000);

    log.append(dummy_draft(user, 1000.0, 0.0));
    assert_eq!(log.len(), 500);
    assert_eq!(log.all().first().map(|s| s.points[0].x), Some(501.0));
    assert_eq!(log.all().last().map(|s| s.points[0].x), Some(1000.0));
}

#[test]
fn capacity_is_clamped() {
    let log = StrokeLog::new(0);
    assert_eq!(log.capacity(), 2);
}

#[test]
fn pop_last_removes_tail() {
    let mut log = StrokeLog::new(10);
    let user = Uuid::new_v4();
    log.append(dummy_draft(user, 1.0, 0.0));
    log.append(dummy_draft(user, 2.0, 0.0));

    let popped = log.pop_last().expect("non-empty");
    assert!((popped.points[0].x - 2.0).abs() < f64::EPSILON);
    assert_eq!(xs(&log), vec![1.0]);
}

#[test]
fn pop_last_on_empty_is_none() {
    let mut log = StrokeLog::new(10);
    assert!(log.pop_last().is_none());
}

#[test]
fn clear_empties_log() {
    let mut log = StrokeLog::new(10);
    log.append(dummy_draft(Uuid::new_v4(), 1.0, 0.0));
    log.clear();
    assert_eq!(log.len(), 0);
}

#[test]
fn recolor_only_touches_owner_brush_strokes() {
    let mut log = StrokeLog::new(10);
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    log.append(dummy_draft(owner, 1.0, 0.0));
    let mut eraser = dummy_draft(owner, 2.0, 0.0);
    eraser.tool = Tool::Eraser;
    log.append(eraser);
    log.append(dummy_draft(other, 3.0, 0.0));

    let changed = log.recolor(owner, "#00ff00");
    assert_eq!(changed, 1);

    let colors: Vec<String> = log.all().into_iter().map(|s| s.color).collect();
    assert_eq!(colors, vec!["#00ff00", "#000000", "#000000"]);
}

#[test]
fn recolor_skips_background_colored_brush_strokes() {
    let mut log = StrokeLog::new(10);
    let owner = Uuid::new_v4();
    log.append(dummy_draft(owner, 1.0, 0.0));
    let mut white = dummy_draft(owner, 2.0, 0.0);
    white.color = "#FFFFFF".into();
    log.append(white);

    assert_eq!(log.recolor(owner, "#222222"), 1);

    let colors: Vec<String> = log.all().into_iter().map(|s| s.color).collect();
    assert_eq!(colors, vec!["#222222", "#FFFFFF"]);
}

#[test]
fn recolor_preserves_order_and_ids() {
    let mut log = StrokeLog::new(10);
    let owner = Uuid::new_v4();
    let before: Vec<String> = (0..3)
        .map(|x| log.append(dummy_draft(owner, f64::from(x), 0.0)).id)
        .collect();
    log.recolor(owner, "#123456");
    let after: Vec<String> = log.all().into_iter().map(|s| s.id).collect();
    assert_eq!(before, after);
}
