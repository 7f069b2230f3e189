use super::*;
use serde_json::json;

#[test]
fn stroke_serializes_camel_case_with_lowercase_tags() {
    let user_id = Uuid::new_v4();
    let stroke = Stroke {
        id: "1-abc".into(),
        user_id,
        points: vec![Point { x: 1.0, y: 2.0 }],
        color: "#ff0000".into(),
        size: 5.0,
        tool: Tool::Eraser,
        phase: StrokePhase::Start,
        timestamp: 42,
    };

    let value = serde_json::to_value(&stroke).unwrap();
    assert_eq!(value["userId"], json!(user_id));
    assert_eq!(value["tool"], "eraser");
    assert_eq!(value["phase"], "start");
    assert_eq!(value["points"], json!([{"x": 1.0, "y": 2.0}]));
}

#[test]
fn participant_serializes_cursor_and_join_time() {
    let participant =
        Participant { id: Uuid::new_v4(), color: "#3cb44b".into(), cursor: Cursor::HIDDEN, joined_at: 7 };
    let value = serde_json::to_value(&participant).unwrap();
    assert_eq!(value["joinedAt"], 7);
    assert_eq!(value["cursor"], json!({"x": 0.0, "y": 0.0, "visible": false}));
}

#[test]
fn draft_from_stroke_keeps_identity() {
    let stroke = Stroke {
        id: "9-xyz".into(),
        user_id: Uuid::new_v4(),
        points: vec![],
        color: "#000000".into(),
        size: 1.0,
        tool: Tool::Brush,
        phase: StrokePhase::End,
        timestamp: 9,
    };
    let draft = StrokeDraft::from(stroke.clone());
    assert_eq!(draft.id.as_deref(), Some("9-xyz"));
    assert_eq!(draft.timestamp, Some(9));
    assert_eq!(draft.user_id, stroke.user_id);
}

#[tokio::test]
async fn app_state_starts_with_empty_session() {
    let state = test_helpers::test_app_state();
    let session = state.session.lock().await;
    let stats = session.stats();
    assert_eq!(stats.total_users, 0);
    assert_eq!(stats.total_strokes, 0);
}
