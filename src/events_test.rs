use super::*;
use serde_json::json;
use uuid::Uuid;

fn decode(event: &str, data: serde_json::Value) -> Result<ClientEvent, EventError> {
    ClientEvent::try_from(Frame::new(event, data))
}

fn sample_stroke(phase: StrokePhase) -> Stroke {
    Stroke {
        id: "1-aaaaaaaaa".into(),
        user_id: Uuid::new_v4(),
        points: vec![Point { x: 10.0, y: 10.0 }],
        color: "#e6194b".into(),
        size: 5.0,
        tool: Tool::Brush,
        phase,
        timestamp: 1,
    }
}

// =============================================================================
// Inbound
// =============================================================================

#[test]
fn draw_events_map_to_phases() {
    let data = json!({"x": 10, "y": 20, "size": 5, "color": "#ff0000", "timestamp": 99});
    let ClientEvent::Draw(phase, input) = decode("draw-start", data.clone()).unwrap() else {
        panic!("expected draw");
    };
    assert_eq!(phase, StrokePhase::Start);
    assert!((input.x - 10.0).abs() < f64::EPSILON);
    assert_eq!(input.size, Some(5.0));
    assert_eq!(input.color.as_deref(), Some("#ff0000"));
    assert_eq!(input.timestamp, Some(99));

    assert!(matches!(decode("draw", data.clone()).unwrap(), ClientEvent::Draw(StrokePhase::Continue, _)));
    assert!(matches!(decode("draw-end", data).unwrap(), ClientEvent::Draw(StrokePhase::End, _)));
}

#[test]
fn draw_accepts_point_batches_and_tool() {
    let data = json!({"points": [{"x": 1, "y": 2}, {"x": 3, "y": 4}], "tool": "eraser"});
    let ClientEvent::Draw(_, input) = decode("draw", data).unwrap() else {
        panic!("expected draw");
    };
    assert_eq!(input.points.len(), 2);
    assert_eq!(input.tool, Some(Tool::Eraser));
    assert!(input.size.is_none());
}

#[test]
fn draw_without_payload_is_malformed() {
    let err = decode("draw", serde_json::Value::Null).unwrap_err();
    assert!(matches!(err, EventError::Payload { ref event, .. } if event == "draw"));
}

#[test]
fn draw_with_unknown_tool_is_malformed() {
    assert!(matches!(decode("draw", json!({"x": 1, "y": 1, "tool": "spray"})), Err(EventError::Payload { .. })));
}

#[test]
fn cursor_visibility_defaults_to_true() {
    let ClientEvent::CursorMove(input) = decode("cursor-move", json!({"x": 3, "y": 4})).unwrap() else {
        panic!("expected cursor");
    };
    assert!(input.visible);
    let cursor = Cursor::from(input);
    assert_eq!(cursor, Cursor { x: 3.0, y: 4.0, visible: true });
}

#[test]
fn cursor_hidden_flag_is_kept() {
    let event = decode("cursor-move", json!({"x": 0, "y": 0, "visible": false, "timestamp": 5})).unwrap();
    assert!(matches!(event, ClientEvent::CursorMove(CursorInput { visible: false, .. })));
}

#[test]
fn color_change_accepts_bare_and_wrapped() {
    assert_eq!(decode("color-change", json!("#00ff00")).unwrap(), ClientEvent::ColorChange("#00ff00".into()));
    assert_eq!(
        decode("color-change", json!({"color": "#0000ff"})).unwrap(),
        ClientEvent::ColorChange("#0000ff".into())
    );
    assert!(decode("color-change", json!(42)).is_err());
}

#[test]
fn payloadless_events_ignore_data() {
    assert_eq!(decode("clear-canvas", serde_json::Value::Null).unwrap(), ClientEvent::ClearCanvas);
    assert_eq!(decode("undo", json!({})).unwrap(), ClientEvent::Undo);
    assert_eq!(decode("redo", serde_json::Value::Null).unwrap(), ClientEvent::Redo);
}

#[test]
fn unknown_event_is_reported_by_name() {
    let err = decode("teleport", json!({})).unwrap_err();
    assert!(matches!(err, EventError::Unknown(ref name) if name == "teleport"));
}

// =============================================================================
// Outbound
// =============================================================================

#[test]
fn remote_draw_name_follows_phase() {
    assert_eq!(ServerEvent::RemoteDraw(sample_stroke(StrokePhase::Start)).name(), "remote-draw-start");
    assert_eq!(ServerEvent::RemoteDraw(sample_stroke(StrokePhase::Continue)).name(), "remote-draw");
    assert_eq!(ServerEvent::RemoteDraw(sample_stroke(StrokePhase::End)).name(), "remote-draw-end");
}

#[test]
fn remote_draw_frame_is_enriched_stroke() {
    let stroke = sample_stroke(StrokePhase::Continue);
    let frame = Frame::from(&ServerEvent::RemoteDraw(stroke.clone()));
    assert_eq!(frame.event, "remote-draw");
    assert_eq!(frame.data["userId"], json!(stroke.user_id));
    assert_eq!(frame.data["color"], "#e6194b");
    assert_eq!(frame.data["phase"], "continue");
}

#[test]
fn cursor_frame_nests_color_inside_cursor() {
    let user_id = Uuid::new_v4();
    let event = ServerEvent::RemoteCursorMove {
        user_id,
        cursor: CursorView { x: 1.0, y: 2.0, visible: true, color: "#3cb44b".into() },
    };
    let frame = Frame::from(&event);
    assert_eq!(
        frame.data,
        json!({"userId": user_id, "cursor": {"x": 1.0, "y": 2.0, "visible": true, "color": "#3cb44b"}})
    );
}

#[test]
fn clear_frame_has_no_data() {
    let frame = Frame::from(&ServerEvent::RemoteClearCanvas);
    assert_eq!(frame.event, "remote-clear-canvas");
    assert!(frame.data.is_null());
}

#[test]
fn presence_frames_carry_user_and_color() {
    let participant = Participant { id: Uuid::new_v4(), color: "#4363d8".into(), cursor: Cursor::HIDDEN, joined_at: 1 };
    let joined = Frame::from(&ServerEvent::UserConnected(participant.clone()));
    assert_eq!(joined.event, "user-connected");
    assert_eq!(joined.data["userId"], json!(participant.id));
    assert_eq!(joined.data["cursor"]["visible"], false);

    let left = Frame::from(&ServerEvent::UserDisconnected { user_id: participant.id, color: participant.color.clone() });
    assert_eq!(left.event, "user-disconnected");
    assert_eq!(left.data, json!({"userId": participant.id, "color": "#4363d8"}));
}

#[test]
fn undo_frame_carries_retracted_stroke() {
    let stroke = sample_stroke(StrokePhase::End);
    let user_id = Uuid::new_v4();
    let frame = Frame::from(&ServerEvent::RemoteUndo { user_id, stroke: stroke.clone() });
    assert_eq!(frame.event, "remote-undo");
    assert_eq!(frame.data["userId"], json!(user_id));
    assert_eq!(frame.data["stroke"]["id"], json!(stroke.id));
}

#[test]
fn init_frame_keys_users_by_id() {
    let other = Participant { id: Uuid::new_v4(), color: "#f58231".into(), cursor: Cursor::HIDDEN, joined_at: 3 };
    let mut users = HashMap::new();
    users.insert(other.id, other.clone());
    let snapshot =
        Snapshot { user_id: Uuid::new_v4(), color: "#e6194b".into(), strokes: vec![sample_stroke(StrokePhase::Start)], users };

    let frame = Frame::from(&ServerEvent::Init(snapshot.clone()));
    assert_eq!(frame.event, "init");
    assert_eq!(frame.data["userId"], json!(snapshot.user_id));
    assert_eq!(frame.data["strokes"].as_array().map(Vec::len), Some(1));
    assert_eq!(frame.data["users"][other.id.to_string()]["color"], "#f58231");
}
