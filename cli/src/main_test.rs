use super::*;

#[test]
fn ws_url_maps_http_schemes() {
    assert_eq!(ws_url("http://127.0.0.1:3000").unwrap(), "ws://127.0.0.1:3000/ws");
    assert_eq!(ws_url("https://canvas.example.com").unwrap(), "wss://canvas.example.com/ws");
}

#[test]
fn ws_url_rejects_other_schemes() {
    assert!(matches!(ws_url("ftp://host"), Err(CliError::InvalidBaseUrl(_))));
}

#[test]
fn parse_point_accepts_pairs() {
    assert_eq!(parse_point("10,20").unwrap(), (10.0, 20.0));
    assert_eq!(parse_point(" 1.5 , -2 ").unwrap(), (1.5, -2.0));
}

#[test]
fn parse_point_rejects_garbage() {
    assert!(parse_point("10").is_err());
    assert!(parse_point("a,b").is_err());
    assert!(parse_point("").is_err());
}

#[test]
fn reconnect_failure_message() {
    assert_eq!(CliError::ReconnectFailed(5).to_string(), "reconnection failed after 5 attempts");
}
