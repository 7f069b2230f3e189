//! Frame — the wire envelope for every WebSocket message.
//!
//! ARCHITECTURE
//! ============
//! Clients and the server exchange JSON text messages shaped as
//! `{ "event": "...", "ts": 1700000000000, "data": ... }`. The envelope is
//! deliberately dumb: it carries an event name and an opaque payload. Typed
//! decoding into domain events lives in `events`, so the transport never
//! inspects `data`.
//!
//! DESIGN
//! ======
//! - `ts` is stamped at construction on outbound frames and optional inbound.
//! - `data` is omitted from the JSON when it is null (`remote-clear-canvas`).

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// The universal message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    /// Milliseconds since Unix epoch.
    #[serde(default)]
    pub ts: i64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// Current time as milliseconds since Unix epoch.
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    /// Create a frame carrying a payload.
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self { event: event.into(), ts: now_ms(), data }
    }

    /// Create a frame with no payload.
    pub fn bare(event: impl Into<String>) -> Self {
        Self::new(event, serde_json::Value::Null)
    }

    /// Serialize a payload into a new frame. Falls back to a bare frame if the
    /// payload cannot be represented as JSON, which never happens for the
    /// derive-based payloads in this crate.
    pub fn encode<T: Serialize>(event: impl Into<String>, payload: &T) -> Self {
        let data = serde_json::to_value(payload).unwrap_or_default();
        Self::new(event, data)
    }

    /// Parse a frame from a WebSocket text message.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not a valid envelope.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Render the frame as a WebSocket text payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
