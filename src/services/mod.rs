//! Canvas services used by the websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! `session` is the only module routes talk to. The rest are the pieces it
//! owns: colors and presence (`palette`, `registry`), drawing state
//! (`stroke_log`, `history`), and per-connection delivery (`relay`). None of
//! them lock or spawn; the session's caller holds the lock.

pub mod history;
pub mod palette;
pub mod registry;
pub mod relay;
pub mod session;
pub mod stroke_log;
