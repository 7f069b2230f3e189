//! Reconnect backoff for long-lived `watch` sessions.
//!
//! Attempt `n` (1-based) waits `min(1000 * 2^n, 10000)` ms. After
//! `MAX_ATTEMPTS` consecutive failures the caller gives up. Any successful
//! connection resets the counter.

use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 5;

const BASE_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Default)]
pub struct Backoff {
    attempts: u32,
}

impl Backoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before the next attempt, or `None` once attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= MAX_ATTEMPTS {
            return None;
        }
        self.attempts += 1;
        Some(delay_for(self.attempts))
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[must_use]
pub fn delay_for(attempt: u32) -> Duration {
    let ms = 2u64
        .checked_pow(attempt)
        .map_or(MAX_DELAY_MS, |factor| BASE_DELAY_MS.saturating_mul(factor))
        .min(MAX_DELAY_MS);
    Duration::from_millis(ms)
}

#[cfg(test)]
#[path = "reconnect_test.rs"]
mod tests;
