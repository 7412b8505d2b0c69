//! Reconnection rules for the event stream.
//!
//! Pure functions, no side effects.

use std::time::Duration;

use crate::error::SseError;

/// Check if the stream must not be reopened at all based on the error type.
///
/// # Returns
///
/// `true` if the error requires giving up immediately (rejected credentials),
/// `false` otherwise
pub fn should_stop_immediately(error: &SseError) -> bool {
    matches!(error, SseError::Unauthorized)
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The stream error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &SseError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_stop_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}

/// Delay before the next attempt: the server's `retry` value when it sent one,
/// the configured interval otherwise
pub fn reconnect_delay(configured: Duration, server_retry: Option<Duration>) -> Duration {
    server_retry.unwrap_or(configured)
}
