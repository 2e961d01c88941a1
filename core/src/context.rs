//! Per-call deadlines.

use std::time::{Duration, Instant};

use crate::error::ApiError;

/// Bounds a single call. The transport aborts the in-flight request once
/// the deadline passes; a call started after the deadline is not sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    deadline: Option<Instant>,
}

impl Context {
    /// No deadline. The transport's own timeouts still apply.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, or `DeadlineExceeded` if it passed.
    pub fn remaining(&self) -> Result<Option<Duration>, ApiError> {
        let Some(deadline) = self.deadline else {
            return Ok(None);
        };
        let now = Instant::now();
        if deadline <= now {
            return Err(ApiError::DeadlineExceeded);
        }
        Ok(Some(deadline - now))
    }
}
