//! Quiz attempts: multiple-choice, date/event, and historical-figures matching.
//!
//! Each variant fetches a fresh question set, collects answers locally, and
//! submits them in one batch. Scores always come from the backend.

pub mod events;
pub mod mcq;
pub mod personalities;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delay before a multiple-choice question auto-advances.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(2000);

/// Errors from driving a quiz attempt locally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("the quiz has no questions")]
    Empty,
    #[error("question {0} was already answered")]
    AlreadyAnswered(usize),
    #[error("option {index} is out of range ({available} options)")]
    OptionOutOfRange { index: usize, available: usize },
    #[error("no question with id {0}")]
    UnknownQuestion(i64),
    #[error("slot {index} is out of range ({available} slots)")]
    SlotOutOfRange { index: usize, available: usize },
    #[error("no personality with id {0}")]
    UnknownPersonality(i64),
    #[error("the attempt was already submitted")]
    AlreadySubmitted,
}

/// Why a submission was held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitGate {
    /// The question at this index has no answer yet.
    Unanswered(usize),
    AlreadySubmitted,
}

/// `{question_id, correct}` as graded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedItem {
    pub question_id: i64,
    #[serde(default)]
    pub correct: bool,
}

/// Visible countdown driving the auto-advance.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    total: Duration,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(AUTO_ADVANCE_DELAY)
    }
}

impl Countdown {
    pub fn new(total: Duration) -> Self {
        Self { total }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    /// Percent of the countdown bar still filled after `elapsed`.
    pub fn remaining_percent(&self, elapsed: Duration) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        let fraction = elapsed.as_secs_f64() / self.total.as_secs_f64();
        (100.0 * (1.0 - fraction)).max(0.0)
    }

    pub fn is_done(&self, elapsed: Duration) -> bool {
        elapsed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_drains_linearly() {
        let c = Countdown::default();
        assert_eq!(c.remaining_percent(Duration::ZERO), 100.0);
        assert!((c.remaining_percent(Duration::from_millis(500)) - 75.0).abs() < 1e-9);
        assert_eq!(c.remaining_percent(Duration::from_millis(2000)), 0.0);
        assert_eq!(c.remaining_percent(Duration::from_millis(5000)), 0.0);
        assert!(!c.is_done(Duration::from_millis(1999)));
        assert!(c.is_done(Duration::from_millis(2000)));
    }

    #[test]
    fn zero_countdown_is_empty() {
        let c = Countdown::new(Duration::ZERO);
        assert_eq!(c.remaining_percent(Duration::ZERO), 0.0);
        assert!(c.is_done(Duration::ZERO));
    }
}
