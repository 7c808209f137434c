//! Progress reporting and cancellation
//!
//! An algorithm reports through a `Feedback` and polls it for cancellation
//! once per feature.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::utils::progress::ProgressTracker;

/// Sink for progress and messages of a run
pub trait Feedback {
    /// Percentage complete, 0 to 100
    fn set_progress(&mut self, percent: u32);

    /// Whether the user asked to stop
    fn is_canceled(&self) -> bool;

    /// Informational message for the user
    fn push_info(&mut self, message: &str);

    /// Recoverable problem worth showing the user
    fn push_warning(&mut self, message: &str) {
        warn!("{}", message);
    }
}

/// Shared cancellation flag
///
/// Clones share the flag, so another thread (or a signal handler) can
/// cancel a run in progress.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Feedback that records everything, for library use and tests
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    pub progress: Vec<u32>,
    pub messages: Vec<String>,
    pub warnings: Vec<String>,
    token: CancellationToken,
    /// Report cancellation once this many polls said "keep going"
    cancel_after: Option<usize>,
    polls: Cell<usize>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feedback tied to an external cancellation token
    pub fn with_token(token: CancellationToken) -> Self {
        RecordingFeedback { token, ..Self::default() }
    }

    /// Feedback that cancels before feature `polls` (0-based)
    pub fn cancel_after(polls: usize) -> Self {
        RecordingFeedback { cancel_after: Some(polls), ..Self::default() }
    }
}

impl Feedback for RecordingFeedback {
    fn set_progress(&mut self, percent: u32) {
        self.progress.push(percent);
    }

    fn is_canceled(&self) -> bool {
        let polls = self.polls.get();
        self.polls.set(polls + 1);
        self.token.is_cancelled() || self.cancel_after.is_some_and(|limit| polls >= limit)
    }

    fn push_info(&mut self, message: &str) {
        info!("{}", message);
        self.messages.push(message.to_string());
    }

    fn push_warning(&mut self, message: &str) {
        warn!("{}", message);
        self.warnings.push(message.to_string());
    }
}

/// Terminal progress bar feedback for the command line
pub struct ProgressFeedback {
    tracker: ProgressTracker,
    token: CancellationToken,
}

impl ProgressFeedback {
    pub fn new(description: &str, token: CancellationToken) -> Self {
        ProgressFeedback {
            tracker: ProgressTracker::new(100, description),
            token,
        }
    }

    /// Same reporting without drawing a bar
    pub fn hidden(token: CancellationToken) -> Self {
        ProgressFeedback {
            tracker: ProgressTracker::hidden(),
            token,
        }
    }

    pub fn finish(&self) {
        self.tracker.finish();
    }

    pub fn abandon(&self, message: &str) {
        self.tracker.abandon(message);
    }
}

impl Feedback for ProgressFeedback {
    fn set_progress(&mut self, percent: u32) {
        self.tracker.set_position(percent.min(100) as u64);
    }

    fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn push_info(&mut self, message: &str) {
        info!("{}", message);
        self.tracker.set_message(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let feedback = RecordingFeedback::with_token(token.clone());

        assert!(!feedback.is_canceled());
        token.cancel();
        assert!(feedback.is_canceled());
    }

    #[test]
    fn cancel_after_counts_polls() {
        let feedback = RecordingFeedback::cancel_after(2);
        assert!(!feedback.is_canceled());
        assert!(!feedback.is_canceled());
        assert!(feedback.is_canceled());
    }

    #[test]
    fn progress_feedback_clamps() {
        let mut feedback = ProgressFeedback::hidden(CancellationToken::new());
        feedback.set_progress(250);
        assert_eq!(feedback.tracker.position(), 100);
    }
}
