//! Confirmation window state machine
//!
//! The countdown loop never auto-closes the window: when it reaches the
//! last second it forces a price refresh, then restarts. Only the user
//! (confirm or cancel) moves the window to [`ConfirmPhase::Closed`].

use serde::{Deserialize, Serialize};

/// Phase of the swap confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmPhase {
    /// No confirmation dialog has been opened.
    Idle,
    /// Dialog open, counting down toward a forced price refresh.
    CountingDown,
    /// Countdown elapsed; prices are re-fetched before the countdown restarts.
    RefreshingBeforeRestart,
    /// Dialog dismissed, by confirm or cancel.
    Closed,
}

impl Default for ConfirmPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Confirmation dialog state visible to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationWindow {
    pub phase: ConfirmPhase,
    /// Seconds left before the forced refresh
    pub seconds_remaining: u32,
    /// True while the forced refresh/restart is in progress; confirm is
    /// rejected whenever this is set
    pub confirm_disabled: bool,
}

impl ConfirmationWindow {
    /// A window that has never been opened.
    pub fn idle(countdown_secs: u32) -> Self {
        Self {
            phase: ConfirmPhase::Idle,
            seconds_remaining: countdown_secs,
            confirm_disabled: false,
        }
    }

    /// Open the window and start counting down.
    pub fn open(countdown_secs: u32) -> Self {
        Self {
            phase: ConfirmPhase::CountingDown,
            seconds_remaining: countdown_secs,
            confirm_disabled: false,
        }
    }

    /// A dismissed window, with the countdown reset for the next open.
    pub fn closed(countdown_secs: u32) -> Self {
        Self {
            phase: ConfirmPhase::Closed,
            seconds_remaining: countdown_secs,
            confirm_disabled: false,
        }
    }

    /// Whether the dialog is currently on screen.
    pub fn is_open(&self) -> bool {
        matches!(
            self.phase,
            ConfirmPhase::CountingDown | ConfirmPhase::RefreshingBeforeRestart
        )
    }
}
