//! Card interaction state machine
//!
//! ```text
//!   Idle ──begin──▶ Recording ──submit──▶ Verifying ──verdict──▶ ShowingResult
//!    ▲                 │                                             │
//!    └─────abort───────┘◀──────────────begin (clears result)─────────┤
//!    └────────────────────────────expire─────────────────────────────┘
//! ```

/// Outcome of a verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Pronounced correctly
    Correct,
    /// Pronounced incorrectly
    Incorrect,
}

impl From<bool> for Verdict {
    fn from(correct: bool) -> Self {
        if correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

/// Where a card is in its interaction cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardState {
    /// Waiting for input
    #[default]
    Idle,
    /// Microphone open, capturing the learner
    Recording,
    /// Recording submitted, waiting for a verdict
    Verifying,
    /// Verdict on display until it expires
    ShowingResult(Verdict),
}

impl CardState {
    /// Whether a recording or verification cycle is in flight
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Recording | Self::Verifying)
    }
}

/// Guarded transitions for one card
///
/// Each transition returns whether it was accepted; rejected transitions
/// leave the state untouched. Results carry an epoch so a late expiry for
/// an old result cannot clear a newer one.
#[derive(Debug, Default)]
pub struct CardMachine {
    state: CardState,
    epoch: u64,
}

impl CardMachine {
    /// Create a machine in `Idle`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CardState::Idle,
            epoch: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> CardState {
        self.state
    }

    /// Whether reference playback is allowed
    #[must_use]
    pub const fn can_play(&self) -> bool {
        !self.state.is_busy()
    }

    /// Enter `Recording`, clearing any displayed result
    pub fn begin_recording(&mut self) -> bool {
        if self.state.is_busy() {
            return false;
        }
        self.state = CardState::Recording;
        true
    }

    /// Leave `Recording` without submitting anything
    pub fn abort_recording(&mut self) -> bool {
        if self.state != CardState::Recording {
            return false;
        }
        self.state = CardState::Idle;
        true
    }

    /// Move a finished recording into `Verifying`
    pub fn submit(&mut self) -> bool {
        if self.state != CardState::Recording {
            return false;
        }
        self.state = CardState::Verifying;
        true
    }

    /// Record the verdict; returns the epoch of the new result
    pub fn complete(&mut self, verdict: Verdict) -> Option<u64> {
        if self.state != CardState::Verifying {
            return None;
        }
        self.epoch += 1;
        self.state = CardState::ShowingResult(verdict);
        Some(self.epoch)
    }

    /// Return to `Idle` if the result from `epoch` is still on display
    pub fn expire(&mut self, epoch: u64) -> bool {
        if !matches!(self.state, CardState::ShowingResult(_)) || self.epoch != epoch {
            return false;
        }
        self.state = CardState::Idle;
        true
    }
}
