//! Controller phase machine.
//!
//! The control loop moves through a fixed ring of phases each cycle:
//!
//! ```text
//!  STARTUP ──▶ READING ──▶ EVALUATING ──▶ IDLING ──▶ READING ──▶ …
//!                            │    ▲
//!                            ▼    │
//!                     NOTIFYING / WATERING
//! ```
//!
//! [`PhaseTracker`] holds the current phase, checks each move against the
//! transition table, and keeps per-phase entry counters for tests and
//! telemetry.  It carries no per-cycle data; the controller's cycle
//! snapshot lives on the stack of `run_cycle`.

use log::debug;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// What the controller is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    Startup = 0,
    Reading = 1,
    Evaluating = 2,
    Notifying = 3,
    Watering = 4,
    Idling = 5,
}

impl Phase {
    /// Total number of phases — used to size the counter array.
    pub const COUNT: usize = 6;

    pub const fn name(self) -> &'static str {
        match self {
            Self::Startup => "Startup",
            Self::Reading => "Reading",
            Self::Evaluating => "Evaluating",
            Self::Notifying => "Notifying",
            Self::Watering => "Watering",
            Self::Idling => "Idling",
        }
    }

    /// Transition table.  `Startup` is reachable from every phase so an
    /// interrupted cycle can be abandoned.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::{Evaluating, Idling, Notifying, Reading, Startup, Watering};
        matches!(
            (self, next),
            (_, Startup)
                | (Startup | Evaluating | Idling, Reading)
                | (Reading | Notifying | Watering, Evaluating)
                | (Evaluating, Notifying | Watering | Idling)
        )
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub struct PhaseTracker {
    current: Phase,
    entries: [u64; Phase::COUNT],
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: Phase::Startup,
            entries: [0; Phase::COUNT],
        }
    }

    /// Move to `next`.  Returns the previous phase, or `None` if the
    /// tracker was already there.
    pub fn enter(&mut self, next: Phase) -> Option<Phase> {
        if next == self.current {
            return None;
        }
        debug_assert!(
            self.current.can_transition_to(next),
            "illegal phase transition {:?} -> {:?}",
            self.current,
            next
        );
        debug!("phase: {} -> {}", self.current.name(), next.name());

        let prev = self.current;
        self.current = next;
        self.entries[next as usize] += 1;
        Some(prev)
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    /// How many times `phase` has been entered.
    pub fn entries(&self, phase: Phase) -> u64 {
        self.entries[phase as usize]
    }
}
