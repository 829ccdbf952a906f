//! # Decode Coordinator
//!
//! Single-flight scheduler for decode calls. Point edits arrive faster than the model can
//! decode, so at most one decode runs at a time and any number of requests made while it
//! runs collapse into one rerun.
//!
//! ```text
//!                request                      request
//!   Idle ───────────────────▶ Running ───────────────────▶ RunningWithPendingRerun
//!    ▲      (Dispatch)           │          (Coalesced)              │    ▲
//!    │                           │ complete                          │    │ request
//!    └───────────────────────────┘ (Settled)                         │    └ (Coalesced)
//!    ▲                                                               │
//!    └───────────────────────────────────────────────────────────────┘
//!                      complete (Rerun): caller requests again
//! ```
//!
//! The coordinator never reads points itself. The caller snapshots the point list when
//! it acts on `Dispatch`, so a rerun always sees the latest state.

use tracing::debug;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePhase {
    #[default]
    Idle,
    Running,
    RunningWithPendingRerun,
}

/// Answer to a decode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRequest {
    /// Nothing was running; the caller must issue exactly one decode call now.
    Dispatch,
    /// A decode is running; the request was folded into its rerun.
    Coalesced,
}

/// Answer to a decode completion, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSettle {
    /// No request arrived while running.
    Settled,
    /// At least one request arrived while running; the caller must request again.
    Rerun,
}

/// Three-state single-flight decode scheduler.
#[derive(Debug, Default)]
pub struct DecodeCoordinator {
    phase: DecodePhase,
    dispatched: u64,
    coalesced: u64,
}

impl DecodeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) -> DecodeRequest {
        match self.phase {
            DecodePhase::Idle => {
                self.phase = DecodePhase::Running;
                self.dispatched += 1;
                DecodeRequest::Dispatch
            }
            DecodePhase::Running | DecodePhase::RunningWithPendingRerun => {
                self.phase = DecodePhase::RunningWithPendingRerun;
                self.coalesced += 1;
                debug!(coalesced = self.coalesced, "decode request coalesced");
                DecodeRequest::Coalesced
            }
        }
    }

    /// Release the running slot. Must be called once per `Dispatch`, after success or failure.
    pub fn complete(&mut self) -> DecodeSettle {
        let settle = match self.phase {
            DecodePhase::RunningWithPendingRerun => DecodeSettle::Rerun,
            DecodePhase::Running | DecodePhase::Idle => DecodeSettle::Settled,
        };
        self.phase = DecodePhase::Idle;
        settle
    }

    /// Forget a pending rerun without touching the running call.
    pub fn discard_pending(&mut self) {
        if self.phase == DecodePhase::RunningWithPendingRerun {
            debug!("pending decode rerun discarded");
            self.phase = DecodePhase::Running;
        }
    }

    pub fn phase(&self) -> DecodePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != DecodePhase::Idle
    }

    /// Number of requests that resulted in a decode call.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Number of requests folded into a rerun.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_request_dispatches() {
        let mut c = DecodeCoordinator::new();
        assert_eq!(c.request(), DecodeRequest::Dispatch);
        assert_eq!(c.phase(), DecodePhase::Running);
        assert_eq!(c.complete(), DecodeSettle::Settled);
        assert_eq!(c.phase(), DecodePhase::Idle);
    }

    #[test]
    fn test_burst_collapses_into_one_rerun() {
        let mut c = DecodeCoordinator::new();
        assert_eq!(c.request(), DecodeRequest::Dispatch);
        for _ in 0..5 {
            assert_eq!(c.request(), DecodeRequest::Coalesced);
        }
        assert_eq!(c.phase(), DecodePhase::RunningWithPendingRerun);

        assert_eq!(c.complete(), DecodeSettle::Rerun);
        assert_eq!(c.request(), DecodeRequest::Dispatch);
        assert_eq!(c.complete(), DecodeSettle::Settled);

        assert_eq!(c.dispatched(), 2);
        assert_eq!(c.coalesced(), 5);
    }

    #[test]
    fn test_discard_pending_keeps_running() {
        let mut c = DecodeCoordinator::new();
        c.request();
        c.request();
        c.discard_pending();
        assert_eq!(c.phase(), DecodePhase::Running);
        assert_eq!(c.complete(), DecodeSettle::Settled);
        assert!(!c.is_running());
    }

    #[test]
    fn test_discard_pending_when_idle_is_noop() {
        let mut c = DecodeCoordinator::new();
        c.discard_pending();
        assert_eq!(c.phase(), DecodePhase::Idle);
    }
}
