// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lifecycle gate guaranteeing that a stream terminates at most once.

use std::sync::atomic::{AtomicU8, Ordering};

/// The lifecycle phase of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Items may still flow.
    Active,
    /// The producer delivered `on_complete`.
    Completed,
    /// The producer delivered `on_error`.
    Errored,
    /// The subscriber cancelled; nothing further is delivered.
    Cancelled,
}

impl StreamState {
    /// Returns `true` for every phase except [`StreamState::Active`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Atomic terminal-state gate for one subscription.
///
/// Producers race cancellation, completion and errors against each other;
/// whichever calls [`Status::finish`] first wins and every later attempt is
/// rejected. This is what makes `on_error` / `on_complete` mutually exclusive
/// and cancellation idempotent.
#[derive(Debug)]
pub struct Status {
    state: AtomicU8,
}

const ACTIVE: u8 = 0;
const COMPLETED: u8 = 1;
const ERRORED: u8 = 2;
const CANCELLED: u8 = 3;

impl Status {
    /// Creates a gate in the [`StreamState::Active`] phase.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ACTIVE),
        }
    }

    /// Current phase.
    pub fn get(&self) -> StreamState {
        match self.state.load(Ordering::Acquire) {
            ACTIVE => StreamState::Active,
            COMPLETED => StreamState::Completed,
            ERRORED => StreamState::Errored,
            _ => StreamState::Cancelled,
        }
    }

    /// Returns `true` while no terminal event has been recorded.
    pub fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }

    /// Returns `true` once any terminal event has been recorded.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns `true` when the recorded terminal event was a cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Attempts to move from [`StreamState::Active`] into `terminal`.
    ///
    /// Returns `true` when this call won the race and the caller owns the
    /// right to deliver the matching terminal signal, `false` when another
    /// outcome was recorded first.
    ///
    /// # Panics
    /// Debug builds panic when `terminal` is [`StreamState::Active`].
    pub fn finish(&self, terminal: StreamState) -> bool {
        debug_assert!(terminal.is_terminal(), "finish requires a terminal state");
        let encoded = match terminal {
            StreamState::Active => return false,
            StreamState::Completed => COMPLETED,
            StreamState::Errored => ERRORED,
            StreamState::Cancelled => CANCELLED,
        };
        self.state
            .compare_exchange(ACTIVE, encoded, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_active() {
        let status = Status::new();

        assert!(status.is_active());
        assert_eq!(status.get(), StreamState::Active);
    }

    #[test]
    fn first_terminal_event_wins() {
        let status = Status::new();

        assert!(status.finish(StreamState::Completed));
        assert!(!status.finish(StreamState::Errored));
        assert_eq!(status.get(), StreamState::Completed);
    }

    #[test]
    fn cancellation_is_idempotent() {
        let status = Status::new();

        assert!(status.finish(StreamState::Cancelled));
        assert!(!status.finish(StreamState::Cancelled));
        assert!(status.is_cancelled());
    }

    #[test]
    fn terminal_classification() {
        assert!(!StreamState::Active.is_terminal());
        assert!(StreamState::Completed.is_terminal());
        assert!(StreamState::Errored.is_terminal());
        assert!(StreamState::Cancelled.is_terminal());
    }
}
