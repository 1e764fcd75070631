// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Reified stream events.
//!
//! The subscriber callbacks are the primary delivery path; [`Signal`] exists
//! for the places that need events as data, such as recording probes, queued
//! emitters and signal-level logging.

use crate::error::FluxError;

/// One event observed on a stream, as a value.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// An item was delivered.
    Next(T),
    /// The stream failed. No further events follow.
    Error(FluxError),
    /// The stream finished normally. No further events follow.
    Complete,
}

impl<T> Signal<T> {
    /// Returns `true` for [`Signal::Next`].
    pub fn is_next(&self) -> bool {
        matches!(self, Self::Next(_))
    }

    /// Returns `true` for [`Signal::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns `true` for [`Signal::Complete`].
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Returns `true` for the two signals that end a stream.
    pub fn is_terminal(&self) -> bool {
        !self.is_next()
    }

    /// Extracts the item from a [`Signal::Next`], if that is what this is.
    pub fn into_next(self) -> Option<T> {
        match self {
            Self::Next(item) => Some(item),
            _ => None,
        }
    }

    /// Borrows the item from a [`Signal::Next`], if that is what this is.
    pub fn as_next(&self) -> Option<&T> {
        match self {
            Self::Next(item) => Some(item),
            _ => None,
        }
    }

    /// Borrows the error from a [`Signal::Error`], if that is what this is.
    pub fn as_error(&self) -> Option<&FluxError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Applies `f` to the item of a [`Signal::Next`], passing terminal
    /// signals through unchanged.
    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Next(item) => Signal::Next(f(item)),
            Self::Error(error) => Signal::Error(error),
            Self::Complete => Signal::Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Signal::Next(1).is_next());
        assert!(Signal::<i32>::Error(FluxError::Empty).is_error());
        assert!(Signal::<i32>::Complete.is_complete());
        assert!(Signal::<i32>::Complete.is_terminal());
        assert!(!Signal::Next(1).is_terminal());
    }

    #[test]
    fn map_transforms_only_items() {
        let doubled = Signal::Next(21).map(|n| n * 2);
        assert_eq!(doubled.into_next(), Some(42));

        let passed = Signal::<i32>::Complete.map(|n| n * 2);
        assert!(passed.is_complete());
    }

    #[test]
    fn accessors_return_none_for_other_arms() {
        let signal = Signal::<i32>::Error(FluxError::Empty);

        assert!(signal.as_next().is_none());
        assert!(signal.as_error().is_some());
    }
}
