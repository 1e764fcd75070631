// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the efflux streaming engine.
//!
//! Every failure that travels through a stream is a [`FluxError`]. The enum is
//! cheap to clone so that a single upstream failure can be fanned out to any
//! number of downstream subscribers without reconstructing it.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Error type for all efflux operations.
///
/// Errors are delivered to subscribers through
/// [`Subscriber::on_error`](crate::Subscriber::on_error) and terminate the
/// stream that produced them. They can also surface as the `Err` arm of
/// blocking calls such as `block_last`.
#[derive(Debug, Clone, Error)]
pub enum FluxError {
    /// An item-level transformation rejected or failed on a specific element.
    ///
    /// Raised by fallible operators such as `try_map` when a closure returns
    /// `Err` for one item. The stream terminates; items already delivered
    /// stay delivered.
    #[error("processing error: {context}")]
    Processing {
        /// Description of the item or rule that failed.
        context: String,
    },

    /// The source itself failed while producing items.
    ///
    /// Raised by programmatic sources (`Flux::create` emitters, callables)
    /// when production cannot continue.
    #[error("source error: {context}")]
    Source {
        /// Description of the failure reported by the source.
        context: String,
    },

    /// A stream that was required to produce at least one item completed
    /// without producing any.
    #[error("sequence completed without emitting any item")]
    Empty,

    /// A producer had an item ready but no outstanding demand to spend.
    ///
    /// Raised by time-driven sources such as `interval` when a tick fires
    /// while the subscriber has not requested anything.
    #[error("demand overflow: {context}")]
    Overflow {
        /// Description of the producer that could not emit.
        context: String,
    },

    /// A blocking wait gave up before the stream reached a terminal state.
    #[error("timed out after {elapsed:?} waiting for the stream to terminate")]
    Timeout {
        /// How long the caller waited before giving up.
        elapsed: Duration,
    },

    /// An application error adopted into the stream unchanged.
    #[error("{0}")]
    Custom(Arc<dyn std::error::Error + Send + Sync>),
}

impl FluxError {
    /// Creates a [`FluxError::Processing`] error.
    ///
    /// # Arguments
    /// * `context` - Description of the item or rule that failed
    pub fn processing(context: impl Into<String>) -> Self {
        Self::Processing {
            context: context.into(),
        }
    }

    /// Creates a [`FluxError::Source`] error.
    ///
    /// # Arguments
    /// * `context` - Description of the failure reported by the source
    pub fn source(context: impl Into<String>) -> Self {
        Self::Source {
            context: context.into(),
        }
    }

    /// Creates a [`FluxError::Overflow`] error.
    ///
    /// # Arguments
    /// * `context` - Description of the producer that could not emit
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }

    /// Creates a [`FluxError::Timeout`] error.
    ///
    /// # Arguments
    /// * `elapsed` - How long the caller waited before giving up
    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed }
    }

    /// Adopts an arbitrary application error into the stream.
    ///
    /// # Arguments
    /// * `error` - The error to carry; shared behind an [`Arc`] so the
    ///   resulting [`FluxError`] stays cloneable
    pub fn custom(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(error))
    }

    /// Returns `true` when the error marks an empty required sequence.
    pub fn is_empty_sequence(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` when the error came from a blocking wait that expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for efflux operations.
pub type Result<T> = std::result::Result<T, FluxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let error = FluxError::processing("item 7 rejected");

        assert_eq!(error.to_string(), "processing error: item 7 rejected");
    }

    #[test]
    fn custom_errors_display_the_inner_error() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "device gone");
        let error = FluxError::custom(inner);

        assert_eq!(error.to_string(), "device gone");
    }

    #[test]
    fn clones_share_the_custom_payload() {
        let error = FluxError::custom(std::io::Error::new(std::io::ErrorKind::Other, "once"));
        let clone = error.clone();

        assert_eq!(error.to_string(), clone.to_string());
    }

    #[test]
    fn classification_helpers() {
        assert!(FluxError::Empty.is_empty_sequence());
        assert!(FluxError::timeout(Duration::from_millis(5)).is_timeout());
        assert!(!FluxError::source("boom").is_timeout());
    }
}
