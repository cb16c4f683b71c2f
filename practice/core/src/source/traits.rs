//! Sequence Source Traits
//!
//! The fetch contract between the engine and whatever serves sequences.
//! A fetch either yields a validated [`Sequence`] or fails with one of two
//! classifications. The engine never retries; classification only decides
//! what the surface tells the player.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sequence::{Sequence, SequenceId};

/// Classification of a failed fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The sequence id does not exist
    NotFound,
    /// Anything else went wrong getting the sequence
    Transport,
}

impl FailureKind {
    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::Transport => "transport error",
        }
    }
}

/// Error returned by [`SequenceSource::fetch`]
#[derive(Debug, Error)]
pub enum FetchError {
    /// The sequence id is not known to the source
    #[error("sequence '{0}' not found")]
    NotFound(SequenceId),

    /// The fetch failed for any other reason
    #[error("failed to fetch sequence: {0}")]
    Transport(String),
}

impl FetchError {
    /// Build a transport error from anything displayable
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Classification of this error
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Transport(_) => FailureKind::Transport,
        }
    }
}

/// Supplier of practice sequences
///
/// Implement this trait to plug in a different library backend.
#[async_trait]
pub trait SequenceSource: Send + Sync {
    /// Source name for logs (e.g., "http", "catalog")
    fn name(&self) -> &str;

    /// Fetch a sequence by id
    async fn fetch(&self, id: &SequenceId) -> Result<Sequence, FetchError>;
}

#[async_trait]
impl<S: SequenceSource + ?Sized> SequenceSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, id: &SequenceId) -> Result<Sequence, FetchError> {
        (**self).fetch(id).await
    }
}

#[async_trait]
impl<S: SequenceSource + ?Sized> SequenceSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, id: &SequenceId) -> Result<Sequence, FetchError> {
        (**self).fetch(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kind() {
        assert_eq!(
            FetchError::NotFound("x".into()).kind(),
            FailureKind::NotFound
        );
        assert_eq!(
            FetchError::transport("connection refused").kind(),
            FailureKind::Transport
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::NotFound("moon-flow".into());
        assert_eq!(err.to_string(), "sequence 'moon-flow' not found");
    }
}
