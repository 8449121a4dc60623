//! Error taxonomy for tree building.

use thiserror::Error;

use crate::runtime::ObjectId;
use crate::types::Name;

/// Failure while reflecting on the live program. Always recoverable: the item is skipped
/// and a warning is recorded.
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The name no longer refers to anything live.
    #[error("unresolved name {0}")]
    UnresolvedName(Name),

    /// Handle does not belong to this runtime.
    #[error("unknown object handle #{0}")]
    UnknownHandle(ObjectId),

    /// The entity raised while being inspected.
    #[error("failed to inspect {subject}: {reason}")]
    Inspect { subject: String, reason: String },

    /// Signature metadata does not line up with the method's real parameters.
    #[error("malformed signature for {owner}#{method}: {reason}")]
    MalformedSignature {
        owner: String,
        method: String,
        reason: String,
    },
}

impl IntrospectError {
    pub fn inspect(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Inspect {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

/// Error surfaced by the traversal engine or a listener.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Soft: converted into a warning, traversal continues.
    #[error(transparent)]
    Introspect(#[from] IntrospectError),

    /// Fatal: a listener (trusted configuration) failed. Aborts the traversal.
    #[error("listener `{listener}` failed: {source}")]
    Listener {
        listener: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl BuildError {
    pub fn listener(listener: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Listener {
            listener,
            source: source.into(),
        }
    }

    pub fn is_soft(&self) -> bool {
        matches!(self, BuildError::Introspect(_))
    }
}
