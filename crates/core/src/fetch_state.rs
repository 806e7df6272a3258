//! Remote fetch states and their failure taxonomy.

use serde::{Deserialize, Serialize};
use crate::source::{NormalizedProgress, ProgressSource};
use crate::id::SourceId;

/// Classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Transport or connectivity failure, non-success status, or timeout
    NetworkError,
    /// Body is not JSON or the content type is missing/wrong
    MalformedResponse,
    /// JSON is well-formed but semantically invalid
    ValidationError,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::NetworkError => write!(f, "network error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::ValidationError => write!(f, "validation error"),
        }
    }
}

/// Why a fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct FetchError {
    /// Failure class
    pub kind: FailureKind,

    /// Human-readable detail
    pub message: String,
}

impl FetchError {
    /// Transport level failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::NetworkError, message: message.into() }
    }

    /// Response that is not JSON.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::MalformedResponse, message: message.into() }
    }

    /// JSON that does not carry the expected fields.
    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::ValidationError, message: message.into() }
    }
}

/// State of one remote data binding.
///
/// Per request the state only moves forward: `Loading` then `Ready` or
/// `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FetchState<P> {
    /// Nothing requested yet
    Idle,
    /// Request in flight
    Loading,
    /// Payload received and validated
    Ready(P),
    /// Request failed
    Failed(FetchError),
}

impl<P> FetchState<P> {
    /// Whether a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Whether the state holds a payload.
    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    /// Whether the last request failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }

    /// The payload, if ready.
    pub fn payload(&self) -> Option<&P> {
        match self {
            FetchState::Ready(payload) => Some(payload),
            _ => None,
        }
    }

    /// The failure, if failed.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading => "loading",
            FetchState::Ready(_) => "ready",
            FetchState::Failed(_) => "failed",
        }
    }
}

impl<P> Default for FetchState<P> {
    fn default() -> Self {
        FetchState::Idle
    }
}

/// Payloads that describe a progress value.
pub trait IntoProgressSource {
    /// Build the progress source this payload describes.
    fn to_progress_source(&self, id: &SourceId) -> ProgressSource;
}

/// What the render layer receives for a remotely fed progress widget.
///
/// `error` keeps "failed to load" apart from a legitimate 0%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    /// Normalized progress; the zero fallback when not ready
    pub progress: NormalizedProgress,

    /// Set when the fetch failed
    pub error: Option<FetchError>,

    /// Set while a request is in flight or none was made yet
    pub loading: bool,
}

impl ProgressView {
    /// Whether an error label should be rendered.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
