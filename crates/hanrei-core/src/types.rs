//! ============================================================================
//! Core Types for the Soul
//! ============================================================================
//! Capability switches, lifecycle state and the error type shared by every
//! collaborator client.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Result alias used at every collaborator boundary
pub type SoulResult<T> = Result<T, SoulError>;

/// Error types for the soul and its backends
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SoulError {
    /// A credential or required field is missing
    #[error("Not configured: {0}")]
    ConfigAbsent(&'static str),

    /// Network failure or non-2xx response from a configured backend
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// Remote answered with an unexpected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// One-time capability probe failed
    #[error("Initialization failed: {0}")]
    InitFailure(String),
}

impl SoulError {
    /// Wrap a transport error from reqwest
    pub(crate) fn remote(context: &str, err: reqwest::Error) -> Self {
        SoulError::RemoteUnavailable(format!("{}: {}", context, err))
    }

    /// Build an error from a non-success HTTP status and its body
    pub(crate) fn status(service: &str, status: reqwest::StatusCode, body: &str) -> Self {
        SoulError::RemoteUnavailable(format!("{} error {}: {}", service, status, body))
    }
}

/// A backend that is either switched off or holds a live handle.
///
/// Decided once during `Soul::init`; per-call code branches on the variant
/// instead of re-checking configuration.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Disabled,
    Enabled(T),
}

impl<T> Capability<T> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Capability::Enabled(_))
    }

    pub fn enabled(&self) -> Option<&T> {
        match self {
            Capability::Disabled => None,
            Capability::Enabled(inner) => Some(inner),
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Capability::Enabled(inner),
            None => Capability::Disabled,
        }
    }
}

/// Lifecycle of a Soul instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoulStatus {
    Uninitialized,
    Initializing,
    /// `degraded` is set when at least one backend is disabled
    Ready { degraded: bool },
    Failed,
}

impl SoulStatus {
    /// Whether per-turn operations are expected to run against live backends
    pub fn is_ready(&self) -> bool {
        matches!(self, SoulStatus::Ready { .. })
    }
}

impl std::fmt::Display for SoulStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoulStatus::Uninitialized => write!(f, "Uninitialized"),
            SoulStatus::Initializing => write!(f, "Initializing"),
            SoulStatus::Ready { degraded: false } => write!(f, "Ready(full)"),
            SoulStatus::Ready { degraded: true } => write!(f, "Ready(degraded)"),
            SoulStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Long-term memory mode, as reported in the startup summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryMode {
    /// No vector store; only the host's short-term cache remembers anything
    CacheOnly,
    /// Vector store reachable in addition to the host cache
    LongAndCache,
}

impl std::fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryMode::CacheOnly => write!(f, "Cache-Only"),
            MemoryMode::LongAndCache => write!(f, "Long+Cache"),
        }
    }
}
