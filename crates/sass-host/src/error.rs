use crate::results::CompilerMessage;
use std::time::Duration;
use url::Url;

/// Errors surfaced by the compiler host.
///
/// Every variant is cheap to clone: a fatal error fails all in-flight
/// and pending compilations with the same value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A control-plane failure: startup, version mismatch, reinit,
    /// shutdown, or submission against a compiler that can't take it.
    #[error("compiler lifecycle error: {0}")]
    Lifecycle(String),

    /// The compiler or the host sent something unparseable or
    /// internally inconsistent. Fatal: the driver resets and all work
    /// in flight fails with this error.
    #[error("sass protocol error: {0}")]
    Protocol(String),

    /// The stylesheet failed to compile. Scoped to the one submission
    /// that caused it.
    #[error(transparent)]
    Compiler(#[from] CompilerFailure),

    /// The child process died or its pipes failed. The driver resets.
    #[error("compiler i/o error: {0}")]
    Io(String),

    /// A compilation exceeded its deadline. Escalated to a driver
    /// reset: the protocol has no way to abort a single job.
    #[error("compilation timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol(message.into())
    }

    pub(crate) fn lifecycle(message: impl Into<String>) -> Self {
        Error::Lifecycle(message.into())
    }

    pub(crate) fn io(context: &str, error: std::io::Error) -> Self {
        Error::Io(format!("{context}: {error}"))
    }
}

/// A compilation failure reported by the compiler, from a syntax error
/// or an `@error` directive.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CompilerFailure {
    /// The error message, without source context.
    pub message: String,
    /// Where in the source the failure occurred.
    pub span: Option<crate::results::Span>,
    /// The Sass stack trace, when the compiler provides one.
    pub stack_trace: Option<String>,
    /// The compiler's own multi-line rendering of the failure.
    pub formatted: Option<String>,
    /// Warnings and debug messages emitted before the failure.
    pub messages: Vec<CompilerMessage>,
    /// Canonical URLs loaded before the failure.
    pub loaded_urls: Vec<Url>,
}
