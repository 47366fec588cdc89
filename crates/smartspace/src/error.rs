#![forbid(unsafe_code)]

//! Smartspace error model and graceful degradation.
//!
//! # Design Principles
//!
//! 1. **The carousel never blanks itself.** Nothing on the update path
//!    surfaces an error to the user; each failure maps to a local
//!    [`DegradationAction`].
//! 2. **Domain errors stay typed.** [`ItemError`] and [`ConfigError`] live in
//!    the crates that raise them and are wrapped here, not flattened.
//! 3. **Errors do not depend on tracing.** They carry the context a log line
//!    needs ([`Error::error_type`], [`Error::degradation`]) and callers log.

use std::fmt;

use smartspace_core::ItemError;
use smartspace_runtime::{AppliedUpdate, ConfigError, TransitionRequest};

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for smartspace hosts.
#[derive(Debug)]
pub enum Error {
    /// An upstream card failed validation.
    Item(ItemError),
    /// Configuration could not be loaded or is invalid.
    Config(ConfigError),
    /// A card provider reported a failure.
    Stream(String),
    /// A page index fell outside the current page count.
    IndexOutOfRange { index: usize, count: usize },
    /// An exit transition request was refused (`Busy` or `AlreadyAttached`).
    TransitionRejected(TransitionRequest),
    /// Process setup failed (logging, signal handling).
    Setup(String),
    /// Raw I/O error (convenience variant for `?` on io::Result).
    Io(std::io::Error),
}

/// Standard result type for smartspace APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the carousel does instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Exclude the offending card; the rest of the set still applies.
    DropItem,
    /// Clamp into `[0, max(count, 1))` and continue.
    ClampIndex,
    /// Apply the data change without animating it.
    SkipAnimation,
    /// Keep showing the last applied cards (or the previous configuration).
    KeepLastKnown,
    /// Unrecoverable; stop the host.
    Shutdown,
}

impl Error {
    /// The error an apply degraded through, if any.
    ///
    /// Only a refused exit transition is reported; the data change itself
    /// always lands.
    pub fn from_applied(update: &AppliedUpdate) -> Option<Self> {
        match update.transition {
            Some(request) if !request.is_started() => Some(Self::TransitionRejected(request)),
            _ => None,
        }
    }

    /// The degradation action for this error.
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Item(_) => DegradationAction::DropItem,
            Self::Config(ConfigError::Io(_)) => DegradationAction::Shutdown,
            Self::Config(_) => DegradationAction::KeepLastKnown,
            Self::Stream(_) => DegradationAction::KeepLastKnown,
            Self::IndexOutOfRange { .. } => DegradationAction::ClampIndex,
            Self::TransitionRejected(_) => DegradationAction::SkipAnimation,
            Self::Setup(_) => DegradationAction::Shutdown,
            Self::Io(_) => DegradationAction::Shutdown,
        }
    }

    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Item(_) => "item",
            Self::Config(_) => "config",
            Self::Stream(_) => "stream",
            Self::IndexOutOfRange { .. } => "index",
            Self::TransitionRejected(_) => "transition",
            Self::Setup(_) => "setup",
            Self::Io(_) => "io",
        }
    }

    /// Whether the error is recoverable (does not require shutdown).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::Shutdown)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Stream(reason) => write!(f, "card stream failed: {reason}"),
            Self::IndexOutOfRange { index, count } => {
                write!(f, "page index {index} out of range for {count} pages")
            }
            Self::TransitionRejected(TransitionRequest::Busy) => {
                write!(f, "exit transition dropped: another is running")
            }
            Self::TransitionRejected(request) => write!(f, "exit transition refused: {request:?}"),
            Self::Setup(msg) => write!(f, "setup: {msg}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

impl fmt::Display for DegradationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropItem => write!(f, "drop_item"),
            Self::ClampIndex => write!(f, "clamp_index"),
            Self::SkipAnimation => write!(f, "skip_animation"),
            Self::KeepLastKnown => write!(f, "keep_last_known"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Item(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Stream(_)
            | Self::IndexOutOfRange { .. }
            | Self::TransitionRejected(_)
            | Self::Setup(_) => None,
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<ItemError> for Error {
    fn from(err: ItemError) -> Self {
        Self::Item(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
