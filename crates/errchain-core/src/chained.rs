//! `ChainedError` — an error with an optional, immutable cause.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::cause::{BoxError, Cause, LazyCause, Payload};
use crate::like::{CauseRef, ErrorLike};
use crate::record::{Code, ErrorRecord};
use crate::serialize::SerializeOptions;

const DEFAULT_NAME: &str = "ChainedError";

/// A failure with a message and an optional cause.
///
/// The cause may be another error, a lazily computed value, or any JSON value.
/// It is set once at construction and never changes.
///
/// ```rust
/// use errchain_core::ChainedError;
///
/// let err = ChainedError::with_cause("disk full", ChainedError::new("permission denied"));
/// let json = serde_json::to_value(err.to_object(false)).unwrap();
/// assert_eq!(json["cause"]["message"], "permission denied");
/// ```
#[derive(Debug)]
pub struct ChainedError {
    name: Cow<'static, str>,
    message: Option<String>,
    code: Option<Code>,
    signal: Option<String>,
    cause: Cause,
    backtrace: Backtrace,
}

impl ChainedError {
    /// An error with a message and no cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self::builder().message(message).build()
    }

    /// An error wrapping `cause`.
    pub fn with_cause(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Self::builder().message(message).cause(cause).build()
    }

    /// An error whose cause is computed by `f` only when serialized.
    pub fn lazy<F, P, E>(message: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Result<P, E> + Send + Sync + 'static,
        P: Into<Payload>,
        E: Into<BoxError>,
    {
        Self::builder().message(message).cause(LazyCause::new(f)).build()
    }

    pub fn builder() -> ChainedErrorBuilder {
        ChainedErrorBuilder::default()
    }

    /// The stored cause, unchanged. [`Cause::None`] when none was given.
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Serialize this error and its chain.
    pub fn to_object(&self, include_stack: bool) -> ErrorRecord {
        SerializeOptions::default()
            .include_stack(include_stack)
            .serialize_error(self)
    }
}

impl fmt::Display for ChainedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => f.write_str(m),
            _ => f.write_str(&self.name),
        }
    }
}

impl StdError for ChainedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.cause {
            Cause::Eager(Payload::Error(e)) => e.as_std_error(),
            _ => None,
        }
    }
}

impl ErrorLike for ChainedError {
    fn name(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.name.as_ref()))
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        self.message.as_deref().map(Cow::Borrowed)
    }

    fn code(&self) -> Option<Code> {
        self.code.clone()
    }

    fn signal(&self) -> Option<Cow<'_, str>> {
        self.signal.as_deref().map(Cow::Borrowed)
    }

    fn stack(&self) -> Option<Cow<'_, str>> {
        match self.backtrace.status() {
            BacktraceStatus::Captured => Some(Cow::Owned(self.backtrace.to_string())),
            _ => None,
        }
    }

    fn cause(&self) -> CauseRef<'_> {
        CauseRef::Stored(&self.cause)
    }

    fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self)
    }
}

/// Any serde encoder sees the serialized chain, stack included.
impl Serialize for ChainedError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_object(true).serialize(serializer)
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

/// Builder for a [`ChainedError`] with a custom name, code or signal.
#[derive(Debug, Default)]
pub struct ChainedErrorBuilder {
    name: Option<Cow<'static, str>>,
    message: Option<String>,
    code: Option<Code>,
    signal: Option<String>,
    cause: Cause,
}

impl ChainedErrorBuilder {
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn code(mut self, code: impl Into<Code>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = Some(signal.into());
        self
    }

    pub fn cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = cause.into();
        self
    }

    /// Captures the backtrace.
    pub fn build(self) -> ChainedError {
        ChainedError {
            name: self.name.unwrap_or(Cow::Borrowed(DEFAULT_NAME)),
            message: self.message,
            code: self.code,
            signal: self.signal,
            cause: self.cause,
            backtrace: Backtrace::capture(),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
