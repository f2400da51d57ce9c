//! The `ErrorLike` capability and adapters for standard library errors.

use std::any::type_name;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::cause::Cause;
use crate::os;
use crate::record::Code;
use crate::ChainedError;

/// An error-like value shared across a chain.
pub type SharedError = Arc<dyn ErrorLike + Send + Sync>;

/// Where an error points back to, as seen by the serializer.
#[derive(Debug, Clone, Copy)]
pub enum CauseRef<'a> {
    /// No cause.
    None,
    /// A stored [`Cause`], possibly lazy.
    Stored(&'a Cause),
    /// The next link of a standard library `source()` chain.
    Source(&'a (dyn StdError + 'static)),
}

/// An object the serializer turns into a record.
///
/// Every field is optional; implementors override only what they carry.
/// Empty strings are treated as absent by the serializer.
pub trait ErrorLike: fmt::Debug {
    /// Type/kind tag (e.g. `"ChainedError"`).
    fn name(&self) -> Option<Cow<'_, str>>;

    /// Human-readable description.
    fn message(&self) -> Option<Cow<'_, str>>;

    /// OS / process failure code.
    fn code(&self) -> Option<Code> {
        None
    }

    /// Name of the signal that terminated a process.
    fn signal(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Captured call history, opaque text.
    fn stack(&self) -> Option<Cow<'_, str>> {
        None
    }

    fn cause(&self) -> CauseRef<'_> {
        CauseRef::None
    }

    /// View as a standard library error, used for `Error::source` bridging.
    fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        None
    }
}

// ─── NativeError ──────────────────────────────────────────────────────────────

/// Adapter exposing any standard library error as [`ErrorLike`].
///
/// The name defaults to the error's type name (last path segment). `code` and
/// `signal` are probed from `std::io::Error` and [`ProcessFailure`](crate::ProcessFailure).
/// A wrapped [`ChainedError`] is exposed as itself.
pub struct NativeError<E> {
    name: Cow<'static, str>,
    inner: E,
}

impl<E> NativeError<E>
where
    E: StdError + Send + Sync + 'static,
{
    pub fn new(inner: E) -> Self {
        let name = known_name(&inner).unwrap_or_else(short_type_name::<E>);
        Self {
            name: Cow::Borrowed(name),
            inner,
        }
    }

    /// Wrap with an explicit name instead of the type name.
    pub fn named(name: impl Into<Cow<'static, str>>, inner: E) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    fn view(&self) -> &(dyn StdError + 'static) {
        &self.inner
    }
}

impl<E: fmt::Debug> fmt::Debug for NativeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeError")
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<E> ErrorLike for NativeError<E>
where
    E: StdError + Send + Sync + 'static,
{
    fn name(&self) -> Option<Cow<'_, str>> {
        match as_chained(self.view()) {
            Some(c) => c.name(),
            None => Some(Cow::Borrowed(self.name.as_ref())),
        }
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        std_message(self.view())
    }

    fn code(&self) -> Option<Code> {
        std_code(self.view())
    }

    fn signal(&self) -> Option<Cow<'_, str>> {
        std_signal(self.view())
    }

    fn stack(&self) -> Option<Cow<'_, str>> {
        as_chained(self.view()).and_then(ChainedError::stack)
    }

    fn cause(&self) -> CauseRef<'_> {
        std_cause(self.view())
    }

    fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.view())
    }
}

// ─── SourceRef ────────────────────────────────────────────────────────────────

/// Borrowed adapter over one link of a `source()` chain.
///
/// Unlike [`NativeError`] the concrete type is unknown, so the name is only
/// filled in for the types this crate can recognise.
#[derive(Debug, Clone, Copy)]
pub struct SourceRef<'a>(pub &'a (dyn StdError + 'static));

impl ErrorLike for SourceRef<'_> {
    fn name(&self) -> Option<Cow<'_, str>> {
        match as_chained(self.0) {
            Some(c) => c.name(),
            None => known_name(self.0).map(Cow::Borrowed),
        }
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        std_message(self.0)
    }

    fn code(&self) -> Option<Code> {
        std_code(self.0)
    }

    fn signal(&self) -> Option<Cow<'_, str>> {
        std_signal(self.0)
    }

    fn stack(&self) -> Option<Cow<'_, str>> {
        as_chained(self.0).and_then(ChainedError::stack)
    }

    fn cause(&self) -> CauseRef<'_> {
        std_cause(self.0)
    }

    fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0)
    }
}

// ─── Probes ───────────────────────────────────────────────────────────────────

fn as_chained<'a>(e: &'a (dyn StdError + 'static)) -> Option<&'a ChainedError> {
    e.downcast_ref::<ChainedError>()
}

/// Names for the standard error types this crate recognises.
fn known_name(e: &(dyn StdError + 'static)) -> Option<&'static str> {
    if e.is::<std::io::Error>() {
        Some("io::Error")
    } else if e.is::<os::ProcessFailure>() {
        Some(os::PROCESS_FAILURE_NAME)
    } else {
        None
    }
}

fn std_message<'a>(e: &'a (dyn StdError + 'static)) -> Option<Cow<'a, str>> {
    match as_chained(e) {
        Some(c) => c.message(),
        None => Some(Cow::Owned(e.to_string())),
    }
}

fn std_code(e: &(dyn StdError + 'static)) -> Option<Code> {
    match as_chained(e) {
        Some(c) => c.code(),
        None => os::probe_code(e),
    }
}

fn std_signal<'a>(e: &'a (dyn StdError + 'static)) -> Option<Cow<'a, str>> {
    match as_chained(e) {
        Some(c) => c.signal(),
        None => os::probe_signal(e).map(Cow::Borrowed),
    }
}

fn std_cause<'a>(e: &'a (dyn StdError + 'static)) -> CauseRef<'a> {
    if let Some(c) = as_chained(e) {
        return ErrorLike::cause(c);
    }
    match e.source() {
        Some(src) => CauseRef::Source(src),
        None => CauseRef::None,
    }
}

/// `core::num::error::ParseIntError` → `ParseIntError`, generics dropped.
fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
