//! The cause model: what a [`ChainedError`](crate::ChainedError) points back to.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use crate::like::{ErrorLike, NativeError, SharedError};
use crate::os::ProcessFailure;
use crate::ChainedError;

/// Boxed error returned by a failing lazy cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type CauseFn = dyn Fn() -> Result<Payload, BoxError> + Send + Sync;

// ─── Payload ──────────────────────────────────────────────────────────────────

/// Any value that can sit in cause position.
#[derive(Debug, Clone)]
pub enum Payload {
    /// An error-like object; serialized into a record.
    Error(SharedError),
    /// Anything else; passed through the serializer verbatim.
    Value(Value),
}

impl Payload {
    /// Wrap a type implementing [`ErrorLike`] directly.
    pub fn error<E>(err: E) -> Self
    where
        E: ErrorLike + Send + Sync + 'static,
    {
        Self::Error(Arc::new(err))
    }

    /// Wrap a standard library error; its `source()` chain is walked as causes.
    pub fn native<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Error(Arc::new(NativeError::new(err)))
    }

    /// Truthiness used when deciding whether a resolved cause is present:
    /// `null`, `false`, `0` and `""` are falsy, errors and containers are not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Error(_) => true,
            Self::Value(v) => match v {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            },
        }
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::Value(Value::from(s))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::Value(Value::from(s))
    }
}

impl From<ChainedError> for Payload {
    fn from(e: ChainedError) -> Self {
        Self::Error(Arc::new(e))
    }
}

impl From<Arc<ChainedError>> for Payload {
    fn from(e: Arc<ChainedError>) -> Self {
        Self::Error(e)
    }
}

impl From<ProcessFailure> for Payload {
    fn from(e: ProcessFailure) -> Self {
        Self::Error(Arc::new(e))
    }
}

impl<E> From<NativeError<E>> for Payload
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: NativeError<E>) -> Self {
        Self::Error(Arc::new(e))
    }
}

// ─── LazyCause ────────────────────────────────────────────────────────────────

/// A zero-argument accessor computing the cause on demand.
///
/// Only invoked when the error is serialized. A returned `Err` or a panic
/// inside the accessor resolves to "no cause" and nothing is logged.
///
/// The panic is caught, not silenced: the process-wide panic hook still runs
/// first, so the default hook prints `thread '..' panicked at ..` to stderr.
/// Install a quieter hook with [`std::panic::set_hook`] if that matters.
#[derive(Clone)]
pub struct LazyCause(Arc<CauseFn>);

impl LazyCause {
    pub fn new<F, P, E>(f: F) -> Self
    where
        F: Fn() -> Result<P, E> + Send + Sync + 'static,
        P: Into<Payload>,
        E: Into<BoxError>,
    {
        Self(Arc::new(move || f().map(Into::into).map_err(Into::into)))
    }

    fn call(&self) -> Result<Payload, BoxError> {
        (self.0)()
    }
}

impl fmt::Debug for LazyCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyCause(..)")
    }
}

// ─── Cause ────────────────────────────────────────────────────────────────────

/// The cause stored on a [`ChainedError`](crate::ChainedError).
///
/// "Not given" and "explicitly none" are the same variant.
#[derive(Debug, Clone, Default)]
pub enum Cause {
    #[default]
    None,
    Eager(Payload),
    Lazy(LazyCause),
}

impl Cause {
    pub fn lazy<F, P, E>(f: F) -> Self
    where
        F: Fn() -> Result<P, E> + Send + Sync + 'static,
        P: Into<Payload>,
        E: Into<BoxError>,
    {
        Self::Lazy(LazyCause::new(f))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The eager payload, if any. Lazy causes are not invoked.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Eager(p) => Some(p),
            Self::None | Self::Lazy(_) => None,
        }
    }

    /// Resolve to a concrete payload. Lazy accessors are invoked here; any
    /// failure they report, including a panic, yields `None`.
    pub fn resolve(&self) -> Option<Payload> {
        match self {
            Self::None => None,
            Self::Eager(p) => Some(p.clone()),
            Self::Lazy(f) => match catch_unwind(AssertUnwindSafe(|| f.call())) {
                Ok(Ok(p)) => {
                    tracing::trace!("lazy cause resolved");
                    Some(p)
                }
                Ok(Err(_)) | Err(_) => None,
            },
        }
    }
}

impl From<Payload> for Cause {
    fn from(p: Payload) -> Self {
        Self::Eager(p)
    }
}

impl From<LazyCause> for Cause {
    fn from(f: LazyCause) -> Self {
        Self::Lazy(f)
    }
}

impl From<Value> for Cause {
    fn from(v: Value) -> Self {
        Self::Eager(v.into())
    }
}

impl From<&str> for Cause {
    fn from(s: &str) -> Self {
        Self::Eager(s.into())
    }
}

impl From<String> for Cause {
    fn from(s: String) -> Self {
        Self::Eager(s.into())
    }
}

impl From<ChainedError> for Cause {
    fn from(e: ChainedError) -> Self {
        Self::Eager(e.into())
    }
}

impl From<Arc<ChainedError>> for Cause {
    fn from(e: Arc<ChainedError>) -> Self {
        Self::Eager(e.into())
    }
}

impl From<ProcessFailure> for Cause {
    fn from(e: ProcessFailure) -> Self {
        Self::Eager(e.into())
    }
}

impl<E> From<NativeError<E>> for Cause
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: NativeError<E>) -> Self {
        Self::Eager(e.into())
    }
}

impl<T: Into<Cause>> From<Option<T>> for Cause {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::None, Into::into)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_of_values() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!Payload::from(falsy.clone()).is_truthy(), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(Payload::from(truthy.clone()).is_truthy(), "{truthy} should be truthy");
        }
        assert!(Payload::from(ChainedError::new("")).is_truthy());
    }

    #[test]
    fn none_and_explicit_none_resolve_alike() {
        assert!(Cause::default().resolve().is_none());
        assert!(Cause::from(None::<ChainedError>).resolve().is_none());
    }

    #[test]
    fn eager_cause_is_shared_not_copied() {
        let root = Arc::new(ChainedError::new("root"));
        let cause = Cause::from(Arc::clone(&root));
        match cause.resolve() {
            Some(Payload::Error(e)) => {
                let addr = Arc::as_ptr(&e) as *const ();
                assert_eq!(addr, Arc::as_ptr(&root) as *const ());
            }
            other => panic!("expected error payload, got {other:?}"),
        }
    }

    #[test]
    fn lazy_cause_is_invoked_on_resolve() {
        let cause = Cause::lazy(|| Ok::<_, BoxError>(json!("computed")));
        assert!(matches!(cause.resolve(), Some(Payload::Value(v)) if v == "computed"));
    }

    #[test]
    fn failing_lazy_cause_resolves_to_none() {
        let cause = Cause::lazy(|| Err::<Payload, _>("backing store gone"));
        assert!(cause.resolve().is_none());
    }

    #[test]
    fn panicking_lazy_cause_resolves_to_none() {
        let cause = Cause::lazy(|| -> Result<Payload, BoxError> { panic!("accessor blew up") });
        assert!(cause.resolve().is_none());
    }

    #[test]
    fn payload_does_not_invoke_lazy() {
        let cause = Cause::lazy(|| -> Result<Payload, BoxError> { panic!("must not run") });
        assert!(cause.payload().is_none());
        assert!(!cause.is_none());
    }
}
