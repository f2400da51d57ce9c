//! The chain serializer.
//!
//! Walk order per link:
//! 1. Non-error payload   → returned verbatim
//! 2. Error-like          → `name`, `message`, `code`, `signal`, `stack`,
//!                          each kept only when present and non-empty
//! 3. Cause               → lazy accessors invoked (failures become "none"),
//!                          truthy causes serialized recursively
//!
//! Eager causes are fixed at construction and cannot loop, so they are always
//! followed to the end. Only lazy causes count against
//! [`SerializeOptions::max_lazy_depth`]; once it is reached the next lazy
//! accessor is not invoked, so a cycle built through a lazy cause terminates.

use std::borrow::Cow;
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::cause::{Cause, Payload};
use crate::like::{CauseRef, ErrorLike, SourceRef};
use crate::record::{Code, ErrorRecord, Serialized};

/// Default bound on the number of lazy causes resolved along one chain. A
/// lazy cycle truncated here still reads back under serde_json's parse
/// recursion limit.
pub const DEFAULT_MAX_LAZY_DEPTH: usize = 64;

/// Serializer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Emit captured stacks.
    pub include_stack: bool,
    /// Maximum number of lazy causes resolved along one chain; `0` never
    /// invokes an accessor. Eager and `source()` links are not counted.
    pub max_lazy_depth: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            include_stack: true,
            max_lazy_depth: DEFAULT_MAX_LAZY_DEPTH,
        }
    }
}

/// A cause after lazy resolution.
enum Resolved<'a> {
    Payload(Payload),
    Source(&'a (dyn StdError + 'static)),
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_stack(mut self, include_stack: bool) -> Self {
        self.include_stack = include_stack;
        self
    }

    pub fn max_lazy_depth(mut self, max_lazy_depth: usize) -> Self {
        self.max_lazy_depth = max_lazy_depth;
        self
    }

    /// Serialize any payload: errors become records, values pass through.
    pub fn serialize(&self, value: &Payload) -> Serialized {
        self.serialize_at(value, 0)
    }

    /// Serialize an error-like object into a record.
    pub fn serialize_error(&self, err: &dyn ErrorLike) -> ErrorRecord {
        self.walk(err, 0)
    }

    /// Serialize a standard library error and its `source()` chain.
    pub fn serialize_std_error(&self, err: &(dyn StdError + 'static)) -> ErrorRecord {
        self.walk(&SourceRef(err), 0)
    }

    fn serialize_at(&self, value: &Payload, lazy_depth: usize) -> Serialized {
        match value {
            Payload::Value(v) => Serialized::Value(v.clone()),
            Payload::Error(e) => Serialized::Record(self.walk(e.as_ref(), lazy_depth)),
        }
    }

    /// `lazy_depth` is the number of lazy causes already resolved above `err`.
    fn walk(&self, err: &dyn ErrorLike, mut lazy_depth: usize) -> ErrorRecord {
        let mut record = ErrorRecord {
            name: present(err.name()),
            message: present(err.message()),
            code: err.code().filter(Code::is_truthy),
            signal: present(err.signal()),
            stack: if self.include_stack { present(err.stack()) } else { None },
            cause: None,
        };

        let cause = err.cause();
        if let CauseRef::Stored(Cause::Lazy(_)) = cause {
            if lazy_depth >= self.max_lazy_depth {
                tracing::debug!(
                    max_lazy_depth = self.max_lazy_depth,
                    "error chain truncated at lazy cause"
                );
                return record;
            }
            lazy_depth += 1;
        }
        let Some(cause) = resolve(cause) else {
            return record;
        };

        let next = match cause {
            Resolved::Payload(p) => self.serialize_at(&p, lazy_depth),
            Resolved::Source(src) => Serialized::Record(self.walk(&SourceRef(src), lazy_depth)),
        };
        record.cause = Some(Box::new(next));
        record
    }
}

/// Resolve a cause reference; falsy and failed causes come back as `None`.
fn resolve(cause: CauseRef<'_>) -> Option<Resolved<'_>> {
    match cause {
        CauseRef::None => None,
        CauseRef::Stored(c) => c
            .resolve()
            .filter(Payload::is_truthy)
            .map(Resolved::Payload),
        CauseRef::Source(src) => Some(Resolved::Source(src)),
    }
}

fn present(field: Option<Cow<'_, str>>) -> Option<String> {
    field.filter(|s| !s.is_empty()).map(Cow::into_owned)
}

/// Serialize `value` with default settings and the given stack flag.
pub fn serialize(value: &Payload, include_stack: bool) -> Serialized {
    SerializeOptions::default()
        .include_stack(include_stack)
        .serialize(value)
}

/// Serialize an error-like object with default settings.
pub fn serialize_error(err: &dyn ErrorLike, include_stack: bool) -> ErrorRecord {
    SerializeOptions::default()
        .include_stack(include_stack)
        .serialize_error(err)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
