//! errchain-core — chained errors and their JSON-safe serialization.
//!
//! This crate defines:
//! - [`ChainedError`] — an error with a message and an immutable cause
//! - [`Cause`] / [`Payload`] — what a cause may be: an error, any JSON value, or a lazy accessor
//! - [`ErrorLike`] — the capability the serializer reads (`name`, `message`, `code`, `signal`, `stack`, cause)
//! - [`serialize`] / [`SerializeOptions`] — the chain walk producing [`Serialized`] records
//! - [`NativeError`] / [`ProcessFailure`] — adapters for `std` errors and failed child processes
//!
//! # Quick Start
//!
//! ```rust
//! use errchain_core::{ChainedError, ResultExt};
//!
//! fn read_config() -> Result<String, ChainedError> {
//!     std::fs::read_to_string("/definitely/not/here.toml").wrap_err("could not load config")
//! }
//!
//! let err = read_config().unwrap_err();
//! let line = serde_json::to_string(&err).unwrap();
//! assert!(line.contains("could not load config"));
//! ```

pub mod cause;
pub mod chained;
pub mod ext;
pub mod like;
pub mod os;
pub mod record;
pub mod serialize;

pub use cause::{BoxError, Cause, LazyCause, Payload};
pub use chained::{ChainedError, ChainedErrorBuilder};
pub use ext::ResultExt;
pub use like::{CauseRef, ErrorLike, NativeError, SharedError, SourceRef};
pub use os::ProcessFailure;
pub use record::{Code, ErrorRecord, RecordError, Serialized};
pub use serialize::{serialize, serialize_error, SerializeOptions, DEFAULT_MAX_LAZY_DEPTH};
