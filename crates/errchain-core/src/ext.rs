//! `Result` helpers for wrapping errors into a chain.

use crate::cause::Payload;
use crate::ChainedError;

/// Wrap the error of a `Result` in a [`ChainedError`], keeping it as the cause.
pub trait ResultExt<T> {
    fn wrap_err(self, message: impl Into<String>) -> Result<T, ChainedError>;

    /// Like [`wrap_err`](Self::wrap_err), building the message only on failure.
    fn wrap_err_with<M, F>(self, f: F) -> Result<T, ChainedError>
    where
        M: Into<String>,
        F: FnOnce() -> M;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn wrap_err(self, message: impl Into<String>) -> Result<T, ChainedError> {
        self.map_err(|e| ChainedError::with_cause(message, Payload::native(e)))
    }

    fn wrap_err_with<M, F>(self, f: F) -> Result<T, ChainedError>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        self.map_err(|e| ChainedError::with_cause(f(), Payload::native(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn wrap_err_keeps_original_as_cause() {
        let res: Result<(), io::Error> = Err(io::Error::from_raw_os_error(28));
        let err = res.wrap_err("disk full").unwrap_err();
        let rec = err.to_object(false);
        assert_eq!(rec.message.as_deref(), Some("disk full"));
        let cause = rec.chain().nth(1).expect("cause record");
        assert_eq!(cause.name.as_deref(), Some("io::Error"));
        assert_eq!(cause.code, Some(crate::Code::Number(28)));
    }

    #[test]
    fn wrapping_a_chained_error_keeps_its_chain() {
        let inner: Result<(), ChainedError> =
            Err(ChainedError::with_cause("read failed", ChainedError::new("eof")));
        let err = inner.wrap_err_with(|| format!("loading {}", "config.toml")).unwrap_err();
        let messages: Vec<_> = err
            .to_object(false)
            .chain()
            .filter_map(|r| r.message.clone())
            .collect();
        assert_eq!(messages, ["loading config.toml", "read failed", "eof"]);
    }

    #[test]
    fn ok_passes_through() {
        let res: Result<u8, io::Error> = Ok(7);
        assert_eq!(res.wrap_err_with(|| -> String { unreachable!() }).unwrap(), 7);
    }
}
