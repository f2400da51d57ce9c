//! OS-originated failures: `code` / `signal` probing and process exit status.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use crate::like::ErrorLike;
use crate::record::Code;

pub(crate) const PROCESS_FAILURE_NAME: &str = "ProcessFailure";

/// A child process that exited unsuccessfully.
///
/// Serializes with `code` = exit code and, on unix, `signal` = the name of the
/// terminating signal.
#[derive(Debug, Error)]
#[error("`{program}` {}", describe(.status))]
pub struct ProcessFailure {
    program: String,
    status: ExitStatus,
}

impl ProcessFailure {
    pub fn new(program: impl Into<String>, status: ExitStatus) -> Self {
        Self {
            program: program.into(),
            status,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    /// Exit code, `None` when the process was killed by a signal.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Name of the terminating signal (`"SIGKILL"`), unix only.
    pub fn signal_name(&self) -> Option<&'static str> {
        signal_number(self.status).map(signal_name)
    }
}

impl ErrorLike for ProcessFailure {
    fn name(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(PROCESS_FAILURE_NAME))
    }

    fn message(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }

    fn code(&self) -> Option<Code> {
        self.exit_code().map(Code::from)
    }

    fn signal(&self) -> Option<Cow<'_, str>> {
        self.signal_name().map(Cow::Borrowed)
    }

    fn as_std_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self)
    }
}

fn describe(status: &ExitStatus) -> String {
    match (status.code(), signal_number(*status)) {
        (Some(code), _) => format!("exited with status {code}"),
        (None, Some(sig)) => format!("terminated by {}", signal_name(sig)),
        (None, None) => "terminated abnormally".to_string(),
    }
}

#[cfg(unix)]
fn signal_number(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_number(_status: ExitStatus) -> Option<i32> {
    None
}

/// POSIX signal numbers that are stable across unix platforms.
fn signal_name(sig: i32) -> &'static str {
    match sig {
        1 => "SIGHUP",
        2 => "SIGINT",
        3 => "SIGQUIT",
        4 => "SIGILL",
        5 => "SIGTRAP",
        6 => "SIGABRT",
        8 => "SIGFPE",
        9 => "SIGKILL",
        11 => "SIGSEGV",
        13 => "SIGPIPE",
        14 => "SIGALRM",
        15 => "SIGTERM",
        _ => "SIGUNKNOWN",
    }
}

// ─── Probes ───────────────────────────────────────────────────────────────────

/// `code` of a standard library error: the raw errno of an `io::Error`, else
/// its `ErrorKind` name; the exit code of a [`ProcessFailure`].
pub(crate) fn probe_code(e: &(dyn StdError + 'static)) -> Option<Code> {
    if let Some(io_err) = e.downcast_ref::<io::Error>() {
        return Some(match io_err.raw_os_error() {
            Some(errno) => Code::from(errno),
            None => Code::Text(format!("{:?}", io_err.kind())),
        });
    }
    e.downcast_ref::<ProcessFailure>()
        .and_then(ProcessFailure::exit_code)
        .map(Code::from)
}

pub(crate) fn probe_signal(e: &(dyn StdError + 'static)) -> Option<&'static str> {
    e.downcast_ref::<ProcessFailure>()
        .and_then(ProcessFailure::signal_name)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    // Raw wait(2) statuses: exit code in the high byte, signal in the low bits.
    fn exited(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    fn killed(sig: i32) -> ExitStatus {
        ExitStatus::from_raw(sig)
    }

    #[test]
    fn exit_code_becomes_code() {
        let failure = ProcessFailure::new("make", exited(2));
        assert_eq!(failure.to_string(), "`make` exited with status 2");
        assert_eq!(ErrorLike::code(&failure), Some(Code::Number(2)));
        assert_eq!(ErrorLike::signal(&failure), None);
    }

    #[test]
    fn signal_becomes_signal() {
        let failure = ProcessFailure::new("worker", killed(9));
        assert_eq!(failure.to_string(), "`worker` terminated by SIGKILL");
        assert_eq!(ErrorLike::code(&failure), None);
        assert_eq!(ErrorLike::signal(&failure).as_deref(), Some("SIGKILL"));
    }

    #[test]
    fn io_error_probe_prefers_errno() {
        let from_os = io::Error::from_raw_os_error(2);
        assert_eq!(probe_code(&from_os), Some(Code::Number(2)));
        let synthetic = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(probe_code(&synthetic), Some(Code::Text("PermissionDenied".into())));
    }

    #[test]
    fn probes_see_through_dyn_error() {
        let failure = ProcessFailure::new("sh", killed(15));
        let dynamic: &(dyn StdError + 'static) = &failure;
        assert_eq!(probe_signal(dynamic), Some("SIGTERM"));
        assert_eq!(probe_code(dynamic), None);
    }
}
