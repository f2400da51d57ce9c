//! `errchain run` — run a command and report its failure as a serialized chain.

use std::io;
use std::process::{Command, ExitStatus};

use anyhow::Result;
use errchain_core::{
    ChainedError, ErrorLike, NativeError, Payload, ProcessFailure, SerializeOptions,
};

/// Run `program args..` with inherited stdio. On failure the serialized chain
/// is printed to stdout and the returned code is the child's exit code
/// (1 when it has none).
pub fn run(program: &str, args: &[String], opts: SerializeOptions, pretty: bool) -> Result<i32> {
    tracing::info!(program, ?args, "spawning");
    let outcome = Command::new(program).args(args).status();

    let Some(err) = failure(program, outcome) else {
        return Ok(0);
    };
    let exit = exit_code(program, &err);
    tracing::warn!(program, exit, "command failed");

    let record = opts.serialize_error(&err);
    let out = if pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    println!("{out}");
    Ok(exit)
}

/// The error chain for a spawn outcome, `None` on success.
fn failure(program: &str, outcome: io::Result<ExitStatus>) -> Option<ChainedError> {
    match outcome {
        Ok(status) if status.success() => None,
        Ok(status) => Some(ChainedError::with_cause(
            format!("command `{program}` failed"),
            ProcessFailure::new(program, status),
        )),
        Err(e) => Some(
            ChainedError::builder()
                .name("SpawnError")
                .message(format!("could not start `{program}`"))
                .cause(NativeError::new(e))
                .build(),
        ),
    }
}

fn exit_code(program: &str, err: &ChainedError) -> i32 {
    let status = err
        .cause()
        .payload()
        .and_then(|p| match p {
            Payload::Error(e) => e.as_std_error(),
            Payload::Value(_) => None,
        })
        .and_then(|e| e.downcast_ref::<ProcessFailure>())
        .and_then(ProcessFailure::exit_code);
    if status.is_none() {
        tracing::debug!(program, "no exit code, reporting 1");
    }
    status.unwrap_or(1)
}
