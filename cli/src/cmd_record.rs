//! `errchain render` / `errchain strip` — work on serialized records.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use errchain_core::Serialized;

/// Read a file, or stdin when no path (or `-`) is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("cannot read '{}'", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read stdin")?;
            Ok(buf)
        }
    }
}

fn parse(text: &str) -> Result<Serialized> {
    let parsed = Serialized::from_json_str(text.trim())?;
    let depth = parsed.as_record().map_or(0, |r| r.depth());
    tracing::debug!(depth, "record loaded");
    Ok(parsed)
}

/// Human-readable chain; with `stack` the captured stacks are included.
pub fn render(text: &str, stack: bool) -> Result<String> {
    let parsed = parse(text)?;
    if !parsed.is_record() {
        tracing::warn!("input is not an error record, printing it verbatim");
    }
    Ok(if stack {
        format!("{parsed:#}")
    } else {
        parsed.to_string()
    })
}

/// The same record with every `stack` field removed.
pub fn strip(text: &str, pretty: bool) -> Result<String> {
    let stripped = parse(text)?.without_stack();
    let out = if pretty {
        serde_json::to_string_pretty(&stripped)?
    } else {
        serde_json::to_string(&stripped)?
    };
    Ok(out)
}
