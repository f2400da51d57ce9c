//! Serialized error records — the JSON-safe output of the chain serializer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

// ─── Code ─────────────────────────────────────────────────────────────────────

/// A failure code: an OS errno / exit code, or a symbolic name like `"ENOENT"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Number(i64),
    Text(String),
}

impl Code {
    /// `0` and `""` are falsy and never make it into a record.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i32> for Code {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for Code {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Code {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Code {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// ─── ErrorRecord ──────────────────────────────────────────────────────────────

/// One serialized link of an error chain.
///
/// Every field is optional and absent fields are omitted from the JSON output,
/// never written as `null`. Unknown keys and `null` fields are rejected on
/// deserialization so that an arbitrary JSON object in `cause` position stays a
/// plain value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorRecord {
    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,

    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,

    #[serde(default, deserialize_with = "non_null", skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    /// The serialized cause: another record, or the cause value verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Serialized>>,
}

/// A present field must hold a value; absence is handled by `default`.
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ErrorRecord {
    /// Iterate the chain starting at this record. Stops at the first
    /// non-record cause.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Number of records in the chain, this one included.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Drop `stack` from this record and every record below it.
    pub fn without_stack(mut self) -> Self {
        self.stack = None;
        self.cause = self.cause.map(|c| Box::new((*c).without_stack()));
        self
    }

    /// The one-line summary used by the human renderer.
    fn headline(&self) -> String {
        let mut line = match (&self.name, &self.message) {
            (Some(name), Some(message)) => format!("{name}: {message}"),
            (Some(name), None) => name.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "<unnamed error>".to_string(),
        };
        let mut extra = Vec::new();
        if let Some(code) = &self.code {
            extra.push(format!("code={code}"));
        }
        if let Some(signal) = &self.signal {
            extra.push(format!("signal={signal}"));
        }
        if !extra.is_empty() {
            line.push_str(&format!(" [{}]", extra.join(", ")));
        }
        line
    }
}

/// Iterator over the records of a chain, see [`ErrorRecord::chain`].
pub struct Chain<'a> {
    next: Option<&'a ErrorRecord>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ErrorRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause.as_deref().and_then(Serialized::as_record);
        Some(current)
    }
}

// ─── Serialized ───────────────────────────────────────────────────────────────

/// Errors raised while reading a record back from JSON text.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output of the serializer: a record for error-like input, the input
/// verbatim otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Serialized {
    Record(ErrorRecord),
    Value(Value),
}

impl Serialized {
    /// Parse JSON text produced by the serializer (or any JSON value).
    pub fn from_json_str(s: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn as_record(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Record(r) => Some(r),
            Self::Value(_) => None,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    /// Drop every `stack` field in the chain. Plain values are untouched.
    pub fn without_stack(self) -> Self {
        match self {
            Self::Record(r) => Self::Record(r.without_stack()),
            v @ Self::Value(_) => v,
        }
    }
}

impl From<ErrorRecord> for Serialized {
    fn from(r: ErrorRecord) -> Self {
        Self::Record(r)
    }
}

/// Human-readable chain, one link per line. The alternate form (`{:#}`)
/// also prints captured stacks, indented under their link.
impl fmt::Display for Serialized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current = Some(self);
        let mut first = true;
        while let Some(link) = current {
            if !first {
                writeln!(f)?;
                write!(f, "caused by: ")?;
            }
            first = false;
            match link {
                Self::Value(v) => {
                    write!(f, "{v}")?;
                    current = None;
                }
                Self::Record(r) => {
                    write!(f, "{}", r.headline())?;
                    if f.alternate() {
                        if let Some(stack) = &r.stack {
                            for line in stack.lines() {
                                write!(f, "\n    {line}")?;
                            }
                        }
                    }
                    current = r.cause.as_deref();
                }
            }
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(message: &str) -> ErrorRecord {
        ErrorRecord {
            name: Some("ChainedError".into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    #[test]
    fn absent_fields_are_omitted() {
        let r = ErrorRecord {
            message: Some("disk full".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({ "message": "disk full" }));
    }

    #[test]
    fn code_accepts_number_or_text() {
        let r: ErrorRecord = serde_json::from_str(r#"{"code":2}"#).unwrap();
        assert_eq!(r.code, Some(Code::Number(2)));
        let r: ErrorRecord = serde_json::from_str(r#"{"code":"ENOENT"}"#).unwrap();
        assert_eq!(r.code, Some(Code::Text("ENOENT".into())));
        assert!(!Code::Number(0).is_truthy());
        assert!(!Code::Text(String::new()).is_truthy());
    }

    #[test]
    fn foreign_object_in_cause_stays_a_value() {
        let s = Serialized::from_json_str(r#"{"message":"top","cause":{"retry":3}}"#).unwrap();
        let top = s.as_record().unwrap();
        assert_eq!(
            top.cause.as_deref(),
            Some(&Serialized::Value(json!({ "retry": 3 })))
        );
    }

    #[test]
    fn null_fields_make_an_object_a_value() {
        let text = r#"{"message":"top","cause":{"code":null,"name":null}}"#;
        let s = Serialized::from_json_str(text).unwrap();
        assert_eq!(
            s.as_record().unwrap().cause.as_deref(),
            Some(&Serialized::Value(json!({ "name": null, "code": null })))
        );
        assert_eq!(serde_json::to_string(&s).unwrap(), text);
    }

    #[test]
    fn chain_iterates_records_only() {
        let mut mid = record("mid");
        mid.cause = Some(Box::new(Serialized::Value(json!("root value"))));
        let mut top = record("top");
        top.cause = Some(Box::new(Serialized::Record(mid)));
        let messages: Vec<_> = top.chain().filter_map(|r| r.message.as_deref()).collect();
        assert_eq!(messages, ["top", "mid"]);
        assert_eq!(top.depth(), 2);
    }

    #[test]
    fn without_stack_strips_every_level() {
        let mut inner = record("inner");
        inner.stack = Some("frame 1".into());
        let mut outer = record("outer");
        outer.stack = Some("frame 0".into());
        outer.cause = Some(Box::new(Serialized::Record(inner)));
        let stripped = outer.without_stack();
        assert!(stripped.chain().all(|r| r.stack.is_none()));
    }

    #[test]
    fn display_renders_one_link_per_line() {
        let mut inner = record("permission denied");
        inner.code = Some(Code::Number(13));
        inner.stack = Some("frame".into());
        let mut outer = record("disk full");
        outer.cause = Some(Box::new(Serialized::Record(inner)));
        let s = Serialized::Record(outer);
        assert_eq!(
            s.to_string(),
            "ChainedError: disk full\ncaused by: ChainedError: permission denied [code=13]"
        );
        assert!(format!("{s:#}").ends_with("[code=13]\n    frame"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Serialized::from_json_str("{not json"),
            Err(RecordError::Json(_))
        ));
    }
}
