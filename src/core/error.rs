//! Purpose: Error model shared by the bridge, the JSON printer, and the ABI layer.
//! Exports: `Error`, `ErrorKind`, `to_status_code`.
//! Role: One error type whose kind selects the payload and status code a host sees.
//! Invariants: Each kind maps to exactly one payload shape and one status code.
//! Invariants: Fixed payload text is stable once published; hosts match on it verbatim.
//! Notes: Executor stage kinds append the collaborator's detail after a fixed prefix.
use serde_json::Value;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NullInput,
    NullLedger,
    Serialize,
    InvalidUtf8,
    NullLedgerText,
    QueryParse,
    LedgerParse,
    Execution,
}

impl ErrorKind {
    /// Fixed JSON text substituted for the output when a call fails.
    ///
    /// Executor stage kinds return their bare prefix here; [`Error::payload`]
    /// adds the detail reported by the executor.
    pub fn payload(self) -> &'static str {
        match self {
            ErrorKind::NullInput => r#"{"error": "Input query was null."}"#,
            ErrorKind::NullLedger => r#"{"error": "Parser returned a null ledger."}"#,
            ErrorKind::Serialize => r#"{"error": "Failed to serialize ledger to JSON."}"#,
            ErrorKind::InvalidUtf8 => r#"{"error": "Input was not valid UTF-8."}"#,
            ErrorKind::NullLedgerText => r#"{"error": "Input ledger was null."}"#,
            ErrorKind::QueryParse => r#"{"error": "parse error"}"#,
            ErrorKind::LedgerParse => r#"{"error": "ledger error"}"#,
            ErrorKind::Execution => r#"{"error": "execution error"}"#,
        }
    }

    fn detail_prefix(self) -> Option<&'static str> {
        match self {
            ErrorKind::QueryParse => Some("parse error"),
            ErrorKind::LedgerParse => Some("ledger error"),
            ErrorKind::Execution => Some("execution error"),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    detail: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            detail: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// JSON text a host receives in place of the output.
    pub fn payload(&self) -> Cow<'static, str> {
        match (self.kind.detail_prefix(), &self.detail) {
            (Some(prefix), Some(detail)) => {
                let text = Value::String(format!("{prefix}: {detail}"));
                Cow::Owned(format!("{{\"error\": {text}}}"))
            }
            _ => Cow::Borrowed(self.kind.payload()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Host-visible detail; only executor stage kinds publish it.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " [{detail}]")?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Positive status reported by the length-delimited exports for an error payload.
pub fn to_status_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NullInput => 1,
        ErrorKind::NullLedger => 2,
        ErrorKind::Serialize => 3,
        ErrorKind::InvalidUtf8 => 4,
        ErrorKind::NullLedgerText => 5,
        ErrorKind::QueryParse => 6,
        ErrorKind::LedgerParse => 7,
        ErrorKind::Execution => 8,
    }
}
