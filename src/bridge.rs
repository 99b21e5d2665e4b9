//! Purpose: Run the external parser or executor on host text and hand back JSON text.
//! Exports: `BridgeOptions`, `try_parse_to_json`, `parse_to_json`,
//! `try_execute_to_json`, `execute_to_json`.
//! Role: The whole boundary contract; the ABI layer only converts pointers around it.
//! Invariants: A call yields output JSON or exactly one error payload.
//! Invariants: Panics in collaborator code or `Serialize` impls are caught and become payloads.
//! Invariants: Every call returns a fresh owned `String`; no state survives between calls.
//! Invariants: Input text is never logged; only its length.
//! Notes: Catching panics needs `panic = "unwind"`; under `abort` a panic still ends the host.
use crate::core::error::{Error, ErrorKind};
use crate::json::print::{JsonPrintOptions, message_to_json_string};
use crate::ledger::{DEFAULT_FILENAME, LedgerExecutor, LedgerParser};
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BridgeOptions {
    pub filename: String,
    pub print: JsonPrintOptions,
}

impl BridgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_print(mut self, print: JsonPrintOptions) -> Self {
        self.print = print;
        self
    }
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            print: JsonPrintOptions::bridge(),
        }
    }
}

pub fn try_parse_to_json<P>(
    parser: &P,
    input: Option<&str>,
    options: &BridgeOptions,
) -> Result<String, Error>
where
    P: LedgerParser + ?Sized,
{
    let input = input
        .ok_or_else(|| Error::new(ErrorKind::NullInput).with_message("input query is null"))?;
    tracing::debug!(
        input_len = input.len(),
        filename = %options.filename,
        "parsing ledger input"
    );

    let ledger = guarded(ErrorKind::NullLedger, "parser", || {
        parser.parse_string(input, &options.filename).ok_or_else(|| {
            Error::new(ErrorKind::NullLedger).with_message("parser produced no ledger")
        })
    })?;

    let json = guarded(ErrorKind::Serialize, "serializer", || {
        message_to_json_string(&ledger, &options.print)
    })?;
    tracing::debug!(output_len = json.len(), "serialized ledger");
    Ok(json)
}

/// Boundary form of [`try_parse_to_json`]: failures become their fixed payload.
pub fn parse_to_json<P>(parser: &P, input: Option<&str>, options: &BridgeOptions) -> String
where
    P: LedgerParser + ?Sized,
{
    match try_parse_to_json(parser, input, options) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(kind = ?err.kind(), error = %err, "returning error payload");
            err.payload().into_owned()
        }
    }
}

pub fn try_execute_to_json<E>(
    executor: &E,
    query: Option<&str>,
    ledger_text: Option<&str>,
    options: &BridgeOptions,
) -> Result<String, Error>
where
    E: LedgerExecutor + ?Sized,
{
    let query = query
        .ok_or_else(|| Error::new(ErrorKind::NullInput).with_message("input query is null"))?;
    let ledger_text = ledger_text.ok_or_else(|| {
        Error::new(ErrorKind::NullLedgerText).with_message("input ledger is null")
    })?;
    tracing::debug!(
        query_len = query.len(),
        ledger_len = ledger_text.len(),
        "executing query"
    );

    let query = guarded(ErrorKind::QueryParse, "query parser", || {
        executor
            .parse_query(query)
            .map_err(|err| stage_error(ErrorKind::QueryParse, err))
    })?;
    let ledger = guarded(ErrorKind::LedgerParse, "ledger parser", || {
        executor
            .parse_ledger(ledger_text)
            .map_err(|err| stage_error(ErrorKind::LedgerParse, err))
    })?;
    let output = guarded(ErrorKind::Execution, "executor", || {
        executor
            .execute(&query, &ledger)
            .map_err(|err| stage_error(ErrorKind::Execution, err))
    })?;

    let json = guarded(ErrorKind::Serialize, "serializer", || {
        message_to_json_string(&output, &options.print)
    })?;
    tracing::debug!(output_len = json.len(), "serialized query result");
    Ok(json)
}

/// Boundary form of [`try_execute_to_json`]: failures become their payload.
pub fn execute_to_json<E>(
    executor: &E,
    query: Option<&str>,
    ledger_text: Option<&str>,
    options: &BridgeOptions,
) -> String
where
    E: LedgerExecutor + ?Sized,
{
    match try_execute_to_json(executor, query, ledger_text, options) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(kind = ?err.kind(), error = %err, "returning error payload");
            err.payload().into_owned()
        }
    }
}

fn stage_error(kind: ErrorKind, err: impl Display) -> Error {
    Error::new(kind)
        .with_message("executor stage failed")
        .with_detail(err.to_string())
}

fn guarded<T>(
    kind: ErrorKind,
    stage: &'static str,
    run: impl FnOnce() -> Result<T, Error>,
) -> Result<T, Error> {
    panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        let reason = panic_reason(payload.as_ref());
        tracing::error!(stage, reason, "collaborator panicked");
        Err(Error::new(kind)
            .with_message(format!("{stage} panicked: {reason}"))
            .with_detail(format!("{stage} panicked")))
    })
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
