//! Purpose: Expose an external ledger/BQL parser to WebAssembly and C hosts as JSON text.
//! Exports: `bridge` (the adapter), `abi` (C symbols via the export macros),
//! `ledger` (parser and executor seams), `json` (print options), `core` (errors), `logging`.
//! Role: Thin boundary layer; parsing and the ledger schema belong to the external library.
//! Invariants: Calls are stateless and return owned output; there is no shared result buffer.
//! Invariants: Failures surface only as JSON error payloads at the boundary.
pub mod abi;
pub mod bridge;
pub mod core;
pub mod json;
pub mod ledger;
pub mod logging;

pub use crate::bridge::{
    BridgeOptions, execute_to_json, parse_to_json, try_execute_to_json, try_parse_to_json,
};
pub use crate::core::error::{Error, ErrorKind, to_status_code};
pub use crate::json::print::{JsonPrintOptions, message_to_json_string};
pub use crate::ledger::{DEFAULT_FILENAME, LedgerExecutor, LedgerParser};
