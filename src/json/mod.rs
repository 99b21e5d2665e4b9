//! Purpose: JSON output boundary for ledger messages.
//! Exports: `print` module with the options-aware message printer.
//! Role: Single seam for encoding so callsites never pick serde_json settings ad hoc.
//! Invariants: All ledger text output goes through `print::message_to_json_string`.

pub mod print;
