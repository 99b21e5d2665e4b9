//! Purpose: Seams to the external ledger/BQL parsing and query-execution library.
//! Exports: `LedgerParser`, `LedgerExecutor`, `DEFAULT_FILENAME`.
//! Role: The only points where this crate touches the collaborator; its types stay foreign.
//! Invariants: A parser returns an owned ledger or `None`; it never reports through this seam.
//! Invariants: An executor reports failures per stage as displayable errors.
//! Invariants: Output types are opaque here beyond being `serde::Serialize`.
use serde::Serialize;
use std::fmt::Display;

/// Label handed to the parser for its own diagnostics.
pub const DEFAULT_FILENAME: &str = "<wazbean>";

/// Entry point of an externally maintained ledger parser.
///
/// `filename` is only used by the parser when it reports problems in
/// `source`; nothing is read from disk. Returning `None` is the parser's way
/// of saying it produced no ledger at all.
pub trait LedgerParser {
    type Ledger: Serialize;

    fn parse_string(&self, source: &str, filename: &str) -> Option<Self::Ledger>;
}

impl<F, L> LedgerParser for F
where
    F: Fn(&str, &str) -> Option<L>,
    L: Serialize,
{
    type Ledger = L;

    fn parse_string(&self, source: &str, filename: &str) -> Option<L> {
        self(source, filename)
    }
}

/// Query execution offered by the same external library: parse a BQL query,
/// parse ledger text, run one against the other.
///
/// Each stage has its own failure so the boundary can tell the host which
/// one went wrong.
pub trait LedgerExecutor {
    type Query;
    type Ledger;
    type Output: Serialize;
    type Error: Display;

    fn parse_query(&self, query: &str) -> Result<Self::Query, Self::Error>;

    fn parse_ledger(&self, text: &str) -> Result<Self::Ledger, Self::Error>;

    fn execute(
        &self,
        query: &Self::Query,
        ledger: &Self::Ledger,
    ) -> Result<Self::Output, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_FILENAME, LedgerExecutor, LedgerParser};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Echo {
        source: String,
        filename: String,
    }

    struct EchoParser;

    impl LedgerParser for EchoParser {
        type Ledger = Echo;

        fn parse_string(&self, source: &str, filename: &str) -> Option<Echo> {
            Some(Echo {
                source: source.to_string(),
                filename: filename.to_string(),
            })
        }
    }

    #[test]
    fn closures_act_as_parsers() {
        let parser = |source: &str, _filename: &str| -> Option<usize> {
            (!source.is_empty()).then_some(source.len())
        };
        assert_eq!(parser.parse_string("abc", DEFAULT_FILENAME), Some(3));
        assert_eq!(parser.parse_string("", DEFAULT_FILENAME), None);
    }

    #[test]
    fn parser_receives_source_and_filename() {
        let ledger = EchoParser
            .parse_string("SELECT account", "query.bql")
            .expect("ledger");
        assert_eq!(ledger.source, "SELECT account");
        assert_eq!(ledger.filename, "query.bql");
    }

    struct CountingExecutor;

    impl LedgerExecutor for CountingExecutor {
        type Query = usize;
        type Ledger = Vec<String>;
        type Output = Vec<String>;
        type Error = String;

        fn parse_query(&self, query: &str) -> Result<usize, String> {
            query
                .strip_prefix("LIMIT ")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| format!("bad query {query:?}"))
        }

        fn parse_ledger(&self, text: &str) -> Result<Vec<String>, String> {
            Ok(text.lines().map(str::to_string).collect())
        }

        fn execute(&self, limit: &usize, ledger: &Vec<String>) -> Result<Vec<String>, String> {
            Ok(ledger.iter().take(*limit).cloned().collect())
        }
    }

    #[test]
    fn executor_stages_compose() {
        let executor = CountingExecutor;
        let query = executor.parse_query("LIMIT 1").expect("query");
        let ledger = executor.parse_ledger("a\nb").expect("ledger");
        assert_eq!(executor.execute(&query, &ledger), Ok(vec!["a".to_string()]));
        assert!(executor.parse_query("SELECT").is_err());
    }
}
