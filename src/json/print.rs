//! Purpose: Turn a ledger message into JSON text under explicit print options.
//! Exports: `JsonPrintOptions`, `message_to_json_string`.
//! Role: Serialization boundary; serde_json does the encoding, this module applies options.
//! Invariants: Output is either complete JSON text or a `Serialize` error, never partial.
//! Invariants: Fields keep the message's declaration order (serde_json `preserve_order`).
//! Invariants: Pruning only removes object fields; array elements are always kept.
//! Invariants: A nested object present in the message survives pruning, even as `{}`.
//! Notes: With default fields printed, output equals serde_json::to_string(_pretty) of the message.
use crate::core::error::{Error, ErrorKind};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JsonPrintOptions {
    pub add_whitespace: bool,
    pub always_print_default_fields: bool,
}

impl JsonPrintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options used for every boundary call: indented, defaults included.
    pub fn bridge() -> Self {
        Self {
            add_whitespace: true,
            always_print_default_fields: true,
        }
    }

    pub fn with_whitespace(mut self, add_whitespace: bool) -> Self {
        self.add_whitespace = add_whitespace;
        self
    }

    pub fn with_default_fields(mut self, always_print_default_fields: bool) -> Self {
        self.always_print_default_fields = always_print_default_fields;
        self
    }
}

pub fn message_to_json_string<M>(message: &M, options: &JsonPrintOptions) -> Result<String, Error>
where
    M: Serialize + ?Sized,
{
    if options.always_print_default_fields {
        return write_json(message, options.add_whitespace);
    }
    let mut value = serde_json::to_value(message).map_err(serialize_error)?;
    prune_default_fields(&mut value);
    write_json(&value, options.add_whitespace)
}

fn write_json<M>(message: &M, pretty: bool) -> Result<String, Error>
where
    M: Serialize + ?Sized,
{
    let text = if pretty {
        serde_json::to_string_pretty(message)
    } else {
        serde_json::to_string(message)
    };
    text.map_err(serialize_error)
}

fn serialize_error(err: serde_json::Error) -> Error {
    Error::new(ErrorKind::Serialize)
        .with_message("failed to serialize ledger")
        .with_source(err)
}

fn prune_default_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, field| !is_default(field));
            for field in map.values_mut() {
                prune_default_fields(field);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                prune_default_fields(item);
            }
        }
        _ => {}
    }
}

fn is_default(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(num) => num.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonPrintOptions, message_to_json_string};
    use crate::core::error::ErrorKind;
    use serde::{Serialize, Serializer};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    #[test]
    fn defaults_are_compact_and_pruned() {
        let options = JsonPrintOptions::default();
        assert!(!options.add_whitespace);
        assert!(!options.always_print_default_fields);

        let bridge = JsonPrintOptions::bridge();
        assert!(bridge.add_whitespace);
        assert!(bridge.always_print_default_fields);
    }

    #[test]
    fn whitespace_matches_serde_pretty() {
        let value = json!({"directives": [{"date": "2024-01-02", "flag": "*"}]});
        let options = JsonPrintOptions::new()
            .with_whitespace(true)
            .with_default_fields(true);
        let text = message_to_json_string(&value, &options).expect("json");
        assert_eq!(text, serde_json::to_string_pretty(&value).expect("pretty"));
        assert!(text.contains("\n  \"directives\": ["));
    }

    #[test]
    fn compact_output_is_single_line() {
        let value = json!({"a": 1, "b": [true, null]});
        let options = JsonPrintOptions::new().with_default_fields(true);
        let text = message_to_json_string(&value, &options).expect("json");
        assert_eq!(text, r#"{"a":1,"b":[true,null]}"#);
    }

    #[test]
    fn default_fields_are_kept_when_requested() {
        let value = json!({"payee": "", "amount": 0, "tags": [], "meta": {}, "pending": false});
        let options = JsonPrintOptions::new().with_default_fields(true);
        let text = message_to_json_string(&value, &options).expect("json");
        let parsed: Value = serde_json::from_str(&text).expect("parse");
        assert_eq!(parsed, value);
    }

    #[derive(Serialize)]
    struct Posting {
        account: String,
        number: f64,
        currency: String,
    }

    fn posting() -> Posting {
        Posting {
            account: "Expenses:Food".to_string(),
            number: 3.5,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn bridge_output_keeps_declaration_order() {
        let posting = posting();
        let text = message_to_json_string(&posting, &JsonPrintOptions::bridge()).expect("json");
        assert_eq!(text, serde_json::to_string_pretty(&posting).expect("pretty"));
        let account = text.find("\"account\"").expect("account");
        let number = text.find("\"number\"").expect("number");
        let currency = text.find("\"currency\"").expect("currency");
        assert!(account < number && number < currency);
    }

    #[test]
    fn pruned_output_keeps_declaration_order() {
        let posting = Posting {
            currency: String::new(),
            ..posting()
        };
        let text = message_to_json_string(&posting, &JsonPrintOptions::new()).expect("json");
        assert_eq!(text, r#"{"account":"Expenses:Food","number":3.5}"#);
    }

    #[test]
    fn default_fields_are_pruned_recursively() {
        let value = json!({
            "narration": "Coffee",
            "payee": "",
            "postings": [
                {"account": "Expenses:Food", "amount": 0, "cost": null},
                {"account": "Assets:Cash", "amount": -3.5}
            ],
            "links": [],
            "meta": {"lineno": 0},
            "flag": "*"
        });
        let text = message_to_json_string(&value, &JsonPrintOptions::new()).expect("json");
        let parsed: Value = serde_json::from_str(&text).expect("parse");
        assert_eq!(
            parsed,
            json!({
                "narration": "Coffee",
                "postings": [
                    {"account": "Expenses:Food"},
                    {"account": "Assets:Cash", "amount": -3.5}
                ],
                "meta": {},
                "flag": "*"
            })
        );
    }

    #[test]
    fn empty_nested_objects_are_pruned_but_emptied_ones_stay() {
        let value = json!({"options": {}, "meta": {"lineno": 0, "tags": []}});
        let text = message_to_json_string(&value, &JsonPrintOptions::new()).expect("json");
        assert_eq!(text, r#"{"meta":{}}"#);
    }

    #[test]
    fn array_elements_survive_pruning() {
        let value = json!({"values": [0, "", null, false]});
        let text = message_to_json_string(&value, &JsonPrintOptions::new()).expect("json");
        assert_eq!(text, r#"{"values":[0,"",null,false]}"#);
    }

    #[test]
    fn serializer_errors_map_to_serialize_kind() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("ledger cannot be encoded"))
            }
        }

        let err = message_to_json_string(&Broken, &JsonPrintOptions::bridge()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialize);
        assert!(err.to_string().contains("ledger cannot be encoded"));
    }

    #[test]
    fn non_string_map_keys_fail_to_serialize() {
        let mut balances = HashMap::new();
        balances.insert(vec![1u8], 10);
        let err = message_to_json_string(&balances, &JsonPrintOptions::bridge()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialize);
    }
}
