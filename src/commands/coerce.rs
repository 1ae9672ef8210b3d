//! Turns prompt answers into typed action arguments.
//!
//! Every answer is either a base-10 integer or a bracketed integer list
//! following `'[' int (',' int)* ']'` (whitespace allowed, `[]` allowed).
//! Fields listed as free text are passed through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{HemertonError, Result};
use crate::form::{Answer, Answers};

/// Pattern for a bracketed integer list, usable as an input validator.
pub const INT_LIST_PATTERN: &str = r"\[\s*(?:[+-]?\d+\s*(?:,\s*[+-]?\d+\s*)*)?\]\s*$";

static INT_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:{})", INT_LIST_PATTERN)).expect("int-list pattern is valid")
});

/// Parses `[1, 2, -3]` into integers. `None` when the text is not a list.
pub fn parse_int_list(raw: &str) -> Option<Vec<i64>> {
    let raw = raw.trim();
    if !INT_LIST.is_match(raw) {
        return None;
    }
    let inner = raw.trim_start_matches('[').trim_end_matches(']').trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    inner
        .split(',')
        .map(|item| item.trim().parse::<i64>().ok())
        .collect()
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Coerces one raw answer into an integer or an integer list.
pub fn coerce_value(field: &str, raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        return parse_int_list(trimmed)
            .map(|items| Value::Array(items.into_iter().map(Value::from).collect()))
            .ok_or_else(|| HemertonError::TypeCoercion {
                field: field.to_string(),
                message: format!("'{}' is not a list of integers like [1,2]", raw),
            });
    }
    parse_int(trimmed)
        .map(Value::from)
        .ok_or_else(|| HemertonError::TypeCoercion {
            field: field.to_string(),
            message: format!("'{}' is not an integer", raw),
        })
}

/// Coerces a whole answer map. Names in `free_text` stay strings.
pub fn coerce_answers(answers: &Answers, free_text: &[&str]) -> Result<Map<String, Value>> {
    let mut args = Map::new();
    for (name, answer) in answers {
        let value = match answer {
            Answer::Text(text) if free_text.contains(&name.as_str()) => Value::String(text.clone()),
            Answer::Text(text) => coerce_value(name, text)?,
            Answer::Many(items) if free_text.contains(&name.as_str()) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            Answer::Many(items) => Value::Array(
                items
                    .iter()
                    .map(|item| coerce_value(name, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };
        args.insert(name.clone(), value);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_list_grammar_accepts() {
        assert_eq!(parse_int_list("[10,20]"), Some(vec![10, 20]));
        assert_eq!(parse_int_list("[ 1, -2 ]"), Some(vec![1, -2]));
        assert_eq!(parse_int_list("[]"), Some(vec![]));
        assert_eq!(parse_int_list("  [7]  "), Some(vec![7]));
    }

    #[test]
    fn test_int_list_grammar_rejects() {
        for bad in ["[1,,2]", "10,20", "[1.5]", "[a]", "[1,2", "[,]", "[1] x"] {
            assert_eq!(parse_int_list(bad), None, "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value("n", "42").unwrap(), json!(42));
        assert_eq!(coerce_value("n", " -3 ").unwrap(), json!(-3));
        assert_eq!(coerce_value("n", "[2,2]").unwrap(), json!([2, 2]));

        let err = coerce_value("nTAT", "[1,,2]").unwrap_err();
        assert!(matches!(err, HemertonError::TypeCoercion { ref field, .. } if field == "nTAT"));
        assert!(coerce_value("n", "abc").is_err());
    }

    #[test]
    fn test_free_text_is_never_coerced() {
        let mut answers = Answers::new();
        answers.insert("request".into(), "4".into());
        answers.insert("evidence".into(), "12345".into());
        let args = coerce_answers(&answers, &["evidence"]).unwrap();
        assert_eq!(args["request"], json!(4));
        assert_eq!(args["evidence"], json!("12345"));
    }

    #[test]
    fn test_many_answers_coerce_each_item() {
        let mut answers = Answers::new();
        answers.insert("ids".into(), Answer::Many(vec!["1".into(), "2".into()]));
        let args = coerce_answers(&answers, &[]).unwrap();
        assert_eq!(args["ids"], json!([1, 2]));
    }
}
