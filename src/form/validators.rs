//! Reusable input validators for form questions.
//!
//! Every factory returns a [`Validator`]: `Ok(())` accepts the raw value, `Err`
//! carries the message shown to the user before re-prompting. An absent bound
//! is unbounded and is rendered as `infinite` in messages.

use std::fmt::Display;
use std::num::IntErrorKind;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;

/// Predicate over the raw text of an input question.
pub type Validator = Arc<dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync>;

/// Predicate over the selected values of a checkbox question.
pub type SelectionValidator =
    Arc<dyn Fn(&[String]) -> std::result::Result<(), String> + Send + Sync>;

pub const REQUIRED_MSG: &str = "Parameter is required";
pub const PATTERN_MSG: &str = "Incorrect format (regular expression does not match)";
pub const INTEGER_TYPE_MSG: &str = "Value must be a number";
pub const FLOAT_TYPE_MSG: &str = "Value must be a floating point number";

fn bound<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "infinite".to_string(),
    }
}

/// Float bounds keep their decimal point: `1.0`, not `1`.
fn float_bound(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:?}", v),
        None => "infinite".to_string(),
    }
}

fn out_of_range<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.is_some_and(|m| value < m) || max.is_some_and(|m| value > m)
}

/// Text validator with optional length bounds and a pattern anchored at the
/// start of the input.
///
/// Fails only when `pattern` does not compile.
pub fn validate_string(
    min_char: Option<usize>,
    max_char: Option<usize>,
    pattern: Option<&str>,
    pattern_message: Option<&str>,
    optional: bool,
) -> Result<Validator> {
    let length_msg = format!(
        "Length must be between {} and {}",
        bound(min_char),
        bound(max_char)
    );
    // Anchor so the match behaves like a prefix match, not a search.
    let regex = pattern
        .map(|p| Regex::new(&format!("^(?:{})", p)))
        .transpose()?;
    let pattern_msg = pattern_message.unwrap_or(PATTERN_MSG).to_string();

    Ok(Arc::new(move |val: &str| {
        if val.is_empty() {
            return if optional {
                Ok(())
            } else {
                Err(REQUIRED_MSG.to_string())
            };
        }

        let len = val.chars().count();
        if out_of_range(len, min_char, max_char) {
            return Err(length_msg.clone());
        }

        if let Some(re) = &regex
            && !re.is_match(val)
        {
            return Err(pattern_msg.clone());
        }

        Ok(())
    }))
}

/// Base-10 integer validator with an optional inclusive range.
pub fn validate_integer(min_int: Option<i64>, max_int: Option<i64>, optional: bool) -> Validator {
    let range_msg = format!(
        "Value must be between {} and {}",
        bound(min_int),
        bound(max_int)
    );

    Arc::new(move |val: &str| {
        if val.is_empty() {
            return if optional {
                Ok(())
            } else {
                Err(REQUIRED_MSG.to_string())
            };
        }

        let n = match val.trim().parse::<i64>() {
            Ok(n) => n,
            // Too large for i64 but still a number: only a bound can reject it.
            Err(e) => {
                let limit = match e.kind() {
                    IntErrorKind::PosOverflow => max_int,
                    IntErrorKind::NegOverflow => min_int,
                    _ => return Err(INTEGER_TYPE_MSG.to_string()),
                };
                return match limit {
                    Some(_) => Err(range_msg.clone()),
                    None => Ok(()),
                };
            }
        };

        if out_of_range(n, min_int, max_int) {
            return Err(range_msg.clone());
        }
        Ok(())
    })
}

/// Floating point validator with an optional inclusive range.
pub fn validate_float(min_float: Option<f64>, max_float: Option<f64>, optional: bool) -> Validator {
    let range_msg = format!(
        "Value must be between {} and {}",
        float_bound(min_float),
        float_bound(max_float)
    );

    Arc::new(move |val: &str| {
        if val.is_empty() {
            return if optional {
                Ok(())
            } else {
                Err(REQUIRED_MSG.to_string())
            };
        }

        let x: f64 = val
            .trim()
            .parse()
            .map_err(|_| FLOAT_TYPE_MSG.to_string())?;
        if x.is_nan() {
            return Err(FLOAT_TYPE_MSG.to_string());
        }

        if out_of_range(x, min_float, max_float) {
            return Err(range_msg.clone());
        }
        Ok(())
    })
}

/// Bounds on how many checkbox options may be selected.
pub fn validate_selection(
    min_selected: Option<usize>,
    max_selected: Option<usize>,
) -> SelectionValidator {
    let msg = format!(
        "Select between {} and {} options",
        bound(min_selected),
        bound(max_selected)
    );

    Arc::new(move |selected: &[String]| {
        if out_of_range(selected.len(), min_selected, max_selected) {
            Err(msg.clone())
        } else {
            Ok(())
        }
    })
}

/// Chains validators; the first failure wins.
pub fn all_of(validators: Vec<Validator>) -> Validator {
    Arc::new(move |val: &str| validators.iter().try_for_each(|v| v(val)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_required_and_optional() {
        let required = validate_string(None, None, None, None, false).unwrap();
        assert_eq!(required(""), Err(REQUIRED_MSG.to_string()));

        let optional = validate_string(Some(3), None, None, None, true).unwrap();
        assert_eq!(optional(""), Ok(()));
    }

    #[test]
    fn test_string_length_message_uses_infinite() {
        let v = validate_string(None, Some(5), None, None, false).unwrap();
        assert_eq!(v("abcdef"), Err("Length must be between infinite and 5".into()));
        assert_eq!(v("abcde"), Ok(()));

        let v = validate_string(Some(2), None, None, None, false).unwrap();
        assert_eq!(v("a"), Err("Length must be between 2 and infinite".into()));
    }

    #[test]
    fn test_string_length_counts_characters() {
        let v = validate_string(None, Some(3), None, None, false).unwrap();
        assert_eq!(v("ñáé"), Ok(()));
    }

    #[test]
    fn test_pattern_matches_at_start_only() {
        let v = validate_string(None, None, Some("[0-9a-f]+"), None, false).unwrap();
        assert_eq!(v("27362e4afa18a31c6bf"), Ok(()));
        // Prefix match: trailing junk still passes, leading junk does not.
        assert_eq!(v("abc!"), Ok(()));
        assert_eq!(v("!abc"), Err(PATTERN_MSG.to_string()));
    }

    #[test]
    fn test_pattern_custom_message() {
        let v = validate_string(None, None, Some(r"\["), Some("Use [a,b] syntax"), false).unwrap();
        assert_eq!(v("1,2"), Err("Use [a,b] syntax".into()));
    }

    #[test]
    fn test_invalid_pattern_fails_at_build() {
        assert!(validate_string(None, None, Some("(unclosed"), None, false).is_err());
    }

    #[test]
    fn test_integer_messages() {
        let v = validate_integer(Some(1), Some(65536), false);
        assert_eq!(v("7"), Ok(()));
        assert_eq!(v("x7"), Err(INTEGER_TYPE_MSG.to_string()));
        assert_eq!(v("1.5"), Err(INTEGER_TYPE_MSG.to_string()));
        assert_eq!(v("0"), Err("Value must be between 1 and 65536".into()));
        assert_eq!(v("65537"), Err("Value must be between 1 and 65536".into()));
        assert_eq!(v(""), Err(REQUIRED_MSG.to_string()));
    }

    #[test]
    fn test_integer_unbounded() {
        let v = validate_integer(None, Some(0), true);
        assert_eq!(v("-99999"), Ok(()));
        assert_eq!(v("1"), Err("Value must be between infinite and 0".into()));
        assert_eq!(v(""), Ok(()));
    }

    #[test]
    fn test_float() {
        let v = validate_float(Some(0.5), Some(2.5), false);
        assert_eq!(v("1.25"), Ok(()));
        assert_eq!(v("3"), Err("Value must be between 0.5 and 2.5".into()));
        assert_eq!(v("abc"), Err(FLOAT_TYPE_MSG.to_string()));
        assert_eq!(v("NaN"), Err(FLOAT_TYPE_MSG.to_string()));
    }

    #[test]
    fn test_float_integral_bounds_keep_decimal_point() {
        let v = validate_float(Some(1.0), Some(2.0), false);
        assert_eq!(v("3"), Err("Value must be between 1.0 and 2.0".into()));
        let v = validate_float(None, Some(10.0), false);
        assert_eq!(v("11"), Err("Value must be between infinite and 10.0".into()));
    }

    #[test]
    fn test_integer_beyond_i64() {
        let huge = "99999999999999999999";
        let bounded = validate_integer(Some(1), Some(65536), false);
        assert_eq!(bounded(huge), Err("Value must be between 1 and 65536".into()));
        assert_eq!(
            bounded("-99999999999999999999"),
            Err("Value must be between 1 and 65536".into())
        );

        let unbounded = validate_integer(None, None, false);
        assert_eq!(unbounded(huge), Ok(()));
        assert_eq!(unbounded("-99999999999999999999"), Ok(()));

        let only_min = validate_integer(Some(0), None, false);
        assert_eq!(only_min(huge), Ok(()));
    }

    #[test]
    fn test_selection_bounds() {
        let v = validate_selection(Some(1), None);
        assert_eq!(v(&[]), Err("Select between 1 and infinite options".into()));
        assert_eq!(v(&["a".to_string()]), Ok(()));
    }

    #[test]
    fn test_all_of_first_failure_wins() {
        let v = all_of(vec![
            validate_string(None, Some(4), None, None, false).unwrap(),
            validate_integer(None, None, false),
        ]);
        assert_eq!(v("12"), Ok(()));
        assert_eq!(v("12345"), Err("Length must be between infinite and 4".into()));
        assert_eq!(v("ab"), Err(INTEGER_TYPE_MSG.to_string()));
    }
}
