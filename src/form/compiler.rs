//! Projects [`Question`]s into the uniform records consumed by the runner.
//!
//! Only the fields valid for a question's variant are carried over, and a
//! field holding its zero value (empty text, empty list, absent) is left out so
//! the renderer falls back to its own default.

use std::collections::HashSet;

use super::question::{
    ChoicesSpec, DefaultSpec, Filter, Question, choices_is_empty, default_is_empty,
};
use super::theme::PromptTheme;
use super::validators::{SelectionValidator, Validator};
use crate::error::{HemertonError, Result};

/// Rendering type of a compiled question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Input,
    List,
    RawList,
    Checkbox,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Input => "input",
            QuestionKind::List => "list",
            QuestionKind::RawList => "rawlist",
            QuestionKind::Checkbox => "checkbox",
        }
    }
}

/// Names of the optional fields a record may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Message,
    Default,
    Choices,
    Validate,
    Filter,
    Separator,
}

/// A question ready for rendering.
#[derive(Clone)]
pub struct CompiledQuestion {
    pub kind: QuestionKind,
    pub name: String,
    pub qmark: String,
    pub message: String,
    pub default: Option<DefaultSpec>,
    pub choices: Option<ChoicesSpec>,
    pub validate: Option<Validator>,
    pub validate_selection: Option<SelectionValidator>,
    pub filter: Option<Filter>,
    pub separator: Option<String>,
}

impl CompiledQuestion {
    fn new(kind: QuestionKind, name: &str, message: &Option<String>, qmark: &str) -> Self {
        let message = message
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_message(name));
        Self {
            kind,
            name: name.to_string(),
            qmark: qmark.to_string(),
            message,
            default: None,
            choices: None,
            validate: None,
            validate_selection: None,
            filter: None,
            separator: None,
        }
    }

    /// Optional fields present on this record, in a fixed order.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Message];
        if self.default.is_some() {
            fields.push(Field::Default);
        }
        if self.choices.is_some() {
            fields.push(Field::Choices);
        }
        if self.validate.is_some() || self.validate_selection.is_some() {
            fields.push(Field::Validate);
        }
        if self.filter.is_some() {
            fields.push(Field::Filter);
        }
        if self.separator.is_some() {
            fields.push(Field::Separator);
        }
        fields
    }
}

impl std::fmt::Debug for CompiledQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledQuestion")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("message", &self.message)
            .field("fields", &self.fields())
            .finish()
    }
}

/// Prompt shown when a question has no message: `numlist` becomes `Numlist:`.
pub fn default_message(name: &str) -> String {
    let mut chars = name.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };
    format!("{}:", capitalized)
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.clone().filter(|s| !s.is_empty())
}

/// Compiles a form, preserving question order.
pub fn compile(questions: &[Question], theme: &PromptTheme) -> Result<Vec<CompiledQuestion>> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::with_capacity(questions.len());

    for q in questions {
        let name = q.name();
        if name.is_empty() {
            return Err(HemertonError::InvalidForm {
                message: "question name cannot be empty".into(),
            });
        }
        if !seen.insert(name.to_string()) {
            return Err(HemertonError::InvalidForm {
                message: format!("duplicate question name '{}'", name),
            });
        }

        let record = match q {
            Question::Input(input) => {
                let mut r =
                    CompiledQuestion::new(QuestionKind::Input, name, &input.message, &theme.qmark);
                if !default_is_empty(&input.default) {
                    r.default = input.default.clone();
                }
                r.validate = input.validate.clone();
                r.filter = input.filter.clone();
                r
            }
            Question::OptionList(list) | Question::RawList(list) => {
                let kind = if matches!(q, Question::RawList(_)) {
                    QuestionKind::RawList
                } else {
                    QuestionKind::List
                };
                let mut r = CompiledQuestion::new(kind, name, &list.message, &theme.qmark);
                if !default_is_empty(&list.default) {
                    r.default = list.default.clone();
                }
                if !choices_is_empty(&list.choices) {
                    r.choices = list.choices.clone();
                }
                r.filter = list.filter.clone();
                r.separator = non_empty(&list.separator);
                r
            }
            Question::CheckBox(cb) => {
                let mut r =
                    CompiledQuestion::new(QuestionKind::Checkbox, name, &cb.message, &theme.qmark);
                if !default_is_empty(&cb.default) {
                    r.default = cb.default.clone();
                }
                if !choices_is_empty(&cb.choices) {
                    r.choices = cb.choices.clone();
                }
                r.filter = cb.filter.clone();
                r.validate_selection = cb.validate.clone();
                r
            }
        };

        tracing::trace!(name = %record.name, kind = record.kind.as_str(), "compiled question");
        compiled.push(record);
    }

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::validators::validate_integer;

    #[test]
    fn test_default_message() {
        assert_eq!(default_message("numlist"), "Numlist:");
        assert_eq!(default_message("nAccMax"), "Naccmax:");
        assert_eq!(default_message(""), ":");
    }

    #[test]
    fn test_empty_form_compiles_to_nothing() {
        assert!(compile(&[], &PromptTheme::default()).unwrap().is_empty());
    }

    #[test]
    fn test_input_projection_omits_empty_default() {
        let form = [Question::input("numlist")
            .default("")
            .validate(validate_integer(Some(1), None, false))];
        let compiled = compile(&form, &PromptTheme::default()).unwrap();
        assert_eq!(compiled[0].kind, QuestionKind::Input);
        assert_eq!(compiled[0].message, "Numlist:");
        assert_eq!(compiled[0].fields(), vec![Field::Message, Field::Validate]);
    }

    #[test]
    fn test_empty_message_falls_back() {
        let form = [Question::input("request").message("")];
        let compiled = compile(&form, &PromptTheme::default()).unwrap();
        assert_eq!(compiled[0].message, "Request:");
    }

    #[test]
    fn test_rawlist_kind_and_separator() {
        let form = [Question::raw_list("pick").choices(["a"]).separator("~~")];
        let compiled = compile(&form, &PromptTheme::default()).unwrap();
        assert_eq!(compiled[0].kind, QuestionKind::RawList);
        assert_eq!(compiled[0].separator.as_deref(), Some("~~"));
        assert_eq!(
            compiled[0].fields(),
            vec![Field::Message, Field::Choices, Field::Separator]
        );
    }

    #[test]
    fn test_qmark_comes_from_theme() {
        let theme = PromptTheme {
            qmark: "?".into(),
            ..Default::default()
        };
        let form = [Question::input("a"), Question::checkbox("b")];
        let compiled = compile(&form, &theme).unwrap();
        assert!(compiled.iter().all(|c| c.qmark == "?"));
    }

    #[test]
    fn test_rejects_duplicate_and_empty_names() {
        let theme = PromptTheme::default();
        let dup = [Question::input("a"), Question::option_list("a")];
        assert!(matches!(
            compile(&dup, &theme),
            Err(HemertonError::InvalidForm { .. })
        ));
        assert!(compile(&[Question::input("")], &theme).is_err());
    }
}
