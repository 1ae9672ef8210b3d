//! Question descriptors for interactive forms.
//!
//! Questions hold data only. The closed [`Question`] union is projected into
//! prompt records by [`crate::form::compiler`] and executed by
//! [`crate::form::runner`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::validators::{SelectionValidator, Validator};

/// A collected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Many(Vec<String>),
}

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            Answer::Many(_) => None,
        }
    }

    pub fn is_empty_text(&self) -> bool {
        matches!(self, Answer::Text(s) if s.is_empty())
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Answer::Text(s)
    }
}

/// Answers keyed by question name.
pub type Answers = BTreeMap<String, Answer>;

/// Transform applied to an accepted answer before it is stored.
pub type Filter = Arc<dyn Fn(Answer) -> Answer + Send + Sync>;

/// Static default for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Pre-filled text, or the value of the preselected choice.
    Text(String),
    /// Position of the preselected choice, separators included.
    Index(usize),
    /// Pre-checked values of a checkbox.
    Many(Vec<String>),
}

impl DefaultValue {
    pub fn is_empty(&self) -> bool {
        match self {
            DefaultValue::Text(s) => s.is_empty(),
            DefaultValue::Index(_) => false,
            DefaultValue::Many(v) => v.is_empty(),
        }
    }
}

/// A default, either fixed or computed from the answers given so far.
#[derive(Clone)]
pub enum DefaultSpec {
    Value(DefaultValue),
    Computed(Arc<dyn Fn(&Answers) -> Option<DefaultValue> + Send + Sync>),
}

impl DefaultSpec {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Answers) -> Option<DefaultValue> + Send + Sync + 'static,
    {
        DefaultSpec::Computed(Arc::new(f))
    }

    /// Evaluates the default against the current answers. Never cached.
    pub fn resolve(&self, answers: &Answers) -> Option<DefaultValue> {
        match self {
            DefaultSpec::Value(v) => Some(v.clone()),
            DefaultSpec::Computed(f) => f(answers),
        }
        .filter(|v| !v.is_empty())
    }

    fn is_empty(&self) -> bool {
        matches!(self, DefaultSpec::Value(v) if v.is_empty())
    }
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSpec::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultSpec::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for DefaultSpec {
    fn from(s: &str) -> Self {
        DefaultSpec::Value(DefaultValue::Text(s.to_string()))
    }
}

impl From<String> for DefaultSpec {
    fn from(s: String) -> Self {
        DefaultSpec::Value(DefaultValue::Text(s))
    }
}

impl From<usize> for DefaultSpec {
    fn from(i: usize) -> Self {
        DefaultSpec::Value(DefaultValue::Index(i))
    }
}

impl From<Vec<String>> for DefaultSpec {
    fn from(v: Vec<String>) -> Self {
        DefaultSpec::Value(DefaultValue::Many(v))
    }
}

/// One entry of a choice list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Option {
        /// Text shown to the user.
        label: String,
        /// Value stored in the answers.
        value: String,
        disabled: bool,
    },
    /// Non-selectable divider, optionally labelled.
    Separator(Option<String>),
}

impl Choice {
    pub fn option(value: impl Into<String>) -> Self {
        let value = value.into();
        Choice::Option {
            label: value.clone(),
            value,
            disabled: false,
        }
    }

    pub fn labelled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Choice::Option {
            label: label.into(),
            value: value.into(),
            disabled: false,
        }
    }

    pub fn separator() -> Self {
        Choice::Separator(None)
    }

    pub fn is_selectable(&self) -> bool {
        matches!(self, Choice::Option { disabled: false, .. })
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Choice::Option { value, .. } => Some(value),
            Choice::Separator(_) => None,
        }
    }
}

/// Choices, either fixed or computed from the answers given so far.
#[derive(Clone)]
pub enum ChoicesSpec {
    Static(Vec<Choice>),
    Computed(Arc<dyn Fn(&Answers) -> Vec<Choice> + Send + Sync>),
}

impl ChoicesSpec {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Answers) -> Vec<Choice> + Send + Sync + 'static,
    {
        ChoicesSpec::Computed(Arc::new(f))
    }

    pub fn resolve(&self, answers: &Answers) -> Vec<Choice> {
        match self {
            ChoicesSpec::Static(c) => c.clone(),
            ChoicesSpec::Computed(f) => f(answers),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, ChoicesSpec::Static(c) if c.is_empty())
    }
}

impl fmt::Debug for ChoicesSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoicesSpec::Static(c) => f.debug_tuple("Static").field(c).finish(),
            ChoicesSpec::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ChoicesSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ChoicesSpec::Static(iter.into_iter().map(Choice::option).collect())
    }
}

impl From<Vec<Choice>> for ChoicesSpec {
    fn from(c: Vec<Choice>) -> Self {
        ChoicesSpec::Static(c)
    }
}

impl From<Vec<String>> for ChoicesSpec {
    fn from(values: Vec<String>) -> Self {
        values.into_iter().collect()
    }
}

impl<const N: usize> From<[&str; N]> for ChoicesSpec {
    fn from(values: [&str; N]) -> Self {
        values.into_iter().collect()
    }
}

/// Single-line text question.
#[derive(Clone, Default)]
pub struct Input {
    pub name: String,
    pub message: Option<String>,
    pub default: Option<DefaultSpec>,
    pub validate: Option<Validator>,
    pub filter: Option<Filter>,
}

/// Single-choice question. Also backs [`Question::RawList`].
#[derive(Clone, Default)]
pub struct OptionList {
    pub name: String,
    pub message: Option<String>,
    pub default: Option<DefaultSpec>,
    pub choices: Option<ChoicesSpec>,
    pub filter: Option<Filter>,
    /// Text drawn for unlabelled separators.
    pub separator: Option<String>,
}

/// Multi-choice question.
#[derive(Clone, Default)]
pub struct CheckBox {
    pub name: String,
    pub message: Option<String>,
    pub default: Option<DefaultSpec>,
    pub choices: Option<ChoicesSpec>,
    pub filter: Option<Filter>,
    pub validate: Option<SelectionValidator>,
}

/// A form question. The set of variants is closed.
#[derive(Clone)]
pub enum Question {
    Input(Input),
    OptionList(OptionList),
    /// Same fields as `OptionList`, rendered as a numbered list.
    RawList(OptionList),
    CheckBox(CheckBox),
}

impl Question {
    pub fn input(name: impl Into<String>) -> Self {
        Question::Input(Input {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn option_list(name: impl Into<String>) -> Self {
        Question::OptionList(OptionList {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn raw_list(name: impl Into<String>) -> Self {
        Question::RawList(OptionList {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Question::CheckBox(CheckBox {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Question::Input(q) => &q.name,
            Question::OptionList(q) | Question::RawList(q) => &q.name,
            Question::CheckBox(q) => &q.name,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        let message = Some(message.into());
        match &mut self {
            Question::Input(q) => q.message = message,
            Question::OptionList(q) | Question::RawList(q) => q.message = message,
            Question::CheckBox(q) => q.message = message,
        }
        self
    }

    pub fn default(mut self, default: impl Into<DefaultSpec>) -> Self {
        let default = Some(default.into());
        match &mut self {
            Question::Input(q) => q.default = default,
            Question::OptionList(q) | Question::RawList(q) => q.default = default,
            Question::CheckBox(q) => q.default = default,
        }
        self
    }

    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(Answer) -> Answer + Send + Sync + 'static,
    {
        let filter: Option<Filter> = Some(Arc::new(f));
        match &mut self {
            Question::Input(q) => q.filter = filter,
            Question::OptionList(q) | Question::RawList(q) => q.filter = filter,
            Question::CheckBox(q) => q.filter = filter,
        }
        self
    }

    /// Sets the text validator. Ignored by variants without one.
    pub fn validate(mut self, v: Validator) -> Self {
        if let Question::Input(q) = &mut self {
            q.validate = Some(v);
        }
        self
    }

    /// Sets the selection validator. Ignored by variants without one.
    pub fn validate_selection(mut self, v: SelectionValidator) -> Self {
        if let Question::CheckBox(q) = &mut self {
            q.validate = Some(v);
        }
        self
    }

    /// Sets the choices. Ignored by `Input`.
    pub fn choices(mut self, choices: impl Into<ChoicesSpec>) -> Self {
        let choices = Some(choices.into());
        match &mut self {
            Question::Input(_) => {}
            Question::OptionList(q) | Question::RawList(q) => q.choices = choices,
            Question::CheckBox(q) => q.choices = choices,
        }
        self
    }

    /// Sets the separator text. Only list variants draw it.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        if let Question::OptionList(q) | Question::RawList(q) = &mut self {
            q.separator = Some(separator.into());
        }
        self
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Question::Input(_) => "Input",
            Question::OptionList(_) => "OptionList",
            Question::RawList(_) => "RawList",
            Question::CheckBox(_) => "CheckBox",
        };
        f.debug_struct(kind).field("name", &self.name()).finish()
    }
}

// Zero-equivalence checks shared with the compiler.
pub(crate) fn default_is_empty(d: &Option<DefaultSpec>) -> bool {
    d.as_ref().is_none_or(DefaultSpec::is_empty)
}

pub(crate) fn choices_is_empty(c: &Option<ChoicesSpec>) -> bool {
    c.as_ref().is_none_or(ChoicesSpec::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_variant_fields() {
        let q = Question::option_list("numlist")
            .message("Pick a list: ")
            .choices(["1", "2"])
            .default(1usize);
        match q {
            Question::OptionList(ol) => {
                assert_eq!(ol.message.as_deref(), Some("Pick a list: "));
                assert!(matches!(
                    ol.default,
                    Some(DefaultSpec::Value(DefaultValue::Index(1)))
                ));
                assert!(!choices_is_empty(&ol.choices));
            }
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn test_builder_ignores_foreign_fields() {
        let q = Question::input("evidence").choices(["a"]).separator("--");
        let Question::Input(input) = q else {
            panic!("expected input");
        };
        assert!(input.validate.is_none());
        assert_eq!(input.name, "evidence");
    }

    #[test]
    fn test_computed_default_sees_answers() {
        let default = DefaultSpec::computed(|answers| {
            answers
                .get("x_axis")
                .and_then(Answer::as_text)
                .map(|x| DefaultValue::Text(x.to_string()))
        });
        let mut answers = Answers::new();
        assert_eq!(default.resolve(&answers), None);
        answers.insert("x_axis".into(), "3".into());
        assert_eq!(default.resolve(&answers), Some(DefaultValue::Text("3".into())));
    }

    #[test]
    fn test_empty_default_resolves_to_none() {
        let default = DefaultSpec::from("");
        assert_eq!(default.resolve(&Answers::new()), None);
        assert!(default_is_empty(&Some(default)));
    }

    #[test]
    fn test_answer_serializes_untagged() {
        let json = serde_json::to_string(&Answer::Many(vec!["a".into()])).unwrap();
        assert_eq!(json, r#"["a"]"#);
        let json = serde_json::to_string(&Answer::from("7")).unwrap();
        assert_eq!(json, r#""7""#);
    }
}
