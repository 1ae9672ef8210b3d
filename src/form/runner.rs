//! Executes compiled forms against a [`PromptBackend`].

use super::compiler::{CompiledQuestion, QuestionKind};
use super::question::{Answer, Answers, Choice, DefaultValue};
use super::theme::PromptTheme;
use crate::error::{HemertonError, Result};

/// A single-line text prompt.
#[derive(Debug, Clone)]
pub struct LinePrompt<'a> {
    pub qmark: &'a str,
    pub message: &'a str,
    pub default: Option<&'a str>,
}

/// A choice prompt. `cursor` indexes `choices` and is always selectable.
#[derive(Debug, Clone)]
pub struct SelectPrompt<'a> {
    pub qmark: &'a str,
    pub message: &'a str,
    pub choices: &'a [Choice],
    /// Text for separators without a label.
    pub separator: &'a str,
    pub cursor: usize,
    /// Pre-checked state per choice (checkbox only).
    pub checked: Vec<bool>,
    /// Render as a numbered list.
    pub numbered: bool,
}

/// Terminal interaction used by the runner.
///
/// Implementations block until the user responds and return
/// [`HemertonError::Interrupted`] when the user cancels.
pub trait PromptBackend {
    /// Returns the raw text entered; empty when the user just pressed enter.
    fn read_line(&mut self, prompt: &LinePrompt<'_>) -> Result<String>;

    /// Returns the index of the chosen entry.
    fn select_one(&mut self, prompt: &SelectPrompt<'_>) -> Result<usize>;

    /// Returns the indices of the checked entries.
    fn select_many(&mut self, prompt: &SelectPrompt<'_>) -> Result<Vec<usize>>;

    /// Shows a validation message before the question is asked again.
    fn show_error(&mut self, message: &str) -> Result<()>;

    /// Echoes the accepted answer.
    fn show_answer(&mut self, qmark: &str, message: &str, answer: &Answer) -> Result<()>;
}

impl<B: PromptBackend + ?Sized> PromptBackend for &mut B {
    fn read_line(&mut self, prompt: &LinePrompt<'_>) -> Result<String> {
        (**self).read_line(prompt)
    }

    fn select_one(&mut self, prompt: &SelectPrompt<'_>) -> Result<usize> {
        (**self).select_one(prompt)
    }

    fn select_many(&mut self, prompt: &SelectPrompt<'_>) -> Result<Vec<usize>> {
        (**self).select_many(prompt)
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        (**self).show_error(message)
    }

    fn show_answer(&mut self, qmark: &str, message: &str, answer: &Answer) -> Result<()> {
        (**self).show_answer(qmark, message, answer)
    }
}

/// Removes answers that are empty strings. Empty selections are kept.
pub fn prune_empty(answers: &mut Answers) {
    answers.retain(|_, v| !v.is_empty_text());
}

pub struct PromptRunner<B> {
    backend: B,
    theme: PromptTheme,
}

impl<B: PromptBackend> PromptRunner<B> {
    pub fn new(backend: B, theme: PromptTheme) -> Self {
        Self { backend, theme }
    }

    /// Asks every question in order and returns the collected answers.
    ///
    /// Nothing is returned if the user interrupts part-way.
    pub fn run(&mut self, questions: &[CompiledQuestion], prune: bool) -> Result<Answers> {
        let mut answers = Answers::new();

        for q in questions {
            let answer = match q.kind {
                QuestionKind::Input => self.ask_input(q, &answers)?,
                QuestionKind::List | QuestionKind::RawList => self.ask_list(q, &answers)?,
                QuestionKind::Checkbox => self.ask_checkbox(q, &answers)?,
            };
            let answer = match &q.filter {
                Some(filter) => filter(answer),
                None => answer,
            };
            self.backend.show_answer(&q.qmark, &q.message, &answer)?;
            tracing::debug!(question = %q.name, "answer accepted");
            answers.insert(q.name.clone(), answer);
        }

        if prune {
            prune_empty(&mut answers);
        }
        Ok(answers)
    }

    fn ask_input(&mut self, q: &CompiledQuestion, answers: &Answers) -> Result<Answer> {
        let default = q
            .default
            .as_ref()
            .and_then(|d| d.resolve(answers))
            .map(|d| match d {
                DefaultValue::Text(t) => t,
                DefaultValue::Index(i) => i.to_string(),
                DefaultValue::Many(v) => v.join(","),
            });

        loop {
            let raw = self.backend.read_line(&LinePrompt {
                qmark: &q.qmark,
                message: &q.message,
                default: default.as_deref(),
            })?;
            let value = match (raw.is_empty(), &default) {
                (true, Some(d)) => d.clone(),
                _ => raw,
            };

            if let Some(validate) = &q.validate
                && let Err(msg) = validate(&value)
            {
                self.backend.show_error(&msg)?;
                continue;
            }
            return Ok(Answer::Text(value));
        }
    }

    fn resolve_choices(&self, q: &CompiledQuestion, answers: &Answers) -> Result<Vec<Choice>> {
        let choices = q
            .choices
            .as_ref()
            .map(|c| c.resolve(answers))
            .unwrap_or_default();
        if !choices.iter().any(Choice::is_selectable) {
            return Err(HemertonError::InvalidForm {
                message: format!("question '{}' has no selectable choices", q.name),
            });
        }
        Ok(choices)
    }

    fn ask_list(&mut self, q: &CompiledQuestion, answers: &Answers) -> Result<Answer> {
        let choices = self.resolve_choices(q, answers)?;
        let default = q.default.as_ref().and_then(|d| d.resolve(answers));
        let cursor = initial_cursor(&choices, default.as_ref());
        let separator = q.separator.as_deref().unwrap_or(&self.theme.separator);

        loop {
            let idx = self.backend.select_one(&SelectPrompt {
                qmark: &q.qmark,
                message: &q.message,
                choices: &choices,
                separator,
                cursor,
                checked: Vec::new(),
                numbered: q.kind == QuestionKind::RawList,
            })?;
            if let Some(choice) = choices.get(idx)
                && choice.is_selectable()
                && let Some(value) = choice.value()
            {
                return Ok(Answer::Text(value.to_string()));
            }
            self.backend.show_error("Please select a valid option")?;
        }
    }

    fn ask_checkbox(&mut self, q: &CompiledQuestion, answers: &Answers) -> Result<Answer> {
        let choices = self.resolve_choices(q, answers)?;
        let default = q.default.as_ref().and_then(|d| d.resolve(answers));
        let checked = initial_checked(&choices, default.as_ref());
        let cursor = initial_cursor(&choices, None);
        let separator = q.separator.as_deref().unwrap_or(&self.theme.separator);

        loop {
            let picked = self.backend.select_many(&SelectPrompt {
                qmark: &q.qmark,
                message: &q.message,
                choices: &choices,
                separator,
                cursor,
                checked: checked.clone(),
                numbered: false,
            })?;
            let values: Vec<String> = choices
                .iter()
                .enumerate()
                .filter(|(i, c)| picked.contains(i) && c.is_selectable())
                .filter_map(|(_, c)| c.value().map(str::to_string))
                .collect();

            if let Some(validate) = &q.validate_selection
                && let Err(msg) = validate(&values)
            {
                self.backend.show_error(&msg)?;
                continue;
            }
            return Ok(Answer::Many(values));
        }
    }
}

fn first_selectable(choices: &[Choice]) -> usize {
    choices.iter().position(Choice::is_selectable).unwrap_or(0)
}

fn initial_cursor(choices: &[Choice], default: Option<&DefaultValue>) -> usize {
    let found = match default {
        Some(DefaultValue::Index(i)) => Some(*i),
        Some(DefaultValue::Text(v)) => choices.iter().position(|c| c.value() == Some(v.as_str())),
        _ => None,
    };
    found
        .filter(|&i| choices.get(i).is_some_and(Choice::is_selectable))
        .unwrap_or_else(|| first_selectable(choices))
}

fn initial_checked(choices: &[Choice], default: Option<&DefaultValue>) -> Vec<bool> {
    choices
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.is_selectable()
                && match default {
                    Some(DefaultValue::Many(values)) => {
                        c.value().is_some_and(|v| values.iter().any(|x| x == v))
                    }
                    Some(DefaultValue::Text(t)) => c.value() == Some(t.as_str()),
                    Some(DefaultValue::Index(idx)) => *idx == i,
                    None => false,
                }
        })
        .collect()
}
