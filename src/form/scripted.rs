//! A [`PromptBackend`] that replays prepared responses instead of reading keys.

use std::collections::VecDeque;

use super::question::Answer;
use super::runner::{LinePrompt, PromptBackend, SelectPrompt};
use crate::error::{HemertonError, Result};

/// One prepared reaction to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Text typed into an input; empty accepts the default.
    Line(String),
    /// Accept the preselected choice.
    Enter,
    /// Pick the choice whose value matches.
    Pick(String),
    /// Pick the choice at this index.
    PickIndex(usize),
    /// Submit a checkbox with exactly these values checked.
    Check(Vec<String>),
    /// Submit a checkbox with its preselection untouched.
    KeepChecked,
    /// Cancel the form.
    Interrupt,
}

impl Response {
    pub fn line(s: impl Into<String>) -> Self {
        Response::Line(s.into())
    }

    pub fn pick(s: impl Into<String>) -> Self {
        Response::Pick(s.into())
    }
}

/// Replays [`Response`]s in order and records what was shown.
///
/// Running out of responses counts as an interrupt.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: VecDeque<Response>,
    /// Messages of the prompts that were displayed, in order.
    pub prompts: Vec<String>,
    /// Validation messages that were displayed.
    pub errors: Vec<String>,
    /// Echoed answers as `(message, answer)`.
    pub echoed: Vec<(String, Answer)>,
}

impl ScriptedBackend {
    pub fn new(responses: impl IntoIterator<Item = Response>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Feeds one line per input question.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| Response::Line(l.into())))
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    fn next(&mut self, message: &str) -> Result<Response> {
        self.prompts.push(message.to_string());
        match self.responses.pop_front() {
            None | Some(Response::Interrupt) => Err(HemertonError::Interrupted),
            Some(r) => Ok(r),
        }
    }

    fn unexpected(message: &str, r: &Response) -> HemertonError {
        HemertonError::Terminal {
            message: format!("scripted response {:?} does not fit prompt '{}'", r, message),
        }
    }
}

impl PromptBackend for ScriptedBackend {
    fn read_line(&mut self, prompt: &LinePrompt<'_>) -> Result<String> {
        match self.next(prompt.message)? {
            Response::Line(s) => Ok(s),
            Response::Enter => Ok(String::new()),
            other => Err(Self::unexpected(prompt.message, &other)),
        }
    }

    fn select_one(&mut self, prompt: &SelectPrompt<'_>) -> Result<usize> {
        match self.next(prompt.message)? {
            Response::Enter => Ok(prompt.cursor),
            Response::PickIndex(i) => Ok(i),
            Response::Pick(value) => prompt
                .choices
                .iter()
                .position(|c| c.value() == Some(value.as_str()))
                .ok_or_else(|| HemertonError::Terminal {
                    message: format!("no choice '{}' in prompt '{}'", value, prompt.message),
                }),
            other => Err(Self::unexpected(prompt.message, &other)),
        }
    }

    fn select_many(&mut self, prompt: &SelectPrompt<'_>) -> Result<Vec<usize>> {
        match self.next(prompt.message)? {
            Response::KeepChecked | Response::Enter => Ok(prompt
                .checked
                .iter()
                .enumerate()
                .filter(|(_, on)| **on)
                .map(|(i, _)| i)
                .collect()),
            Response::Check(values) => Ok(prompt
                .choices
                .iter()
                .enumerate()
                .filter(|(_, c)| c.value().is_some_and(|v| values.iter().any(|x| x == v)))
                .map(|(i, _)| i)
                .collect()),
            other => Err(Self::unexpected(prompt.message, &other)),
        }
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        self.errors.push(message.to_string());
        Ok(())
    }

    fn show_answer(&mut self, _qmark: &str, message: &str, answer: &Answer) -> Result<()> {
        self.echoed.push((message.to_string(), answer.clone()));
        Ok(())
    }
}
