//! Interactive form engine.
//!
//! Forms are declared as a sequence of [`Question`]s, compiled into
//! [`CompiledQuestion`] records by [`compile`], and asked in order by a
//! [`PromptRunner`] over some [`PromptBackend`]:
//!
//! ```rust,ignore
//! use hemerton::form::{self, Question, validators::validate_integer};
//!
//! let answers = form::prompt(
//!     &[Question::input("request")
//!         .message("Request ID: ")
//!         .default("1")
//!         .validate(validate_integer(Some(1), Some(65536), false))],
//!     &form::PromptTheme::default(),
//! )?;
//! ```
//!
//! The engine does not know what the answers are for; callers coerce the
//! returned strings themselves.

pub mod compiler;
pub mod question;
pub mod runner;
pub mod scripted;
pub mod terminal;
pub mod theme;
pub mod validators;

pub use compiler::{CompiledQuestion, Field, QuestionKind, compile, default_message};
pub use question::{
    Answer, Answers, CheckBox, Choice, ChoicesSpec, DefaultSpec, DefaultValue, Filter, Input,
    OptionList, Question,
};
pub use runner::{LinePrompt, PromptBackend, PromptRunner, SelectPrompt, prune_empty};
pub use scripted::{Response, ScriptedBackend};
pub use terminal::TerminalBackend;
pub use theme::PromptTheme;

use crate::error::Result;

/// Compiles and asks `questions` on the terminal, pruning empty answers.
pub fn prompt(questions: &[Question], theme: &PromptTheme) -> Result<Answers> {
    let compiled = compile(questions, theme)?;
    let mut runner = PromptRunner::new(TerminalBackend::new(theme.clone()), theme.clone());
    runner.run(&compiled, true)
}

/// Like [`prompt`], over any backend.
pub fn prompt_with<B: PromptBackend>(
    backend: B,
    questions: &[Question],
    theme: &PromptTheme,
) -> Result<Answers> {
    let compiled = compile(questions, theme)?;
    PromptRunner::new(backend, theme.clone()).run(&compiled, true)
}
