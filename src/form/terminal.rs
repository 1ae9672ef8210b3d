//! Crossterm implementation of [`PromptBackend`].

use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveToPreviousLine;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Print, PrintStyledContent};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};

use super::question::{Answer, Choice};
use super::runner::{LinePrompt, PromptBackend, SelectPrompt};
use super::theme::PromptTheme;
use crate::error::{HemertonError, Result};

/// Restores cooked mode when dropped, including on early returns.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

enum Key {
    Interrupt,
    Other(KeyEvent),
}

fn next_key() -> Result<Key> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || key.code == KeyCode::Esc {
                return Ok(Key::Interrupt);
            }
            return Ok(Key::Other(key));
        }
    }
}

/// Screen rows taken by `len` printed characters on a terminal `width` wide.
fn rows_for(width: u16, len: usize) -> u16 {
    if width == 0 || len == 0 {
        return 1;
    }
    let rows = (len - 1) / usize::from(width) + 1;
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// Interactive prompts on stdout, keys read in raw mode.
pub struct TerminalBackend {
    out: Stdout,
    theme: PromptTheme,
    /// Screen rows drawn for the current question, wrapped rows included.
    /// Erased when the answer is echoed.
    drawn: u16,
}

impl TerminalBackend {
    pub fn new(theme: PromptTheme) -> Self {
        Self {
            out: io::stdout(),
            theme,
            drawn: 0,
        }
    }

    fn width(&self) -> u16 {
        terminal::size().map(|(cols, _)| cols).unwrap_or(0)
    }

    /// Printed width of the header, trailing space included.
    fn header_len(qmark: &str, message: &str) -> usize {
        qmark.chars().count() + message.chars().count() + 2
    }

    fn header(&mut self, qmark: &str, message: &str) -> Result<()> {
        queue!(
            self.out,
            PrintStyledContent(self.theme.qmark_style().apply(qmark.to_string())),
            Print(" "),
            PrintStyledContent(self.theme.question_style().apply(message.to_string())),
            Print(" "),
        )?;
        Ok(())
    }

    fn interrupted(&mut self) -> HemertonError {
        let _ = execute!(self.out, Print("\r\n"));
        HemertonError::Interrupted
    }

    /// Draws a choice list and returns the number of lines written.
    fn draw_choices(
        &mut self,
        prompt: &SelectPrompt<'_>,
        cursor: usize,
        checked: Option<&[bool]>,
        typed: Option<&str>,
    ) -> Result<u16> {
        let width = self.width();
        self.header(prompt.qmark, prompt.message)?;
        let hint = match (checked.is_some(), prompt.numbered) {
            (true, _) => "(<space> select, <a> toggle all, <i> invert, <enter> confirm)",
            (false, true) => "(type a number or use arrows, <enter> confirm)",
            (false, false) => "(use arrow keys, <enter> confirm)",
        };
        let mut rows = rows_for(
            width,
            Self::header_len(prompt.qmark, prompt.message) + hint.chars().count(),
        );
        queue!(
            self.out,
            PrintStyledContent(self.theme.instruction_style().apply(hint)),
            Print("\r\n")
        )?;

        let mut number = 0;
        for (i, choice) in prompt.choices.iter().enumerate() {
            let line_len;
            let pointer = if i == cursor {
                self.theme.pointer.clone()
            } else {
                " ".repeat(self.theme.pointer.chars().count())
            };
            match choice {
                Choice::Separator(label) => {
                    let text = label.as_deref().unwrap_or(prompt.separator);
                    line_len = 2 + pointer.chars().count() + text.chars().count();
                    queue!(
                        self.out,
                        Print(format!("  {}", " ".repeat(pointer.chars().count()))),
                        PrintStyledContent(self.theme.instruction_style().apply(text.to_string())),
                    )?;
                }
                Choice::Option {
                    label, disabled, ..
                } => {
                    let mut text = String::new();
                    if let Some(checked) = checked {
                        text.push_str(if checked.get(i).copied().unwrap_or(false) {
                            "◉ "
                        } else {
                            "◯ "
                        });
                    }
                    if prompt.numbered && !*disabled {
                        number += 1;
                        text.push_str(&format!("{}) ", number));
                    }
                    text.push_str(label);
                    if *disabled {
                        text.push_str(" (disabled)");
                    }
                    line_len = pointer.chars().count() + 1 + text.chars().count();
                    if *disabled {
                        queue!(
                            self.out,
                            Print(format!("{} ", pointer)),
                            PrintStyledContent(self.theme.instruction_style().apply(text)),
                        )?;
                    } else if i == cursor {
                        queue!(
                            self.out,
                            PrintStyledContent(
                                self.theme.selected_style().apply(format!("{} {}", pointer, text))
                            ),
                        )?;
                    } else {
                        queue!(self.out, Print(format!("{} {}", pointer, text)))?;
                    }
                }
            }
            queue!(self.out, Print("\r\n"))?;
            rows = rows.saturating_add(rows_for(width, line_len));
        }

        if let Some(typed) = typed {
            let line = format!("  Answer: {}", typed);
            queue!(self.out, Print(&line), Print("\r\n"))?;
            rows = rows.saturating_add(rows_for(width, line.chars().count()));
        }
        self.out.flush()?;
        Ok(rows)
    }

    fn redraw(
        &mut self,
        height: u16,
        prompt: &SelectPrompt<'_>,
        cursor: usize,
        checked: Option<&[bool]>,
        typed: Option<&str>,
    ) -> Result<u16> {
        queue!(
            self.out,
            MoveToPreviousLine(height),
            Clear(ClearType::FromCursorDown)
        )?;
        self.draw_choices(prompt, cursor, checked, typed)
    }
}

fn step(choices: &[Choice], from: usize, forward: bool) -> usize {
    let n = choices.len();
    let mut i = from;
    for _ in 0..n {
        i = if forward { (i + 1) % n } else { (i + n - 1) % n };
        if choices[i].is_selectable() {
            return i;
        }
    }
    from
}

/// Index of the `n`th (1-based) numbered choice.
fn nth_numbered(choices: &[Choice], n: usize) -> Option<usize> {
    choices
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_selectable())
        .nth(n.checked_sub(1)?)
        .map(|(i, _)| i)
}

impl PromptBackend for TerminalBackend {
    fn read_line(&mut self, prompt: &LinePrompt<'_>) -> Result<String> {
        self.header(prompt.qmark, prompt.message)?;
        let mut prefix_len = Self::header_len(prompt.qmark, prompt.message);
        if let Some(default) = prompt.default {
            let hint = format!("({}) ", default);
            prefix_len += hint.chars().count();
            queue!(
                self.out,
                PrintStyledContent(self.theme.instruction_style().apply(hint))
            )?;
        }
        self.out.flush()?;

        let mut buf = String::new();
        {
            let _raw = RawModeGuard::enable()?;
            loop {
                let key = match next_key()? {
                    Key::Interrupt => return Err(self.interrupted()),
                    Key::Other(key) => key,
                };
                match key.code {
                    KeyCode::Enter => break,
                    KeyCode::Backspace => {
                        if buf.pop().is_some() {
                            execute!(self.out, Print("\u{8} \u{8}"))?;
                        }
                    }
                    KeyCode::Char(c) => {
                        buf.push(c);
                        execute!(self.out, Print(c))?;
                    }
                    _ => {}
                }
            }
            execute!(self.out, Print("\r\n"))?;
        }
        let rows = rows_for(self.width(), prefix_len + buf.chars().count());
        self.drawn = self.drawn.saturating_add(rows);
        Ok(buf)
    }

    fn select_one(&mut self, prompt: &SelectPrompt<'_>) -> Result<usize> {
        let mut cursor = prompt.cursor;
        let mut typed = String::new();
        let typed_line = |t: &String| prompt.numbered.then(|| t.clone());

        let _raw = RawModeGuard::enable()?;
        let mut height = self.draw_choices(prompt, cursor, None, typed_line(&typed).as_deref())?;
        loop {
            let key = match next_key()? {
                Key::Interrupt => return Err(self.interrupted()),
                Key::Other(key) => key,
            };
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Up | KeyCode::Char('k') => cursor = step(prompt.choices, cursor, false),
                KeyCode::Down | KeyCode::Char('j') => cursor = step(prompt.choices, cursor, true),
                KeyCode::Char(c) if prompt.numbered && c.is_ascii_digit() => {
                    typed.push(c);
                    if let Some(i) = typed
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| nth_numbered(prompt.choices, n))
                    {
                        cursor = i;
                    }
                }
                KeyCode::Backspace if prompt.numbered => {
                    typed.pop();
                }
                _ => continue,
            }
            height = self.redraw(height, prompt, cursor, None, typed_line(&typed).as_deref())?;
        }
        self.drawn = self.drawn.saturating_add(height);
        Ok(cursor)
    }

    fn select_many(&mut self, prompt: &SelectPrompt<'_>) -> Result<Vec<usize>> {
        let mut cursor = prompt.cursor;
        let mut checked = prompt.checked.clone();
        checked.resize(prompt.choices.len(), false);

        let _raw = RawModeGuard::enable()?;
        let mut height = self.draw_choices(prompt, cursor, Some(&checked), None)?;
        loop {
            let key = match next_key()? {
                Key::Interrupt => return Err(self.interrupted()),
                Key::Other(key) => key,
            };
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Up | KeyCode::Char('k') => cursor = step(prompt.choices, cursor, false),
                KeyCode::Down | KeyCode::Char('j') => cursor = step(prompt.choices, cursor, true),
                KeyCode::Char(' ') => {
                    if prompt.choices[cursor].is_selectable() {
                        checked[cursor] = !checked[cursor];
                    }
                }
                KeyCode::Char('a') => {
                    let all = prompt
                        .choices
                        .iter()
                        .zip(&checked)
                        .filter(|(c, _)| c.is_selectable())
                        .all(|(_, on)| *on);
                    for (i, c) in prompt.choices.iter().enumerate() {
                        if c.is_selectable() {
                            checked[i] = !all;
                        }
                    }
                }
                KeyCode::Char('i') => {
                    for (i, c) in prompt.choices.iter().enumerate() {
                        if c.is_selectable() {
                            checked[i] = !checked[i];
                        }
                    }
                }
                _ => continue,
            }
            height = self.redraw(height, prompt, cursor, Some(&checked), None)?;
        }
        self.drawn = self.drawn.saturating_add(height);

        Ok(checked
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| i)
            .collect())
    }

    fn show_error(&mut self, message: &str) -> Result<()> {
        let line = format!(">> {}", message);
        let rows = rows_for(self.width(), line.chars().count());
        execute!(
            self.out,
            PrintStyledContent(self.theme.error_style().apply(line)),
            Print("\r\n")
        )?;
        self.drawn = self.drawn.saturating_add(rows);
        Ok(())
    }

    fn show_answer(&mut self, qmark: &str, message: &str, answer: &Answer) -> Result<()> {
        if self.drawn > 0 {
            queue!(
                self.out,
                MoveToPreviousLine(self.drawn),
                Clear(ClearType::FromCursorDown)
            )?;
        }
        self.drawn = 0;

        let text = match answer {
            Answer::Text(s) => s.clone(),
            Answer::Many(v) => v.join(", "),
        };
        self.header(qmark, message)?;
        execute!(
            self.out,
            PrintStyledContent(self.theme.answer_style().apply(text)),
            Print("\r\n")
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Vec<Choice> {
        vec![
            Choice::option("1"),
            Choice::separator(),
            Choice::Option {
                label: "2".into(),
                value: "2".into(),
                disabled: true,
            },
            Choice::option("3"),
        ]
    }

    #[test]
    fn test_step_skips_unselectable() {
        let c = choices();
        assert_eq!(step(&c, 0, true), 3);
        assert_eq!(step(&c, 3, true), 0);
        assert_eq!(step(&c, 0, false), 3);
    }

    #[test]
    fn test_rows_for_counts_wrapped_rows() {
        assert_eq!(rows_for(80, 0), 1);
        assert_eq!(rows_for(80, 79), 1);
        assert_eq!(rows_for(80, 80), 1);
        assert_eq!(rows_for(80, 81), 2);
        assert_eq!(rows_for(20, 65), 4);
        // Unknown width: no wrapping assumed.
        assert_eq!(rows_for(0, 500), 1);
    }

    #[test]
    fn test_nth_numbered() {
        let c = choices();
        assert_eq!(nth_numbered(&c, 1), Some(0));
        assert_eq!(nth_numbered(&c, 2), Some(3));
        assert_eq!(nth_numbered(&c, 0), None);
        assert_eq!(nth_numbered(&c, 3), None);
    }
}
