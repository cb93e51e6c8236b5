use crate::calc_engine::{evaluate_traced, format_result, EvaluationTrace};
use anyhow::{Context, Result};
use std::io::{stdin, stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::{DetectCursorPos, Goto},
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const PROMPT: &str = "Expression: ";

/// Line buffer edited by grapheme, so the cursor never lands inside a cluster.
#[derive(Debug, Default)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    fn byte_index(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Display width of the text left of the cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.byte_index(self.cursor)].width()
    }

    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.text.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.delete();
        }
    }

    pub fn delete(&mut self) {
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.drain(start..end);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.grapheme_count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    pub fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.end();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Splits the `details` marker off an input line.
pub fn split_details(input: &str) -> (bool, &str) {
    let lower = input.to_lowercase();
    if lower.starts_with("details ") {
        (true, input[8..].trim())
    } else if lower.ends_with(" details") {
        (true, input[..input.len() - 8].trim())
    } else {
        (false, input)
    }
}

pub fn run_line() -> Result<()> {
    println!("PadCalc line mode");
    println!("Supports: + - * / % evaluated strictly left to right");
    println!("Navigation: ←/→, Backspace/Delete, Home/End, ↑/↓ for history");
    println!("Special commands: 'quit' to exit, 'clear' to reset history");
    println!("\rAdd 'details' before expression for step-by-step evaluation\n");

    let mut stdout = stdout().into_raw_mode().context("Failed to enter raw mode")?;
    let mut history: Vec<String> = Vec::new();
    let mut history_index = 0;

    loop {
        write!(stdout, "{}{}", ClearLine, PROMPT)?;
        stdout.flush()?;

        let mut line = LineBuffer::default();
        let (_, initial_y) = stdout.cursor_pos()?;
        let mut keys = stdin().keys();

        loop {
            write!(stdout, "{}{}{}{}", Goto(1, initial_y), ClearLine, PROMPT, line.text())?;
            let column = PROMPT.len() + line.cursor_column() + 1;
            write!(stdout, "{}", Goto(column as u16, initial_y))?;
            stdout.flush()?;

            let Some(key) = keys.next() else {
                return Ok(());
            };
            match key? {
                Key::Char('\n') => break,
                Key::Ctrl('c') | Key::Ctrl('d') => {
                    write!(stdout, "\r\n")?;
                    return Ok(());
                }
                Key::Char(c) => line.insert(c),
                Key::Backspace => line.backspace(),
                Key::Delete => line.delete(),
                Key::Left => line.move_left(),
                Key::Right => line.move_right(),
                Key::Home => line.home(),
                Key::End => line.end(),
                Key::Up => {
                    if history_index > 0 {
                        history_index -= 1;
                        line.replace(&history[history_index]);
                    }
                }
                Key::Down => {
                    if history_index + 1 < history.len() {
                        history_index += 1;
                        line.replace(&history[history_index]);
                    } else {
                        history_index = history.len();
                        line.clear();
                    }
                }
                _ => {}
            }
        }

        let input = line.text().trim();
        if input.is_empty() {
            write!(stdout, "\r\n")?;
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                write!(stdout, "\r\nGoodbye!\r\n")?;
                return Ok(());
            }
            "clear" | "reset" => {
                history.clear();
                history_index = 0;
                write!(stdout, "\r\nHistory cleared\r\n\r\n")?;
                continue;
            }
            _ => {}
        }

        history.push(input.to_string());
        history_index = history.len();

        let (detailed_mode, expression) = split_details(input);
        if expression.is_empty() {
            write!(stdout, "\r\nPlease enter a valid expression after 'details'\r\n\r\n")?;
            continue;
        }

        let mut trace = EvaluationTrace::new(detailed_mode);
        let shown = match evaluate_traced(expression, &mut trace) {
            Ok(value) => format_result(value),
            Err(e) => format!("Error: {}", e),
        };
        write!(stdout, "\r\n  {} = {}\r\n", expression, shown)?;

        if detailed_mode && !trace.steps.is_empty() {
            write!(stdout, "\r\n  Step-by-step evaluation:\r\n")?;
            for (i, step) in trace.steps.iter().enumerate() {
                write!(stdout, "  Step {}: {} = {}\r\n", i + 1, step.operation, format_result(step.result))?;
            }
        }
        write!(stdout, "\r\n")?;
    }
}
