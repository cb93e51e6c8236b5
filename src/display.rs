//! Keypad display state.
//!
//! Holds the two text lines of the calculator (the echoed expression and the
//! live input) and the small amount of bookkeeping that decides how the next
//! key press edits them. Every input source goes through [`Display::apply`].

use crate::calc_engine::{evaluate_traced, format_result, EvalError, EvaluationTrace, Operator};
use crate::keys::KeyAction;
use regex::Regex;
use std::sync::OnceLock;

/// What the current line is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readout {
    Editing,
    Result,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    previous: String,
    current: String,
    readout: Readout,
    decimal_enabled: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

fn is_operator_char(c: char) -> bool {
    Operator::from_symbol(c).is_some()
}

fn leading_number(text: &str) -> Option<f64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)").expect("leading number pattern is valid"));
    pattern
        .find(text.trim())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

impl Display {
    pub fn new() -> Self {
        Display {
            previous: String::new(),
            current: "0".to_string(),
            readout: Readout::Editing,
            decimal_enabled: true,
        }
    }

    pub fn previous(&self) -> &str {
        &self.previous
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn readout(&self) -> Readout {
        self.readout
    }

    pub fn decimal_enabled(&self) -> bool {
        self.decimal_enabled
    }

    /// Routes a key press. Only [`KeyAction::Equals`] produces an outcome.
    pub fn apply(&mut self, action: KeyAction) -> Option<Result<f64, EvalError>> {
        match action {
            KeyAction::Digit(d) => self.press_digit(d),
            KeyAction::Decimal => self.press_decimal(),
            KeyAction::Operator(op) => self.press_operator(op),
            KeyAction::ToggleSign => self.toggle_sign(),
            KeyAction::Backspace => self.backspace(),
            KeyAction::AllClear => self.all_clear(),
            KeyAction::Equals => return Some(self.equals()),
        }
        None
    }

    /// Replaces the input line with a recalled expression.
    pub fn load(&mut self, expression: &str) {
        self.current = if expression.is_empty() {
            "0".to_string()
        } else {
            expression.to_string()
        };
        self.readout = Readout::Editing;
        self.refresh_decimal();
    }

    pub fn press_digit(&mut self, digit: char) {
        if !digit.is_ascii_digit() {
            return;
        }
        self.start_fresh_if_shown();
        if self.current == "0" {
            self.current.clear();
        }
        self.current.push(digit);
        self.refresh_decimal();
    }

    pub fn press_decimal(&mut self) {
        if self.readout == Readout::Editing && !self.decimal_enabled {
            return;
        }
        self.start_fresh_if_shown();
        self.current.push('.');
        self.refresh_decimal();
    }

    pub fn press_operator(&mut self, op: Operator) {
        if self.readout == Readout::Error || self.current.ends_with(is_operator_char) {
            return;
        }
        self.readout = Readout::Editing;
        self.current.push(op.symbol());
        self.decimal_enabled = true;
    }

    /// Negates the number the input line starts with, dropping the rest.
    pub fn toggle_sign(&mut self) {
        let value = match self.readout {
            Readout::Error => None,
            _ => leading_number(&self.current),
        };
        self.current = match value {
            Some(v) if v != 0.0 => format_result(-v),
            _ => "0".to_string(),
        };
        self.readout = Readout::Editing;
        self.refresh_decimal();
    }

    pub fn backspace(&mut self) {
        if self.readout == Readout::Error {
            self.current = "0".to_string();
        } else {
            self.current.pop();
            if self.current.is_empty() {
                self.current.push('0');
            }
        }
        self.readout = Readout::Editing;
        self.decimal_enabled = !self.current.contains('.');
    }

    pub fn all_clear(&mut self) {
        *self = Display::new();
    }

    /// Echoes the input to the previous line and replaces it with the outcome.
    pub fn equals(&mut self) -> Result<f64, EvalError> {
        self.equals_traced(&mut EvaluationTrace::new(false))
    }

    pub fn equals_traced(&mut self, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
        self.previous = self.current.clone();
        let outcome = evaluate_traced(&self.current, trace);
        match outcome {
            Ok(value) => {
                self.current = format_result(value);
                self.readout = Readout::Result;
            }
            Err(e) => {
                self.current = format!("Error: {}", e);
                self.readout = Readout::Error;
            }
        }
        self.decimal_enabled = true;
        outcome
    }

    fn start_fresh_if_shown(&mut self) {
        if self.readout != Readout::Editing {
            self.current.clear();
            self.readout = Readout::Editing;
        }
    }

    // Only the operand being typed decides whether '.' is still available.
    fn refresh_decimal(&mut self) {
        let last_operand = self.current.rsplit(is_operator_char).next().unwrap_or("");
        self.decimal_enabled = !last_operand.contains('.');
    }
}
