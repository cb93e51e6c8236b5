use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Number of fractional digits kept after every fold step.
pub const PRECISION: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Incomplete input")]
    IncompleteInput,
    #[error("Cannot divide by 0")]
    DivisionByZero,
    #[error("Invalid operation")]
    InvalidOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl Operator {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            '%' => Some(Operator::Remainder),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
            Operator::Remainder => '%',
        }
    }

    /// Applies the operator and rounds the outcome to [`PRECISION`] digits.
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        let raw = match self {
            Operator::Add => add(lhs, rhs),
            Operator::Subtract => subtract(lhs, rhs),
            Operator::Multiply => multiply(lhs, rhs),
            Operator::Divide => divide(lhs, rhs)?,
            // Truncating remainder: the sign follows `lhs`.
            Operator::Remainder => lhs % rhs,
        };
        if !raw.is_finite() {
            return Err(EvalError::InvalidOperation);
        }
        Ok(round_to_precision(raw))
    }
}

pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

pub fn divide(a: f64, b: f64) -> Result<f64, EvalError> {
    if b == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(a / b)
}

/// Rounds to [`PRECISION`] fractional digits. Exact midpoints round away
/// from zero, everything else to the nearest digit.
pub fn round_to_precision(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let nudged = match midpoint_truncation(value) {
        Some(truncated) => truncated + value.signum() * 10f64.powi(-(PRECISION as i32)),
        None => value,
    };
    let rounded = format!("{:.*}", PRECISION, nudged)
        .parse::<f64>()
        .unwrap_or(nudged);
    // Folds -0 into 0.
    rounded + 0.0
}

/// Returns `value` cut to [`PRECISION`] digits when its exact expansion ends
/// in a single `5` right after them.
fn midpoint_truncation(value: f64) -> Option<f64> {
    // 1074 fractional digits hold any f64 exactly.
    let exact = format!("{:.1074}", value);
    let kept = exact.find('.')? + 1 + PRECISION;
    let mut rest = exact[kept..].chars();
    if rest.next() != Some('5') || !rest.all(|c| c == '0') {
        return None;
    }
    exact[..kept].parse::<f64>().ok()
}

/// Shortest decimal form of a result: `3`, `0.5`, `-2.25`.
pub fn format_result(value: f64) -> String {
    format!("{}", round_to_precision(value))
}

/// Operands and operators of one expression, both in order of appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    pub operands: Vec<f64>,
    pub operators: Vec<char>,
}

impl TokenStream {
    pub fn is_well_formed(&self) -> bool {
        self.operands.len() >= 2 && self.operands.len() == self.operators.len() + 1
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+(\.[0-9]+)?|\.[0-9]+").expect("number pattern is valid"))
}

fn operator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[+\-*/%]").expect("operator pattern is valid"))
}

/// Splits an expression into operands and operators. Only ASCII digits form
/// numbers; anything outside the two token classes is skipped.
pub fn tokenize(expression: &str) -> Result<TokenStream, EvalError> {
    let operands = number_pattern()
        .find_iter(expression)
        .map(|m| m.as_str().parse::<f64>().map_err(|_| EvalError::IncompleteInput))
        .collect::<Result<Vec<_>, _>>()?;
    let operators = operator_pattern()
        .find_iter(expression)
        .filter_map(|m| m.as_str().chars().next())
        .collect();
    Ok(TokenStream { operands, operators })
}

pub struct Step {
    pub operation: String,
    pub result: f64,
}

pub struct EvaluationTrace {
    pub steps: Vec<Step>,
    pub detailed_mode: bool,
}

impl EvaluationTrace {
    pub fn new(detailed_mode: bool) -> Self {
        EvaluationTrace {
            steps: Vec::new(),
            detailed_mode,
        }
    }

    pub fn add_step(&mut self, operation: String, result: f64) {
        if self.detailed_mode {
            self.steps.push(Step { operation, result });
        }
    }
}

pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    evaluate_traced(expression, &mut EvaluationTrace::new(false))
}

pub fn evaluate_traced(expression: &str, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
    let outcome = tokenize(expression.trim()).and_then(|tokens| fold(&tokens, trace));
    match &outcome {
        Ok(value) => tracing::debug!(expression, result = %value, "evaluated"),
        Err(e) => tracing::debug!(expression, error = %e, "evaluation failed"),
    }
    outcome
}

/// Reduces a token stream strictly left to right, without precedence.
pub fn fold(tokens: &TokenStream, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
    if !tokens.is_well_formed() {
        return Err(EvalError::IncompleteInput);
    }

    let mut result = tokens.operands[0];
    for (symbol, &next) in tokens.operators.iter().zip(&tokens.operands[1..]) {
        let op = Operator::from_symbol(*symbol).ok_or(EvalError::InvalidOperation)?;
        let operation = format!("{} {} {}", format_result(result), symbol, format_result(next));
        result = op.apply(result, next)?;
        trace.add_step(operation, result);
    }
    Ok(round_to_precision(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_addition() {
        assert_eq!(evaluate("5+3"), Ok(8.0));
    }

    #[test]
    fn test_left_to_right_without_precedence() {
        assert_eq!(evaluate("1+2*3"), Ok(9.0));
        assert_eq!(evaluate("10-4/2"), Ok(3.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("10/0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("4+6/0.0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_remainder() {
        assert_eq!(evaluate("2.5%2"), Ok(0.5));
        assert_eq!(evaluate("10%3"), Ok(1.0));
        assert_eq!(Operator::Remainder.apply(-7.0, 3.0), Ok(-1.0));
        assert_eq!(Operator::Remainder.apply(7.0, -3.0), Ok(1.0));
    }

    #[test]
    fn test_remainder_by_zero_is_invalid() {
        assert_eq!(evaluate("5%0"), Err(EvalError::InvalidOperation));
    }

    #[test]
    fn test_single_operand_is_incomplete() {
        assert_eq!(evaluate("7"), Err(EvalError::IncompleteInput));
        assert_eq!(evaluate(""), Err(EvalError::IncompleteInput));
        assert_eq!(evaluate("+"), Err(EvalError::IncompleteInput));
    }

    #[test]
    fn test_count_mismatch_is_incomplete() {
        assert_eq!(evaluate("5+"), Err(EvalError::IncompleteInput));
        assert_eq!(evaluate("5+-3"), Err(EvalError::IncompleteInput));
        assert_eq!(evaluate("5 3"), Err(EvalError::IncompleteInput));
    }

    #[test]
    fn test_chained_rounding() {
        assert_eq!(evaluate("0.1+0.2+0.3"), Ok(0.6));
        assert_eq!(evaluate("0.1+0.2"), Ok(0.3));
        assert_eq!(evaluate("1/4*4"), Ok(1.0));
        assert_eq!(evaluate("1/3*3"), Ok(0.9999999999));
    }

    #[test]
    fn test_midpoints_round_away_from_zero() {
        assert_eq!(round_to_precision(0.00048828125), 0.0004882813);
        assert_eq!(round_to_precision(-0.00048828125), -0.0004882813);
        assert_eq!(evaluate("1/2048").map(format_result), Ok("0.0004882813".to_string()));
        assert_eq!(evaluate("0-1/2048").map(format_result), Ok("-0.0004882813".to_string()));
        assert_eq!(evaluate("1+2/2048").map(format_result), Ok("0.0014648438".to_string()));
    }

    #[test]
    fn test_near_midpoints_round_to_nearest() {
        assert_eq!(round_to_precision(0.1), 0.1);
        assert_eq!(round_to_precision(1.0 / 3.0), 0.3333333333);
        assert_eq!(round_to_precision(2.0 / 3.0), 0.6666666667);
        assert_eq!(round_to_precision(1024.0 + 1.0 / 1024.0), 1024.0009765625);
    }

    #[test]
    fn test_non_ascii_digits_are_not_operands() {
        let tokens = tokenize("1\u{0663}+5").unwrap();
        assert_eq!(tokens.operands, vec![1.0, 5.0]);
        assert_eq!(evaluate("1\u{0663}+5"), Ok(6.0));
        assert_eq!(evaluate("\u{0664}\u{0665}+2"), Err(EvalError::IncompleteInput));
    }

    #[test]
    fn test_leading_decimal_point() {
        assert_eq!(evaluate(".5+.25"), Ok(0.75));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(evaluate("  12.5 + 3 * 2  "), Ok(31.0));
    }

    #[test]
    fn test_tokenize_collects_in_order() {
        let tokens = tokenize("12.5+3*.2").unwrap();
        assert_eq!(tokens.operands, vec![12.5, 3.0, 0.2]);
        assert_eq!(tokens.operators, vec!['+', '*']);
        assert!(tokens.is_well_formed());
    }

    #[test]
    fn test_unknown_operator_in_fold() {
        let tokens = TokenStream {
            operands: vec![2.0, 3.0, 4.0],
            operators: vec!['+', '^'],
        };
        assert_eq!(
            fold(&tokens, &mut EvaluationTrace::new(false)),
            Err(EvalError::InvalidOperation)
        );
    }

    #[test]
    fn test_divide_returns_error_value() {
        assert_eq!(divide(1.0, 0.0), Err(EvalError::DivisionByZero));
        assert_eq!(divide(-1.0, 0.0), Err(EvalError::DivisionByZero));
        assert_eq!(divide(9.0, 3.0), Ok(3.0));
        assert_eq!(add(2.0, 3.0), 5.0);
        assert_eq!(subtract(2.0, 3.0), -1.0);
        assert_eq!(multiply(2.0, 3.0), 6.0);
    }

    #[test]
    fn test_overflow_is_invalid() {
        let tokens = TokenStream {
            operands: vec![1e308, 10.0],
            operators: vec!['*'],
        };
        assert_eq!(
            fold(&tokens, &mut EvaluationTrace::new(false)),
            Err(EvalError::InvalidOperation)
        );
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(3.0), "3");
        assert_eq!(format_result(0.5), "0.5");
        assert_eq!(format_result(-2.25), "-2.25");
        assert_eq!(format_result(-0.0), "0");
        assert_eq!(format_result(1.0 / 3.0), "0.3333333333");
    }

    #[test]
    fn test_trace_records_each_step() {
        let mut trace = EvaluationTrace::new(true);
        let result = evaluate_traced("1+2*3", &mut trace);
        assert_eq!(result, Ok(9.0));
        assert_eq!(trace.steps.len(), 2);
        assert_eq!(trace.steps[0].operation, "1 + 2");
        assert_eq!(trace.steps[0].result, 3.0);
        assert_eq!(trace.steps[1].operation, "3 * 3");
    }

    #[test]
    fn test_trace_disabled_records_nothing() {
        let mut trace = EvaluationTrace::new(false);
        evaluate_traced("1+2", &mut trace).unwrap();
        assert!(trace.steps.is_empty());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(EvalError::IncompleteInput.to_string(), "Incomplete input");
        assert_eq!(EvalError::DivisionByZero.to_string(), "Cannot divide by 0");
        assert_eq!(EvalError::InvalidOperation.to_string(), "Invalid operation");
    }
}
