use padcalc::calc_engine::{divide, evaluate, format_result, tokenize, EvalError};

#[test]
fn test_documented_examples() {
    assert_eq!(evaluate("5+3"), Ok(8.0));
    assert_eq!(evaluate("10/0"), Err(EvalError::DivisionByZero));
    assert_eq!(evaluate("1+2*3"), Ok(9.0));
    assert_eq!(evaluate("2.5%2"), Ok(0.5));
    assert_eq!(evaluate("7"), Err(EvalError::IncompleteInput));
    assert_eq!(evaluate("0.1+0.2+0.3"), Ok(0.6));
}

#[test]
fn test_arity_mismatch_always_incomplete() {
    for expression in ["1+", "+1", "1+2-", "1++2", "*", "12", "1 2 3+4"] {
        let tokens = tokenize(expression).unwrap();
        assert!(!tokens.is_well_formed(), "{} should be malformed", expression);
        assert_eq!(evaluate(expression), Err(EvalError::IncompleteInput), "{}", expression);
    }
}

#[test]
fn test_rounding_is_idempotent() {
    for expression in ["0.1+0.2", "1/3", "2/3*7", "100/7%3", "0.7*0.1+5", "123456.789*3.3"] {
        let first = evaluate(expression).unwrap();
        let again = evaluate(&format!("{}+0", format_result(first))).unwrap();
        assert_eq!(first, again, "{}", expression);
    }
}

#[test]
fn test_division_by_zero_discards_partial_result() {
    assert_eq!(evaluate("1+2+3/0+4"), Err(EvalError::DivisionByZero));
    assert_eq!(evaluate("5/.0"), Err(EvalError::DivisionByZero));
}

#[test]
fn test_divide_never_yields_non_finite() {
    for a in [0.0, 1.0, -1.0, f64::MAX] {
        assert_eq!(divide(a, 0.0), Err(EvalError::DivisionByZero));
    }
}

#[test]
fn test_result_formatting() {
    assert_eq!(format_result(evaluate("1.5+1.5").unwrap()), "3");
    assert_eq!(format_result(evaluate("1/8").unwrap()), "0.125");
    assert_eq!(format_result(evaluate("2-5").unwrap()), "-3");
    assert_eq!(format_result(evaluate("2/3").unwrap()), "0.6666666667");
}

#[test]
fn test_rounding_midpoints_match_keypad_display() {
    assert_eq!(format_result(evaluate("1/2048").unwrap()), "0.0004882813");
    assert_eq!(format_result(evaluate("0-1/2048").unwrap()), "-0.0004882813");
    assert_eq!(format_result(evaluate("3/2048").unwrap()), "0.0014648438");
    assert_eq!(format_result(evaluate("1+2/2048").unwrap()), "0.0014648438");
}

#[test]
fn test_only_ascii_digits_form_numbers() {
    assert_eq!(evaluate("1\u{0663}+5"), Ok(6.0));
    assert_eq!(tokenize("\u{0661}\u{0662}").unwrap().operands, Vec::<f64>::new());
}
