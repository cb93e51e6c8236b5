use crate::calc_engine::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Digit(char),
    Decimal,
    Operator(Operator),
    ToggleSign,
    Backspace,
    AllClear,
    Equals,
}

impl KeyAction {
    /// Maps a typed character onto the keypad. Enter, Escape and Backspace
    /// are not characters and are mapped by the front ends.
    pub fn from_key_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(KeyAction::Digit(c)),
            '.' => Some(KeyAction::Decimal),
            '=' => Some(KeyAction::Equals),
            'n' | 'N' => Some(KeyAction::ToggleSign),
            'c' | 'C' => Some(KeyAction::AllClear),
            _ => Operator::from_symbol(c).map(KeyAction::Operator),
        }
    }

    pub fn label(self) -> String {
        match self {
            KeyAction::Digit(d) => d.to_string(),
            KeyAction::Decimal => ".".to_string(),
            KeyAction::Operator(op) => op.symbol().to_string(),
            KeyAction::ToggleSign => "+/-".to_string(),
            KeyAction::Backspace => "DEL".to_string(),
            KeyAction::AllClear => "AC".to_string(),
            KeyAction::Equals => "=".to_string(),
        }
    }
}

/// Button grid, top row first.
pub const KEYPAD: [[KeyAction; 4]; 5] = [
    [
        KeyAction::AllClear,
        KeyAction::ToggleSign,
        KeyAction::Backspace,
        KeyAction::Operator(Operator::Divide),
    ],
    [
        KeyAction::Digit('7'),
        KeyAction::Digit('8'),
        KeyAction::Digit('9'),
        KeyAction::Operator(Operator::Multiply),
    ],
    [
        KeyAction::Digit('4'),
        KeyAction::Digit('5'),
        KeyAction::Digit('6'),
        KeyAction::Operator(Operator::Subtract),
    ],
    [
        KeyAction::Digit('1'),
        KeyAction::Digit('2'),
        KeyAction::Digit('3'),
        KeyAction::Operator(Operator::Add),
    ],
    [
        KeyAction::Digit('0'),
        KeyAction::Decimal,
        KeyAction::Operator(Operator::Remainder),
        KeyAction::Equals,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_and_operators() {
        assert_eq!(KeyAction::from_key_char('7'), Some(KeyAction::Digit('7')));
        assert_eq!(
            KeyAction::from_key_char('%'),
            Some(KeyAction::Operator(Operator::Remainder))
        );
        assert_eq!(KeyAction::from_key_char('.'), Some(KeyAction::Decimal));
        assert_eq!(KeyAction::from_key_char('='), Some(KeyAction::Equals));
    }

    #[test]
    fn test_unmapped_chars() {
        assert_eq!(KeyAction::from_key_char('x'), None);
        assert_eq!(KeyAction::from_key_char('^'), None);
        assert_eq!(KeyAction::from_key_char(' '), None);
    }

    #[test]
    fn test_keypad_covers_every_digit() {
        let digits: Vec<char> = KEYPAD
            .iter()
            .flatten()
            .filter_map(|action| match action {
                KeyAction::Digit(d) => Some(*d),
                _ => None,
            })
            .collect();
        assert_eq!(digits.len(), 10);
        for d in '0'..='9' {
            assert!(digits.contains(&d), "missing digit {}", d);
        }
    }
}
