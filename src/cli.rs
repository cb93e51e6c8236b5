use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Full-screen keypad calculator
    Tui,
    /// Line editor prompt
    Line,
}

#[derive(Debug, Parser)]
#[command(name = "padcalc")]
#[command(about = "Keypad calculator with strict left-to-right evaluation")]
pub struct Cli {
    /// Evaluate this expression, print the result and exit
    #[arg(allow_hyphen_values = true)]
    pub expression: Option<String>,

    /// Interactive front end
    #[arg(long, value_enum, default_value_t = Mode::Tui)]
    pub mode: Mode,

    /// Config file (defaults to ~/.config/padcalc/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file (the TUI logs nowhere otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print every fold step of a one-shot evaluation
    #[arg(long)]
    pub details: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["padcalc"]).unwrap();
        assert_eq!(cli.mode, Mode::Tui);
        assert!(cli.expression.is_none());
        assert!(!cli.details);
    }

    #[test]
    fn test_one_shot_with_details() {
        let cli = Cli::try_parse_from(["padcalc", "--details", "1+2*3"]).unwrap();
        assert_eq!(cli.expression.as_deref(), Some("1+2*3"));
        assert!(cli.details);
    }

    #[test]
    fn test_line_mode() {
        let cli = Cli::try_parse_from(["padcalc", "--mode", "line"]).unwrap();
        assert_eq!(cli.mode, Mode::Line);
    }
}
