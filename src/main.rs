use anyhow::Result;
use clap::Parser;
use padcalc::calc_engine::{evaluate_traced, format_result, EvaluationTrace};
use padcalc::cli::{Cli, Mode};
use padcalc::config::Config;
use padcalc::logging::{init_logging, LogTarget};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let target = match (&cli.log_file, &cli.expression, cli.mode) {
        (Some(path), _, _) => LogTarget::File(path),
        (None, Some(_), _) | (None, None, Mode::Line) => LogTarget::Stderr,
        (None, None, Mode::Tui) => LogTarget::Off,
    };
    init_logging(&config.log_filter, target)?;

    if let Some(expression) = &cli.expression {
        return Ok(run_once(expression, cli.details));
    }

    match cli.mode {
        Mode::Tui => run_tui(&config)?,
        Mode::Line => run_line()?,
    }
    Ok(ExitCode::SUCCESS)
}

fn run_once(expression: &str, details: bool) -> ExitCode {
    let mut trace = EvaluationTrace::new(details);
    match evaluate_traced(expression, &mut trace) {
        Ok(value) => {
            for (i, step) in trace.steps.iter().enumerate() {
                println!("Step {}: {} = {}", i + 1, step.operation, format_result(step.result));
            }
            println!("{}", format_result(value));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tui")]
fn run_tui(config: &Config) -> Result<()> {
    padcalc::tui_mode::run_tui(config)
}

#[cfg(not(feature = "tui"))]
fn run_tui(_config: &Config) -> Result<()> {
    anyhow::bail!("padcalc was built without the `tui` feature")
}

#[cfg(feature = "line")]
fn run_line() -> Result<()> {
    padcalc::line_mode::run_line()
}

#[cfg(not(feature = "line"))]
fn run_line() -> Result<()> {
    anyhow::bail!("padcalc was built without the `line` feature; rebuild with --features line")
}
