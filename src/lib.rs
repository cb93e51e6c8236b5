pub mod calc_engine;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod keys;
pub mod logging;

#[cfg(feature = "line")]
pub mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
pub mod tui_mode;
