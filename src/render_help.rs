use crate::tui_mode::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" PadCalc Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);

    let help_text = vec![
        Line::from(Span::styled("PadCalc - Keypad Calculator", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Operations:", heading)),
        Line::from("  + : Addition        (e.g., 5 + 3 = 8)"),
        Line::from("  - : Subtraction     (e.g., 10 - 4 = 6)"),
        Line::from("  * : Multiplication  (e.g., 6 * 7 = 42)"),
        Line::from("  / : Division        (e.g., 15 / 3 = 5)"),
        Line::from("  % : Remainder       (e.g., 2.5 % 2 = 0.5)"),
        Line::from(""),
        Line::from(Span::styled("Evaluation:", heading)),
        Line::from("  Operators apply strictly left to right: 1 + 2 * 3 = 9"),
        Line::from("  Every step is rounded to 10 decimal places"),
        Line::from("  Numbers may start with a decimal point: .5"),
        Line::from(""),
        Line::from(Span::styled("Keys:", heading)),
        Line::from("  0-9 .        : Digits and decimal point"),
        Line::from("  + - * / %    : Operators"),
        Line::from("  Enter or =   : Calculate"),
        Line::from("  Backspace    : Delete last character"),
        Line::from("  Esc or c     : All clear"),
        Line::from("  n            : Toggle sign"),
        Line::from("  d            : Toggle step-by-step details"),
        Line::from("  Ctrl+L       : Clear history"),
        Line::from("  F1 or ?      : Show this help"),
        Line::from("  q or Ctrl+C  : Quit"),
        Line::from(""),
        Line::from(Span::styled("Navigation:", heading)),
        Line::from("  ↑ ↓ : Recall calculations from history"),
        Line::from("  PgUp/PgDn : Page through history"),
        Line::from("  Mouse click : Press keypad buttons"),
        Line::from("  Mouse wheel : Scroll through history"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
