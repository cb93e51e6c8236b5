use super::app::App;
use super::helpers::{format_with_spaces, highlight_expression, wrap_text};
use crate::calc_engine::format_result;
use crate::display::Readout;
use crate::keys::{KeyAction, KEYPAD};
use crate::render_help::render_help;
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::time::Duration;

const MIN_TERMINAL_WIDTH: u16 = 50;
const MIN_TERMINAL_HEIGHT: u16 = 22;
const KEYPAD_WIDTH: u16 = 30;
const DISPLAY_HEIGHT: u16 = 4;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            if app.show_help {
                render_help(f, app);
            } else {
                ui(f, app);
            }
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind == KeyEventKind::Press => {
                    handle_key_event(app, code, modifiers);
                }
                Event::Mouse(event) => {
                    handle_mouse_event(app, event);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.show_help {
        match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            _ => {}
        }
        return;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') | KeyCode::Char('C') => app.should_quit = true,
            KeyCode::Char('l') | KeyCode::Char('L') => app.clear_history(),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Char('d') | KeyCode::Char('D') => app.toggle_details(),
        KeyCode::Char('?') => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        // Shifted symbols like '+' and '%' arrive with SHIFT set.
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::ALT) => {
            if let Some(action) = KeyAction::from_key_char(c) {
                app.press(action);
            }
        }
        KeyCode::Enter => app.press(KeyAction::Equals),
        KeyCode::Backspace => app.press(KeyAction::Backspace),
        KeyCode::Esc | KeyCode::Delete => app.press(KeyAction::AllClear),
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::PageUp => app.scroll_history(-1),
        KeyCode::PageDown => app.scroll_history(1),
        KeyCode::F(1) => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, event: crossterm::event::MouseEvent) {
    if app.show_help {
        match event.kind {
            MouseEventKind::ScrollDown => app.help_scroll = app.help_scroll.saturating_add(3),
            MouseEventKind::ScrollUp => app.help_scroll = app.help_scroll.saturating_sub(3),
            _ => {}
        }
    } else {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => app.click(event.column, event.row),
            MouseEventKind::ScrollDown => {
                app.history_scroll = app.history_scroll.saturating_add(3);
            }
            MouseEventKind::ScrollUp => {
                app.history_scroll = app.history_scroll.saturating_sub(3);
            }
            _ => {}
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH ||
                             terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        app.button_areas.clear();
        render_resize_message(frame, terminal_size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(DISPLAY_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(terminal_size);

    render_display(frame, app, layout[0]);

    if app.show_keypad {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Length(KEYPAD_WIDTH),
                Constraint::Min(10),
            ])
            .split(layout[1]);
        render_keypad(frame, app, body[0]);
        render_history(frame, app, body[1]);
        app.list_height = body[1].height as usize;
    } else {
        app.button_areas.clear();
        render_history(frame, app, layout[1]);
        app.list_height = layout[1].height as usize;
    }

    render_status(frame, app, layout[2]);
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH,
        MIN_TERMINAL_HEIGHT,
        area.width,
        area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow)
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_display(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.detailed_mode { " Display [details] " } else { " Display " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_alignment(Alignment::Center);

    let previous = Line::from(Span::styled(
        app.display.previous().to_string(),
        Style::default().fg(Color::DarkGray),
    ));

    let current_style = Style::default().add_modifier(Modifier::BOLD);
    let current = match app.display.readout() {
        Readout::Editing => Line::from(highlight_expression(app.display.current(), current_style.fg(Color::White))),
        Readout::Result => Line::from(Span::styled(
            app.display.current().to_string(),
            current_style.fg(Color::LightMagenta),
        )),
        Readout::Error => Line::from(Span::styled(
            app.display.current().to_string(),
            current_style.fg(Color::Red),
        )),
    };

    let paragraph = Paragraph::new(vec![previous, current])
        .block(block)
        .alignment(Alignment::Right);

    frame.render_widget(paragraph, area);
}

fn button_style(app: &App, action: KeyAction) -> Style {
    let style = match action {
        KeyAction::Equals => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        KeyAction::AllClear | KeyAction::Backspace => Style::default().fg(Color::Red),
        KeyAction::Operator(_) | KeyAction::ToggleSign => Style::default().fg(Color::Yellow),
        KeyAction::Decimal if !app.display.decimal_enabled() => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::White),
    };

    if app.last_pressed == Some(action) {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

fn render_keypad(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Keypad ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, KEYPAD.len() as u32); KEYPAD.len()])
        .split(inner_area);

    app.button_areas.clear();

    for (row_area, row) in rows.iter().zip(KEYPAD.iter()) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, row.len() as u32); row.len()])
            .split(*row_area);

        for (cell, action) in cells.iter().zip(row.iter()) {
            let style = button_style(app, *action);
            let button = Paragraph::new(action.label())
                .style(style)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                );
            frame.render_widget(button, *cell);
            app.button_areas.push((*cell, *action));
        }
    }
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" History ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.history.is_empty() {
        let empty_msg = Paragraph::new("No calculations yet. Press = or Enter to evaluate.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    app.item_start_indices.clear();

    let wrap_width = inner_area.width.saturating_sub(4) as usize;

    for (i, entry) in app.history.iter().enumerate() {
        app.item_start_indices.push(items.len());

        let is_selected = i == app.cursor_history;
        let base_style = Style::default()
            .fg(if is_selected { Color::Yellow } else { Color::Cyan });

        let expression = format_with_spaces(&entry.expression);
        let expression_lines = wrap_text(&expression, wrap_width);

        for (line_idx, line) in expression_lines.into_iter().enumerate() {
            let mut result_spans = vec![];

            if line_idx == 0 {
                result_spans.push(Span::styled("> ", Style::default().fg(Color::Green)));
            } else {
                result_spans.push(Span::styled("  ", Style::default()));
            }

            result_spans.extend(highlight_expression(&line, base_style));

            if line_idx == 0 {
                result_spans.push(Span::styled(" = ", Style::default().fg(Color::Gray)));
                match &entry.result {
                    Ok(val) => {
                        result_spans.push(Span::styled(
                            format_result(*val),
                            Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD)
                        ));
                    }
                    Err(e) => {
                        result_spans.push(Span::styled(
                            format!("Error: {}", e),
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                        ));
                    }
                }
            }

            items.push(ListItem::new(Line::from(result_spans)));
        }

        if entry.detailed_mode {
            for (j, step) in entry.detailed_steps.iter().enumerate() {
                let step_text = format!("Step {}: {} = {}", j + 1, step.operation, format_result(step.result));
                for (step_idx, line) in wrap_text(&step_text, wrap_width).into_iter().enumerate() {
                    let prefix = if step_idx == 0 { "    - " } else { "      " };
                    items.push(ListItem::new(Line::from(Span::styled(
                        format!("{}{}", prefix, line),
                        Style::default().fg(Color::DarkGray)
                    ))));
                }
            }

            let time_str = format!("Time: {:.6} ms", entry.duration.as_secs_f64() * 1000.0);
            items.push(ListItem::new(Line::from(Span::styled(
                format!("    - {}", time_str),
                Style::default().fg(Color::Magenta)
            ))));
        }

        if i < app.history.len() - 1 {
            let separator = Span::styled(
                "-".repeat(inner_area.width as usize),
                Style::default().fg(Color::DarkGray)
            );
            items.push(ListItem::new(Line::from(separator)));
        }
    }

    if app.scroll_to_bottom {
        app.history_scroll = items.len().saturating_sub(inner_area.height as usize);
        app.scroll_to_bottom = false;
    }
    app.history_scroll = app.history_scroll.min(items.len().saturating_sub(1));

    let selected_index = app.item_start_indices.get(app.cursor_history).copied();

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default()
        .with_selected(selected_index)
        .with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let details = if app.detailed_mode { "Details off" } else { "Details on" };
    let keys = [
        ("Enter", "Calculate"),
        ("Esc", "Clear"),
        ("d", details),
        ("Up/Down", "Recall"),
        ("F1", "Help"),
        ("q", "Quit"),
    ];

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_typed_keys_reach_display() {
        let mut app = App::new(&Config::default());
        for c in "5+3".chars() {
            handle_key_event(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        handle_key_event(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.display.current(), "8");
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn test_shifted_operator() {
        let mut app = App::new(&Config::default());
        handle_key_event(&mut app, KeyCode::Char('2'), KeyModifiers::NONE);
        handle_key_event(&mut app, KeyCode::Char('%'), KeyModifiers::SHIFT);
        assert_eq!(app.display.current(), "2%");
    }

    #[test]
    fn test_escape_clears_and_quit_keys() {
        let mut app = App::new(&Config::default());
        handle_key_event(&mut app, KeyCode::Char('9'), KeyModifiers::NONE);
        handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.display.current(), "0");

        handle_key_event(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_captures_keys() {
        let mut app = App::new(&Config::default());
        handle_key_event(&mut app, KeyCode::F(1), KeyModifiers::NONE);
        assert!(app.show_help);
        handle_key_event(&mut app, KeyCode::Char('7'), KeyModifiers::NONE);
        assert_eq!(app.display.current(), "0");
        handle_key_event(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.show_help);
    }
}
