use crate::calc_engine::{EvalError, EvaluationTrace, Step};
use crate::config::Config;
use crate::display::Display;
use crate::keys::KeyAction;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

pub struct HistoryEntry {
    pub expression: String,
    pub result: Result<f64, EvalError>,
    pub detailed_steps: Vec<Step>,
    pub detailed_mode: bool,
    pub duration: Duration,
}

pub struct App {
    pub display: Display,
    pub history: Vec<HistoryEntry>,
    pub history_limit: usize,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub show_keypad: bool,
    pub detailed_mode: bool,
    pub help_scroll: usize,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
    /// Keypad hit areas from the last frame
    pub button_areas: Vec<(Rect, KeyAction)>,
    pub last_pressed: Option<KeyAction>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        App {
            display: Display::new(),
            history: Vec::new(),
            history_limit: config.history_limit.max(1),
            cursor_history: 0,
            should_quit: false,
            show_help: false,
            show_keypad: config.show_keypad,
            detailed_mode: false,
            help_scroll: 0,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
            button_areas: Vec::new(),
            last_pressed: None,
        }
    }

    /// Single entry point for keypad clicks and typed keys.
    pub fn press(&mut self, action: KeyAction) {
        self.last_pressed = Some(action);
        if action != KeyAction::Equals {
            self.display.apply(action);
            return;
        }

        let start_time = Instant::now();
        let mut trace = EvaluationTrace::new(self.detailed_mode);
        let result = self.display.equals_traced(&mut trace);
        let duration = start_time.elapsed();

        self.push_history(HistoryEntry {
            expression: self.display.previous().to_string(),
            result,
            detailed_steps: trace.steps,
            detailed_mode: self.detailed_mode,
            duration,
        });
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > self.history_limit {
            let overflow = self.history.len() - self.history_limit;
            self.history.drain(..overflow);
        }
        self.cursor_history = self.history.len().saturating_sub(1);
        self.scroll_to_bottom = true;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.cursor_history = 0;
        self.history_scroll = 0;
    }

    pub fn toggle_details(&mut self) {
        self.detailed_mode = !self.detailed_mode;
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if self.history.is_empty() {
            return;
        }
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.history.len() - 1 {
            self.cursor_history += 1;
        }

        self.recall_selected();
        self.scroll_to_bottom = false;
    }

    pub fn scroll_history(&mut self, direction: i32) {
        if self.history.is_empty() {
            return;
        }
        let step = self.list_height.saturating_sub(1).max(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self.cursor_history.saturating_add(step)
                .min(self.history.len() - 1);
        }

        self.recall_selected();
        self.scroll_to_bottom = false;
    }

    fn recall_selected(&mut self) {
        if let Some(entry) = self.history.get(self.cursor_history) {
            self.display.load(&entry.expression);
        }
    }

    pub fn button_at(&self, column: u16, row: u16) -> Option<KeyAction> {
        self.button_areas
            .iter()
            .find(|(area, _)| {
                column >= area.x
                    && column < area.x + area.width
                    && row >= area.y
                    && row < area.y + area.height
            })
            .map(|(_, action)| *action)
    }

    pub fn click(&mut self, column: u16, row: u16) {
        if let Some(action) = self.button_at(column, row) {
            self.press(action);
        }
    }
}
