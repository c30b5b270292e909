use std::time::Instant;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use supportchat_core::{ChatReply, ChatWidget, WidgetError};

/// Input stops growing past this many content lines and scrolls instead.
pub const MAX_INPUT_LINES: u16 = 5;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub widget: ChatWidget,
    pub should_quit: bool,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Transcript view state
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,
    pub total_chat_lines: u16,

    // Messages area for mouse hit-testing (updated during render)
    pub messages_area: Option<Rect>,

    // Animation state (0-2 for ellipsis animation)
    pub animation_frame: u8,

    // The one in-flight send, if any. The controller's Sending phase is the
    // authoritative guard; this handle only carries the result back.
    pub send_task: Option<JoinHandle<Result<ChatReply, WidgetError>>>,
}

impl App {
    pub fn new(widget: ChatWidget) -> Self {
        Self {
            widget,
            should_quit: false,
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            total_chat_lines: 0,
            messages_area: None,
            animation_frame: 0,
            send_task: None,
        }
    }

    /// Submit the input buffer. The controller decides whether the submit
    /// is accepted; the buffer is only cleared when it is.
    pub fn submit(&mut self) {
        let text = self.input.clone();
        let Some(out) = self.widget.begin_send(&text) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;

        let api = self.widget.api().clone();
        self.send_task = Some(tokio::spawn(async move {
            api.send_message(out.tenant_id, out.session_id, &out.message)
                .await
        }));
    }

    pub async fn on_tick(&mut self) {
        self.widget.tick(Instant::now());

        if self.widget.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        // Harvest a finished send without ever blocking the UI
        if self.send_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.send_task.take() {
                let result = task.await.unwrap_or(Err(WidgetError::SendInterrupted));
                self.widget.finish_send(result, Instant::now());
            }
        }
    }

    pub fn input_height(&self) -> u16 {
        let lines = self.input.split('\n').count() as u16;
        lines.clamp(1, MAX_INPUT_LINES)
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        let char_count = self.input.chars().count();
        if self.cursor < char_count {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Cursor position as (line, column), both in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.input.chars().take(self.cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    // Transcript scrolling

    pub fn scroll_up(&mut self, n: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: u16) {
        let max_scroll = self.total_chat_lines.saturating_sub(self.chat_height);
        self.chat_scroll = self.chat_scroll.saturating_add(n).min(max_scroll);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.total_chat_lines.saturating_sub(self.chat_height);
    }
}
