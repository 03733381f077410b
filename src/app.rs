use tokio::sync::mpsc;

use crate::client::StreamClient;
use crate::conversation::Conversation;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation state
    pub conversation: Conversation,

    // Input line state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Chat viewport state
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the chat area, set during render
    pub chat_width: u16,  // Inner width of the chat area, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend
    pub client: StreamClient,
    pub events_tx: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(api_url: &str, events_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            conversation: Conversation::new(),
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            client: StreamClient::new(api_url),
            events_tx,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll so the newest message (or the Thinking indicator) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for (idx, msg) in self.conversation.messages().iter().enumerate() {
            total_lines += 1; // Role line ("You:" or "AI:")
            if self.conversation.is_pending_slot(idx) {
                total_lines += 1; // Thinking indicator
            } else {
                for line in msg.content.lines() {
                    total_lines += wrapped_line_count(line, wrap_width);
                }
            }
            total_lines += 1; // Blank line after message
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}

/// Lines a string occupies when wrapped at `width` columns. Character count,
/// not byte length, for proper UTF-8 handling.
fn wrapped_line_count(line: &str, width: usize) -> u16 {
    let char_count = line.chars().count();
    if char_count == 0 {
        1 // Empty line still takes one line
    } else {
        ((char_count / width) + 1) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new("http://localhost:8000", tx)
    }

    #[test]
    fn test_wrapped_line_count() {
        assert_eq!(wrapped_line_count("", 10), 1);
        assert_eq!(wrapped_line_count("short", 10), 1);
        assert_eq!(wrapped_line_count(&"a".repeat(25), 10), 3);
        // Character count, not bytes: 25 two-byte chars still wrap as 25 cells
        assert_eq!(wrapped_line_count(&"ñ".repeat(25), 10), 3);
    }

    #[test]
    fn test_animation_only_advances_while_awaiting() {
        let mut app = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        app.conversation.submit("hi").expect("should accept");
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0); // wraps after 3 frames
    }

    #[test]
    fn test_scroll_chat_to_bottom_counts_pending_placeholder() {
        let mut app = test_app();
        app.chat_width = 10;
        app.chat_height = 4;

        app.conversation.submit("hello").expect("should accept");
        app.scroll_chat_to_bottom();

        // user: role + 1 content + blank; assistant: role + thinking + blank
        assert_eq!(app.chat_scroll, 2);
    }

    #[test]
    fn test_scroll_stays_at_top_when_everything_fits() {
        let mut app = test_app();
        app.chat_width = 80;
        app.chat_height = 20;

        app.conversation.submit("hi").expect("should accept");
        app.scroll_chat_to_bottom();

        assert_eq!(app.chat_scroll, 0);
    }
}
