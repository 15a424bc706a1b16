//! Test utilities for charla-tui snapshot and integration testing.

use crate::app::App;
use charla_engine::{Config, FixedClock};
use ratatui::{buffer::Buffer, layout::Rect};

/// Create a test app for `config` with the clock fixed at 1:05 PM.
///
/// Voice configs get no capture capability, so the microphone reports
/// itself unsupported.
pub fn create_test_app(config: Config) -> App {
    let view = config.build_view(FixedClock::at(13, 5));
    let view = if config.voice_input {
        view.with_unsupported_voice(config.capture.clone())
    } else {
        view
    };
    let mut app = App::new(config, view);
    app.theme = crate::theme::Theme::charcoal();
    app
}

/// Convert a buffer to a string representation for snapshot testing.
///
/// Trailing whitespace is trimmed from each line.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

/// Render the chat screen and return it as a string.
pub fn render_app_to_string(app: &mut App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    crate::screen::render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_app() {
        let app = create_test_app(Config::voice());
        assert!(app.view.voice_enabled());
        assert_eq!(app.view.messages().len(), 1);
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hola", ratatui::style::Style::default());
        buffer.set_string(0, 1, "Mundo", ratatui::style::Style::default());

        let result = buffer_to_string(&buffer);
        assert_eq!(result, "Hola\nMundo\n");
    }
}
