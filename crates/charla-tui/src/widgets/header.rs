//! Header bar: title and conversation status.
//!
//! Format: `● Chat con Voz  Escuchando...`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;

/// Header widget.
pub struct Header<'a> {
    title: &'a str,
    status: &'a str,
    listening: bool,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    /// Create a header with the given title and status text.
    pub fn new(title: &'a str, status: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            status,
            listening: false,
            theme,
        }
    }

    /// Highlight the status dot while listening.
    #[must_use]
    pub fn listening(mut self, listening: bool) -> Self {
        self.listening = listening;
        self
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dot = if self.listening {
            self.theme.recording
        } else {
            self.theme.primary
        };
        let line = Line::from(vec![
            Span::styled("● ", Style::default().fg(dot)),
            Span::styled(
                self.title,
                Style::default()
                    .fg(self.theme.text)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.status, Style::default().fg(self.theme.muted)),
        ]);

        Paragraph::new(line)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(self.theme.border)),
            )
            .render(area, buf);
    }
}
