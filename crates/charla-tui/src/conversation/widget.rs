//! Message list widget.

use charla_engine::Message;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::StatefulWidget,
};

use super::bubble::{layout, Row};
use super::state::ScrollState;
use crate::theme::Theme;

/// Renders the conversation as chat bubbles.
pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    /// Create a message list over `messages`.
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self { messages, theme }
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = ScrollState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ScrollState) {
        buf.set_style(area, Style::default().bg(self.theme.base));
        if area.width < 3 || area.height == 0 {
            return;
        }

        let pane_x = area.x + 1;
        let pane_width = area.width - 2;
        let rows = layout(self.messages, pane_width as usize);
        let top = state.resolve(rows.len(), area.height as usize);

        for (offset, row) in rows.iter().skip(top).take(area.height as usize).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + offset as u16;
            let Row::Bubble {
                x,
                width,
                text,
                meta,
                ..
            } = row
            else {
                continue;
            };

            #[allow(clippy::cast_possible_truncation)]
            let (x, width) = (pane_x + *x as u16, *width as u16);
            buf.set_style(
                Rect::new(x, y, width, 1),
                Style::default().bg(self.theme.bubble),
            );

            let style = if *meta {
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(self.theme.text)
            };
            buf.set_stringn(x + 1, y, text, width.saturating_sub(2) as usize, style);
        }
    }
}
