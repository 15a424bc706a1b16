//! Footer line: key hints, or the current notice when one is showing.

use charla_engine::Notice;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// A single keybinding hint.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    /// Create a new key hint.
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

const SEND: KeyHint = KeyHint::new("Enter", "enviar");
const MICROPHONE: KeyHint = KeyHint::new("F2", "micrófono");
const QUIT: KeyHint = KeyHint::new("Esc", "salir");

/// Hints for the given variant.
pub fn hints(voice_input: bool) -> Vec<KeyHint> {
    if voice_input {
        vec![SEND, MICROPHONE, QUIT]
    } else {
        vec![SEND, QUIT]
    }
}

/// Footer widget.
pub struct Footer<'a> {
    hints: &'a [KeyHint],
    notice: Option<Notice>,
    theme: &'a Theme,
}

impl<'a> Footer<'a> {
    /// Create a footer with the given hints.
    pub fn new(hints: &'a [KeyHint], theme: &'a Theme) -> Self {
        Self {
            hints,
            notice: None,
            theme,
        }
    }

    /// Show a notice in place of the hints.
    #[must_use]
    pub fn notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice;
        self
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = if let Some(notice) = self.notice {
            Line::from(Span::styled(
                format!(" ⚠ {}", notice.message()),
                Style::default()
                    .fg(self.theme.warning)
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            let key_style = Style::default().fg(self.theme.text);
            let action_style = Style::default().fg(self.theme.muted);
            let mut spans = vec![Span::raw(" ")];
            for (i, hint) in self.hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled("  ·  ", action_style));
                }
                spans.push(Span::styled(hint.key, key_style));
                spans.push(Span::styled(format!(" {}", hint.action), action_style));
            }
            Line::from(spans)
        };

        Paragraph::new(line).render(area, buf);
    }
}
