//! Composer: the draft input with its send and microphone controls.

use charla_engine::ConversationView;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;

/// Prompt shown before the draft.
const PROMPT: &str = "> ";

/// Cursor glyph drawn inside the draft.
const CURSOR: &str = "█";

/// Microphone glyphs for the idle and listening states.
const MIC_IDLE: &str = "🎤";
const MIC_LISTENING: &str = "🔴";

/// Cursor position within the view's draft.
///
/// The draft text itself lives in [`ConversationView`]; edits are pushed to it
/// as text-change events.
#[derive(Debug, Clone, Default)]
pub struct ComposerState {
    /// Cursor position (character index).
    cursor: usize,
}

impl ComposerState {
    /// Create a new composer state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor position clamped to the draft.
    pub fn cursor(&self, draft: &str) -> usize {
        self.cursor.min(draft.chars().count())
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, view: &mut ConversationView, ch: char) {
        let mut draft = view.draft().to_string();
        let cursor = self.cursor(&draft);
        draft.insert(byte_index(&draft, cursor), ch);
        view.set_draft(draft);
        self.cursor = cursor + 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self, view: &mut ConversationView) {
        let cursor = self.cursor(view.draft());
        if cursor == 0 {
            return;
        }
        let mut draft = view.draft().to_string();
        draft.remove(byte_index(&draft, cursor - 1));
        view.set_draft(draft);
        self.cursor = cursor - 1;
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self, view: &mut ConversationView) {
        let cursor = self.cursor(view.draft());
        if cursor >= view.draft().chars().count() {
            return;
        }
        let mut draft = view.draft().to_string();
        draft.remove(byte_index(&draft, cursor));
        view.set_draft(draft);
        self.cursor = cursor;
    }

    /// Move cursor left.
    pub fn move_left(&mut self, draft: &str) {
        self.cursor = self.cursor(draft).saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self, draft: &str) {
        self.cursor = (self.cursor(draft) + 1).min(draft.chars().count());
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self, draft: &str) {
        self.cursor = draft.chars().count();
    }
}

/// Byte offset of the `index`-th character.
fn byte_index(s: &str, index: usize) -> usize {
    s.char_indices().nth(index).map_or(s.len(), |(i, _)| i)
}

/// Split the draft around the cursor, dropping leading characters so the
/// cursor stays within `available` columns.
fn visible_draft(draft: &str, cursor: usize, available: usize) -> (String, String) {
    let chars: Vec<char> = draft.chars().collect();
    let cursor = cursor.min(chars.len());
    let width = |cs: &[char]| cs.iter().map(|c| c.width().unwrap_or(0)).sum::<usize>();

    let mut start = 0;
    while start < cursor && width(&chars[start..cursor]) + 1 > available {
        start += 1;
    }
    (
        chars[start..cursor].iter().collect(),
        chars[cursor..].iter().collect(),
    )
}

/// Composer widget.
///
/// ```text
/// ┌──────────────────────────────────────┐
/// │> Hola qué tal█             🎤 [Enviar]│
/// └──────────────────────────────────────┘
/// ```
pub struct Composer<'a> {
    draft: &'a str,
    cursor: usize,
    placeholder: &'a str,
    send_label: &'a str,
    /// `Some(listening)` when the microphone control is shown.
    microphone: Option<bool>,
    theme: &'a Theme,
}

impl<'a> Composer<'a> {
    /// Create a composer for `draft` with the cursor at `cursor`.
    pub fn new(draft: &'a str, cursor: usize, theme: &'a Theme) -> Self {
        Self {
            draft,
            cursor,
            placeholder: "",
            send_label: "",
            microphone: None,
            theme,
        }
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Set the send control label.
    #[must_use]
    pub fn send_label(mut self, label: &'a str) -> Self {
        self.send_label = label;
        self
    }

    /// Show the microphone control in the given listening state.
    #[must_use]
    pub fn microphone(mut self, listening: Option<bool>) -> Self {
        self.microphone = listening;
        self
    }

    fn action_spans(&self) -> Vec<Span<'a>> {
        let mut spans = Vec::new();
        if let Some(listening) = self.microphone {
            let (glyph, style) = if listening {
                (
                    MIC_LISTENING,
                    Style::default()
                        .fg(self.theme.recording)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (MIC_IDLE, Style::default().fg(self.theme.text))
            };
            spans.push(Span::styled(glyph, style));
            spans.push(Span::raw(" "));
        }
        if !self.send_label.is_empty() {
            spans.push(Span::styled(
                format!("[{}]", self.send_label),
                Style::default()
                    .fg(self.theme.button)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        spans
    }

    fn draft_line(&self, available: usize) -> Line<'a> {
        let prompt = Span::styled(PROMPT, Style::default().fg(self.theme.primary));
        if self.draft.is_empty() {
            return Line::from(vec![
                prompt,
                Span::styled(self.placeholder, Style::default().fg(self.theme.placeholder)),
            ]);
        }

        let (before, after) =
            visible_draft(self.draft, self.cursor, available.saturating_sub(PROMPT.len()));
        let text = Style::default().fg(self.theme.text);
        Line::from(vec![
            prompt,
            Span::styled(before, text),
            Span::styled(CURSOR, text),
            Span::styled(after, text),
        ])
    }
}

/// Screen areas of the composer's clickable controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlAreas {
    pub send: Option<Rect>,
    pub microphone: Option<Rect>,
}

impl Composer<'_> {
    /// Where the controls land when rendered into `area`.
    pub fn control_areas(&self, area: Rect) -> ControlAreas {
        let inner = Block::bordered().inner(area);
        if inner.height < 1 || inner.width < 1 {
            return ControlAreas::default();
        }
        let right = inner.x + inner.width;
        let mut next = right;
        let mut areas = ControlAreas::default();

        if !self.send_label.is_empty() {
            let width = u16::try_from(self.send_label.width() + 2).unwrap_or(u16::MAX);
            let x = next.saturating_sub(width).max(inner.x);
            areas.send = Some(Rect::new(x, inner.y, next - x, 1));
            next = x.saturating_sub(1);
        }
        if self.microphone.is_some() {
            let width = u16::try_from(MIC_IDLE.width()).unwrap_or(2);
            let x = next.saturating_sub(width).max(inner.x);
            areas.microphone = Some(Rect::new(x, inner.y, next.saturating_sub(x), 1));
        }
        areas
    }
}

impl Widget for Composer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().border_style(Style::default().fg(self.theme.border));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let actions = Line::from(self.action_spans());
        #[allow(clippy::cast_possible_truncation)]
        let actions_width = (actions.width() as u16).min(inner.width);
        let draft_area = Rect {
            width: inner.width - actions_width,
            ..inner
        };
        let actions_area = Rect {
            x: inner.x + draft_area.width,
            width: actions_width,
            ..inner
        };

        Paragraph::new(self.draft_line(draft_area.width as usize)).render(draft_area, buf);
        Paragraph::new(actions)
            .alignment(Alignment::Right)
            .render(actions_area, buf);
    }
}
