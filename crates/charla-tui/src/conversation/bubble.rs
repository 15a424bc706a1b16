//! Bubble layout: turns messages into rows of wrapped, aligned text.

use charla_engine::Message;
use unicode_width::UnicodeWidthStr;

/// Share of the pane a bubble may span, in percent.
pub const MAX_BUBBLE_PERCENT: usize = 78;

/// Horizontal padding inside a bubble (one column each side).
const PADDING: usize = 2;

/// One laid-out row of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Blank row between messages.
    Gap,
    /// A row inside a bubble.
    Bubble {
        /// Offset of the bubble from the left edge of the pane.
        x: usize,
        /// Bubble width including padding.
        width: usize,
        /// Text to draw.
        text: String,
        /// Whether this is the timestamp row.
        meta: bool,
        /// Whether the bubble belongs to the local user.
        mine: bool,
    },
}

/// Wrap width for bubble text in a pane of `pane_width` columns.
pub fn wrap_width(pane_width: usize) -> usize {
    (pane_width * MAX_BUBBLE_PERCENT / 100)
        .saturating_sub(PADDING)
        .max(1)
}

/// Lay out a single message. Own messages hug the right edge.
pub fn layout_message(message: &Message, pane_width: usize) -> Vec<Row> {
    let lines: Vec<String> = textwrap::wrap(message.text(), wrap_width(pane_width))
        .into_iter()
        .map(|line| line.into_owned())
        .collect();

    let content = lines
        .iter()
        .map(|line| line.width())
        .chain(std::iter::once(message.timestamp().width()))
        .max()
        .unwrap_or(0);
    let width = (content + PADDING).min(pane_width);
    let mine = message.is_mine();
    let x = if mine { pane_width - width } else { 0 };

    let mut rows: Vec<Row> = lines
        .into_iter()
        .map(|text| Row::Bubble {
            x,
            width,
            text,
            meta: false,
            mine,
        })
        .collect();
    rows.push(Row::Bubble {
        x,
        width,
        text: message.timestamp().to_string(),
        meta: true,
        mine,
    });
    rows
}

/// Lay out the whole conversation with a gap between messages.
pub fn layout(messages: &[Message], pane_width: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            rows.push(Row::Gap);
        }
        rows.extend(layout_message(message, pane_width));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use charla_engine::{ConversationView, FixedClock, Sender};

    fn messages(history: &[(Sender, &str)]) -> Vec<Message> {
        ConversationView::new()
            .with_clock(FixedClock::at(13, 5))
            .with_history(history.iter().copied())
            .messages()
            .to_vec()
    }

    #[test]
    fn test_wrap_width() {
        assert_eq!(wrap_width(100), 76);
        assert_eq!(wrap_width(38), 27);
        assert_eq!(wrap_width(1), 1);
    }

    #[test]
    fn test_own_message_is_right_aligned() {
        let msgs = messages(&[(Sender::Me, "¿Qué tal?")]);
        let rows = layout_message(&msgs[0], 38);
        assert_eq!(rows.len(), 2);
        let Row::Bubble { x, width, mine, .. } = &rows[0] else {
            panic!("expected bubble row");
        };
        assert!(*mine);
        assert_eq!(*width, 11);
        assert_eq!(*x, 27);
    }

    #[test]
    fn test_other_message_is_left_aligned() {
        let msgs = messages(&[(Sender::Other, "Hola")]);
        let rows = layout_message(&msgs[0], 38);
        assert!(matches!(rows[0], Row::Bubble { x: 0, width: 9, .. }));
        assert!(matches!(&rows[1], Row::Bubble { meta: true, text, .. } if text == "1:05 PM"));
    }

    #[test]
    fn test_long_message_wraps_within_bubble_limit() {
        let text = "una frase bastante larga que no cabe en una sola fila del panel";
        let msgs = messages(&[(Sender::Other, text)]);
        let rows = layout_message(&msgs[0], 30);

        let text_rows: Vec<_> = rows
            .iter()
            .filter(|row| matches!(row, Row::Bubble { meta: false, .. }))
            .collect();
        assert!(text_rows.len() > 1);
        for row in text_rows {
            let Row::Bubble { text, width, .. } = row else {
                unreachable!();
            };
            assert!(text.width() <= wrap_width(30));
            assert!(*width <= 30 * MAX_BUBBLE_PERCENT / 100);
        }
    }

    #[test]
    fn test_gaps_between_messages() {
        let msgs = messages(&[(Sender::Other, "Hola"), (Sender::Me, "Buenas")]);
        let rows = layout(&msgs, 38);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2], Row::Gap);
    }
}
