//! Chat screen layout.
//!
//! ```text
//! ● Chat con Voz  Listo para hablar
//! ──────────────────────────────────
//!   ¡Hola!                  (bubbles)
//! ┌────────────────────────────────┐
//! │> Escribe…          🎤 [Enviar] │
//! └────────────────────────────────┘
//!  Enter enviar  ·  F2 micrófono
//! ```

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::{StatefulWidget, Widget},
};

use crate::app::App;
use crate::conversation::MessageList;
use crate::widgets::{hints, Composer, Footer, Header};

/// Render the chat screen.
pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    buf.set_style(area, Style::default().bg(app.theme.base));

    let [header_area, list_area, composer_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let voice = app.view.voice_enabled();
    let listening = app.view.is_listening();
    let labels = &app.config.labels;

    Header::new(&app.config.title, labels.status(voice, listening), &app.theme)
        .listening(listening)
        .render(header_area, buf);

    MessageList::new(app.view.messages(), &app.theme).render(list_area, buf, &mut app.scroll);

    let draft = app.view.draft();
    let composer = Composer::new(draft, app.composer.cursor(draft), &app.theme)
        .placeholder(labels.placeholder(voice))
        .send_label(&labels.send)
        .microphone(voice.then_some(listening));
    app.controls = composer.control_areas(composer_area);
    composer.render(composer_area, buf);

    let hints = hints(voice);
    Footer::new(&hints, &app.theme)
        .notice(app.view.notice())
        .render(footer_area, buf);
}
