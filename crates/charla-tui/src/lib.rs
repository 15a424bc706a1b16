//! charla-tui: Terminal chat screen for charla
//!
//! This crate provides the TUI layer for charla, including:
//! - The chat screen (header, bubbles, composer, footer)
//! - Key and mouse handling
//! - Wiring of the speech transcriber into the event loop

mod app;
mod conversation;
mod event;
mod screen;
#[cfg(test)]
pub mod test_utils;
mod theme;
mod widgets;

pub use app::App;
pub use charla_engine;
pub use event::{Action, Event, EventHandler};
pub use theme::Theme;

use charla_engine::{CommandCapture, Config, ConversationView, SessionEvent, SystemClock};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, MouseButton, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tokio::sync::mpsc;
use tracing::{debug, info};

use conversation::SCROLL_SPEED;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Build the conversation view for `config`.
///
/// The voice variant uses the configured transcriber, reporting its events on
/// `capture_tx`. Without one, the microphone reports itself unsupported.
pub fn build_view(
    config: &Config,
    capture_tx: mpsc::UnboundedSender<SessionEvent>,
) -> ConversationView {
    let view = config.build_view(SystemClock);
    if !config.voice_input {
        return view;
    }

    match &config.transcriber {
        Some(transcriber) => view.with_voice(
            CommandCapture::new(transcriber.command_argv.clone(), capture_tx),
            config.capture.clone(),
        ),
        None => view.with_unsupported_voice(config.capture.clone()),
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let (capture_tx, mut capture_rx) = mpsc::unbounded_channel();
    let view = build_view(&config, capture_tx);
    info!(
        voice = view.voice_enabled(),
        transcriber = config.transcriber.is_some(),
        "Starting chat"
    );
    let mut app = App::new(config, view);

    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 4 Hz tick rate
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, &mut capture_rx).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    capture_rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if app.take_dirty() {
            terminal.draw(|frame| {
                let area = frame.area();
                screen::render(app, area, frame.buffer_mut());
            })?;
        }

        tokio::select! {
            Some(event) = events.next() => match event {
                Event::Key(key) => app.handle_action(event::key_to_action(key)),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        app.scroll.scroll_up(SCROLL_SPEED);
                        app.mark_dirty();
                    }
                    MouseEventKind::ScrollDown => {
                        app.scroll.scroll_down(SCROLL_SPEED);
                        app.mark_dirty();
                    }
                    MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
                    _ => {}
                },
                Event::Tick => app.tick(),
                Event::Resize(_, _) => app.mark_dirty(),
            },
            Some(capture) = capture_rx.recv() => {
                debug!(?capture, "Capture event");
                app.handle_session_event(capture);
            }
            else => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Returns the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
