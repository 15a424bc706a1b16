//! Application state for the chat screen.

use std::cell::RefCell;
use std::rc::Rc;

use charla_engine::{CaptureEvent, Config, ConversationView, SessionEvent, ViewChange};
use ratatui::layout::{Position, Rect};
use tracing::debug;

use crate::conversation::ScrollState;
use crate::event::Action;
use crate::theme::Theme;
use crate::widgets::{ComposerState, ControlAreas};

/// Ticks a notice stays on screen before it is cleared (5s at 4 Hz).
pub const NOTICE_TTL: usize = 20;

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Loaded configuration.
    pub config: Config,

    /// Conversation state.
    pub view: ConversationView,

    /// Color palette.
    pub theme: Theme,

    /// Cursor within the draft.
    pub composer: ComposerState,

    /// Message list scrolling.
    pub scroll: ScrollState,

    /// Clickable composer controls as of the last render.
    pub controls: ControlAreas,

    /// Changes reported by the view since the last sync.
    changes: Rc<RefCell<Vec<ViewChange>>>,

    /// Ticks remaining until the notice is cleared.
    notice_ttl: usize,

    /// Whether the screen needs redrawing.
    dirty: bool,
}

impl App {
    /// Create an app around an already-built view.
    pub fn new(config: Config, mut view: ConversationView) -> Self {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        view.subscribe(move |change| sink.borrow_mut().push(*change));

        Self {
            should_quit: false,
            config,
            view,
            theme: Theme::from_env(),
            composer: ComposerState::new(),
            scroll: ScrollState::new(),
            controls: ControlAreas::default(),
            changes,
            notice_ttl: 0,
            dirty: true,
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        if action != Action::None && self.view.dismiss_notice().is_some() {
            self.notice_ttl = 0;
            self.dirty = true;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleMicrophone => self.view.toggle_microphone(),
            Action::Key(input) => {
                if let Some(id) = self.view.handle_key_event(&input).sent() {
                    debug!(%id, "Draft submitted");
                }
            }
            Action::Insert(ch) => self.composer.insert(&mut self.view, ch),
            Action::Backspace => self.composer.backspace(&mut self.view),
            Action::Delete => self.composer.delete(&mut self.view),
            Action::Left => self.composer.move_left(self.view.draft()),
            Action::Right => self.composer.move_right(self.view.draft()),
            Action::Home => self.composer.move_home(),
            Action::End => self.composer.move_end(self.view.draft()),
            Action::ScrollUp => self.scroll.scroll_up(1),
            Action::ScrollDown => self.scroll.scroll_down(1),
            Action::PageUp => self.scroll.page_up(),
            Action::PageDown => self.scroll.page_down(),
            Action::None => return,
        }

        // Cursor and scroll moves do not go through the view
        self.dirty = true;
        self.sync_changes();
    }

    /// Handle a left click at a screen position.
    pub fn click(&mut self, column: u16, row: u16) {
        let hit = |area: Option<Rect>| area.is_some_and(|a| a.contains(Position::new(column, row)));
        if hit(self.controls.send) {
            self.view.dismiss_notice();
            self.view.click_send();
        } else if hit(self.controls.microphone) {
            self.view.dismiss_notice();
            self.view.toggle_microphone();
        } else {
            return;
        }
        self.dirty = true;
        self.sync_changes();
    }

    /// Apply an event from a speech capture session.
    pub fn handle_session_event(&mut self, tagged: SessionEvent) {
        let transcript = matches!(tagged.event, CaptureEvent::Result { .. });
        self.view.handle_session_event(tagged);
        if transcript {
            self.composer.move_end(self.view.draft());
        }
        self.sync_changes();
    }

    /// Advance timers.
    pub fn tick(&mut self) {
        if self.notice_ttl == 0 {
            return;
        }
        self.notice_ttl -= 1;
        if self.notice_ttl == 0 && self.view.dismiss_notice().is_some() {
            self.dirty = true;
        }
    }

    /// Request a redraw.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether a redraw is due. Clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn sync_changes(&mut self) {
        let changes: Vec<ViewChange> = self.changes.borrow_mut().drain(..).collect();
        for change in changes {
            match change {
                ViewChange::MessageAppended(id) => {
                    if let Some(message) = self.view.log().get(id) {
                        debug!(%id, sender = ?message.sender(), "Message appended");
                    }
                    self.scroll.follow();
                }
                ViewChange::Notice(notice) => {
                    debug!(?notice, "Notice raised");
                    self.notice_ttl = NOTICE_TTL;
                }
                ViewChange::DraftChanged | ViewChange::ListeningChanged(_) => {}
            }
            self.dirty = true;
        }
    }
}
