//! Conversation view state.
//!
//! [`ConversationView`] owns everything the chat screen shows: the message
//! log, the draft text and (when voice input is enabled) the listening state.
//! Hosts drive it with input events and observe it through
//! [`ConversationView::subscribe`] instead of re-running a render function.

use crate::clock::{format_timestamp, Clock, SystemClock};
use crate::keys::{KeyInput, KeyOutcome};
use crate::message::{Message, MessageId, MessageLog, Sender};
use crate::speech::{
    CaptureError, CaptureEvent, CaptureSettings, SessionEvent, SpeechCapture,
    UnsupportedCapture, PERMISSION_DENIED_CODE,
};
use tracing::{debug, warn};

/// Listening state of the microphone toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningState {
    /// No capture in progress.
    #[default]
    Idle,
    /// A capture session was started and has not ended yet.
    Listening,
}

/// One-shot message for the user about a capture problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The host has no usable speech capability.
    CaptureUnsupported,
    /// Microphone access was refused.
    PermissionDenied,
}

impl Notice {
    /// Text shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Self::CaptureUnsupported => {
                "El reconocimiento de voz no es compatible con este equipo. Configura un transcriptor."
            }
            Self::PermissionDenied => {
                "Permiso de micrófono denegado. Por favor, permite el acceso al micrófono."
            }
        }
    }
}

/// A state change observers are told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    /// A message was added to the log.
    MessageAppended(MessageId),
    /// The draft text changed.
    DraftChanged,
    /// Listening started (`true`) or stopped (`false`).
    ListeningChanged(bool),
    /// A notice was raised.
    Notice(Notice),
}

/// Handle returned by [`ConversationView::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ViewChange)>;

/// Voice input wiring: the capability and how to start it.
struct Voice {
    capture: Box<dyn SpeechCapture>,
    settings: CaptureSettings,
}

/// State holder for the chat screen.
pub struct ConversationView {
    log: MessageLog,
    draft: String,
    listening: ListeningState,
    notice: Option<Notice>,
    voice: Option<Voice>,
    clock: Box<dyn Clock>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for ConversationView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationView")
            .field("messages", &self.log.len())
            .field("draft", &self.draft)
            .field("listening", &self.listening)
            .field("notice", &self.notice)
            .field("voice_input", &self.voice.is_some())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for ConversationView {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationView {
    /// Create an empty view without voice input, using the system clock.
    pub fn new() -> Self {
        Self {
            log: MessageLog::new(),
            draft: String::new(),
            listening: ListeningState::Idle,
            notice: None,
            voice: None,
            clock: Box::new(SystemClock),
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Use a different clock for timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Enable voice input backed by `capture`.
    #[must_use]
    pub fn with_voice(
        mut self,
        capture: impl SpeechCapture + 'static,
        settings: CaptureSettings,
    ) -> Self {
        self.voice = Some(Voice {
            capture: Box::new(capture),
            settings,
        });
        self
    }

    /// Enable voice input with no usable capability behind it.
    #[must_use]
    pub fn with_unsupported_voice(self, settings: CaptureSettings) -> Self {
        self.with_voice(UnsupportedCapture, settings)
    }

    /// Seed the log with an initial history. Blank entries are skipped.
    #[must_use]
    pub fn with_history<I, S>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = (Sender, S)>,
        S: AsRef<str>,
    {
        for (sender, text) in history {
            let timestamp = self.timestamp();
            self.log.append(sender, text.as_ref(), timestamp);
        }
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// All messages in display order.
    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    /// The message log.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Current draft text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Current listening state.
    pub fn listening(&self) -> ListeningState {
        self.listening
    }

    /// Whether a capture session is active.
    pub fn is_listening(&self) -> bool {
        self.listening == ListeningState::Listening
    }

    /// Whether the microphone toggle is available.
    pub fn voice_enabled(&self) -> bool {
        self.voice.is_some()
    }

    /// The notice currently shown, if any.
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register a listener for state changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&ViewChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: ViewChange) {
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }

    // ------------------------------------------------------------------
    // Input events
    // ------------------------------------------------------------------

    /// Replace the draft text (the composer's change event).
    pub fn set_draft(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.draft {
            return;
        }
        self.draft = text;
        self.notify(ViewChange::DraftChanged);
    }

    /// Send the draft as a message from the local user.
    ///
    /// A blank draft is ignored and left untouched. Otherwise the trimmed
    /// text is appended and the draft is cleared.
    pub fn send(&mut self) -> Option<MessageId> {
        let timestamp = self.timestamp();
        let id = self.log.append(Sender::Me, &self.draft, timestamp)?;
        debug!(%id, "Message sent");

        self.notify(ViewChange::MessageAppended(id));
        self.set_draft(String::new());
        Some(id)
    }

    /// The send control was clicked.
    pub fn click_send(&mut self) -> Option<MessageId> {
        self.send()
    }

    /// Handle a key press in the composer.
    pub fn handle_key_event(&mut self, key: &KeyInput) -> KeyOutcome {
        if key.is_composing {
            return KeyOutcome::Composing;
        }
        if key.is_submit() {
            KeyOutcome::Submitted(self.send())
        } else {
            KeyOutcome::Ignored
        }
    }

    /// Start or stop voice capture. No-op when voice input is disabled.
    pub fn toggle_microphone(&mut self) {
        let Some(voice) = self.voice.as_mut() else {
            return;
        };

        if self.listening == ListeningState::Listening {
            voice.capture.stop();
            self.set_listening(ListeningState::Idle);
            return;
        }

        match voice.capture.start(&voice.settings) {
            Ok(()) => self.set_listening(ListeningState::Listening),
            Err(CaptureError::PermissionDenied) => self.raise(Notice::PermissionDenied),
            Err(e) => {
                warn!(error = %e, "Speech capture unavailable");
                self.raise(Notice::CaptureUnsupported);
            }
        }
    }

    /// Apply a session-tagged event, dropping it if its session was replaced.
    pub fn handle_session_event(&mut self, tagged: SessionEvent) {
        let current = self
            .voice
            .as_ref()
            .is_some_and(|voice| voice.capture.is_current(tagged.session));
        if !current {
            debug!(session = tagged.session, event = ?tagged.event, "Dropping stale capture event");
            return;
        }
        self.handle_capture_event(tagged.event);
    }

    /// Apply an event reported by the speech capability.
    pub fn handle_capture_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Result { transcript, .. } => self.set_draft(transcript),
            CaptureEvent::Error { code } if code == PERMISSION_DENIED_CODE => {
                self.raise(Notice::PermissionDenied);
                self.set_listening(ListeningState::Idle);
            }
            CaptureEvent::Error { code } => {
                warn!(%code, "Speech capture error");
            }
            CaptureEvent::End => self.set_listening(ListeningState::Idle),
        }
    }

    /// Clear the current notice.
    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn set_listening(&mut self, state: ListeningState) {
        if self.listening == state {
            return;
        }
        self.listening = state;
        self.notify(ViewChange::ListeningChanged(
            state == ListeningState::Listening,
        ));
    }

    fn raise(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.notify(ViewChange::Notice(notice));
    }

    fn timestamp(&self) -> String {
        format_timestamp(self.clock.now())
    }
}
