//! charla-engine: Headless state for the charla chat demo
//!
//! This crate provides the core logic behind the chat screen, including:
//! - The conversation view state (messages, draft, listening toggle)
//! - Key-event classification for submit-on-Enter
//! - The speech-capture interface and a process-backed transcriber
//! - Configuration

pub mod clock;
pub mod config;
pub mod keys;
pub mod message;
pub mod speech;
pub mod view;

// Re-export commonly used types
pub use clock::{format_timestamp, Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError, Labels, TranscriberConfig};
pub use keys::{KeyInput, KeyOutcome};
pub use message::{Message, MessageId, MessageLog, Sender};
pub use speech::{
    program_available, CaptureError, CaptureEvent, CaptureSettings, CommandCapture,
    SessionEvent, SpeechCapture, UnsupportedCapture, LANGUAGE_PLACEHOLDER,
};
pub use view::{ConversationView, ListeningState, Notice, SubscriptionId, ViewChange};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
