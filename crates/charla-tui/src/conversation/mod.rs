//! Conversation pane: chat bubbles with follow-scrolling.

mod bubble;
mod state;
mod widget;

pub use state::{ScrollState, SCROLL_SPEED};
pub use widget::MessageList;
