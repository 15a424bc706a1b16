//! UI widgets for the chat screen.
//!
//! This module provides:
//! - [`Header`] - Title and status line
//! - [`Composer`] - Draft input with send and microphone controls
//! - [`Footer`] - Key hints or the current notice

mod composer;
mod footer;
mod header;

pub use composer::{Composer, ComposerState, ControlAreas};
pub use footer::{hints, Footer};
pub use header::Header;
