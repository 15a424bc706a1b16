//! Theme components for the TUI.
//!
//! This module provides:
//! - [`Theme`] - Color palette (dark charcoal default, high contrast)

mod colors;

pub use colors::Theme;
