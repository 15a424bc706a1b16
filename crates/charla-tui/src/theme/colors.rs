//! Color palette for the chat screen.

use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub bubble: Color,

    // Foregrounds
    pub text: Color,
    pub muted: Color,
    pub placeholder: Color,

    // Accents
    pub primary: Color,
    pub button: Color,
    pub recording: Color,

    // Semantic
    pub warning: Color,

    // Borders
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::charcoal()
    }
}

impl Theme {
    /// Charcoal dark theme (default).
    pub fn charcoal() -> Self {
        Self {
            // Backgrounds
            base: Color::Rgb(33, 33, 33),   // #212121
            bubble: Color::Rgb(48, 48, 48), // #303030

            // Foregrounds
            text: Color::Rgb(234, 234, 234),        // #eaeaea
            muted: Color::Rgb(150, 150, 150),       // #969696
            placeholder: Color::Rgb(185, 185, 185), // #b9b9b9

            // Accents
            primary: Color::Rgb(255, 255, 255), // #ffffff
            button: Color::Rgb(255, 255, 255),  // #ffffff
            recording: Color::Rgb(255, 68, 68), // #ff4444

            // Semantic
            warning: Color::Rgb(249, 226, 175), // #f9e2af

            // Borders
            border: Color::Rgb(58, 58, 58), // #3a3a3a
        }
    }

    /// High contrast theme for accessibility.
    pub fn high_contrast() -> Self {
        Self {
            base: Color::Black,
            bubble: Color::Rgb(20, 20, 20),

            text: Color::White,
            muted: Color::Rgb(200, 200, 200),
            placeholder: Color::Rgb(150, 150, 150),

            primary: Color::Cyan,
            button: Color::White,
            recording: Color::Red,

            warning: Color::Yellow,

            border: Color::White,
        }
    }

    /// Pick a theme from the environment, respecting `NO_COLOR`.
    pub fn from_env() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            Self::high_contrast()
        } else {
            Self::charcoal()
        }
    }
}
