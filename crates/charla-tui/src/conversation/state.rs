//! Scroll state for the message list.
//!
//! The list follows the newest message until the user scrolls up, and
//! resumes following once they scroll back to the bottom.

/// Rows scrolled per mouse wheel tick.
pub const SCROLL_SPEED: usize = 3;

/// Message list scroll state.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    /// First visible row while pinned; `None` follows the bottom.
    pinned_top: Option<usize>,
    /// First visible row at the last render.
    last_top: usize,
    /// Largest valid first row at the last render.
    max_top: usize,
    /// Visible rows at the last render.
    page: usize,
}

impl ScrollState {
    /// Create a state that follows the newest message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if follow mode is enabled.
    pub fn is_following(&self) -> bool {
        self.pinned_top.is_none()
    }

    /// First visible row at the last render.
    pub fn top(&self) -> usize {
        self.last_top
    }

    /// Resume following the newest message.
    pub fn follow(&mut self) {
        self.pinned_top = None;
    }

    /// Scroll up by `amount` rows. Disables follow mode.
    pub fn scroll_up(&mut self, amount: usize) {
        if self.max_top == 0 {
            return;
        }
        self.pinned_top = Some(self.last_top.saturating_sub(amount));
        self.last_top = self.pinned_top.unwrap_or_default();
    }

    /// Scroll down by `amount` rows. Reaching the bottom re-enables follow.
    pub fn scroll_down(&mut self, amount: usize) {
        let Some(top) = self.pinned_top else {
            return;
        };
        let top = top + amount;
        if top >= self.max_top {
            self.pinned_top = None;
            self.last_top = self.max_top;
        } else {
            self.pinned_top = Some(top);
            self.last_top = top;
        }
    }

    /// Scroll up by a page.
    pub fn page_up(&mut self) {
        self.scroll_up(self.page.max(1));
    }

    /// Scroll down by a page.
    pub fn page_down(&mut self) {
        self.scroll_down(self.page.max(1));
    }

    /// Record the content size for this frame and return the first visible row.
    pub fn resolve(&mut self, total_rows: usize, visible_rows: usize) -> usize {
        self.max_top = total_rows.saturating_sub(visible_rows);
        self.page = visible_rows;
        let top = self
            .pinned_top
            .map_or(self.max_top, |pinned| pinned.min(self.max_top));
        self.last_top = top;
        top
    }
}
