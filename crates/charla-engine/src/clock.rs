//! Wall-clock access and display formatting for message timestamps.

use chrono::{Local, NaiveTime};

/// Source of the current local time.
///
/// Injected into [`ConversationView`](crate::ConversationView) so tests can
/// pin timestamps.
pub trait Clock {
    /// Current local time of day.
    fn now(&self) -> NaiveTime;
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock that always reports the same time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    /// Create a fixed clock at `hour:minute`. Out-of-range values fall back to midnight.
    pub fn at(hour: u32, minute: u32) -> Self {
        Self(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Format a time as a 12-hour clock without a leading zero (e.g. `1:05 PM`).
pub fn format_timestamp(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
