//! Host-neutral key events and Enter detection.

use crate::message::MessageId;

/// Legacy key code reported for Enter.
const ENTER_KEY_CODE: u32 = 13;

/// Key names treated as Enter (compared case-insensitively).
const ENTER_NAMES: [&str; 2] = ["enter", "numpadenter"];

/// A key-down event as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInput {
    /// Logical key name (e.g. `"Enter"`, `"a"`).
    pub key: Option<String>,
    /// Physical key code name (e.g. `"NumpadEnter"`).
    pub code: Option<String>,
    /// Legacy numeric key code.
    pub key_code: Option<u32>,
    /// Whether Shift was held.
    pub shift: bool,
    /// Whether the event is part of an input-method composition.
    pub is_composing: bool,
}

impl KeyInput {
    /// A plain Enter press.
    pub fn enter() -> Self {
        Self {
            key: Some("Enter".into()),
            code: Some("Enter".into()),
            key_code: Some(ENTER_KEY_CODE),
            ..Self::default()
        }
    }

    /// A key press identified only by its logical name.
    pub fn named(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Set the Shift modifier.
    #[must_use]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Mark the event as part of an IME composition.
    #[must_use]
    pub fn composing(mut self, is_composing: bool) -> Self {
        self.is_composing = is_composing;
        self
    }

    /// Whether this key is Enter, ignoring modifiers.
    ///
    /// Uses the key name, falling back to the code name when the key name is
    /// missing or empty, then the legacy key code.
    pub fn is_enter(&self) -> bool {
        let name = self
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or(self.code.as_deref())
            .unwrap_or_default()
            .to_lowercase();

        ENTER_NAMES.contains(&name.as_str()) || self.key_code == Some(ENTER_KEY_CODE)
    }

    /// Whether this event should submit the draft.
    pub fn is_submit(&self) -> bool {
        !self.is_composing && self.is_enter() && !self.shift
    }
}

/// What the view did with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a submit key; the host handles it normally.
    Ignored,
    /// Dropped because an IME composition is in progress.
    Composing,
    /// Enter was pressed: the default action is suppressed and a send was
    /// attempted. Holds the new message id if the send produced one.
    Submitted(Option<MessageId>),
}

impl KeyOutcome {
    /// Whether the host must suppress the key's default behavior.
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    /// The id of the message created by this key press, if any.
    pub fn sent(self) -> Option<MessageId> {
        match self {
            Self::Submitted(id) => id,
            _ => None,
        }
    }
}
