//! Configuration types for charla.
//!
//! The configuration decides which variant of the chat screen runs (plain or
//! voice), the strings it shows, and how speech capture is performed.

use crate::clock::Clock;
use crate::message::Sender;
use crate::speech::CaptureSettings;
use crate::view::ConversationView;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Directory holding charla's files, relative to the working directory.
pub const CHARLA_DIR: &str = ".charla";

/// Config file name inside [`CHARLA_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Main configuration for charla.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Show the microphone toggle.
    #[serde(default)]
    pub voice_input: bool,

    /// Header title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Opening message from the other party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,

    /// User-facing strings.
    #[serde(default)]
    pub labels: Labels,

    /// Speech capture parameters.
    #[serde(default)]
    pub capture: CaptureSettings,

    /// External transcriber used for voice input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcriber: Option<TranscriberConfig>,
}

fn default_title() -> String {
    "Chat".into()
}

/// Strings shown in the header and composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    /// Header status for the plain variant.
    #[serde(default = "default_status_ready")]
    pub status_ready: String,

    /// Header status while listening.
    #[serde(default = "default_status_listening")]
    pub status_listening: String,

    /// Header status for the voice variant while idle.
    #[serde(default = "default_status_voice_idle")]
    pub status_voice_idle: String,

    /// Composer placeholder for the plain variant.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Composer placeholder for the voice variant.
    #[serde(default = "default_voice_placeholder")]
    pub voice_placeholder: String,

    /// Send control label.
    #[serde(default = "default_send")]
    pub send: String,
}

fn default_status_ready() -> String {
    "Funcionando".into()
}

fn default_status_listening() -> String {
    "Escuchando...".into()
}

fn default_status_voice_idle() -> String {
    "Listo para hablar".into()
}

fn default_placeholder() -> String {
    "Escribe un mensaje…".into()
}

fn default_voice_placeholder() -> String {
    "Escribe un mensaje o usa el micrófono...".into()
}

fn default_send() -> String {
    "Enviar".into()
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            status_ready: default_status_ready(),
            status_listening: default_status_listening(),
            status_voice_idle: default_status_voice_idle(),
            placeholder: default_placeholder(),
            voice_placeholder: default_voice_placeholder(),
            send: default_send(),
        }
    }
}

impl Labels {
    /// Header status for the given variant and listening state.
    pub fn status(&self, voice_input: bool, listening: bool) -> &str {
        match (voice_input, listening) {
            (false, _) => &self.status_ready,
            (true, true) => &self.status_listening,
            (true, false) => &self.status_voice_idle,
        }
    }

    /// Composer placeholder for the given variant.
    pub fn placeholder(&self, voice_input: bool) -> &str {
        if voice_input {
            &self.voice_placeholder
        } else {
            &self.placeholder
        }
    }
}

/// External speech-to-text command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Command and arguments. `{language}` is replaced with the capture language.
    pub command_argv: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            voice_input: false,
            title: default_title(),
            greeting: None,
            labels: Labels::default(),
            capture: CaptureSettings::default(),
            transcriber: None,
        }
    }
}

impl Config {
    /// Preset for the voice-input variant.
    pub fn voice() -> Self {
        Self {
            voice_input: true,
            title: "Chat con Voz".into(),
            greeting: Some("¡Hola! Puedes usar el micrófono para hablar conmigo".into()),
            ..Self::default()
        }
    }

    /// Default config file location under `root`.
    pub fn default_path(root: &Path) -> std::path::PathBuf {
        root.join(CHARLA_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Header status for the given listening state.
    pub fn status(&self, listening: bool) -> &str {
        self.labels.status(self.voice_input, listening)
    }

    /// Composer placeholder.
    pub fn placeholder(&self) -> &str {
        self.labels.placeholder(self.voice_input)
    }

    /// Build a view seeded with the greeting. Voice wiring is left to the host.
    pub fn build_view(&self, clock: impl Clock + 'static) -> ConversationView {
        ConversationView::new().with_clock(clock).with_history(
            self.greeting
                .iter()
                .map(|text| (Sender::Other, text.as_str())),
        )
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.voice_input);
        assert_eq!(config.title, "Chat");
        assert_eq!(config.status(false), "Funcionando");
        assert_eq!(config.placeholder(), "Escribe un mensaje…");
        assert!(config.transcriber.is_none());
    }

    #[test]
    fn test_voice_preset() {
        let config = Config::voice();
        assert!(config.voice_input);
        assert_eq!(config.status(false), "Listo para hablar");
        assert_eq!(config.status(true), "Escuchando...");
        assert_eq!(
            config.placeholder(),
            "Escribe un mensaje o usa el micrófono..."
        );
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"voice_input": true, "labels": {"send": "Send"}, "capture": {"language": "en-US"}}"#,
        )
        .unwrap();
        assert!(config.voice_input);
        assert_eq!(config.title, "Chat");
        assert_eq!(config.labels.send, "Send");
        assert_eq!(config.labels.status_listening, "Escuchando...");
        assert_eq!(config.capture.language, "en-US");
        assert!(config.capture.interim_results);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::default_path(dir.path());
        let mut config = Config::voice();
        config.transcriber = Some(TranscriberConfig {
            command_argv: vec!["whisper-stream".into(), "--lang".into(), "{language}".into()],
        });

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_build_view_seeds_greeting() {
        let view = Config::voice().build_view(FixedClock::at(9, 0));
        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].sender(), Sender::Other);
        assert_eq!(view.messages()[0].timestamp(), "9:00 AM");

        assert!(Config::default()
            .build_view(FixedClock::at(9, 0))
            .messages()
            .is_empty());
    }
}
