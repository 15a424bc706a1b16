//! Speech-capture capability.
//!
//! The conversation view never records audio itself. It calls into a
//! [`SpeechCapture`] implementation to start and stop a capture session and
//! receives [`CaptureEvent`]s on a separate channel owned by the host.
//!
//! [`CommandCapture`] runs an external transcriber process and translates its
//! stdout into events. The transcriber prints one line per update:
//!
//! ```text
//! partial: hola que       interim hypothesis
//! final: hola qué tal     committed result (a bare line is also final)
//! error: not-allowed      capture error code
//! ```

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Error code reported when the user denied microphone access.
pub const PERMISSION_DENIED_CODE: &str = "not-allowed";

/// Error code reported when the transcriber exits abnormally without saying why.
pub const AUDIO_CAPTURE_CODE: &str = "audio-capture";

/// Placeholder substituted with the capture language in transcriber arguments.
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Parameters of a capture session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// BCP 47 language tag.
    #[serde(default = "default_language")]
    pub language: String,

    /// Keep listening after the first final result.
    #[serde(default)]
    pub continuous: bool,

    /// Deliver interim (non-final) hypotheses.
    #[serde(default = "default_interim_results")]
    pub interim_results: bool,
}

fn default_language() -> String {
    "es-ES".into()
}

fn default_interim_results() -> bool {
    true
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            continuous: false,
            interim_results: default_interim_results(),
        }
    }
}

/// Notification from an active capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Transcript so far.
    Result { transcript: String, is_final: bool },
    /// Capture failed with the given code. [`CaptureEvent::End`] follows.
    Error { code: String },
    /// The session is over, for whatever reason.
    End,
}

/// A [`CaptureEvent`] tagged with the session that produced it.
///
/// Events can still be queued on the host's channel after their session was
/// replaced, so receivers check the tag with [`SpeechCapture::is_current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: u64,
    pub event: CaptureEvent,
}

/// Errors returned synchronously when a capture cannot start.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No speech capability is available on this host.
    #[error("speech capture is not supported: {0}")]
    Unsupported(String),

    /// Access to the microphone was denied.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// The transcriber process could not be started.
    #[error("failed to start transcriber: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A speech-to-text capability the view can drive.
pub trait SpeechCapture {
    /// Begin a capture session. Events for the session are delivered out of band.
    fn start(&mut self, settings: &CaptureSettings) -> Result<(), CaptureError>;

    /// Ask the current session to stop. The session still reports
    /// [`CaptureEvent::End`] when it winds down.
    fn stop(&mut self);

    /// Whether events tagged with `session` belong to the latest session.
    fn is_current(&self, _session: u64) -> bool {
        true
    }
}

/// Capability for hosts without any transcriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedCapture;

impl SpeechCapture for UnsupportedCapture {
    fn start(&mut self, _settings: &CaptureSettings) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported("no transcriber configured".into()))
    }

    fn stop(&mut self) {}
}

/// One parsed line of transcriber output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriberLine {
    Partial(String),
    Final(String),
    Error(String),
}

impl TranscriberLine {
    /// Parse a stdout line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(rest) = line.strip_prefix("partial:") {
            return Some(Self::Partial(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("final:") {
            return Some(Self::Final(rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("error:") {
            return Some(Self::Error(rest.trim().to_string()));
        }
        Some(Self::Final(line.to_string()))
    }
}

/// Folds transcriber lines into the transcript the view should show.
///
/// Final results accumulate; the delivered transcript is everything committed
/// so far followed by the latest interim hypothesis.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAssembler {
    committed: String,
    interim_results: bool,
}

impl TranscriptAssembler {
    /// Create an assembler.
    pub fn new(interim_results: bool) -> Self {
        Self {
            committed: String::new(),
            interim_results,
        }
    }

    /// Apply a line, returning the event to emit (if any).
    pub fn feed(&mut self, line: TranscriberLine) -> Option<CaptureEvent> {
        match line {
            TranscriberLine::Partial(text) => {
                if !self.interim_results {
                    return None;
                }
                Some(CaptureEvent::Result {
                    transcript: join_words(&self.committed, &text),
                    is_final: false,
                })
            }
            TranscriberLine::Final(text) => {
                self.committed = join_words(&self.committed, &text);
                Some(CaptureEvent::Result {
                    transcript: self.committed.clone(),
                    is_final: true,
                })
            }
            TranscriberLine::Error(code) => Some(CaptureEvent::Error { code }),
        }
    }
}

fn join_words(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (false, true) => head.to_string(),
        (false, false) => format!("{head} {tail}"),
    }
}

/// Handle for stopping a running session.
#[derive(Debug)]
struct SessionHandle {
    stop_tx: mpsc::Sender<()>,
}

/// Speech capture backed by an external transcriber command.
#[derive(Debug)]
pub struct CommandCapture {
    command_argv: Vec<String>,
    events: mpsc::UnboundedSender<SessionEvent>,
    current_session: Arc<AtomicU64>,
    active: Option<SessionHandle>,
}

impl CommandCapture {
    /// Create a capture that runs `command_argv` and reports on `events`.
    pub fn new(command_argv: Vec<String>, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            command_argv,
            events,
            current_session: Arc::new(AtomicU64::new(0)),
            active: None,
        }
    }

    fn build_command(&self, settings: &CaptureSettings) -> Result<Command, CaptureError> {
        let Some(program) = self.command_argv.first() else {
            return Err(CaptureError::Unsupported("transcriber command is empty".into()));
        };
        let path = which::which(program)
            .map_err(|e| CaptureError::Unsupported(format!("{program}: {e}")))?;

        let mut cmd = Command::new(path);
        for arg in &self.command_argv[1..] {
            cmd.arg(arg.replace(LANGUAGE_PLACEHOLDER, &settings.language));
        }
        cmd.env("CHARLA_LANGUAGE", &settings.language)
            .env("CHARLA_CONTINUOUS", settings.continuous.to_string())
            .env("CHARLA_INTERIM_RESULTS", settings.interim_results.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

/// Whether the program named by `command_argv` can be found on `PATH`.
pub fn program_available(command_argv: &[String]) -> bool {
    command_argv
        .first()
        .is_some_and(|program| which::which(program).is_ok())
}

impl SpeechCapture for CommandCapture {
    fn start(&mut self, settings: &CaptureSettings) -> Result<(), CaptureError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CaptureError::Spawn(std::io::Error::other(e)))?;
        let mut cmd = self.build_command(settings)?;

        // Supersede any previous session before its events can race ours.
        self.stop();
        let session = self.current_session.fetch_add(1, Ordering::SeqCst) + 1;

        let _guard = runtime.enter();
        // Microphone refusals arrive as `error:` lines, never as spawn failures.
        let mut child = cmd.spawn().map_err(CaptureError::Spawn)?;
        let Some(stdout) = child.stdout.take() else {
            return Err(CaptureError::Spawn(std::io::Error::other(
                "transcriber stdout not captured",
            )));
        };

        let (stop_tx, stop_rx) = mpsc::channel(1);
        let sink = SessionSink {
            events: self.events.clone(),
            current_session: Arc::clone(&self.current_session),
            session,
        };
        info!(session, language = %settings.language, "Starting speech capture");
        runtime.spawn(run_session(child, stdout, settings.clone(), sink, stop_rx));
        self.active = Some(SessionHandle { stop_tx });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            debug!("Stopping speech capture");
            let _ = handle.stop_tx.try_send(());
        }
    }

    fn is_current(&self, session: u64) -> bool {
        self.current_session.load(Ordering::SeqCst) == session
    }
}

/// Forwards events for one session, dropping them once the session is superseded.
struct SessionSink {
    events: mpsc::UnboundedSender<SessionEvent>,
    current_session: Arc<AtomicU64>,
    session: u64,
}

impl SessionSink {
    fn emit(&self, event: CaptureEvent) {
        if self.current_session.load(Ordering::SeqCst) == self.session {
            let _ = self.events.send(SessionEvent {
                session: self.session,
                event,
            });
        } else {
            debug!(session = self.session, ?event, "Dropping event from superseded session");
        }
    }
}

async fn run_session(
    mut child: Child,
    stdout: ChildStdout,
    settings: CaptureSettings,
    sink: SessionSink,
    mut stop_rx: mpsc::Receiver<()>,
) {
    let mut lines = BufReader::new(stdout).lines();
    let mut assembler = TranscriptAssembler::new(settings.interim_results);
    let mut reported_error = false;
    let mut stopped = false;

    loop {
        tokio::select! {
            _ = stop_rx.recv() => {
                stopped = true;
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let Some(parsed) = TranscriberLine::parse(&line) else {
                        continue;
                    };
                    let is_final = matches!(parsed, TranscriberLine::Final(_));
                    reported_error |= matches!(parsed, TranscriberLine::Error(_));
                    if let Some(event) = assembler.feed(parsed) {
                        sink.emit(event);
                    }
                    if is_final && !settings.continuous {
                        stopped = true;
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read transcriber output");
                    break;
                }
            }
        }
    }

    if stopped {
        let _ = child.start_kill();
    }
    match child.wait().await {
        Ok(status) if !stopped && !reported_error && !status.success() => {
            warn!(%status, "Transcriber exited abnormally");
            sink.emit(CaptureEvent::Error {
                code: AUDIO_CAPTURE_CODE.into(),
            });
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to wait for transcriber"),
    }
    info!(session = sink.session, "Speech capture ended");
    sink.emit(CaptureEvent::End);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_settings() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.language, "es-ES");
        assert!(!settings.continuous);
        assert!(settings.interim_results);
    }

    #[test]
    fn test_settings_fill_missing_fields() {
        let settings: CaptureSettings = serde_json::from_str(r#"{"continuous":true}"#).unwrap();
        assert!(settings.continuous);
        assert_eq!(settings.language, "es-ES");
        assert!(settings.interim_results);
    }

    #[test]
    fn test_unsupported_capture_always_fails() {
        let mut capture = UnsupportedCapture;
        let result = capture.start(&CaptureSettings::default());
        assert!(matches!(result, Err(CaptureError::Unsupported(_))));
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            TranscriberLine::parse("partial: hola"),
            Some(TranscriberLine::Partial("hola".into()))
        );
        assert_eq!(
            TranscriberLine::parse("final:  hola mundo "),
            Some(TranscriberLine::Final("hola mundo".into()))
        );
        assert_eq!(
            TranscriberLine::parse("error: not-allowed"),
            Some(TranscriberLine::Error("not-allowed".into()))
        );
        assert_eq!(
            TranscriberLine::parse("sin prefijo"),
            Some(TranscriberLine::Final("sin prefijo".into()))
        );
        assert_eq!(TranscriberLine::parse("   "), None);
    }

    #[test]
    fn test_assembler_accumulates_finals() {
        let mut assembler = TranscriptAssembler::new(true);
        assert_eq!(
            assembler.feed(TranscriberLine::Partial("hola".into())),
            Some(CaptureEvent::Result {
                transcript: "hola".into(),
                is_final: false
            })
        );
        assembler.feed(TranscriberLine::Final("hola".into()));
        assert_eq!(
            assembler.feed(TranscriberLine::Partial("qué".into())),
            Some(CaptureEvent::Result {
                transcript: "hola qué".into(),
                is_final: false
            })
        );
        assert_eq!(
            assembler.feed(TranscriberLine::Final("qué tal".into())),
            Some(CaptureEvent::Result {
                transcript: "hola qué tal".into(),
                is_final: true
            })
        );
    }

    #[test]
    fn test_assembler_drops_partials_without_interim_results() {
        let mut assembler = TranscriptAssembler::new(false);
        assert_eq!(assembler.feed(TranscriberLine::Partial("ho".into())), None);
        assert_eq!(
            assembler.feed(TranscriberLine::Error("network".into())),
            Some(CaptureEvent::Error {
                code: "network".into()
            })
        );
    }

    async fn next_tagged(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for capture event")
            .expect("event channel closed")
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> CaptureEvent {
        next_tagged(rx).await.event
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    #[test]
    fn test_missing_transcriber_is_unsupported() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(vec!["charla-no-such-transcriber".into()], tx);
        assert!(!program_available(&capture.command_argv));

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let result = capture.start(&CaptureSettings::default());
        assert!(matches!(result, Err(CaptureError::Unsupported(_))));
    }

    #[test]
    fn test_empty_command_is_unsupported() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(Vec::new(), tx);
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        assert!(matches!(
            capture.start(&CaptureSettings::default()),
            Err(CaptureError::Unsupported(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_single_utterance_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(sh("echo 'partial: ho'; echo 'final: hola'"), tx);
        capture.start(&CaptureSettings::default()).unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            CaptureEvent::Result {
                transcript: "ho".into(),
                is_final: false
            }
        );
        assert_eq!(
            next_event(&mut rx).await,
            CaptureEvent::Result {
                transcript: "hola".into(),
                is_final: true
            }
        );
        assert_eq!(next_event(&mut rx).await, CaptureEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_language_is_passed_to_transcriber() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut argv = sh("echo \"final: $0 $CHARLA_LANGUAGE\"");
        argv.push(LANGUAGE_PLACEHOLDER.into());
        let mut capture = CommandCapture::new(argv, tx);
        let settings = CaptureSettings {
            language: "en-US".into(),
            ..CaptureSettings::default()
        };
        capture.start(&settings).unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            CaptureEvent::Result {
                transcript: "en-US en-US".into(),
                is_final: true
            }
        );
        assert_eq!(next_event(&mut rx).await, CaptureEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_error_line_is_reported_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(sh("echo 'error: not-allowed'; exit 1"), tx);
        capture.start(&CaptureSettings::default()).unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            CaptureEvent::Error {
                code: PERMISSION_DENIED_CODE.into()
            }
        );
        assert_eq!(next_event(&mut rx).await, CaptureEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_abnormal_exit_reports_audio_capture_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(sh("exit 3"), tx);
        capture.start(&CaptureSettings::default()).unwrap();

        assert_eq!(
            next_event(&mut rx).await,
            CaptureEvent::Error {
                code: AUDIO_CAPTURE_CODE.into()
            }
        );
        assert_eq!(next_event(&mut rx).await, CaptureEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_ends_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(sh("sleep 30"), tx);
        capture.start(&CaptureSettings::default()).unwrap();
        capture.stop();

        assert_eq!(next_event(&mut rx).await, CaptureEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_restart_drops_superseded_session_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(sh("sleep 30"), tx);
        capture.start(&CaptureSettings::default()).unwrap();
        capture.start(&CaptureSettings::default()).unwrap();
        capture.stop();

        assert_eq!(next_event(&mut rx).await, CaptureEvent::End);
        let extra = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(extra.is_err(), "superseded session leaked {extra:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_end_queued_before_restart_is_not_current() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(sh("sleep 30"), tx);
        capture.start(&CaptureSettings::default()).unwrap();
        capture.stop();

        // Wait until the first session's End is sitting in the channel.
        tokio::time::sleep(Duration::from_millis(300)).await;
        capture.start(&CaptureSettings::default()).unwrap();

        let queued = next_tagged(&mut rx).await;
        assert_eq!(queued.event, CaptureEvent::End);
        assert!(!capture.is_current(queued.session));
        assert!(capture.is_current(queued.session + 1));
        capture.stop();
    }

    #[test]
    fn test_unsupported_capture_accepts_any_session() {
        assert!(UnsupportedCapture.is_current(7));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_continuous_session_keeps_listening() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut capture = CommandCapture::new(sh("echo 'final: uno'; echo 'final: dos'"), tx);
        let settings = CaptureSettings {
            continuous: true,
            interim_results: false,
            ..CaptureSettings::default()
        };
        capture.start(&settings).unwrap();

        next_event(&mut rx).await;
        assert_eq!(
            next_event(&mut rx).await,
            CaptureEvent::Result {
                transcript: "uno dos".into(),
                is_final: true
            }
        );
        assert_eq!(next_event(&mut rx).await, CaptureEvent::End);
    }
}
