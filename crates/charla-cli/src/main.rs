//! charla CLI: Command-line entry point for the charla chat demo

use charla_engine::{program_available, Config, LANGUAGE_PLACEHOLDER};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Chat screen with optional voice input, in the terminal
#[derive(Parser)]
#[command(name = "charla")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: .charla/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat screen (default when no command specified)
    Chat {
        /// Use the voice-input variant
        #[arg(long)]
        voice: bool,
    },

    /// Print configuration and transcriber diagnostics
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init {
        /// Write the voice-input preset
        #[arg(long)]
        voice: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Log file name inside the temp directory.
const LOG_FILE: &str = "charla.log";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config_path = cli
        .config
        .unwrap_or_else(|| Config::default_path(Path::new(".")));

    match cli.command {
        None => cmd_chat(&config_path, false),
        Some(Commands::Chat { voice }) => cmd_chat(&config_path, voice),
        Some(Commands::Doctor { json }) => cmd_doctor(&config_path, json),
        Some(Commands::Init { voice, force }) => cmd_init(&config_path, voice, force),
    }
}

/// Log to a file so the alternate screen stays clean.
fn init_logging(debug: bool) {
    let path = std::env::temp_dir().join(LOG_FILE);
    let Ok(file) = File::create(&path) else {
        return;
    };

    let default_filter = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    tracing::debug!(log = %path.display(), "Logging initialized");
}

fn load_config(path: &Path) -> Config {
    match Config::load_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn cmd_chat(config_path: &Path, voice: bool) {
    let mut config = if voice && !config_path.exists() {
        Config::voice()
    } else {
        load_config(config_path)
    };
    config.voice_input |= voice;

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(charla_tui::run_tui(config)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_doctor(config_path: &Path, json: bool) {
    let exists = config_path.exists();
    let config = load_config(config_path);

    let command = config
        .transcriber
        .as_ref()
        .map(|t| t.command_argv.join(" "));
    let available = config
        .transcriber
        .as_ref()
        .is_some_and(|t| program_available(&t.command_argv));

    if json {
        let report = serde_json::json!({
            "config_path": config_path.display().to_string(),
            "config_exists": exists,
            "voice_input": config.voice_input,
            "language": config.capture.language,
            "transcriber": command,
            "transcriber_available": available,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("charla diagnostics\n");
    let source = if exists { "" } else { " (not found, using defaults)" };
    println!("  Config: {}{source}", config_path.display());
    println!(
        "  Voice input: {}",
        if config.voice_input { "on" } else { "off" }
    );
    println!("  Language: {}", config.capture.language);

    match command {
        Some(command) => {
            let status = if available { "ready" } else { "not found" };
            println!("  Transcriber: {command} - {status}");
        }
        None if config.voice_input => {
            println!("  Transcriber: none (microphone will report unsupported)");
            println!(
                "    Set \"transcriber\": {{\"command_argv\": [\"...\", \"{LANGUAGE_PLACEHOLDER}\"]}}"
            );
        }
        None => println!("  Transcriber: none"),
    }
}

fn cmd_init(config_path: &Path, voice: bool, force: bool) {
    if config_path.exists() && !force {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    let config = if voice {
        Config::voice()
    } else {
        Config::default()
    };

    match config.save(config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }
}
