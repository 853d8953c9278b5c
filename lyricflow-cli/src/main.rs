mod cli;
mod player;
mod render;

use crate::cli::{Cli, Command};
use crate::player::PlayOptions;
use crate::render::{render_line_list, render_view, LyricsView};
use clap::Parser;
use lyricflow_core::{CoreError, LyricflowConfig, ParsedLyrics, Transcript};
use serde::Serialize;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let Cli { config, command } = Cli::parse();
    let config_path = config.unwrap_or_else(LyricflowConfig::config_path);

    // Check config for logging.enabled before full config load
    init_tracing(check_file_logging_enabled(&config_path));

    let config = match LyricflowConfig::load_or_create_at(&config_path) {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            info!(
                "Created config template at {}, using defaults",
                path.display()
            );
            LyricflowConfig::default()
        }
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let color = std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout().lock();

    match run(command, &config, &mut stdout, color) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run<W: Write>(
    command: Command,
    config: &LyricflowConfig,
    out: &mut W,
    color: bool,
) -> Result<(), CoreError> {
    match command {
        Command::Lines { file, json } => {
            let lyrics = load_lyrics(&file)?;
            if json {
                writeln!(out, "{}", to_json(&lyrics)?)?;
            } else {
                write!(out, "{}", render_line_list(&lyrics, &config.display))?;
            }
        }
        Command::At { file, time, json } => {
            let lyrics = load_lyrics(&file)?;
            let view = LyricsView::at(&lyrics, time, &config.display);
            if json {
                writeln!(out, "{}", to_json(&view)?)?;
            } else {
                write!(out, "{}", render_view(&view, color))?;
            }
        }
        Command::Play { file, from, speed } => {
            let lyrics = load_lyrics(&file)?;
            let options = PlayOptions {
                from,
                speed,
                tick: Duration::from_millis(config.playback.tick_ms),
            };
            start_playback(&lyrics, options, config, out)?;
        }
    }

    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CoreError> {
    serde_json::to_string_pretty(value).map_err(CoreError::OutputSerialize)
}

fn load_lyrics(path: &Path) -> Result<ParsedLyrics, CoreError> {
    let transcript = Transcript::from_path(path)?;
    let lyrics = transcript.parse_lyrics();

    if lyrics.is_empty() {
        warn!("Transcript {} produced no lyric lines", path.display());
    } else {
        info!(
            "Loaded {} lines ({} tokens) from {}",
            lyrics.lines.len(),
            transcript.words.len(),
            path.display()
        );
    }
    Ok(lyrics)
}

/// Run the playback loop until the lyrics end or Ctrl+C is pressed
fn start_playback<W: Write>(
    lyrics: &ParsedLyrics,
    options: PlayOptions,
    config: &LyricflowConfig,
    out: &mut W,
) -> Result<(), CoreError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    // Set up Ctrl+C handler to trigger graceful shutdown
    let cancel_token = CancellationToken::new();
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, stopping playback...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    runtime.block_on(player::play(
        lyrics,
        options,
        &config.display,
        cancel_token,
        out,
    ))?;
    Ok(())
}

fn check_file_logging_enabled(config_path: &Path) -> bool {
    // Minimal structs to parse just the logging.enabled field
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let Ok(content) = std::fs::read_to_string(config_path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with stderr output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = lyricflow_core::paths::log_file_path();

        // Create cache directory if needed
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = include_str!("../../demos/sample_transcript.json");

    fn sample_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("sample.json");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    fn run_to_string(command: Command) -> String {
        let mut out = Vec::new();
        run(command, &LyricflowConfig::default(), &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_load_lyrics() {
        let dir = tempfile::tempdir().unwrap();
        let lyrics = load_lyrics(&sample_file(&dir)).unwrap();
        assert_eq!(lyrics.lines.len(), 4);

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_lyrics(&missing), Err(CoreError::IoError(_))));
    }

    #[test]
    fn test_load_lyrics_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_lyrics(&path),
            Err(CoreError::TranscriptParse(_))
        ));
    }

    #[test]
    fn test_run_lines_json() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_to_string(Command::Lines {
            file: sample_file(&dir),
            json: true,
        });

        let parsed: ParsedLyrics = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.lines.len(), 4);
        assert_eq!(parsed.lines[0].text, "City lights are calling me.");
        assert_eq!(parsed.total_duration, 20.4);
    }

    #[test]
    fn test_run_lines_plain() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_to_string(Command::Lines {
            file: sample_file(&dir),
            json: false,
        });

        assert!(output.starts_with("[0:"));
        assert!(output.contains("We run until the morning..."));
        assert!(output.ends_with("4 lines, 0:20\n"));
    }

    #[test]
    fn test_run_at_renders_current_line() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_to_string(Command::At {
            file: sample_file(&dir),
            time: 16.5,
            json: false,
        });

        assert!(output.starts_with("0:16 / 0:20\n"));
        assert!(output.contains("\n\n> *We*"));
    }

    #[test]
    fn test_run_at_json() {
        let dir = tempfile::tempdir().unwrap();
        let output = run_to_string(Command::At {
            file: sample_file(&dir),
            time: 16.5,
            json: true,
        });

        let view: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(view["currentIndex"], 2);
        assert_eq!(view["lines"][1]["state"], "current");
    }

    #[test]
    fn test_output_serialize_error_message() {
        // JSON object keys must be strings
        let value = std::collections::BTreeMap::from([(vec![1u8], 1u8)]);
        let err = to_json(&value).unwrap_err();
        assert!(matches!(err, CoreError::OutputSerialize(_)));
        assert!(err.to_string().starts_with("Failed to serialize output"));
    }
}
