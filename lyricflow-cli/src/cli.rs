use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Word-synchronized karaoke lyrics from speech-to-text transcripts
#[derive(Debug, Parser)]
#[command(name = "lyricflow", version, about)]
pub struct Cli {
    /// Config file to use instead of ~/.config/lyricflow/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every segmented line with its timing
    Lines {
        /// Transcript JSON file
        file: PathBuf,
        /// Print the segmented lyrics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the lines and highlighted words at a playback time
    At {
        /// Transcript JSON file
        file: PathBuf,
        /// Playback time, as seconds (`83.5`) or `M:SS` (`1:23.5`)
        #[arg(long, short, value_parser = parse_time)]
        time: f64,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow a simulated playback clock through the lyrics
    Play {
        /// Transcript JSON file
        file: PathBuf,
        /// Start position, as seconds or `M:SS`
        #[arg(long, value_parser = parse_time, default_value = "0")]
        from: f64,
        /// Playback speed multiplier
        #[arg(long, value_parser = parse_speed, default_value = "1")]
        speed: f64,
    },
}

/// Parse a playback time given as plain seconds or `M:SS(.fff)`
pub fn parse_time(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let seconds = match s.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes
                .parse()
                .map_err(|_| format!("invalid minutes in '{s}'"))?;
            let seconds: f64 = seconds
                .parse()
                .map_err(|_| format!("invalid seconds in '{s}'"))?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(format!("seconds must be below 60 in '{s}'"));
            }
            f64::from(minutes) * 60.0 + seconds
        }
        None => s.parse().map_err(|_| format!("invalid time '{s}'"))?,
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("time must be a non-negative number, got '{s}'"));
    }
    Ok(seconds)
}

fn parse_speed(s: &str) -> Result<f64, String> {
    let speed: f64 = s.parse().map_err(|_| format!("invalid speed '{s}'"))?;
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(format!("speed must be greater than zero, got '{s}'"))
    }
}
