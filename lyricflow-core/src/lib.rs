pub mod config;
pub mod error;
pub mod paths;
pub mod segment;
pub mod sync;
pub mod time;
pub mod transcript;

pub use config::{
    DisplayConfig, LoggingConfig, LyricflowConfig, PlaybackConfig, CONFIG_TEMPLATE,
};
pub use error::CoreError;
pub use paths::{config_dir, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME};
pub use segment::{ends_line, segment, LyricLine, ParsedLyrics};
pub use sync::{
    current_line_index, has_large_gap, is_word_active, line_opacity, line_progress, seek_target,
    should_highlight, visible_lines, LineState,
};
pub use time::{format_time, seconds_to_duration, DurationExt};
pub use transcript::{LyricWord, TokenKind, Transcript};
