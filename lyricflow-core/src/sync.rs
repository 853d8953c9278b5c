//! Playback-time queries over segmented lyrics.
//!
//! Everything here is a pure function of the lyrics and a playback time in
//! seconds, cheap enough to call on every position update.

use crate::config::DisplayConfig;
use crate::segment::LyricLine;
use crate::transcript::{LyricWord, TokenKind};

/// Find the index of the line active at `time`.
///
/// Returns the last line whose start time has been reached, or 0 when no
/// line has started yet. Also returns 0 for an empty slice, so callers must
/// check for emptiness before indexing.
#[must_use]
pub fn current_line_index(lines: &[LyricLine], time: f64) -> usize {
    lines
        .iter()
        .rposition(|line| line.start_time <= time)
        .unwrap_or(0)
}

/// Whether a word has started at `time`.
///
/// This is one-sided: a word stays active after its end time has passed.
#[must_use]
pub fn is_word_active(word: &LyricWord, time: f64) -> bool {
    time >= word.start
}

/// Seek position for a clicked word
#[must_use]
pub const fn seek_target(word: &LyricWord) -> f64 {
    word.start
}

/// Position of a line relative to the current line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Past,
    Current,
    Upcoming,
}

impl LineState {
    /// Classify `line_index` against the current line index
    #[must_use]
    pub fn of(line_index: usize, current_index: usize) -> Self {
        match line_index.cmp(&current_index) {
            std::cmp::Ordering::Less => Self::Past,
            std::cmp::Ordering::Equal => Self::Current,
            std::cmp::Ordering::Greater => Self::Upcoming,
        }
    }
}

/// Whether a token should be drawn highlighted.
///
/// Spacing is never highlighted. Words on past lines always are; words on
/// the current line are once they become active.
#[must_use]
pub fn should_highlight(word: &LyricWord, state: LineState, time: f64) -> bool {
    if word.kind != TokenKind::Word {
        return false;
    }
    match state {
        LineState::Past => true,
        LineState::Current => is_word_active(word, time),
        LineState::Upcoming => false,
    }
}

/// Opacity for a line `distance` lines away from the current one
#[must_use]
pub fn line_opacity(distance: usize, config: &DisplayConfig) -> f64 {
    if distance == 0 {
        return 1.0;
    }
    let distance = u32::try_from(distance).map_or(f64::from(u32::MAX), f64::from);
    (1.0 - distance * config.opacity_step).max(config.min_opacity)
}

/// Whether the silence before a line is long enough to warrant extra spacing
#[must_use]
pub fn has_large_gap(line: &LyricLine, config: &DisplayConfig) -> bool {
    line.gap_before >= config.large_gap_secs
}

/// Fraction of the line's span that has elapsed at `time`, clamped to 0..=1
#[must_use]
pub fn line_progress(line: &LyricLine, time: f64) -> f64 {
    if time < line.start_time {
        return 0.0;
    }
    let duration = line.duration();
    if duration <= 0.0 {
        return 1.0;
    }
    ((time - line.start_time) / duration).clamp(0.0, 1.0)
}

/// Lines around the one active at `time`
#[must_use]
pub fn visible_lines(lines: &[LyricLine], time: f64, before: usize, after: usize) -> &[LyricLine] {
    let current_idx = current_line_index(lines, time);

    let start = current_idx.saturating_sub(before);
    let end = current_idx.saturating_add(after).saturating_add(1).min(lines.len());

    lines.get(start..end).unwrap_or_default()
}
