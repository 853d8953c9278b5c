//! Terminal rendering of segmented lyrics.
//!
//! [`LyricsView`] captures every per-line and per-word decision for a
//! playback time; the text renderers only turn that into strings.

use lyricflow_core::{
    format_time, has_large_gap, line_opacity, line_progress, seconds_to_duration, seek_target,
    should_highlight, visible_lines, DisplayConfig, DurationExt, LineState, LyricLine,
    ParsedLyrics, TokenKind,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt::Write as _;

/// Lines below this opacity are drawn dimmed
const DIM_OPACITY: f64 = 0.6;

/// Snapshot of the lyrics display at one playback time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsView {
    pub time: f64,
    pub total_duration: f64,
    pub current_index: usize,
    pub lines: Vec<LineView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub line_index: usize,
    pub state: ViewState,
    pub opacity: f64,
    pub large_gap: bool,
    /// Fraction of the line's duration already sung
    pub progress: f64,
    pub segments: Vec<WordView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordView {
    pub text: String,
    pub highlighted: bool,
    /// Seek target for the word, absent for spacing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seek_ms: Option<u64>,
}

/// Serializable mirror of [`LineState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Past,
    Current,
    Upcoming,
}

impl From<LineState> for ViewState {
    fn from(state: LineState) -> Self {
        match state {
            LineState::Past => Self::Past,
            LineState::Current => Self::Current,
            LineState::Upcoming => Self::Upcoming,
        }
    }
}

impl LyricsView {
    /// Build the view of the lines around `time`
    #[must_use]
    pub fn at(lyrics: &ParsedLyrics, time: f64, config: &DisplayConfig) -> Self {
        let current_index = lyrics.current_line_index(time);
        let lines = visible_lines(&lyrics.lines, time, config.lines_before, config.lines_after)
            .iter()
            .map(|line| LineView::new(line, current_index, time, config))
            .collect();

        Self {
            time,
            total_duration: lyrics.total_duration,
            current_index,
            lines,
        }
    }
}

impl LineView {
    fn new(line: &LyricLine, current_index: usize, time: f64, config: &DisplayConfig) -> Self {
        let state = LineState::of(line.line_index, current_index);
        let segments = line
            .words
            .iter()
            .map(|word| WordView {
                text: word.text.clone(),
                highlighted: should_highlight(word, state, time),
                seek_ms: (word.kind == TokenKind::Word)
                    .then(|| seconds_to_duration(seek_target(word)).as_millis_u64()),
            })
            .collect();

        Self {
            line_index: line.line_index,
            state: state.into(),
            opacity: line_opacity(line.line_index.abs_diff(current_index), config),
            large_gap: has_large_gap(line, config),
            progress: line_progress(line, time),
            segments,
        }
    }

    /// Line text without styling, trimmed like the segmented line
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

/// Render the view for a terminal.
///
/// The current line is marked with `>`. With `color`, highlighted words are
/// bold and faded lines dimmed; without it, highlighted words on the current
/// line are wrapped in `*`.
#[must_use]
pub fn render_view(view: &LyricsView, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} / {}",
        format_time(view.time),
        format_time(view.total_duration)
    );

    if view.lines.is_empty() {
        out.push_str("(no lyrics)\n");
        return out;
    }

    for line in &view.lines {
        if line.large_gap {
            out.push('\n');
        }

        let is_current = line.state == ViewState::Current;
        out.push_str(if is_current { "> " } else { "  " });

        if is_current {
            let text: String = line
                .segments
                .iter()
                .map(|segment| render_segment(segment, color))
                .collect();
            out.push_str(text.trim());
        } else if color && line.opacity < DIM_OPACITY {
            let _ = write!(out, "{}", line.plain_text().dimmed());
        } else {
            out.push_str(&line.plain_text());
        }
        out.push('\n');
    }

    out
}

fn render_segment(segment: &WordView, color: bool) -> String {
    if !segment.highlighted {
        return segment.text.clone();
    }
    if color {
        segment.text.bold().to_string()
    } else {
        format!("*{}*", segment.text)
    }
}

/// Render every line with its start time, blank lines marking long silences
#[must_use]
pub fn render_line_list(lyrics: &ParsedLyrics, config: &DisplayConfig) -> String {
    let mut out = String::new();

    for line in &lyrics.lines {
        if has_large_gap(line, config) {
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "[{}] {:>3}  {}",
            format_time(line.start_time),
            line.line_index,
            line.text
        );
    }

    let _ = writeln!(
        out,
        "{} lines, {}",
        lyrics.lines.len(),
        format_time(lyrics.total_duration)
    );
    out
}
