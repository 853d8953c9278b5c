//! Splits a flat transcript into display lines.
//!
//! Lines end after any `word` token whose trimmed text ends in `.`, `!` or
//! `?`, or at the end of the transcript. Audio events never reach a line.
//! Spacing tokens are kept so the renderer can reproduce the exact text, but
//! they take no part in boundary detection or line timing.

use crate::transcript::{LyricWord, TokenKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One display line of lyrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// Word and spacing tokens of the line, in transcript order
    pub words: Vec<LyricWord>,
    /// Concatenated token text, trimmed
    pub text: String,
    /// Start of the first `word` token (seconds)
    pub start_time: f64,
    /// End of the last `word` token (seconds)
    pub end_time: f64,
    /// Zero-based position among emitted lines
    pub line_index: usize,
    /// Silence since the previous line ended (seconds, never negative)
    pub gap_before: f64,
}

impl LyricLine {
    /// Line duration in seconds
    #[must_use]
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}

/// Result of segmenting a transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLyrics {
    pub lines: Vec<LyricLine>,
    /// End time of the last transcript token of any kind (seconds)
    pub total_duration: f64,
}

impl ParsedLyrics {
    /// Index of the line active at `time`; see [`crate::sync::current_line_index`]
    #[must_use]
    pub fn current_line_index(&self, time: f64) -> usize {
        crate::sync::current_line_index(&self.lines, time)
    }

    /// The line active at `time`, if there are any lines
    #[must_use]
    pub fn current_line(&self, time: f64) -> Option<&LyricLine> {
        self.lines.get(self.current_line_index(time))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Whether a word closes a sentence (and therefore a line).
///
/// A trailing ellipsis counts since its last character is a `.`.
#[must_use]
pub fn ends_line(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?'])
}

/// Segment transcript tokens into display lines.
///
/// Never fails: empty input yields no lines and a zero total duration.
#[must_use]
pub fn segment(words: &[LyricWord]) -> ParsedLyrics {
    let mut builder = LineBuilder::default();
    let mut buffer: Vec<LyricWord> = Vec::new();

    for word in words {
        if word.kind == TokenKind::AudioEvent {
            continue;
        }

        buffer.push(word.clone());

        if word.is_word() && ends_line(&word.text) {
            builder.finish_line(std::mem::take(&mut buffer));
        }
    }

    // Trailing lyrics without closing punctuation
    if !buffer.is_empty() {
        builder.finish_line(buffer);
    }

    let total_duration = words.last().map_or(0.0, |w| w.end);

    debug!(
        "Segmented {} tokens into {} lines ({:.2}s)",
        words.len(),
        builder.lines.len(),
        total_duration
    );

    ParsedLyrics {
        lines: builder.lines,
        total_duration,
    }
}

/// Accumulates emitted lines and derives per-line timing
#[derive(Default)]
struct LineBuilder {
    lines: Vec<LyricLine>,
}

impl LineBuilder {
    fn finish_line(&mut self, words: Vec<LyricWord>) {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<String>()
            .trim()
            .to_string();

        if text.is_empty() {
            return;
        }

        let mut word_tokens = words.iter().filter(|w| w.is_word());
        let Some(first) = word_tokens.next() else {
            // Only spacing made it into the buffer
            return;
        };
        let start_time = first.start;
        let end_time = word_tokens.last().unwrap_or(first).end;

        let gap_before = self
            .lines
            .last()
            .map_or(0.0, |prev| (start_time - prev.end_time).max(0.0));

        self.lines.push(LyricLine {
            words,
            text,
            start_time,
            end_time,
            line_index: self.lines.len(),
            gap_before,
        });
    }
}
