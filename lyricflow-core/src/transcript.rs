//! Word-level transcript model as produced by a speech-to-text service.
//!
//! A transcript is a flat, time-ordered list of [`LyricWord`] tokens. The
//! surrounding document also carries language detection results and the
//! full transcript text; those are kept for pass-through but are not used
//! when building lyric lines.

use crate::error::Result;
use crate::segment::{segment, ParsedLyrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Kind of a transcribed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Visible lyric text
    Word,
    /// Whitespace or punctuation between words
    Spacing,
    /// Non-lexical annotation such as `[music]`
    AudioEvent,
}

/// A single timed token from the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricWord {
    pub text: String,
    /// Start time in seconds
    #[serde(default, deserialize_with = "zero_if_missing")]
    pub start: f64,
    /// End time in seconds
    #[serde(default, deserialize_with = "zero_if_missing")]
    pub end: f64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

impl LyricWord {
    /// Create a new token
    #[must_use]
    pub fn new(text: impl Into<String>, start: f64, end: f64, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            kind,
        }
    }

    /// Create a `word` token
    #[must_use]
    pub fn word(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(text, start, end, TokenKind::Word)
    }

    /// Create a `spacing` token
    #[must_use]
    pub fn spacing(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(text, start, end, TokenKind::Spacing)
    }

    /// Create an `audio_event` token
    #[must_use]
    pub fn audio_event(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(text, start, end, TokenKind::AudioEvent)
    }

    #[must_use]
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// Transcription services report `null` timings for some tokens.
fn zero_if_missing<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Stored transcript document for one song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    #[serde(default)]
    pub song_id: Option<String>,
    #[serde(default)]
    pub transcribed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub language_probability: Option<f64>,
    #[serde(default)]
    pub text: String,
    pub words: Vec<LyricWord>,
}

impl Transcript {
    /// Build a transcript from tokens alone, with no metadata
    #[must_use]
    pub fn from_words(words: Vec<LyricWord>) -> Self {
        let text = words.iter().map(|w| w.text.as_str()).collect();
        Self {
            text,
            words,
            ..Self::default()
        }
    }

    /// Parse a transcript from JSON.
    ///
    /// Accepts either the full document (`{"songId": ..., "words": [...]}`)
    /// or a bare array of tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid transcript JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        let transcript = if value.is_array() {
            Self::from_words(serde_json::from_value(value)?)
        } else {
            serde_json::from_value(value)?
        };

        debug!(
            "Parsed transcript with {} tokens (language: {:?})",
            transcript.words.len(),
            transcript.language_code
        );
        Ok(transcript)
    }

    /// Read and parse a transcript file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid transcript JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        info!("Loading transcript from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Segment the transcript words into display lines
    #[must_use]
    pub fn parse_lyrics(&self) -> ParsedLyrics {
        segment(&self.words)
    }
}
