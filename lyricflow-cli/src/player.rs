//! Simulated playback: follow the lyrics against a monotonic clock.

use lyricflow_core::{
    format_time, has_large_gap, DisplayConfig, DurationExt, LyricLine, ParsedLyrics,
};
use std::io::Write;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Playback position derived from elapsed wall time
#[derive(Debug, Clone, Copy)]
pub struct PlaybackClock {
    origin: Instant,
    from: f64,
    speed: f64,
}

impl PlaybackClock {
    #[must_use]
    pub const fn new(origin: Instant, from: f64, speed: f64) -> Self {
        Self {
            origin,
            from,
            speed,
        }
    }

    /// Wall time elapsed since the clock started
    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.origin)
    }

    /// Playback position in seconds at `now`
    #[must_use]
    pub fn position_at(&self, now: Instant) -> f64 {
        self.from + self.elapsed_at(now).as_secs_f64() * self.speed
    }
}

/// Reports each line once, when playback first reaches it
#[derive(Debug, Default)]
pub struct LineTracker {
    /// Index of the first line not yet reported
    next: usize,
}

impl LineTracker {
    /// Start tracking at `from`, skipping lines that finished before it
    #[must_use]
    pub fn starting_at(lyrics: &ParsedLyrics, from: f64) -> Self {
        Self {
            next: lyrics.current_line_index(from),
        }
    }

    /// Lines reached since the last call, in order.
    ///
    /// Several lines come back at once when they all started within one
    /// clock tick.
    pub fn advance<'a>(&mut self, lyrics: &'a ParsedLyrics, time: f64) -> &'a [LyricLine] {
        let Some(line) = lyrics.current_line(time) else {
            return &[];
        };

        // Before the first line starts the index is 0 but nothing is sung yet
        if line.start_time > time || line.line_index < self.next {
            return &[];
        }

        let reached = self.next..=line.line_index;
        self.next = line.line_index + 1;
        lyrics.lines.get(reached).unwrap_or_default()
    }
}

/// Playback parameters for [`play`]
#[derive(Debug, Clone, Copy)]
pub struct PlayOptions {
    /// Start position in seconds
    pub from: f64,
    /// Clock speed multiplier
    pub speed: f64,
    /// Interval between clock ticks
    pub tick: Duration,
}

/// Print lines to `out` as the playback clock reaches them.
///
/// Stops once the clock passes the end of the transcript or `cancel_token`
/// fires.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub async fn play<W: Write>(
    lyrics: &ParsedLyrics,
    options: PlayOptions,
    display: &DisplayConfig,
    cancel_token: CancellationToken,
    out: &mut W,
) -> std::io::Result<()> {
    info!(
        "Playing {} lines from {} at {}x",
        lyrics.lines.len(),
        format_time(options.from),
        options.speed
    );

    let clock = PlaybackClock::new(Instant::now(), options.from, options.speed);
    let mut tracker = LineTracker::starting_at(lyrics, options.from);
    let mut printed_any = false;
    let mut ticker = interval(options.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                info!("Playback cancelled");
                break;
            }
            now = ticker.tick() => {
                let time = clock.position_at(now);

                for line in tracker.advance(lyrics, time) {
                    debug!("Line {} reached at {time:.2}s", line.line_index);
                    if printed_any && has_large_gap(line, display) {
                        writeln!(out)?;
                    }
                    writeln!(out, "[{}] {}", format_time(line.start_time), line.text)?;
                    printed_any = true;
                }
                out.flush()?;

                if time > lyrics.total_duration {
                    info!(
                        "Reached end of lyrics at {} after {} of playback",
                        format_time(time),
                        clock.elapsed_at(now).format_clock()
                    );
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricflow_core::{segment, LyricWord};

    fn lyrics() -> ParsedLyrics {
        segment(&[
            LyricWord::audio_event("[intro]", 0.0, 1.0),
            LyricWord::word("One.", 1.0, 1.5),
            LyricWord::spacing(" ", 1.5, 1.5),
            LyricWord::word("Two.", 1.5, 2.0),
            LyricWord::spacing(" ", 2.0, 2.0),
            LyricWord::word("Three!", 4.0, 4.5),
        ])
    }

    /// Three lines starting less than half a second apart
    fn quick_lyrics() -> ParsedLyrics {
        segment(&[
            LyricWord::word("Oh!", 1.0, 1.2),
            LyricWord::spacing(" ", 1.2, 1.2),
            LyricWord::word("Hey!", 1.25, 1.4),
            LyricWord::spacing(" ", 1.4, 1.4),
            LyricWord::word("Go.", 1.45, 1.5),
        ])
    }

    fn indices(lines: &[LyricLine]) -> Vec<usize> {
        lines.iter().map(|l| l.line_index).collect()
    }

    #[test]
    fn test_clock_position() {
        let origin = Instant::now();
        let clock = PlaybackClock::new(origin, 10.0, 2.0);
        assert_eq!(clock.position_at(origin), 10.0);

        let later = origin + Duration::from_millis(1500);
        assert!((clock.position_at(later) - 13.0).abs() < 1e-9);
        assert_eq!(clock.elapsed_at(later), Duration::from_millis(1500));
    }

    #[test]
    fn test_tracker_reports_each_line_once() {
        let lyrics = lyrics();
        let mut tracker = LineTracker::default();

        assert!(tracker.advance(&lyrics, 0.5).is_empty());
        assert_eq!(indices(tracker.advance(&lyrics, 1.0)), vec![0]);
        assert!(tracker.advance(&lyrics, 1.2).is_empty());
        assert_eq!(indices(tracker.advance(&lyrics, 1.6)), vec![1]);
        assert_eq!(indices(tracker.advance(&lyrics, 10.0)), vec![2]);
        assert!(tracker.advance(&lyrics, 11.0).is_empty());
    }

    #[test]
    fn test_tracker_reports_lines_passed_between_ticks() {
        let lyrics = quick_lyrics();
        let mut tracker = LineTracker::default();

        assert!(tracker.advance(&lyrics, 0.9).is_empty());
        assert_eq!(indices(tracker.advance(&lyrics, 2.0)), vec![0, 1, 2]);
        assert!(tracker.advance(&lyrics, 3.0).is_empty());
    }

    #[test]
    fn test_tracker_starting_mid_song_skips_earlier_lines() {
        let lyrics = lyrics();
        let mut tracker = LineTracker::starting_at(&lyrics, 1.7);
        assert_eq!(indices(tracker.advance(&lyrics, 1.7)), vec![1]);

        let mut tracker = LineTracker::starting_at(&lyrics, 0.0);
        assert_eq!(indices(tracker.advance(&lyrics, 5.0)), vec![0, 1, 2]);
    }

    #[test]
    fn test_tracker_empty_lyrics() {
        let mut tracker = LineTracker::default();
        assert!(tracker.advance(&ParsedLyrics::default(), 1.0).is_empty());
    }

    fn options(from: f64, speed: f64) -> PlayOptions {
        PlayOptions {
            from,
            speed,
            tick: Duration::from_millis(100),
        }
    }

    async fn play_to_string(
        lyrics: &ParsedLyrics,
        options: PlayOptions,
        token: CancellationToken,
    ) -> String {
        let mut out = Vec::new();
        play(lyrics, options, &DisplayConfig::default(), token, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_prints_lines_in_order() {
        let output = play_to_string(&lyrics(), options(0.0, 1.0), CancellationToken::new()).await;
        assert_eq!(output, "[0:01] One.\n[0:01] Two.\n\n[0:04] Three!\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_from_offset_at_double_speed() {
        let output = play_to_string(&lyrics(), options(1.7, 2.0), CancellationToken::new()).await;
        assert_eq!(output, "[0:01] Two.\n\n[0:04] Three!\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_starting_on_gap_line_has_no_leading_blank() {
        let output = play_to_string(&lyrics(), options(4.2, 1.0), CancellationToken::new()).await;
        assert_eq!(output, "[0:04] Three!\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_prints_every_line_at_high_speed() {
        let output =
            play_to_string(&quick_lyrics(), options(0.0, 4.0), CancellationToken::new()).await;
        assert_eq!(output, "[0:01] Oh!\n[0:01] Hey!\n[0:01] Go.\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_keeps_gap_blank_line_within_one_tick() {
        let options = PlayOptions {
            tick: Duration::from_secs(5),
            ..options(0.0, 1.0)
        };
        let output = play_to_string(&lyrics(), options, CancellationToken::new()).await;
        assert_eq!(output, "[0:01] One.\n[0:01] Two.\n\n[0:04] Three!\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_stops_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let output = play_to_string(&lyrics(), options(0.0, 1.0), token).await;
        assert!(output.is_empty());
    }
}
