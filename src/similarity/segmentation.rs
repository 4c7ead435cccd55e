// Fixed-length time windows over a note sequence

use serde::{Deserialize, Serialize};

use super::midi_parser::NoteSequence;
use super::note_names::note_name;

pub const DEFAULT_TICKS_PER_BEAT: u16 = 480;
pub const DEFAULT_MICROSECONDS_PER_BEAT: u32 = 500_000; // 120 BPM
pub const DEFAULT_WINDOW_SECS: u32 = 10;

/// Window settings for segmentation.
///
/// The tick conversion uses these values regardless of what the compared
/// files declare, so two files are always cut with the same ruler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationSettings {
    #[serde(default = "default_window_secs")]
    pub window_secs: u32,
    #[serde(default = "default_ticks_per_beat")]
    pub ticks_per_beat: u16,
    #[serde(default = "default_microseconds_per_beat")]
    pub microseconds_per_beat: u32,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            ticks_per_beat: DEFAULT_TICKS_PER_BEAT,
            microseconds_per_beat: DEFAULT_MICROSECONDS_PER_BEAT,
        }
    }
}

fn default_window_secs() -> u32 {
    DEFAULT_WINDOW_SECS
}

fn default_ticks_per_beat() -> u16 {
    DEFAULT_TICKS_PER_BEAT
}

fn default_microseconds_per_beat() -> u32 {
    DEFAULT_MICROSECONDS_PER_BEAT
}

/// Convert seconds to ticks at a constant tempo, rounding to the nearest tick.
pub fn seconds_to_ticks(seconds: f64, ticks_per_beat: u16, microseconds_per_beat: u32) -> u64 {
    let seconds_per_tick = microseconds_per_beat as f64 * 1e-6 / ticks_per_beat.max(1) as f64;
    (seconds / seconds_per_tick).round() as u64
}

/// Greedy segmenter: a segment runs until an event lands at or beyond
/// `threshold_ticks` after the segment's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    threshold_ticks: u64,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(&SegmentationSettings::default())
    }
}

impl Segmenter {
    pub fn new(settings: &SegmentationSettings) -> Self {
        // Ticks per second first, then scaled: 10 s at 480 tpb / 120 BPM is 9600
        let ticks_per_second =
            seconds_to_ticks(1.0, settings.ticks_per_beat, settings.microseconds_per_beat);
        Self {
            threshold_ticks: settings.window_secs as u64 * ticks_per_second,
        }
    }

    pub fn threshold_ticks(&self) -> u64 {
        self.threshold_ticks
    }

    /// Group the sequence's pitches into consecutive windows.
    ///
    /// The first window is anchored at tick 0, so when the first note falls
    /// past the threshold an empty leading group is emitted.
    pub fn segments(&self, sequence: &NoteSequence) -> Vec<Vec<u8>> {
        let mut segments = Vec::new();
        let mut current: Vec<u8> = Vec::new();
        let mut segment_start = 0u64;

        for note in sequence {
            if note.time.saturating_sub(segment_start) < self.threshold_ticks {
                current.push(note.pitch);
            } else {
                segments.push(std::mem::replace(&mut current, vec![note.pitch]));
                segment_start = note.time;
            }
        }

        if !current.is_empty() {
            segments.push(current);
        }

        segments
    }

    /// Segment the sequence and render each window as space-joined note names.
    pub fn render(&self, sequence: &NoteSequence) -> Vec<String> {
        self.segments(sequence)
            .iter()
            .map(|pitches| render_segment(pitches))
            .collect()
    }
}

/// Space-joined note names, order and duplicates preserved.
pub fn render_segment(pitches: &[u8]) -> String {
    pitches
        .iter()
        .map(|&p| note_name(p as i32))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Segment with the default 10 second window.
pub fn segment_notes(sequence: &NoteSequence) -> Vec<String> {
    Segmenter::default().render(sequence)
}
