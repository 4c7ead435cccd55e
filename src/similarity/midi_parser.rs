// MIDI file parser producing the flat note-on stream used for comparison


use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};

use super::segmentation::{DEFAULT_MICROSECONDS_PER_BEAT, DEFAULT_TICKS_PER_BEAT};
use super::ComparisonError;

/// A single note-on message, timestamped with the cumulative tick count
/// since the start of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: u8,
    pub time: u64,
}

impl NoteEvent {
    /// Equal-tempered frequency in Hz (A4 = 440 Hz).
    pub fn frequency(&self) -> f64 {
        midi_to_hz(self.pitch)
    }
}

/// Convert a MIDI pitch to its 12-TET frequency.
pub fn midi_to_hz(pitch: u8) -> f64 {
    440.0 * 2f64.powf((pitch as f64 - 69.0) / 12.0)
}

/// Note events in container traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSequence {
    notes: Vec<NoteEvent>,
}

impl NoteSequence {
    pub fn new(notes: Vec<NoteEvent>) -> Self {
        Self { notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.notes.iter()
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    pub fn velocities(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.velocity).collect()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.notes.iter().map(NoteEvent::frequency).collect()
    }

    pub fn times(&self) -> Vec<u64> {
        self.notes.iter().map(|n| n.time).collect()
    }

    /// Split into parallel (pitches, velocities, frequencies, times) arrays.
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>, Vec<f64>, Vec<u64>) {
        let frequencies = self.frequencies();
        let (pitches, velocities, times) = self.notes.into_iter().fold(
            (Vec::new(), Vec::new(), Vec::new()),
            |(mut p, mut v, mut t), note| {
                p.push(note.pitch);
                v.push(note.velocity);
                t.push(note.time);
                (p, v, t)
            },
        );
        (pitches, velocities, frequencies, times)
    }
}

impl<'a> IntoIterator for &'a NoteSequence {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

impl FromIterator<NoteEvent> for NoteSequence {
    fn from_iter<I: IntoIterator<Item = NoteEvent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Timing metadata actually declared by a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiSummary {
    /// None for SMPTE timecode files
    pub ticks_per_beat: Option<u16>,
    pub first_tempo: Option<u32>,
    pub track_count: usize,
}

impl MidiSummary {
    /// Whether the file disagrees with the fixed 480 tpb / 120 BPM assumption
    /// the segmenter uses.
    pub fn differs_from_default_timing(&self) -> bool {
        self.ticks_per_beat != Some(DEFAULT_TICKS_PER_BEAT)
            || self.first_tempo.unwrap_or(DEFAULT_MICROSECONDS_PER_BEAT)
                != DEFAULT_MICROSECONDS_PER_BEAT
    }
}

/// Parse a MIDI container into its note-on events.
///
/// The tick accumulator runs across all tracks without resetting, and notes are
/// kept in traversal order rather than re-sorted. Note-on messages with
/// velocity 0 are kept as well.
pub fn extract_notes(data: &[u8]) -> Result<NoteSequence, ComparisonError> {
    let smf = Smf::parse(data)?;
    Ok(collect_note_ons(&smf))
}

/// Report the timing metadata a container declares.
pub fn summarize(data: &[u8]) -> Result<MidiSummary, ComparisonError> {
    let smf = Smf::parse(data)?;

    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpb) => Some(tpb.as_int()),
        Timing::Timecode(..) => None,
    };

    let first_tempo = smf.tracks.iter().flatten().find_map(|event| match event.kind {
        TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
        _ => None,
    });

    Ok(MidiSummary {
        ticks_per_beat,
        first_tempo,
        track_count: smf.tracks.len(),
    })
}

fn collect_note_ons(smf: &Smf) -> NoteSequence {
    smf.tracks
        .iter()
        .flatten()
        .scan(0u64, |tick, event| {
            *tick += event.delta.as_int() as u64;
            Some((*tick, event.kind))
        })
        .filter_map(|(tick, kind)| match kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } => Some(NoteEvent {
                pitch: key.as_int(),
                velocity: vel.as_int(),
                time: tick,
            }),
            _ => None,
        })
        .collect()
}
