// MIDI fixtures built with midly's writer

#![allow(dead_code)]

use midly::num::u7;
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

/// (delta ticks, pitch, velocity); velocity 0 is written as a note-off
pub type Step = (u32, u8, u8);

fn event(delta: u32, pitch: u8, velocity: u8) -> TrackEvent<'static> {
    let message = if velocity == 0 {
        MidiMessage::NoteOff {
            key: u7::new(pitch),
            vel: u7::new(0),
        }
    } else {
        MidiMessage::NoteOn {
            key: u7::new(pitch),
            vel: u7::new(velocity),
        }
    };
    TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Midi {
            channel: 0.into(),
            message,
        },
    }
}

fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// Serialize tracks of steps into a Standard MIDI File at 480 ticks/beat.
pub fn midi_bytes(tracks: &[Vec<Step>]) -> Vec<u8> {
    let format = if tracks.len() == 1 {
        Format::SingleTrack
    } else {
        Format::Parallel
    };
    let mut smf = Smf::new(Header::new(format, Timing::Metrical(480.into())));
    for steps in tracks {
        let mut track: Track = steps.iter().map(|&(d, p, v)| event(d, p, v)).collect();
        track.push(end_of_track());
        smf.tracks.push(track);
    }

    let mut buffer = Vec::new();
    smf.write_std(&mut buffer).expect("in-memory write");
    buffer
}

/// Single-track file with note-ons at absolute `times`.
pub fn melody(pitches: &[u8], times: &[u32]) -> Vec<u8> {
    let mut last = 0;
    let steps = pitches
        .iter()
        .zip(times)
        .map(|(&p, &t)| {
            let step = (t - last, p, 100);
            last = t;
            step
        })
        .collect();
    midi_bytes(&[steps])
}
