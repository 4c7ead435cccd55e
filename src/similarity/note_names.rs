// Pitch number to scientific pitch notation

pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Render a MIDI pitch as name + octave, e.g. 60 -> "C4", 63 -> "D#4".
///
/// Uses floored division, so values outside 0..=127 still map onto the
/// 12-name cycle (-1 -> "B-2").
pub fn note_name(pitch: i32) -> String {
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", pitch_class(pitch), octave)
}

/// Pitch class name without the octave.
pub fn pitch_class(pitch: i32) -> &'static str {
    NOTE_NAMES[pitch.rem_euclid(12) as usize]
}
