// Whole-sequence similarity: cosine similarity and normalized Manhattan distance

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::midi_parser::NoteSequence;

/// Scores computed over the pitch arrays of two sequences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScores {
    /// Compared length; both pitch arrays are truncated to this
    pub min_length: usize,
    pub cosine_similarity: f64,
    pub manhattan_distance: f64,
    /// Rounded to 2 decimals
    pub normalized_manhattan_distance: f64,
}

impl SimilarityScores {
    pub fn rating(&self) -> ManhattanRating {
        ManhattanRating::classify(self.normalized_manhattan_distance)
    }
}

/// Qualitative bucket for the normalized Manhattan distance.
///
/// Thresholds are strict `>` with no special case for identical input, so a
/// distance of 0 lands in `NeedToImprove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManhattanRating {
    #[serde(rename = "Excellent")]
    Excellent,
    #[serde(rename = "Acceptable")]
    Acceptable,
    #[serde(rename = "Need to improve")]
    NeedToImprove,
}

impl ManhattanRating {
    pub fn classify(normalized_distance: f64) -> Self {
        if normalized_distance > 0.8 {
            Self::Excellent
        } else if normalized_distance > 0.6 {
            Self::Acceptable
        } else {
            Self::NeedToImprove
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Acceptable => "Acceptable",
            Self::NeedToImprove => "Need to improve",
        }
    }
}

impl std::fmt::Display for ManhattanRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Score two sequences by their pitch arrays.
pub fn score(a: &NoteSequence, b: &NoteSequence) -> SimilarityScores {
    score_pitches(&a.pitches(), &b.pitches())
}

/// Score two pitch arrays. Both are truncated to the shorter length; the
/// normalization range is taken from the full, untruncated arrays.
pub fn score_pitches(a: &[u8], b: &[u8]) -> SimilarityScores {
    let min_length = a.len().min(b.len());
    let va = pitch_vector(&a[..min_length]);
    let vb = pitch_vector(&b[..min_length]);

    let cosine = cosine_similarity(va.view(), vb.view());
    let manhattan = manhattan_distance(va.view(), vb.view());

    let divisor = min_length as f64 * pitch_range(a, b);
    let normalized = if divisor > 0.0 { manhattan / divisor } else { 0.0 };

    SimilarityScores {
        min_length,
        cosine_similarity: cosine,
        manhattan_distance: manhattan,
        normalized_manhattan_distance: round_to(normalized, 2),
    }
}

fn pitch_vector(pitches: &[u8]) -> Array1<f64> {
    pitches.iter().map(|&p| p as f64).collect()
}

/// Cosine of the angle between two vectors; 0 when either has zero magnitude.
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let denom = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if denom > 0.0 {
        a.dot(&b) / denom
    } else {
        0.0
    }
}

/// City-block distance between two equal-length vectors.
pub fn manhattan_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    (&a - &b).mapv(f64::abs).sum()
}

/// max - min over both arrays combined, 0 if both are empty.
fn pitch_range(a: &[u8], b: &[u8]) -> f64 {
    let mut combined = a.iter().chain(b.iter()).copied();
    let Some(first) = combined.next() else {
        return 0.0;
    };
    let (lo, hi) = combined.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    (hi - lo) as f64
}

/// Round to `decimals` places from the exact binary value, ties to even.
///
/// 0.125 -> 0.12, while 0.225 (stored just above the tie) -> 0.23.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn identical_sequences_have_zero_distance() {
        let s = score_pitches(&[60, 62, 64], &[60, 62, 64]);
        assert_eq!(s.min_length, 3);
        assert_eq!(s.manhattan_distance, 0.0);
        assert_eq!(s.normalized_manhattan_distance, 0.0);
        assert!((s.cosine_similarity - 1.0).abs() < 1e-12);
        // Strict thresholds: no difference still reads as "Need to improve"
        assert_eq!(s.rating(), ManhattanRating::NeedToImprove);
    }

    #[test]
    fn truncates_to_shorter_but_ranges_over_full_lists() {
        // Compared: [60, 62] vs [61, 70] -> 1 + 8 = 9
        // Range over everything: 80 - 60 = 20, divisor 2 * 20 = 40
        let s = score_pitches(&[60, 62, 80], &[61, 70]);
        assert_eq!(s.min_length, 2);
        assert_eq!(s.manhattan_distance, 9.0);
        assert_eq!(s.normalized_manhattan_distance, 0.23);
    }

    #[test]
    fn exact_ties_round_to_even() {
        // 1 / (2 * 4) = 0.125 exactly
        let s = score_pitches(&[60, 64], &[60, 63]);
        assert_eq!(s.normalized_manhattan_distance, 0.12);

        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(0.625, 2), 0.62);
        assert_eq!(round_to(3.125, 2), 3.12);
        assert_eq!(round_to(0.225, 2), 0.23);
        assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
    }

    #[test]
    fn empty_side_yields_zero() {
        let s = score_pitches(&[], &[60, 62]);
        assert_eq!(s.min_length, 0);
        assert_eq!(s.cosine_similarity, 0.0);
        assert_eq!(s.normalized_manhattan_distance, 0.0);

        let s = score_pitches(&[], &[]);
        assert_eq!(s.normalized_manhattan_distance, 0.0);
    }

    #[test]
    fn constant_pitches_yield_zero() {
        let s = score_pitches(&[60, 60, 60], &[60, 60]);
        assert_eq!(s.normalized_manhattan_distance, 0.0);
    }

    #[test]
    fn maximal_difference_is_one() {
        let s = score_pitches(&[0, 127, 0], &[127, 0, 127]);
        assert_eq!(s.normalized_manhattan_distance, 1.0);
        assert_eq!(s.rating(), ManhattanRating::Excellent);
    }

    #[test]
    fn normalized_distance_stays_in_unit_interval() {
        let a: Vec<u8> = (0..64).map(|i| (i * 37 % 128) as u8).collect();
        let b: Vec<u8> = (0..50).map(|i| (i * 91 % 128) as u8).collect();
        let s = score_pitches(&a, &b);
        assert!((0.0..=1.0).contains(&s.normalized_manhattan_distance));
    }

    #[test]
    fn rating_boundaries_are_strict() {
        assert_eq!(ManhattanRating::classify(0.81), ManhattanRating::Excellent);
        assert_eq!(ManhattanRating::classify(0.8), ManhattanRating::Acceptable);
        assert_eq!(ManhattanRating::classify(0.61), ManhattanRating::Acceptable);
        assert_eq!(ManhattanRating::classify(0.6), ManhattanRating::NeedToImprove);
        assert_eq!(ManhattanRating::classify(0.0), ManhattanRating::NeedToImprove);
    }

    #[test]
    fn cosine_of_orthogonal_and_zero_vectors() {
        assert_eq!(cosine_similarity(array![1.0, 0.0].view(), array![0.0, 1.0].view()), 0.0);
        assert_eq!(cosine_similarity(array![0.0, 0.0].view(), array![3.0, 4.0].view()), 0.0);
        let c = cosine_similarity(array![1.0, 2.0].view(), array![2.0, 4.0].view());
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rating_serializes_as_message() {
        let json = serde_json::to_string(&ManhattanRating::NeedToImprove).unwrap();
        assert_eq!(json, "\"Need to improve\"");
    }
}
