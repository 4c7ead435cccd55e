// Comparison pipeline and the report it produces

use serde::{Deserialize, Serialize};

use super::midi_parser::extract_notes;
use super::scoring::{score, ManhattanRating, SimilarityScores};
use super::segment_diff::{compare_segments, DifferenceRecord};
use super::segmentation::{SegmentationSettings, Segmenter};
use super::ComparisonError;

/// Result of comparing two performances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub normalized_manhattan_distance: f64,
    pub manhattan_message: ManhattanRating,
    pub differences: Vec<DifferenceRecord>,
}

impl ComparisonReport {
    pub fn assemble(scores: &SimilarityScores, differences: Vec<DifferenceRecord>) -> Self {
        Self {
            normalized_manhattan_distance: scores.normalized_manhattan_distance,
            manhattan_message: scores.rating(),
            differences,
        }
    }
}

/// Runs extraction, scoring, segmentation and segment diffing for one request.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    segmenter: Segmenter,
}

impl Comparator {
    pub fn new(settings: &SegmentationSettings) -> Self {
        Self {
            segmenter: Segmenter::new(settings),
        }
    }

    pub fn compare(&self, midi_a: &[u8], midi_b: &[u8]) -> Result<ComparisonReport, ComparisonError> {
        if midi_a.is_empty() || midi_b.is_empty() {
            return Err(ComparisonError::InputMissing("MIDI files are required"));
        }

        let notes_a = extract_notes(midi_a)?;
        let notes_b = extract_notes(midi_b)?;
        log::debug!("Extracted {} and {} note events", notes_a.len(), notes_b.len());

        let scores = score(&notes_a, &notes_b);
        log::debug!(
            "Scores over {} notes: cosine {:.4}, manhattan {}, normalized {}",
            scores.min_length,
            scores.cosine_similarity,
            scores.manhattan_distance,
            scores.normalized_manhattan_distance
        );

        let segments_a = self.segmenter.render(&notes_a);
        let segments_b = self.segmenter.render(&notes_b);
        log::debug!("Segmented into {} and {} windows", segments_a.len(), segments_b.len());

        let differences = compare_segments(&segments_a, &segments_b);

        Ok(ComparisonReport::assemble(&scores, differences))
    }
}

/// Compare two MIDI containers using the default 10 second segment window.
pub fn compare(midi_a: &[u8], midi_b: &[u8]) -> Result<ComparisonReport, ComparisonError> {
    Comparator::default().compare(midi_a, midi_b)
}
