// Per-segment comparison by note-name set overlap

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::scoring::round_to;

/// Qualitative bucket for a segment's difference percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentVerdict {
    #[serde(rename = "Segments are completely different")]
    CompletelyDifferent,
    #[serde(rename = "Segments are somewhat different")]
    SomewhatDifferent,
    #[serde(rename = "Segments are slightly different")]
    SlightlyDifferent,
}

impl SegmentVerdict {
    /// Buckets are checked from most to least severe.
    pub fn classify(difference_percent: f64) -> Self {
        if difference_percent > 66.66 {
            Self::CompletelyDifferent
        } else if difference_percent > 33.33 {
            Self::SomewhatDifferent
        } else {
            Self::SlightlyDifferent
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::CompletelyDifferent => "Segments are completely different",
            Self::SomewhatDifferent => "Segments are somewhat different",
            Self::SlightlyDifferent => "Segments are slightly different",
        }
    }
}

impl std::fmt::Display for SegmentVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Comparison of the segments at one index in both performances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceRecord {
    /// 1-based
    #[serde(rename = "segment")]
    pub segment_index: usize,
    #[serde(rename = "file1")]
    pub rendering_a: String,
    #[serde(rename = "file2")]
    pub rendering_b: String,
    /// Rounded to 2 decimals
    pub difference_percent: f64,
    pub message: SegmentVerdict,
}

/// Share of note names not common to both renderings, in percent.
///
/// Renderings are compared as sets, so repeated notes count once. Two empty
/// renderings are 0% different.
pub fn difference_percent(rendering_a: &str, rendering_b: &str) -> f64 {
    let set_a: BTreeSet<&str> = rendering_a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = rendering_b.split_whitespace().collect();

    let common = set_a.intersection(&set_b).count();
    let total = set_a.union(&set_b).count();

    if total > 0 {
        (1.0 - common as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Compare segments pairwise by index.
///
/// Only indices present in both lists are compared; trailing segments of the
/// longer performance are not reported.
pub fn compare_segments(segments_a: &[String], segments_b: &[String]) -> Vec<DifferenceRecord> {
    segments_a
        .iter()
        .zip(segments_b)
        .enumerate()
        .map(|(i, (a, b))| {
            let percent = difference_percent(a, b);
            DifferenceRecord {
                segment_index: i + 1,
                rendering_a: a.clone(),
                rendering_b: b.clone(),
                difference_percent: round_to(percent, 2),
                message: SegmentVerdict::classify(percent),
            }
        })
        .collect()
}
