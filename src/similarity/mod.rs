// Performance comparison: note extraction, segmentation and scoring

pub mod midi_parser;
pub mod note_names;
pub mod report;
pub mod scoring;
pub mod segment_diff;
pub mod segmentation;

pub use midi_parser::*;
pub use note_names::*;
pub use report::*;
pub use scoring::*;
pub use segment_diff::*;
pub use segmentation::*;

/// Error type for comparison requests
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("{0}")]
    InputMissing(&'static str),

    #[error("Invalid MIDI data: {0}")]
    Decode(#[from] midly::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
