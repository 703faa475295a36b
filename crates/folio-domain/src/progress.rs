//! Progress module - structured progress reporting for pipeline runs
//!
//! Progress is advisory. A run produces the same result whether or not
//! anyone listens to these events.

use serde::Serialize;
use std::fmt;

/// A structured progress event emitted during a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Run started over a text of the given length (characters)
    Started {
        /// Length of the manuscript in characters
        total_chars: usize,
    },

    /// Chunking is about to run
    Chunking,

    /// Chunking produced the given number of chunks
    Chunked {
        /// Number of chunks
        chunks: usize,
    },

    /// A batch of chunk extractions is starting (1-based)
    BatchStarted {
        /// Batch number, starting at 1
        batch: usize,
        /// Total number of batches
        total_batches: usize,
    },

    /// A single chunk extraction is starting (1-based)
    ChunkStarted {
        /// Chunk number, starting at 1
        chunk: usize,
        /// Total number of chunks
        total_chunks: usize,
    },

    /// Short text: one direct extraction over the whole manuscript
    DirectExtraction,

    /// Per-chunk results are being merged
    Merging,

    /// Style analysis is running
    AnalyzingStyle,

    /// Run finished
    Completed {
        /// Wall-clock duration of the run in milliseconds
        elapsed_ms: u64,
    },
}

impl ProgressEvent {
    /// Approximate completion percentage for UI progress bars
    ///
    /// Per-chunk events carry no percentage of their own; within a batch,
    /// completion order is not defined.
    pub fn percent(&self) -> Option<u8> {
        match *self {
            ProgressEvent::Started { .. } => Some(15),
            ProgressEvent::Chunking => Some(20),
            ProgressEvent::Chunked { .. } => Some(25),
            ProgressEvent::BatchStarted {
                batch,
                total_batches,
            } => {
                let total = total_batches.max(1);
                let done = batch.min(total);
                Some(25 + (done * 60 / total) as u8)
            }
            ProgressEvent::ChunkStarted { .. } => None,
            ProgressEvent::DirectExtraction => Some(30),
            ProgressEvent::Merging => Some(85),
            ProgressEvent::AnalyzingStyle => Some(90),
            ProgressEvent::Completed { .. } => Some(100),
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Started { total_chars } => {
                write!(f, "Starting book analysis ({} characters)", total_chars)
            }
            ProgressEvent::Chunking => write!(f, "Splitting book into chunks..."),
            ProgressEvent::Chunked { chunks } => write!(f, "Split into {} chunks", chunks),
            ProgressEvent::BatchStarted {
                batch,
                total_batches,
            } => write!(f, "Processing batch {}/{}...", batch, total_batches),
            ProgressEvent::ChunkStarted {
                chunk,
                total_chunks,
            } => write!(f, "Analyzing chunk {}/{}...", chunk, total_chunks),
            ProgressEvent::DirectExtraction => write!(f, "Analyzing whole text in one pass..."),
            ProgressEvent::Merging => write!(f, "Merging analysis results..."),
            ProgressEvent::AnalyzingStyle => write!(f, "Analyzing writing style..."),
            ProgressEvent::Completed { elapsed_ms } => {
                write!(f, "Analysis complete in {:.1}s", *elapsed_ms as f64 / 1000.0)
            }
        }
    }
}

/// Receiver of progress events
///
/// Implemented for every `Fn(ProgressEvent)` closure, so callers can pass
/// `&|event: ProgressEvent| println!("{}", event)`. `&()` discards events.
pub trait ProgressSink: Send + Sync {
    /// Handle one progress event
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for () {
    fn report(&self, _event: ProgressEvent) {}
}
