//! Bounded-concurrency fan-out of chunk extractions

use crate::error::ImporterError;
use crate::extractor::ChunkExtractor;
use folio_domain::{Chunk, ChunkExtraction, Oracle, ProgressEvent, ProgressSink};
use futures::future::join_all;
use tracing::{debug, info};

/// Runs chunk extractions in fixed-size batches
///
/// Every extraction in a batch runs concurrently and the next batch starts
/// only once the whole batch has finished.
pub struct BatchScheduler<'a, O: Oracle> {
    extractor: &'a ChunkExtractor<O>,
    batch_size: usize,
}

impl<'a, O: Oracle> BatchScheduler<'a, O> {
    /// Create a scheduler running at most `batch_size` extractions at once
    pub fn new(extractor: &'a ChunkExtractor<O>, batch_size: usize) -> Self {
        Self {
            extractor,
            batch_size: batch_size.max(1),
        }
    }

    /// Extract every chunk, returning one result per chunk in chunk order
    ///
    /// The first transport failure in a batch aborts the run once that batch
    /// has settled; later batches are not started.
    pub async fn run_all(
        &self,
        chunks: &[Chunk],
        progress: &dyn ProgressSink,
    ) -> Result<Vec<ChunkExtraction>, ImporterError> {
        let total = chunks.len();
        let total_batches = total.div_ceil(self.batch_size);
        let mut results = Vec::with_capacity(total);

        for (batch_idx, batch) in chunks.chunks(self.batch_size).enumerate() {
            info!("Processing batch {}/{} ({} chunks)", batch_idx + 1, total_batches, batch.len());
            progress.report(ProgressEvent::BatchStarted {
                batch: batch_idx + 1,
                total_batches,
            });

            let extractions = batch.iter().map(|chunk| {
                progress.report(ProgressEvent::ChunkStarted {
                    chunk: chunk.index + 1,
                    total_chunks: total,
                });
                self.extractor.extract(chunk, chunk.index == 0, total)
            });

            for outcome in join_all(extractions).await {
                results.push(outcome?);
            }
            debug!("Batch {}/{} complete", batch_idx + 1, total_batches);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImporterConfig;
    use folio_llm::MockOracle;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn chunks(count: usize) -> Vec<Chunk> {
        (0..count)
            .map(|index| Chunk {
                index,
                content: format!("chunk body {}", index),
                start_offset: index * 10,
                end_offset: index * 10 + 10,
                estimated_token_count: 3,
            })
            .collect()
    }

    fn extractor(oracle: MockOracle) -> ChunkExtractor<MockOracle> {
        ChunkExtractor::new(Arc::new(oracle), Arc::new(ImporterConfig::default()))
    }

    #[tokio::test]
    async fn test_one_result_per_chunk_in_order() {
        let oracle = MockOracle::new("not json");
        let extractor = extractor(oracle.clone());
        let scheduler = BatchScheduler::new(&extractor, 3);

        let results = scheduler.run_all(&chunks(7), &()).await.unwrap();

        assert_eq!(results.len(), 7);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.chunk_index, i);
            assert_eq!(result.chapters[0].content, format!("chunk body {}", i));
        }
        assert_eq!(oracle.call_count(), 7);
    }

    #[tokio::test]
    async fn test_concurrency_bounded_by_batch_size() {
        let oracle = MockOracle::new("{}").with_latency(Duration::from_millis(20));
        let extractor = extractor(oracle.clone());
        let scheduler = BatchScheduler::new(&extractor, 2);

        scheduler.run_all(&chunks(5), &()).await.unwrap();

        assert_eq!(oracle.peak_concurrency(), 2);
    }

    #[tokio::test]
    async fn test_reports_each_batch() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let events = events.clone();
            move |event: ProgressEvent| events.lock().unwrap().push(event)
        };

        let extractor = extractor(MockOracle::new("{}"));
        BatchScheduler::new(&extractor, 5)
            .run_all(&chunks(12), &sink)
            .await
            .unwrap();

        let events = events.lock().unwrap();
        let batches: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::BatchStarted { batch, total_batches } => Some((*batch, *total_batches)),
                _ => None,
            })
            .collect();
        assert_eq!(batches, vec![(1, 3), (2, 3), (3, 3)]);

        let started = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::ChunkStarted { .. }))
            .count();
        assert_eq!(started, 12);
    }

    #[tokio::test]
    async fn test_transport_error_stops_later_batches() {
        let mut oracle = MockOracle::new("{}");
        oracle.add_error("part 2 of");
        let extractor = extractor(oracle.clone());

        let result = BatchScheduler::new(&extractor, 2)
            .run_all(&chunks(6), &())
            .await;

        assert!(matches!(result, Err(ImporterError::Oracle(_))));
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let extractor = extractor(MockOracle::new("{}"));
        let results = BatchScheduler::new(&extractor, 5)
            .run_all(&[], &())
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
