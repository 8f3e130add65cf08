//! Concurrent processing of many documents
//!
//! Each document is translated on the tokio blocking pool with its own
//! rewriters and therefore its own version; the shared transformer is only
//! read.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{info, warn};
use wps_ir::Version;

use crate::{Error, LegacyTransformer, Result, TranslationReport, TranslationStats};

/// How each document is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Event-level rewrite
    #[default]
    Translate,
    /// Bind to the canonical model and write it out again
    Convert,
}

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of documents processed at once
    pub max_concurrency: usize,
    /// Vocabulary to write
    pub target: Version,
    pub mode: BatchMode,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            target: Version::Current,
            mode: BatchMode::default(),
        }
    }
}

/// One document to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl BatchJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Status of a batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Success,
    Failed,
}

/// Outcome for one document
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub job: BatchJob,
    pub status: ItemStatus,
    /// Error message if failed
    pub error: Option<String>,
    pub report: Option<TranslationReport>,
    /// Original position in the batch
    pub position: usize,
}

/// Result of processing a batch
#[derive(Debug)]
pub struct BatchResult {
    /// Items in submission order
    pub items: Vec<BatchItem>,
    pub processing_time: Duration,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.count(ItemStatus::Success)
    }

    pub fn failed(&self) -> usize {
        self.count(ItemStatus::Failed)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Read and write counters summed over every successful document
    pub fn totals(&self) -> TranslationStats {
        let mut total = TranslationStats::new();
        for report in self.items.iter().filter_map(|i| i.report.as_ref()) {
            total += report.read;
            total += report.written;
        }
        total
    }

    fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}

/// Process `jobs` concurrently. A failing document is recorded and does not
/// stop the others; only a failure of the task machinery itself is an error.
pub async fn run_batch(
    transformer: Arc<LegacyTransformer>,
    jobs: Vec<BatchJob>,
    config: &BatchConfig,
) -> Result<BatchResult> {
    let start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::Batch(format!("Semaphore error: {e}")))?;
        let transformer = Arc::clone(&transformer);
        let (target, mode) = (config.target, config.mode);

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let outcome = match mode {
                BatchMode::Translate => transformer.translate_file(&job.input, &job.output, target),
                BatchMode::Convert => transformer.convert_file(&job.input, &job.output, target),
            };
            (job, outcome)
        }));
    }

    let mut items = Vec::with_capacity(handles.len());
    for (position, handle) in handles.into_iter().enumerate() {
        let (job, outcome) = handle
            .await
            .map_err(|e| Error::Batch(format!("Task failed: {e}")))?;
        let item = match outcome {
            Ok(report) => {
                info!(
                    input = %job.input.display(),
                    source = %report.source,
                    target = %report.target,
                    "Processed document"
                );
                BatchItem {
                    job,
                    status: ItemStatus::Success,
                    error: None,
                    report: Some(report),
                    position,
                }
            }
            Err(e) => {
                warn!(input = %job.input.display(), error = %e, "Failed to process document");
                BatchItem {
                    job,
                    status: ItemStatus::Failed,
                    error: Some(e.to_string()),
                    report: None,
                    position,
                }
            }
        };
        items.push(item);
    }

    Ok(BatchResult {
        items,
        processing_time: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_counts() {
        let item = |status| BatchItem {
            job: BatchJob::new("in.xml", "out.xml"),
            status,
            error: None,
            report: None,
            position: 0,
        };
        let result = BatchResult {
            items: vec![item(ItemStatus::Success), item(ItemStatus::Failed)],
            processing_time: Duration::ZERO,
        };
        assert_eq!(result.succeeded(), 1);
        assert_eq!(result.failed(), 1);
        assert!(!result.is_success());
        assert_eq!(result.totals(), TranslationStats::new());
    }

    #[test]
    fn test_totals_sum_both_passes() {
        let stats = |events, elements_renamed| TranslationStats {
            events,
            elements_renamed,
            ..Default::default()
        };
        let item = |report| BatchItem {
            job: BatchJob::new("in.xml", "out.xml"),
            status: ItemStatus::Success,
            error: None,
            report: Some(report),
            position: 0,
        };
        let report = TranslationReport {
            source: Version::Legacy,
            target: Version::Current,
            read: stats(10, 3),
            written: stats(10, 0),
        };
        let result = BatchResult {
            items: vec![item(report), item(report)],
            processing_time: Duration::ZERO,
        };

        let totals = result.totals();
        assert_eq!(totals.events, 40);
        assert_eq!(totals.elements_renamed, 6);
    }

    #[tokio::test]
    async fn test_missing_input_is_recorded_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = vec![BatchJob::new(
            dir.path().join("missing.xml"),
            dir.path().join("out.xml"),
        )];
        let result = run_batch(Arc::new(LegacyTransformer::new()), jobs, &BatchConfig::default())
            .await
            .unwrap();

        assert_eq!(result.failed(), 1);
        assert!(result.items[0].error.as_deref().unwrap().contains("missing.xml"));
    }
}
