#![deny(missing_docs)]
//! Batch processing: run the docmark pipeline over many documents in parallel.
//!
//! Each document is parsed and rewritten independently, so inputs are spread
//! across a rayon pool. Results keep the input order.

use docmark_core::{DocmarkError, HeadingRecord, ProcessOptions, process_document};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single document to process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Markdown source.
    pub source: String,
}

/// Result for a single document in a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Document identifier matching the input.
    pub id: String,
    /// Table of contents (empty on failure).
    pub headings: Vec<HeadingRecord>,
    /// Number of callouts produced.
    pub callouts: usize,
    /// Rendered warnings, prefixed with the document id.
    pub warnings: Vec<String>,
    /// Error message (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Total number of documents submitted.
    pub total: u32,
    /// Number of documents processed successfully.
    pub succeeded: u32,
    /// Number of documents that failed.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
    /// Keep going after a failure. When false, documents are processed
    /// sequentially and processing stops at the first error.
    pub continue_on_error: bool,
    /// Pipeline options applied to every document.
    pub process: ProcessOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_threads: None,
            continue_on_error: true,
            process: ProcessOptions::default(),
        }
    }
}

/// Result of batch processing containing all results and statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchProcessingResult {
    /// Individual results, in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

impl BatchProcessingResult {
    /// Serializes the whole result for a table-of-contents consumer.
    pub fn to_json(&self) -> Result<String, DocmarkError> {
        serde_json::to_string(self).map_err(|err| DocmarkError::Serialization(err.to_string()))
    }
}

/// Processes every input, in parallel unless `continue_on_error` is false.
pub fn process_batch(inputs: Vec<BatchInput>, options: &BatchOptions) -> BatchProcessingResult {
    let start = Instant::now();

    // Configure thread pool if max_threads is specified
    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("falling back to the global rayon pool: {}", err))
            .ok()
    });

    let total = inputs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        match process_document(&input.source, &options.process) {
            Ok(processed) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                let warnings = processed
                    .diagnostics
                    .warnings
                    .iter()
                    .map(|warning| format!("{}: {}", input.id, warning))
                    .collect();
                BatchResult {
                    id: input.id,
                    headings: processed.headings,
                    callouts: processed.callouts,
                    warnings,
                    error: None,
                }
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("{}: {}", input.id, err);
                BatchResult {
                    id: input.id,
                    headings: Vec::new(),
                    callouts: 0,
                    warnings: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if options.continue_on_error {
        if let Some(pool) = pool {
            pool.install(|| inputs.into_par_iter().map(process_input).collect())
        } else {
            inputs.into_par_iter().map(process_input).collect()
        }
    } else {
        // Stop on first error - sequential processing required
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let stop = result.error.is_some();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    let stats = BatchStats {
        total,
        succeeded: succeeded.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    log::debug!(
        "batch finished: {}/{} succeeded in {:.1}ms",
        stats.succeeded,
        stats.total,
        stats.processing_time_ms
    );

    BatchProcessingResult { results, stats }
}
