//! Document-level orchestration over the page pipeline.
//!
//! Pages are analysed independently on a bounded rayon pool. A failing page
//! is recorded in its [`PageResult`] and never stops the remaining pages.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::document::analysis::pipeline::PipelineContext;
use crate::document::analysis::result::{DocumentAnalysis, PageResult};
use crate::document::error::LayoutError;
use crate::document::layout_block::LayoutBlock;
use crate::document::page::PageInput;
use crate::inference::detector::LayoutDetector;

/// Receives the blocks of every successfully analysed page.
pub trait PageSink: Sync {
    fn persist(&self, page_number: usize, blocks: &[LayoutBlock]) -> Result<(), LayoutError>;
}

/// Writes each page's blocks to `page_{n}.json` in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    directory: PathBuf,
}

impl JsonFileSink {
    /// Creates the sink, creating `directory` if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self, LayoutError> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).map_err(|source| LayoutError::SinkSetupError {
            path: directory.clone(),
            source,
        })?;
        Ok(Self { directory })
    }

    pub fn page_path(&self, page_number: usize) -> PathBuf {
        self.directory.join(format!("page_{page_number}.json"))
    }
}

impl PageSink for JsonFileSink {
    fn persist(&self, page_number: usize, blocks: &[LayoutBlock]) -> Result<(), LayoutError> {
        let json = serde_json::to_string_pretty(blocks)
            .map_err(|source| LayoutError::SerializeError {
                page_number,
                source,
            })?;

        let path = self.page_path(page_number);
        fs::write(&path, json).map_err(|source| LayoutError::PersistError {
            page_number,
            path,
            source,
        })
    }
}

/// Per-run options of [`PipelineContext::analyze_document_with`].
#[derive(Clone, Copy, Default)]
pub struct BatchOptions<'a> {
    /// Overrides the configured confidence threshold.
    pub conf_threshold: Option<f32>,
    /// Overrides the configured IoU threshold.
    pub iou_threshold: Option<f32>,
    /// Once set, pages that have not started are reported as cancelled.
    pub cancel: Option<&'a AtomicBool>,
    pub sink: Option<&'a dyn PageSink>,
}

impl<D: LayoutDetector> PipelineContext<D> {
    /// Analyses `pages` (numbered from 1) with the given thresholds.
    pub fn analyze_document<P: PageInput>(
        &self,
        pages: &[P],
        conf_threshold: f32,
        iou_threshold: f32,
    ) -> Result<DocumentAnalysis, LayoutError> {
        self.analyze_document_with(
            pages,
            &BatchOptions {
                conf_threshold: Some(conf_threshold),
                iou_threshold: Some(iou_threshold),
                ..BatchOptions::default()
            },
        )
    }

    /// Analyses `pages` (numbered from 1).
    ///
    /// Thresholds are validated once before any page runs; an invalid
    /// threshold fails the whole call. Every other failure is confined to the
    /// page it happened on, including a page that fails to decode and a
    /// detector that panics.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn analyze_document_with<P: PageInput>(
        &self,
        pages: &[P],
        options: &BatchOptions<'_>,
    ) -> Result<DocumentAnalysis, LayoutError> {
        let config = self.config();
        let conf_threshold = LayoutError::check_threshold(
            "conf_threshold",
            options.conf_threshold.unwrap_or(config.conf_threshold),
        )?;
        let iou_threshold = LayoutError::check_threshold(
            "iou_threshold",
            options.iou_threshold.unwrap_or(config.iou_threshold),
        )?;

        let run_page = |(index, page): (usize, &P)| {
            let page_number = index + 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.run_page(page, page_number, conf_threshold, iou_threshold, options)
            }))
            .unwrap_or_else(|payload| {
                Err(LayoutError::Panicked {
                    page_number,
                    message: panic_message(payload.as_ref()),
                })
            });
            if let Err(e) = &outcome {
                warn!("Page {} failed: {}", page_number, e.reason());
            }
            PageResult::from_outcome(page_number, outcome)
        };

        let workers = config.workers.min(pages.len()).max(1);
        let results: Vec<PageResult> = if workers == 1 {
            pages.iter().enumerate().map(run_page).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| LayoutError::ProcessingError {
                    message: format!("failed to build worker pool: {e}"),
                })?;
            pool.install(|| pages.par_iter().enumerate().map(run_page).collect())
        };

        let analysis = DocumentAnalysis::new(results);
        info!(
            "Document finished: {} succeeded, {} failed",
            analysis.report.succeeded, analysis.report.failed
        );
        Ok(analysis)
    }

    fn run_page<P: PageInput>(
        &self,
        page: &P,
        page_number: usize,
        conf_threshold: f32,
        iou_threshold: f32,
        options: &BatchOptions<'_>,
    ) -> Result<Vec<LayoutBlock>, LayoutError> {
        if options
            .cancel
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
        {
            return Err(LayoutError::Cancelled { page_number });
        }

        let image = page.load()?;
        let blocks = self.analyze_page_with(&image, page_number, conf_threshold, iou_threshold)?;
        if let Some(sink) = options.sink {
            sink.persist(page_number, &blocks)?;
        }
        Ok(blocks)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_file_sink_writes_page_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("out")).unwrap();
        sink.persist(4, &[]).unwrap();

        let written = fs::read_to_string(sink.page_path(4)).unwrap();
        assert_eq!(written.trim(), "[]");
    }

    #[test]
    fn test_json_file_sink_reports_unusable_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = JsonFileSink::new(file.path().join("out"));
        assert!(matches!(result, Err(LayoutError::SinkSetupError { .. })));
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
