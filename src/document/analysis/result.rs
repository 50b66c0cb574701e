use serde::{Deserialize, Serialize};

use crate::document::error::LayoutError;
use crate::document::layout_block::LayoutBlock;

/// The outcome of analysing one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub page_number: usize,
    pub blocks: Vec<LayoutBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResult {
    pub fn success(page_number: usize, blocks: Vec<LayoutBlock>) -> Self {
        Self {
            page_number,
            blocks,
            error: None,
        }
    }

    pub fn failure(page_number: usize, error: &LayoutError) -> Self {
        Self {
            page_number,
            blocks: Vec::new(),
            error: Some(error.reason()),
        }
    }

    pub fn from_outcome(page_number: usize, outcome: Result<Vec<LayoutBlock>, LayoutError>) -> Self {
        match outcome {
            Ok(blocks) => Self::success(page_number, blocks),
            Err(e) => Self::failure(page_number, &e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    pub page_number: usize,
    pub reason: String,
}

/// Summary of a document run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<PageFailure>,
}

impl BatchReport {
    pub fn from_pages(pages: &[PageResult]) -> Self {
        let failures: Vec<PageFailure> = pages
            .iter()
            .filter_map(|page| {
                page.error.as_ref().map(|reason| PageFailure {
                    page_number: page.page_number,
                    reason: reason.clone(),
                })
            })
            .collect();

        Self {
            total: pages.len(),
            succeeded: pages.len() - failures.len(),
            failed: failures.len(),
            failures,
        }
    }
}

/// Per-page results of a document in page order, with their report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub api_version: String,
    pub pages: Vec<PageResult>,
    pub report: BatchReport,
}

impl DocumentAnalysis {
    pub fn new(pages: Vec<PageResult>) -> Self {
        let report = BatchReport::from_pages(&pages);
        Self {
            api_version: env!("CARGO_PKG_VERSION").to_string(),
            pages,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_failures() {
        let pages = vec![
            PageResult::success(1, Vec::new()),
            PageResult::failure(2, &LayoutError::Cancelled { page_number: 2 }),
            PageResult::success(3, Vec::new()),
        ];
        let report = BatchReport::from_pages(&pages);

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].page_number, 2);
        assert!(report.failures[0].reason.contains("cancelled"));
    }

    #[test]
    fn test_successful_page_omits_error_field() {
        let json = serde_json::to_value(PageResult::success(1, Vec::new())).unwrap();
        assert!(json.get("error").is_none());
    }
}
