use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::document::{DocumentAnalysis, LayoutBlock};

fn default_page_number() -> usize {
    1
}

/// Base64 encoding expands data by ~4/3, so the encoded limit is derived from
/// the decoded one.
fn max_base64_length(max_file_size: u64) -> u64 {
    (max_file_size / 3 + 1) * 4
}

fn decode_image_data(data: &str, max_file_size: u64) -> Result<Vec<u8>, ValidationError> {
    if data.is_empty() {
        return Err(ValidationError::EmptyData);
    }

    if data.len() as u64 > max_base64_length(max_file_size) {
        return Err(ValidationError::Base64DataTooLarge);
    }

    let decoded = STANDARD
        .decode(data)
        .map_err(|e| ValidationError::InvalidBase64(e.to_string()))?;

    if decoded.len() as u64 > max_file_size {
        return Err(ValidationError::FileSizeTooLarge {
            limit: max_file_size,
        });
    }

    Ok(decoded)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Base64-encoded page image
    pub data: String,

    /// 1-based page number used in block identifiers
    #[serde(default = "default_page_number")]
    pub page_number: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iou_threshold: Option<f32>,
}

impl PageRequest {
    pub fn validate_and_decode(&self, max_file_size: u64) -> Result<Vec<u8>, ValidationError> {
        if self.page_number == 0 {
            return Err(ValidationError::InvalidPageNumber);
        }
        decode_image_data(&self.data, max_file_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    /// Base64-encoded page images in page order
    pub pages: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iou_threshold: Option<f32>,
}

impl DocumentRequest {
    /// Decodes every page; `max_file_size` bounds the sum of decoded pages.
    pub fn validate_and_decode(&self, max_file_size: u64) -> Result<Vec<Vec<u8>>, ValidationError> {
        if self.pages.is_empty() {
            return Err(ValidationError::NoPages);
        }

        let mut remaining = max_file_size;
        let mut decoded = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let bytes = decode_image_data(page, remaining).map_err(|e| match e {
                ValidationError::Base64DataTooLarge | ValidationError::FileSizeTooLarge { .. } => {
                    ValidationError::FileSizeTooLarge {
                        limit: max_file_size,
                    }
                }
                other => other,
            })?;
            remaining -= bytes.len() as u64;
            decoded.push(bytes);
        }

        Ok(decoded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    pub status: String,
    pub page_number: usize,
    pub blocks: Vec<LayoutBlock>,
}

impl PageResponse {
    pub fn success(page_number: usize, blocks: Vec<LayoutBlock>) -> Self {
        Self {
            status: "success".to_string(),
            page_number,
            blocks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub status: String,
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
}

impl DocumentResponse {
    pub fn success(analysis: DocumentAnalysis) -> Self {
        Self {
            status: "success".to_string(),
            analysis,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
