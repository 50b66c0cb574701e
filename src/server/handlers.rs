use axum::extract::State;
use axum::response::Json;

use super::error::AppError;
use super::models::{DocumentRequest, DocumentResponse, HealthResponse, PageRequest, PageResponse};
use super::AppState;
use crate::document::page::{decode_page, PageSource};
use crate::document::BatchOptions;
use crate::inference::LayoutDetector;

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Single page layout endpoint
pub async fn analyze_page<D: LayoutDetector + 'static>(
    State(state): State<AppState<D>>,
    Json(request): Json<PageRequest>,
) -> Result<Json<PageResponse>, AppError> {
    tracing::info!("Received layout request for page {}", request.page_number);

    let bytes = request.validate_and_decode(state.max_file_size)?;
    let page_number = request.page_number;
    let context = state.context.clone();

    let blocks = tokio::task::spawn_blocking(move || {
        let image = decode_page(&bytes)?;
        let config = context.config();
        context.analyze_page_with(
            &image,
            page_number,
            request.conf_threshold.unwrap_or(config.conf_threshold),
            request.iou_threshold.unwrap_or(config.iou_threshold),
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    tracing::info!("Page {} analysed: {} blocks", page_number, blocks.len());

    Ok(Json(PageResponse::success(page_number, blocks)))
}

/// Multi-page layout endpoint
pub async fn analyze_document<D: LayoutDetector + 'static>(
    State(state): State<AppState<D>>,
    Json(request): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    tracing::info!(
        "Received layout request for a {}-page document",
        request.pages.len()
    );

    let encoded_pages = request.validate_and_decode(state.max_file_size)?;
    let context = state.context.clone();

    let analysis = tokio::task::spawn_blocking(move || {
        let pages: Vec<PageSource> = encoded_pages.into_iter().map(PageSource::Encoded).collect();
        let options = BatchOptions {
            conf_threshold: request.conf_threshold,
            iou_threshold: request.iou_threshold,
            ..BatchOptions::default()
        };
        context.analyze_document_with(&pages, &options)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    tracing::info!(
        "Document analysed: {} of {} pages succeeded",
        analysis.report.succeeded,
        analysis.report.total
    );

    Ok(Json(DocumentResponse::success(analysis)))
}
