// ==============================================================================
// models.rs - Dashboard API Models
// ==============================================================================
// Description: Request/response models for the dashboard event endpoints
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use proteomics_processor::extractor::MatchReason;
use proteomics_processor::models::ThresholdState;
use proteomics_processor::presenter::LiteraturePanel;

/// New session: id, starting thresholds and the first volcano plot
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub volcano: VolcanoResponse,
}

/// Volcano plot for the session's current thresholds
#[derive(Debug, Serialize)]
pub struct VolcanoResponse {
    pub thresholds: ThresholdState,
    pub notable: usize,
    pub background: usize,
    pub figure: Value,
}

/// Slider change. Bounds match the slider ranges.
#[derive(Debug, Deserialize, Validate)]
pub struct ThresholdRequest {
    #[validate(range(min = 0.5, max = 1.5))]
    pub fold_change_limit: f64,

    #[validate(range(min = 1.0, max = 10.0))]
    pub p_value_limit: f64,
}

impl From<&ThresholdRequest> for ThresholdState {
    fn from(request: &ThresholdRequest) -> Self {
        ThresholdState {
            fold_change_limit: request.fold_change_limit,
            p_value_limit: request.p_value_limit,
        }
    }
}

/// Volcano click. `None` clears the selection.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectionRequest {
    #[validate(length(min = 1, max = 128))]
    pub gene_symbol: Option<String>,
}

/// Boxplot and literature panel for a clicked gene
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub gene_symbol: Option<String>,
    /// False when the gene is absent from the sample table
    pub found: bool,
    pub match_reason: Option<MatchReason>,
    pub ambiguous_columns: Vec<String>,
    pub figure: Value,
    pub literature: LiteraturePanel,
}

/// Literature panel after a toggle or on refresh
#[derive(Debug, Serialize)]
pub struct LiteratureResponse {
    pub gene_symbol: Option<String>,
    pub toggle_count: u64,
    pub panel: LiteraturePanel,
}

/// API information response
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub result_rows: usize,
    pub sample_rows: usize,
    pub active_sessions: usize,
    pub workbook_sha256: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
