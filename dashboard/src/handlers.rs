// ==============================================================================
// handlers.rs - Dashboard Event Handlers
// ==============================================================================
// Description: One handler per dashboard event: session start, slider change,
//              volcano click, disclosure toggle, plus health/readiness
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Event wiring:
//   slider change    -> reclassify -> volcano figure
//   volcano click    -> extract cohorts + fetch literature -> boxplot + panel
//   disclosure click -> toggle count + 1 -> panel
// ==============================================================================

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use proteomics_processor::classifier::{classify, PointLabel};
use proteomics_processor::extractor::{extract_samples, ExtractError};
use proteomics_processor::figures::{box_figure, empty_figure, volcano_figure};
use proteomics_processor::literature::LookupOutcome;
use proteomics_processor::models::ThresholdState;
use proteomics_processor::presenter::{present, PAGE_SIZE};

use crate::{
    middleware::DashboardSession,
    models::*,
    session::SessionState,
    state::AppState,
};

/// Root endpoint - API information
pub async fn root() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "Proteomics Dashboard",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "/health - Health check",
            "/ready - Readiness check",
            "/api/dashboard/sessions - Start a session (POST)",
            "/api/dashboard/volcano - Current volcano plot (GET)",
            "/api/dashboard/thresholds - Slider change (PUT)",
            "/api/dashboard/selection - Volcano click (POST)",
            "/api/dashboard/disclosure - Show All / Hide (POST)",
            "/api/dashboard/literature - Current literature panel (GET)",
        ],
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = state.dataset();
    let ready = !dataset.results.is_empty();
    state.sessions().evict_expired();

    let response = ReadinessResponse {
        ready,
        result_rows: dataset.results.len(),
        sample_rows: dataset.samples.rows.len(),
        active_sessions: state.sessions().len(),
        workbook_sha256: state.workbook().map(|w| w.hash_sha256.clone()),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

fn volcano_response(state: &AppState, thresholds: &ThresholdState) -> VolcanoResponse {
    let classification = classify(&state.dataset().results, thresholds);
    VolcanoResponse {
        thresholds: *thresholds,
        notable: classification.count(PointLabel::Notable),
        background: classification.count(PointLabel::Background),
        figure: volcano_figure(&classification),
    }
}

fn session_snapshot(state: &AppState, session: &DashboardSession) -> Result<SessionState, AppError> {
    state
        .sessions()
        .get(&session.0)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session.0)))
}

/// Start a session with default thresholds
pub async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let (session_id, session) = state.sessions().create();
    info!("Session {} started", session_id);

    Json(SessionResponse {
        session_id,
        created_at: session.created_at,
        volcano: volcano_response(&state, &session.thresholds),
    })
}

/// Volcano plot for the session's current thresholds
pub async fn get_volcano(
    State(state): State<AppState>,
    session: DashboardSession,
) -> Result<Json<VolcanoResponse>, AppError> {
    let snapshot = session_snapshot(&state, &session)?;
    Ok(Json(volcano_response(&state, &snapshot.thresholds)))
}

/// Slider change: replace both thresholds and reclassify
pub async fn update_thresholds(
    State(state): State<AppState>,
    session: DashboardSession,
    Json(request): Json<ThresholdRequest>,
) -> Result<Json<VolcanoResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid thresholds: {}", e)))?;

    let thresholds = ThresholdState::from(&request);
    state
        .sessions()
        .update(&session.0, |s| s.thresholds = thresholds)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session.0)))?;

    info!(
        "Session {} thresholds: |logFC| > {}, -log10 p > {}",
        session.0, thresholds.fold_change_limit, thresholds.p_value_limit
    );

    Ok(Json(volcano_response(&state, &thresholds)))
}

/// Volcano click: boxplot for the gene and a fresh literature lookup.
///
/// An unknown gene gives an empty figure and clears the records; it is not
/// an error. The session lock is released while the lookup is in flight.
pub async fn select_gene(
    State(state): State<AppState>,
    session: DashboardSession,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid selection: {}", e)))?;

    // Claim this selection. Records from any lookup still in flight for an
    // earlier click are discarded when it finishes.
    let (seq, disclosure) = state
        .sessions()
        .update(&session.0, |s| {
            s.selection_seq = s.selection_seq.wrapping_add(1);
            s.selected_gene = request.gene_symbol.clone();
            s.records.clear();
            (s.selection_seq, s.disclosure)
        })
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session.0)))?;

    let Some(symbol) = request.gene_symbol else {
        return Ok(Json(SelectionResponse {
            gene_symbol: None,
            found: false,
            match_reason: None,
            ambiguous_columns: Vec::new(),
            figure: empty_figure(),
            literature: present(&[], disclosure, PAGE_SIZE),
        }));
    };

    info!("Session {} selected {}", session.0, symbol);

    let samples = match extract_samples(&state.dataset().samples, &symbol) {
        Ok(samples) => samples,
        Err(ExtractError::NotFound { .. }) => {
            info!("Gene {} not in sample table", symbol);
            return Ok(Json(SelectionResponse {
                gene_symbol: Some(symbol),
                found: false,
                match_reason: None,
                ambiguous_columns: Vec::new(),
                figure: empty_figure(),
                literature: present(&[], disclosure, PAGE_SIZE),
            }));
        }
    };

    let outcome = if samples.gene_id.as_str().is_empty() {
        warn!("Gene {} has no Entrez id; skipping literature lookup", symbol);
        LookupOutcome::NotFound("no Entrez gene id".to_string())
    } else {
        state.literature().lookup(&samples.gene_id).await
    };
    let records = outcome.into_records();

    let (stored, disclosure) = state
        .sessions()
        .update(&session.0, |s| {
            let latest = s.selection_seq == seq;
            if latest {
                s.records = records.clone();
            }
            (latest, s.disclosure)
        })
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session.0)))?;

    if !stored {
        info!(
            "Session {}: lookup for {} superseded by a newer selection",
            session.0, symbol
        );
    }

    Ok(Json(SelectionResponse {
        gene_symbol: Some(symbol),
        found: true,
        match_reason: Some(samples.match_reason),
        ambiguous_columns: samples.ambiguous_columns.clone(),
        figure: box_figure(&samples),
        literature: present(&records, disclosure, PAGE_SIZE),
    }))
}

/// Show All / Hide click
pub async fn toggle_disclosure(
    State(state): State<AppState>,
    session: DashboardSession,
) -> Result<Json<LiteratureResponse>, AppError> {
    let snapshot = state
        .sessions()
        .update(&session.0, |s| {
            s.disclosure.toggle();
            s.clone()
        })
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session.0)))?;

    Ok(Json(literature_response(snapshot)))
}

/// Current literature panel without changing state
pub async fn get_literature(
    State(state): State<AppState>,
    session: DashboardSession,
) -> Result<Json<LiteratureResponse>, AppError> {
    let snapshot = session_snapshot(&state, &session)?;
    Ok(Json(literature_response(snapshot)))
}

fn literature_response(snapshot: SessionState) -> LiteratureResponse {
    LiteratureResponse {
        panel: present(&snapshot.records, snapshot.disclosure, PAGE_SIZE),
        gene_symbol: snapshot.selected_gene,
        toggle_count: snapshot.disclosure.toggle_count,
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::with_details("Resource not found", msg),
            ),
            AppError::BadRequest(msg) => {
                warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}
