// ==============================================================================
// state.rs - Application State Management
// ==============================================================================
// Description: Read-only dataset, literature source and session store shared
//              by every handler
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use proteomics_processor::dataset::{Dataset, WorkbookLoader};
use proteomics_processor::literature::{LiteratureSource, MyGeneClient};
use proteomics_processor::validator::{ValidatedWorkbook, WorkbookValidator};

use crate::config::DashboardConfig;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Both workbook sheets, immutable after startup
    dataset: Dataset,

    /// Fingerprint of the loaded workbook, when loaded from disk
    workbook: Option<ValidatedWorkbook>,

    /// Gene annotation lookups
    literature: Arc<dyn LiteratureSource>,

    /// Per-session UI state
    sessions: SessionStore,
}

impl AppState {
    /// Validate and load the workbook, and build the annotation client
    pub async fn new(config: &DashboardConfig) -> Result<Self> {
        let path = config.workbook_path.clone();

        let (workbook, dataset) = tokio::task::spawn_blocking(move || -> Result<_> {
            let workbook = WorkbookValidator::new()
                .validate(&path)
                .context("Workbook validation failed")?;
            let dataset = WorkbookLoader::new()
                .load(&path)
                .context("Failed to load workbook")?;
            Ok((workbook, dataset))
        })
        .await
        .context("Workbook loading task panicked")??;

        info!(
            "Dataset ready: {} result rows, {} sample rows (sha256 {})",
            dataset.results.len(),
            dataset.samples.rows.len(),
            &workbook.hash_sha256[..16]
        );

        let client = MyGeneClient::new(config.literature_api_base.clone())
            .context("Failed to build annotation HTTP client")?;
        info!("Literature lookups via {}", client.base_url());

        info!("Idle sessions expire after {:?}", config.session_ttl);

        Ok(Self::assemble(
            dataset,
            Some(workbook),
            Arc::new(client),
            SessionStore::with_ttl(config.session_ttl),
        ))
    }

    /// Assemble state from already-loaded parts, with the default session TTL
    pub fn from_parts(
        dataset: Dataset,
        workbook: Option<ValidatedWorkbook>,
        literature: Arc<dyn LiteratureSource>,
    ) -> Self {
        Self::assemble(dataset, workbook, literature, SessionStore::new())
    }

    fn assemble(
        dataset: Dataset,
        workbook: Option<ValidatedWorkbook>,
        literature: Arc<dyn LiteratureSource>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                dataset,
                workbook,
                literature,
                sessions,
            }),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.inner.dataset
    }

    pub fn workbook(&self) -> Option<&ValidatedWorkbook> {
        self.inner.workbook.as_ref()
    }

    pub fn literature(&self) -> &dyn LiteratureSource {
        self.inner.literature.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}
