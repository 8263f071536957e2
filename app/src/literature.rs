// ==============================================================================
// literature.rs - Gene Literature Lookups (MyGene.info GeneRIFs)
// ==============================================================================
// Description: Fetches GeneRIF summaries for a gene id and normalizes every
//              outcome into a tagged result
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Request:  GET {base}/v3/gene/{gene_id}
// Response: {"generif": [{"text": "...", "pubmed": 12345}, ...], ...}
//
// One request per lookup. No retry, no backoff, no cancellation and no
// timeout beyond the HTTP client's defaults.
// ==============================================================================

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{GeneId, LiteratureRecord};

pub const DEFAULT_API_BASE: &str = "https://mygene.info";

pub const NO_PAPERS_MESSAGE: &str = "No papers found for this gene.";

/// Why a lookup produced no records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// No HTTP response at all
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx status other than 404
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// 2xx but the body is not the expected shape
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

/// Tagged lookup result. Only `into_records` produces the legacy
/// "error" sentinel shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Vec<LiteratureRecord>),
    NotFound(String),
    Failed(LookupFailure),
}

impl LookupOutcome {
    /// Legacy record list: the records themselves, or a single sentinel
    /// record whose text explains the absence or failure.
    pub fn into_records(self) -> Vec<LiteratureRecord> {
        match self {
            LookupOutcome::Found(records) => records,
            LookupOutcome::NotFound(_) => vec![LiteratureRecord::sentinel(NO_PAPERS_MESSAGE)],
            LookupOutcome::Failed(failure) => vec![LiteratureRecord::sentinel(format!(
                "Error fetching literature: {}",
                failure
            ))],
        }
    }
}

/// Source of literature records for a gene
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    async fn lookup(&self, gene_id: &GeneId) -> LookupOutcome;
}

/// Classify an HTTP status and body
pub fn interpret_response(status: u16, body: &str) -> LookupOutcome {
    match status {
        200..=299 => match parse_generif(body) {
            Ok(records) => LookupOutcome::Found(records),
            Err(failure) => LookupOutcome::Failed(failure),
        },
        404 => LookupOutcome::NotFound(format!("HTTP 404: {}", body)),
        code => LookupOutcome::Failed(LookupFailure::Status {
            code,
            body: body.to_string(),
        }),
    }
}

/// Extract `generif` entries in response order.
///
/// MyGene.info returns a bare object instead of a list when a gene has a
/// single entry; both forms are accepted.
pub fn parse_generif(body: &str) -> Result<Vec<LiteratureRecord>, LookupFailure> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| LookupFailure::UnexpectedShape(format!("invalid JSON: {}", e)))?;

    let generif = json
        .get("generif")
        .ok_or_else(|| LookupFailure::UnexpectedShape("missing 'generif' field".to_string()))?;

    match generif {
        Value::Array(entries) => entries.iter().map(parse_entry).collect(),
        Value::Object(_) => Ok(vec![parse_entry(generif)?]),
        other => Err(LookupFailure::UnexpectedShape(format!(
            "'generif' is not a list: {}",
            other
        ))),
    }
}

fn parse_entry(entry: &Value) -> Result<LiteratureRecord, LookupFailure> {
    let text = entry
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| LookupFailure::UnexpectedShape("generif entry without 'text'".to_string()))?;

    let pubmed = match entry.get("pubmed") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(LookupFailure::UnexpectedShape(
                "generif entry without 'pubmed'".to_string(),
            ))
        }
    };

    Ok(LiteratureRecord::new(text, pubmed))
}

/// HTTP client for the MyGene.info gene endpoint
#[derive(Debug, Clone)]
pub struct MyGeneClient {
    client: reqwest::Client,
    base_url: String,
}

impl MyGeneClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gene_url(&self, gene_id: &GeneId) -> String {
        format!("{}/v3/gene/{}", self.base_url, gene_id)
    }
}

#[async_trait]
impl LiteratureSource for MyGeneClient {
    async fn lookup(&self, gene_id: &GeneId) -> LookupOutcome {
        let url = self.gene_url(gene_id);
        info!("Fetching literature for gene {}", gene_id);
        debug!("GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Literature lookup for {} failed: {}", gene_id, e);
                return LookupOutcome::Failed(LookupFailure::Transport(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read literature response for {}: {}", gene_id, e);
                return LookupOutcome::Failed(LookupFailure::Transport(e.to_string()));
            }
        };

        let outcome = interpret_response(status, &body);
        match &outcome {
            LookupOutcome::Found(records) => {
                info!("Gene {}: {} literature records", gene_id, records.len())
            }
            LookupOutcome::NotFound(_) => info!("Gene {}: no literature (404)", gene_id),
            LookupOutcome::Failed(failure) => warn!("Gene {}: {}", gene_id, failure),
        }
        outcome
    }
}
