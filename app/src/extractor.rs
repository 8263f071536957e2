// ==============================================================================
// extractor.rs - Gene Lookup & Cohort Sample Extraction
// ==============================================================================
// Description: Finds a gene in the per-sample table and splits its values
//              into old and young donor cohorts by column-name marker
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Column naming convention:
//   <sample>.OD...   old donor
//   <sample>.YD...   young donor
// A column carrying both markers is counted in both cohorts.
// ==============================================================================

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dataset::SampleTable;
use crate::models::GeneId;

pub const OLD_COHORT_MARKER: &str = ".OD";
pub const YOUNG_COHORT_MARKER: &str = ".YD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cohort {
    Old,
    Young,
}

impl Cohort {
    pub fn marker(&self) -> &'static str {
        match self {
            Cohort::Old => OLD_COHORT_MARKER,
            Cohort::Young => YOUNG_COHORT_MARKER,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Cohort::Old => "Old",
            Cohort::Young => "Young",
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        column.contains(self.marker())
    }
}

/// How the symbol matched the sample table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "matches", rename_all = "lowercase")]
pub enum MatchReason {
    Unique,
    /// Several rows share the symbol; only the first is used
    Duplicate(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Gene '{symbol}' not found in sample table")]
    NotFound { symbol: String },
}

/// Old and young sample values for one gene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSamples {
    pub gene_symbol: String,
    pub gene_id: GeneId,
    pub old_values: Vec<f64>,
    pub young_values: Vec<f64>,
    pub match_reason: MatchReason,
    /// Columns that carry both cohort markers
    pub ambiguous_columns: Vec<String>,
}

/// Look up `symbol` (exact, case-sensitive) and split the first matching
/// row's values by cohort marker, in sheet column order.
///
/// Either both sequences are produced (possibly empty) or `NotFound`.
pub fn extract_samples(table: &SampleTable, symbol: &str) -> Result<CohortSamples, ExtractError> {
    let mut matches = table.rows.iter().filter(|row| row.gene_symbol == symbol);

    let row = matches.next().ok_or_else(|| ExtractError::NotFound {
        symbol: symbol.to_string(),
    })?;

    let extra = matches.count();
    let match_reason = if extra == 0 {
        MatchReason::Unique
    } else {
        warn!("Gene {} matches {} rows; using the first", symbol, extra + 1);
        MatchReason::Duplicate(extra + 1)
    };

    let mut old_values = Vec::new();
    let mut young_values = Vec::new();
    let mut ambiguous_columns = Vec::new();

    for (column, value) in &row.cohort_columns {
        let is_old = Cohort::Old.contains(column);
        let is_young = Cohort::Young.contains(column);

        if is_old {
            old_values.push(*value);
        }
        if is_young {
            young_values.push(*value);
        }
        if is_old && is_young {
            ambiguous_columns.push(column.clone());
        }
    }

    if !ambiguous_columns.is_empty() {
        warn!(
            "Columns {:?} carry both {} and {} markers; counted in both cohorts",
            ambiguous_columns, OLD_COHORT_MARKER, YOUNG_COHORT_MARKER
        );
    }

    debug!(
        "Extracted {}: {} old, {} young values",
        symbol,
        old_values.len(),
        young_values.len()
    );

    Ok(CohortSamples {
        gene_symbol: row.gene_symbol.clone(),
        gene_id: row.gene_id.clone(),
        old_values,
        young_values,
        match_reason,
        ambiguous_columns,
    })
}
