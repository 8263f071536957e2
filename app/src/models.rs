// ==============================================================================
// models.rs - Dashboard Data Models
// ==============================================================================
// Description: Differential-expression rows, sample rows, thresholds and
//              literature records shared by the processor and the dashboard
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pubmed id carried by the legacy error record
pub const ERROR_SENTINEL: &str = "error";

/// Entrez gene identifier as it appears in the workbook (e.g., "7157")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneId(pub String);

impl GeneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// -log10 of an adjusted p-value; `None` when the p-value is exactly zero
pub fn derive_significance(adjusted_p_value: f64) -> Option<f64> {
    if adjusted_p_value == 0.0 {
        None
    } else {
        Some(-adjusted_p_value.log10())
    }
}

/// One gene from the limma results sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialResultRow {
    /// Entrez gene symbol (never empty)
    pub gene_symbol: String,

    /// Entrez gene id, when the results sheet carries one
    pub gene_id: Option<GeneId>,

    pub log2_fold_change: f64,

    pub adjusted_p_value: f64,

    /// -log10(adj.P.Val), missing for a zero p-value
    pub derived_significance: Option<f64>,
}

impl DifferentialResultRow {
    pub fn new(
        gene_symbol: impl Into<String>,
        gene_id: Option<GeneId>,
        log2_fold_change: f64,
        adjusted_p_value: f64,
    ) -> Self {
        Self {
            gene_symbol: gene_symbol.into(),
            gene_id,
            log2_fold_change,
            adjusted_p_value,
            derived_significance: derive_significance(adjusted_p_value),
        }
    }
}

/// One gene from the per-sample values sheet
///
/// Cohort membership is not stored: it is read from the column names at
/// query time (see `extractor`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleValuesRow {
    pub gene_symbol: String,
    pub gene_id: GeneId,
    /// (column name, value) in sheet column order
    pub cohort_columns: Vec<(String, f64)>,
}

/// Volcano thresholds chosen with the two sliders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdState {
    pub fold_change_limit: f64,
    pub p_value_limit: f64,
}

impl Default for ThresholdState {
    fn default() -> Self {
        Self {
            fold_change_limit: 1.0,
            p_value_limit: 2.0,
        }
    }
}

/// A GeneRIF summary with its PubMed reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteratureRecord {
    pub summary_text: String,
    pub pubmed_id: String,
}

impl LiteratureRecord {
    pub fn new(summary_text: impl Into<String>, pubmed_id: impl Into<String>) -> Self {
        Self {
            summary_text: summary_text.into(),
            pubmed_id: pubmed_id.into(),
        }
    }

    /// Legacy error record: message text plus the "error" pubmed id
    pub fn sentinel(message: impl Into<String>) -> Self {
        Self::new(message, ERROR_SENTINEL)
    }

    pub fn is_sentinel(&self) -> bool {
        self.pubmed_id == ERROR_SENTINEL
    }

    /// PubMed abstract URL for this record
    pub fn pubmed_url(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.pubmed_id)
    }
}

/// Whether a legacy record list reports a failed lookup.
///
/// This is the whole contract: a list is a failure iff its first record's
/// pubmed id is "error". "No papers found" uses the same shape.
pub fn is_failure_sentinel(records: &[LiteratureRecord]) -> bool {
    records.first().is_some_and(LiteratureRecord::is_sentinel)
}

/// Show-all / hide toggle for the literature panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureState {
    pub toggle_count: u64,
}

impl DisclosureState {
    pub fn toggle(&mut self) {
        self.toggle_count = self.toggle_count.wrapping_add(1);
    }

    pub fn is_expanded(&self) -> bool {
        self.toggle_count % 2 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_p_value_is_missing() {
        assert_eq!(derive_significance(0.0), None);

        let row = DifferentialResultRow::new("TP53", None, 1.2, 0.0);
        assert!(row.derived_significance.is_none());
    }

    #[test]
    fn test_significance_is_negative_log10() {
        for p in [1.0, 0.5, 0.05, 0.001, 1e-12] {
            assert_eq!(derive_significance(p), Some(-p.log10()));
        }
        let two = derive_significance(0.01).unwrap();
        assert!((two - 2.0).abs() < 1e-12);
        assert_eq!(derive_significance(1.0), Some(0.0));
    }

    #[test]
    fn test_failure_sentinel_contract() {
        assert!(!is_failure_sentinel(&[]));
        assert!(is_failure_sentinel(&[LiteratureRecord::sentinel("boom")]));

        let ok = vec![
            LiteratureRecord::new("a", "1"),
            LiteratureRecord::sentinel("only the first record counts"),
        ];
        assert!(!is_failure_sentinel(&ok));
    }

    #[test]
    fn test_disclosure_toggle_alternates() {
        let mut state = DisclosureState::default();
        assert!(!state.is_expanded());
        state.toggle();
        assert!(state.is_expanded());
        state.toggle();
        assert!(!state.is_expanded());
        assert_eq!(state.toggle_count, 2);
    }

    #[test]
    fn test_disclosure_toggle_wraps() {
        let mut state = DisclosureState { toggle_count: u64::MAX };
        state.toggle();
        assert_eq!(state.toggle_count, 0);
    }

    #[test]
    fn test_pubmed_url() {
        let record = LiteratureRecord::new("summary", "12345");
        assert_eq!(record.pubmed_url(), "https://pubmed.ncbi.nlm.nih.gov/12345/");
    }
}
