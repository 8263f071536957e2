// ==============================================================================
// presenter.rs - Literature Panel Disclosure
// ==============================================================================
// Description: Chooses which literature records are shown and how the
//              Show All / Hide control reads
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;

use crate::models::{is_failure_sentinel, DisclosureState, LiteratureRecord};

/// Records shown while the panel is collapsed
pub const PAGE_SIZE: usize = 5;

pub const SHOW_ALL_LABEL: &str = "Show All";
pub const HIDE_LABEL: &str = "Hide";

/// What the literature panel renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteraturePanel {
    pub visible: Vec<LiteratureRecord>,
    pub control_label: String,
    pub control_visible: bool,
    /// Set when the records are the failure sentinel
    pub error_message: Option<String>,
    pub total: usize,
}

/// Decide the visible records and control state.
///
/// Even toggle counts show the first `page_size` records, odd counts show
/// everything. The control is only shown when there is more than one page.
pub fn present(records: &[LiteratureRecord], disclosure: DisclosureState, page_size: usize) -> LiteraturePanel {
    let total = records.len();

    if records.is_empty() {
        return LiteraturePanel {
            visible: Vec::new(),
            control_label: String::new(),
            control_visible: false,
            error_message: None,
            total,
        };
    }

    if is_failure_sentinel(records) {
        let error = records[0].clone();
        return LiteraturePanel {
            error_message: Some(error.summary_text.clone()),
            visible: vec![error],
            control_label: String::new(),
            control_visible: false,
            total,
        };
    }

    let overflow = total > page_size;

    if disclosure.is_expanded() {
        LiteraturePanel {
            visible: records.to_vec(),
            control_label: HIDE_LABEL.to_string(),
            control_visible: overflow,
            error_message: None,
            total,
        }
    } else {
        LiteraturePanel {
            visible: records.iter().take(page_size).cloned().collect(),
            control_label: if overflow { SHOW_ALL_LABEL.to_string() } else { String::new() },
            control_visible: overflow,
            error_message: None,
            total,
        }
    }
}
