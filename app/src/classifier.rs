// ==============================================================================
// classifier.rs - Volcano Threshold Classifier
// ==============================================================================
// Description: Labels every gene notable/background for the current slider
//              thresholds and derives the three threshold guide lines
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;

use crate::models::{DifferentialResultRow, ThresholdState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointLabel {
    Notable,
    Background,
}

impl PointLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointLabel::Notable => "notable",
            PointLabel::Background => "background",
        }
    }

    /// Marker color on the volcano plot
    pub fn color(&self) -> &'static str {
        match self {
            PointLabel::Notable => "red",
            PointLabel::Background => "grey",
        }
    }
}

/// One plotted gene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolcanoPoint {
    pub gene_symbol: String,
    pub x: f64,
    /// None for a zero p-value; such points are not drawn
    pub y: Option<f64>,
    pub label: PointLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideOrientation {
    Vertical,
    Horizontal,
}

/// Straight threshold line from (x0, y0) to (x1, y1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuideLine {
    pub orientation: GuideOrientation,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl GuideLine {
    fn vertical(x: f64, y_max: f64) -> Self {
        Self {
            orientation: GuideOrientation::Vertical,
            x0: x,
            y0: 0.0,
            x1: x,
            y1: y_max,
        }
    }

    fn horizontal(y: f64, x_min: f64, x_max: f64) -> Self {
        Self {
            orientation: GuideOrientation::Horizontal,
            x0: x_min,
            y0: y,
            x1: x_max,
            y1: y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolcanoClassification {
    pub thresholds: ThresholdState,
    pub points: Vec<VolcanoPoint>,
    pub guides: Vec<GuideLine>,
}

impl VolcanoClassification {
    pub fn count(&self, label: PointLabel) -> usize {
        self.points.iter().filter(|p| p.label == label).count()
    }

    /// Points with no drawable significance (zero p-value)
    pub fn missing_count(&self) -> usize {
        self.points.iter().filter(|p| p.y.is_none()).count()
    }
}

/// Notable iff |logFC| exceeds the fold-change limit, or the significance is
/// present and exceeds the p-value limit. A missing significance fails the
/// second clause.
pub fn label_for(row: &DifferentialResultRow, thresholds: &ThresholdState) -> PointLabel {
    let fold_change_hit = row.log2_fold_change.abs() > thresholds.fold_change_limit;
    let significance_hit = row
        .derived_significance
        .is_some_and(|y| y > thresholds.p_value_limit);

    if fold_change_hit || significance_hit {
        PointLabel::Notable
    } else {
        PointLabel::Background
    }
}

/// Classify every row and build the guide lines.
///
/// Vertical lines at ±fold_change_limit span y in [0, max significance];
/// the horizontal line at p_value_limit spans x in [min logFC, max logFC].
/// No rows yields no points and no lines. When no row has a significance
/// the vertical lines have no extent and are left out.
pub fn classify(rows: &[DifferentialResultRow], thresholds: &ThresholdState) -> VolcanoClassification {
    let points = rows
        .iter()
        .map(|row| VolcanoPoint {
            gene_symbol: row.gene_symbol.clone(),
            x: row.log2_fold_change,
            y: row.derived_significance,
            label: label_for(row, thresholds),
        })
        .collect();

    let y_max = rows
        .iter()
        .filter_map(|row| row.derived_significance)
        .reduce(f64::max);

    let x_range = rows
        .iter()
        .map(|row| row.log2_fold_change)
        .fold(None, |acc: Option<(f64, f64)>, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        });

    let mut guides = Vec::with_capacity(3);
    if let Some(y_max) = y_max {
        guides.push(GuideLine::vertical(thresholds.fold_change_limit, y_max));
        guides.push(GuideLine::vertical(-thresholds.fold_change_limit, y_max));
    }
    if let Some((x_min, x_max)) = x_range {
        guides.push(GuideLine::horizontal(thresholds.p_value_limit, x_min, x_max));
    }

    VolcanoClassification {
        thresholds: *thresholds,
        points,
        guides,
    }
}
