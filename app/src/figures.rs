// ==============================================================================
// figures.rs - Plotly Figure Builders
// ==============================================================================
// Description: Renders volcano classifications and cohort samples as
//              Plotly-compatible JSON figures ({"data": [...], "layout": {}})
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde_json::{json, Value};

use crate::classifier::VolcanoClassification;
use crate::extractor::{Cohort, CohortSamples};

pub const VOLCANO_TITLE: &str = "Volcano plot (Click on a point)";

/// Figure with no traces, shown before a selection or for unknown genes
pub fn empty_figure() -> Value {
    json!({ "data": [], "layout": {} })
}

/// Volcano scatter colored by label, plus the threshold guide lines
pub fn volcano_figure(classification: &VolcanoClassification) -> Value {
    let points = &classification.points;

    let mut data = vec![json!({
        "type": "scatter",
        "mode": "markers",
        "name": "genes",
        "x": points.iter().map(|p| p.x).collect::<Vec<_>>(),
        "y": points.iter().map(|p| p.y).collect::<Vec<_>>(),
        "text": points.iter().map(|p| p.gene_symbol.as_str()).collect::<Vec<_>>(),
        "customdata": points.iter().map(|p| p.gene_symbol.as_str()).collect::<Vec<_>>(),
        "marker": {
            "size": 6,
            "color": points.iter().map(|p| p.label.color()).collect::<Vec<_>>(),
        },
        "showlegend": false,
    })];

    for guide in &classification.guides {
        data.push(json!({
            "type": "scatter",
            "mode": "lines",
            "x": [guide.x0, guide.x1],
            "y": [guide.y0, guide.y1],
            "line": { "color": "black", "dash": "dash", "width": 1 },
            "hoverinfo": "skip",
            "showlegend": false,
        }));
    }

    json!({
        "data": data,
        "layout": {
            "title": VOLCANO_TITLE,
            "xaxis": { "title": "log2 Fold change" },
            "yaxis": { "title": "-log10 Adjusted P-value" },
            "hovermode": "closest",
            "height": 600,
        }
    })
}

/// Young-vs-old boxplot; a cohort with no values gets no box
pub fn box_figure(samples: &CohortSamples) -> Value {
    let data: Vec<Value> = [
        (Cohort::Young, &samples.young_values),
        (Cohort::Old, &samples.old_values),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(cohort, values)| {
        json!({
            "type": "box",
            "y": values,
            "name": cohort.display_name(),
            "boxpoints": "all",
            "boxmean": true,
        })
    })
    .collect();

    json!({
        "data": data,
        "layout": {
            "title": format!("Expression for {}", samples.gene_symbol),
            "yaxis": { "title": "Protein concentration" },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::extractor::MatchReason;
    use crate::models::{DifferentialResultRow, GeneId, ThresholdState};

    fn samples(old: Vec<f64>, young: Vec<f64>) -> CohortSamples {
        CohortSamples {
            gene_symbol: "X".to_string(),
            gene_id: GeneId("42".to_string()),
            old_values: old,
            young_values: young,
            match_reason: MatchReason::Unique,
            ambiguous_columns: Vec::new(),
        }
    }

    #[test]
    fn test_volcano_figure_traces() {
        let rows = vec![
            DifferentialResultRow::new("A", None, 2.0, 0.01),
            DifferentialResultRow::new("B", None, 0.1, 0.0),
        ];
        let figure = volcano_figure(&classify(&rows, &ThresholdState::default()));

        let data = figure["data"].as_array().unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(data[0]["customdata"], json!(["A", "B"]));
        assert_eq!(data[0]["marker"]["color"], json!(["red", "grey"]));
        assert_eq!(data[0]["y"][1], Value::Null);
        assert_eq!(figure["layout"]["title"], VOLCANO_TITLE);
    }

    #[test]
    fn test_box_figure_young_first() {
        let figure = box_figure(&samples(vec![3.0, 5.0], vec![1.0]));
        let data = figure["data"].as_array().unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "Young");
        assert_eq!(data[0]["y"], json!([1.0]));
        assert_eq!(data[1]["name"], "Old");
        assert_eq!(data[1]["y"], json!([3.0, 5.0]));
        assert_eq!(figure["layout"]["title"], "Expression for X");
    }

    #[test]
    fn test_box_figure_skips_empty_cohort() {
        let figure = box_figure(&samples(vec![3.0], vec![]));
        let data = figure["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Old");
    }

    #[test]
    fn test_empty_figure() {
        assert_eq!(empty_figure()["data"], json!([]));
    }
}
