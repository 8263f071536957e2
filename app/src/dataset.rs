// ==============================================================================
// dataset.rs - Supplementary Workbook Loader
// ==============================================================================
// Description: Reads the limma results and per-sample values sheets into the
//              read-only dataset shared by every dashboard handler
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Layout (both sheets):
//   row 0-1  title / notes (skipped)
//   row 2    header
//   row 3..  one gene per row
// ==============================================================================

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{DifferentialResultRow, GeneId, SampleValuesRow};

pub const DEFAULT_RESULTS_SHEET: &str = "S4B limma results";
pub const DEFAULT_VALUES_SHEET: &str = "S4A values";

/// Physical row holding the column names
pub const HEADER_ROW: u32 = 2;

pub const SYMBOL_COLUMN: &str = "EntrezGeneSymbol";
pub const GENE_ID_COLUMN: &str = "EntrezGeneID";
pub const LOG_FC_COLUMN: &str = "logFC";
pub const ADJ_P_COLUMN: &str = "adj.P.Val";

/// Errors that can occur while loading the workbook
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Sheet '{sheet}' not found in workbook")]
    MissingSheet { sheet: String },

    #[error("Sheet '{sheet}' has no header at row {row}")]
    MissingHeader { sheet: String, row: u32 },

    #[error("Sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },
}

/// Per-sample values for every gene, with the sheet's value columns in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTable {
    pub columns: Vec<String>,
    pub rows: Vec<SampleValuesRow>,
}

/// Both sheets, loaded once at startup and never mutated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub results: Vec<DifferentialResultRow>,
    pub samples: SampleTable,
}

/// Loader for the two-sheet supplementary workbook
#[derive(Debug, Clone)]
pub struct WorkbookLoader {
    pub results_sheet: String,
    pub values_sheet: String,
    pub header_row: u32,
}

impl Default for WorkbookLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookLoader {
    pub fn new() -> Self {
        Self {
            results_sheet: DEFAULT_RESULTS_SHEET.to_string(),
            values_sheet: DEFAULT_VALUES_SHEET.to_string(),
            header_row: HEADER_ROW,
        }
    }

    /// Open the workbook and parse both sheets
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset, DatasetError> {
        let path = path.as_ref();
        info!("Loading workbook: {:?}", path);

        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names();

        for sheet in [&self.results_sheet, &self.values_sheet] {
            if !sheet_names.iter().any(|name| name == sheet) {
                return Err(DatasetError::MissingSheet {
                    sheet: sheet.clone(),
                });
            }
        }

        let results_range = workbook.worksheet_range(&self.results_sheet)?;
        let values_range = workbook.worksheet_range(&self.values_sheet)?;

        let results = self.parse_results(&results_range)?;
        let samples = self.parse_sample_values(&values_range)?;

        info!(
            "Loaded {} result rows and {} sample rows ({} value columns)",
            results.len(),
            samples.rows.len(),
            samples.columns.len()
        );

        Ok(Dataset { results, samples })
    }

    /// Parse the limma results sheet.
    ///
    /// Rows without a gene symbol are dropped. Rows whose `logFC` or
    /// `adj.P.Val` is not a number, or whose p-value lies outside [0, 1],
    /// cannot be placed on the volcano plot and are dropped with a warning.
    pub fn parse_results(&self, range: &Range<Data>) -> Result<Vec<DifferentialResultRow>, DatasetError> {
        let sheet = &self.results_sheet;
        let (header, rows) = self.split_header(sheet, range)?;

        let symbol_idx = require_column(sheet, &header, SYMBOL_COLUMN)?;
        let log_fc_idx = require_column(sheet, &header, LOG_FC_COLUMN)?;
        let adj_p_idx = require_column(sheet, &header, ADJ_P_COLUMN)?;
        let gene_id_idx = find_column(&header, GENE_ID_COLUMN);

        let mut results = Vec::new();
        let mut missing_symbol = 0usize;
        let mut unusable = 0usize;

        for row in rows {
            let Some(symbol) = cell_symbol(row.get(symbol_idx)) else {
                missing_symbol += 1;
                continue;
            };

            let log_fc = row.get(log_fc_idx).and_then(cell_to_f64);
            let adj_p = row.get(adj_p_idx).and_then(cell_to_f64);

            let (log_fc, adj_p) = match (log_fc, adj_p) {
                (Some(fc), Some(p)) if (0.0..=1.0).contains(&p) && fc.is_finite() => (fc, p),
                _ => {
                    debug!("Dropping {}: logFC={:?} adj.P.Val={:?}", symbol, log_fc, adj_p);
                    unusable += 1;
                    continue;
                }
            };

            let gene_id = gene_id_idx.and_then(|idx| cell_gene_id(row.get(idx)));
            results.push(DifferentialResultRow::new(symbol, gene_id, log_fc, adj_p));
        }

        if missing_symbol > 0 {
            debug!("{}: dropped {} rows without a gene symbol", sheet, missing_symbol);
        }
        if unusable > 0 {
            warn!("{}: dropped {} rows with unusable logFC/adj.P.Val", sheet, unusable);
        }

        Ok(results)
    }

    /// Parse the wide per-sample values sheet.
    ///
    /// Every column other than the symbol and id columns is kept as a value
    /// column; empty or non-numeric cells are skipped for that row.
    pub fn parse_sample_values(&self, range: &Range<Data>) -> Result<SampleTable, DatasetError> {
        let sheet = &self.values_sheet;
        let (header, rows) = self.split_header(sheet, range)?;

        let symbol_idx = require_column(sheet, &header, SYMBOL_COLUMN)?;
        let gene_id_idx = require_column(sheet, &header, GENE_ID_COLUMN)?;

        let value_columns: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .filter(|(idx, name)| *idx != symbol_idx && *idx != gene_id_idx && !name.is_empty())
            .map(|(idx, name)| (idx, name.clone()))
            .collect();

        let mut table = SampleTable {
            columns: value_columns.iter().map(|(_, name)| name.clone()).collect(),
            rows: Vec::new(),
        };
        let mut skipped = 0usize;

        for row in rows {
            let Some(symbol) = cell_symbol(row.get(symbol_idx)) else {
                skipped += 1;
                continue;
            };
            let gene_id = cell_gene_id(row.get(gene_id_idx)).unwrap_or_else(|| GeneId(String::new()));

            let cohort_columns = value_columns
                .iter()
                .filter_map(|(idx, name)| {
                    row.get(*idx)
                        .and_then(cell_to_f64)
                        .map(|value| (name.clone(), value))
                })
                .collect();

            table.rows.push(SampleValuesRow {
                gene_symbol: symbol,
                gene_id,
                cohort_columns,
            });
        }

        if skipped > 0 {
            debug!("{}: skipped {} rows without a gene symbol", sheet, skipped);
        }

        Ok(table)
    }

    /// Header names and the data rows below them.
    ///
    /// calamine trims leading empty rows, so the physical header row is
    /// translated relative to where the used range starts.
    fn split_header<'a>(
        &self,
        sheet: &str,
        range: &'a Range<Data>,
    ) -> Result<(Vec<String>, impl Iterator<Item = &'a [Data]>), DatasetError> {
        let start_row = range.start().map(|(row, _)| row).unwrap_or(0);
        let offset = self.header_row.saturating_sub(start_row) as usize;

        let mut rows = range.rows().skip(offset);
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| DatasetError::MissingHeader {
                sheet: sheet.to_string(),
                row: self.header_row,
            })?
            .iter()
            .map(|cell| cell_to_string(cell).trim().to_string())
            .collect();

        Ok((header, rows))
    }
}

fn find_column(header: &[String], column: &str) -> Option<usize> {
    header.iter().position(|name| name == column)
}

fn require_column(sheet: &str, header: &[String], column: &str) -> Result<usize, DatasetError> {
    find_column(header, column).ok_or_else(|| DatasetError::MissingColumn {
        sheet: sheet.to_string(),
        column: column.to_string(),
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("ERR({e:?})"),
        Data::Float(n) => n.to_string(),
        Data::Int(i) => i.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn cell_to_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| !v.is_nan())
}

fn cell_symbol(cell: Option<&Data>) -> Option<String> {
    let symbol = cell_to_string(cell?);
    let symbol = symbol.trim();
    (!symbol.is_empty()).then(|| symbol.to_string())
}

/// Entrez ids are often stored as floats; render 7157.0 as "7157"
fn cell_gene_id(cell: Option<&Data>) -> Option<GeneId> {
    let id = match cell? {
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        Data::String(s) => s.trim().to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(GeneId(id))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an in-memory sheet from rows of cells, starting at A1
    pub(crate) fn sheet(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height.saturating_sub(1), width.saturating_sub(1)));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    fn title_rows(width: usize) -> Vec<Vec<Data>> {
        let mut title = vec![s("Table S4B")];
        title.resize(width, Data::Empty);
        vec![title, vec![Data::Empty; width]]
    }

    #[test]
    fn test_parse_results_drops_missing_symbols() {
        let mut rows = title_rows(4);
        rows.push(vec![s("EntrezGeneSymbol"), s("EntrezGeneID"), s("logFC"), s("adj.P.Val")]);
        rows.push(vec![s("TP53"), Data::Float(7157.0), Data::Float(1.5), Data::Float(0.01)]);
        rows.push(vec![Data::Empty, Data::Float(1.0), Data::Float(0.2), Data::Float(0.5)]);
        rows.push(vec![s("  "), Data::Float(2.0), Data::Float(0.2), Data::Float(0.5)]);
        rows.push(vec![s("GDF15"), Data::Int(9518), Data::Float(-0.8), Data::Float(0.0)]);

        let results = WorkbookLoader::new().parse_results(&sheet(rows)).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].gene_symbol, "TP53");
        assert_eq!(results[0].gene_id, Some(GeneId("7157".to_string())));
        assert_eq!(results[0].derived_significance, Some(-(0.01f64).log10()));
        assert_eq!(results[1].gene_symbol, "GDF15");
        assert_eq!(results[1].gene_id, Some(GeneId("9518".to_string())));
        assert_eq!(results[1].derived_significance, None);
    }

    #[test]
    fn test_parse_results_drops_unusable_values() {
        let mut rows = title_rows(3);
        rows.push(vec![s("EntrezGeneSymbol"), s("logFC"), s("adj.P.Val")]);
        rows.push(vec![s("A"), s("n/a"), Data::Float(0.1)]);
        rows.push(vec![s("B"), Data::Float(0.3), Data::Empty]);
        rows.push(vec![s("C"), Data::Float(0.3), Data::Float(1.5)]);
        rows.push(vec![s("D"), s("0.4"), s("0.2")]);

        let results = WorkbookLoader::new().parse_results(&sheet(rows)).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].gene_symbol, "D");
        assert_eq!(results[0].log2_fold_change, 0.4);
        assert_eq!(results[0].gene_id, None);
    }

    #[test]
    fn test_parse_results_missing_column() {
        let mut rows = title_rows(2);
        rows.push(vec![s("EntrezGeneSymbol"), s("logFC")]);
        rows.push(vec![s("A"), Data::Float(1.0)]);

        let err = WorkbookLoader::new().parse_results(&sheet(rows)).unwrap_err();
        match err {
            DatasetError::MissingColumn { column, .. } => assert_eq!(column, "adj.P.Val"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_results_without_header_row() {
        let rows = title_rows(2);
        let err = WorkbookLoader::new().parse_results(&sheet(rows)).unwrap_err();
        assert!(matches!(err, DatasetError::MissingHeader { row: 2, .. }));
    }

    #[test]
    fn test_parse_sample_values_keeps_column_order() {
        let mut rows = title_rows(6);
        rows.push(vec![
            s("SeqId"),
            s("EntrezGeneSymbol"),
            s("EntrezGeneID"),
            s("S1.OD"),
            s("S2.YD"),
            s("S3.OD"),
        ]);
        rows.push(vec![
            s("10000-28"),
            s("X"),
            Data::Float(42.0),
            Data::Float(3.0),
            Data::Float(1.0),
            Data::Float(5.0),
        ]);
        rows.push(vec![
            s("10001-7"),
            s("Y"),
            s("43"),
            Data::Empty,
            Data::Int(2),
            s("bad"),
        ]);

        let table = WorkbookLoader::new().parse_sample_values(&sheet(rows)).unwrap();

        assert_eq!(table.columns, vec!["SeqId", "S1.OD", "S2.YD", "S3.OD"]);
        assert_eq!(table.rows.len(), 2);

        let x = &table.rows[0];
        assert_eq!(x.gene_id, GeneId("42".to_string()));
        assert_eq!(
            x.cohort_columns,
            vec![
                ("S1.OD".to_string(), 3.0),
                ("S2.YD".to_string(), 1.0),
                ("S3.OD".to_string(), 5.0),
            ]
        );

        let y = &table.rows[1];
        assert_eq!(y.gene_id, GeneId("43".to_string()));
        assert_eq!(y.cohort_columns, vec![("S2.YD".to_string(), 2.0)]);
    }

    #[test]
    fn test_header_row_relative_to_trimmed_range() {
        // Used range starting at the header row (leading rows were empty)
        let mut range = Range::new((2, 0), (3, 2));
        range.set_value((2, 0), s("EntrezGeneSymbol"));
        range.set_value((2, 1), s("logFC"));
        range.set_value((2, 2), s("adj.P.Val"));
        range.set_value((3, 0), s("A"));
        range.set_value((3, 1), Data::Float(1.0));
        range.set_value((3, 2), Data::Float(0.5));

        let results = WorkbookLoader::new().parse_results(&range).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].gene_symbol, "A");
    }

    #[test]
    fn test_load_missing_file() {
        let result = WorkbookLoader::new().load("/nonexistent/workbook.xlsx");
        assert!(result.is_err());
    }

    mod xlsx {
        use super::*;
        use std::io::Write;
        use tempfile::NamedTempFile;
        use zip::{write::SimpleFileOptions, ZipWriter};

        fn cell_xml(row: usize, col: usize, cell: &Data) -> String {
            let reference = format!("{}{}", (b'A' + col as u8) as char, row + 1);
            match cell {
                Data::String(text) => format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#
                ),
                Data::Float(value) => format!(r#"<c r="{reference}"><v>{value}</v></c>"#),
                _ => String::new(),
            }
        }

        fn sheet_xml(rows: &[Vec<Data>]) -> String {
            let body: String = rows
                .iter()
                .enumerate()
                .map(|(r, cells)| {
                    let cells: String = cells
                        .iter()
                        .enumerate()
                        .map(|(c, cell)| cell_xml(r, c, cell))
                        .collect();
                    format!(r#"<row r="{}">{}</row>"#, r + 1, cells)
                })
                .collect();
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{body}</sheetData></worksheet>"#
            )
        }

        /// Minimal xlsx package with inline-string cells, one worksheet per entry
        pub(super) fn write_workbook(sheets: &[(&str, Vec<Vec<Data>>)]) -> NamedTempFile {
            let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
            let mut zip = ZipWriter::new(file.as_file());
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

            let overrides: String = (1..=sheets.len())
                .map(|i| format!(
                    r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
                ))
                .collect();
            let sheet_entries: String = sheets
                .iter()
                .enumerate()
                .map(|(i, (name, _))| {
                    format!(r#"<sheet name="{name}" sheetId="{id}" r:id="rId{id}"/>"#, id = i + 1)
                })
                .collect();
            let relationships: String = (1..=sheets.len())
                .map(|i| format!(
                    r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
                ))
                .collect();

            let mut parts = vec![
                (
                    "[Content_Types].xml".to_string(),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
                    ),
                ),
                (
                    "_rels/.rels".to_string(),
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
                ),
                (
                    "xl/workbook.xml".to_string(),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
                    ),
                ),
                (
                    "xl/_rels/workbook.xml.rels".to_string(),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
                    ),
                ),
            ];
            for (i, (_, rows)) in sheets.iter().enumerate() {
                parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(rows)));
            }

            for (name, contents) in parts {
                zip.start_file(name, options).unwrap();
                zip.write_all(contents.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
            file
        }

        fn results_rows() -> Vec<Vec<Data>> {
            vec![
                vec![s("Table S4B limma results")],
                vec![],
                vec![s("EntrezGeneSymbol"), s("EntrezGeneID"), s("logFC"), s("adj.P.Val")],
                vec![s("TP53"), Data::Float(7157.0), Data::Float(1.5), Data::Float(0.01)],
                vec![s("GDF15"), Data::Float(9518.0), Data::Float(-0.4), Data::Float(0.2)],
            ]
        }

        fn values_rows() -> Vec<Vec<Data>> {
            vec![
                vec![s("Table S4A values")],
                vec![],
                vec![s("EntrezGeneSymbol"), s("EntrezGeneID"), s("S1.OD"), s("S2.YD")],
                vec![s("TP53"), Data::Float(7157.0), Data::Float(3.0), Data::Float(1.0)],
            ]
        }

        #[test]
        fn test_load_both_sheets() {
            let file = write_workbook(&[
                (DEFAULT_RESULTS_SHEET, results_rows()),
                (DEFAULT_VALUES_SHEET, values_rows()),
            ]);

            let dataset = WorkbookLoader::new().load(file.path()).unwrap();

            assert_eq!(dataset.results.len(), 2);
            assert_eq!(dataset.results[0].gene_symbol, "TP53");
            assert_eq!(dataset.results[0].gene_id, Some(GeneId("7157".to_string())));
            assert_eq!(dataset.results[0].log2_fold_change, 1.5);
            assert_eq!(dataset.results[1].adjusted_p_value, 0.2);

            assert_eq!(dataset.samples.columns, vec!["S1.OD", "S2.YD"]);
            assert_eq!(dataset.samples.rows.len(), 1);
            assert_eq!(dataset.samples.rows[0].gene_id, GeneId("7157".to_string()));
            assert_eq!(
                dataset.samples.rows[0].cohort_columns,
                vec![("S1.OD".to_string(), 3.0), ("S2.YD".to_string(), 1.0)]
            );
        }

        #[test]
        fn test_load_missing_values_sheet() {
            let file = write_workbook(&[(DEFAULT_RESULTS_SHEET, results_rows())]);

            let err = WorkbookLoader::new().load(file.path()).unwrap_err();
            match err {
                DatasetError::MissingSheet { sheet } => assert_eq!(sheet, DEFAULT_VALUES_SHEET),
                other => panic!("expected MissingSheet, got {other:?}"),
            }
        }
    }
}
