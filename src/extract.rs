// src/extract.rs
//
// Turns one stacked table inside a sheet into tidy long-form records.
// The caller owns the positional knowledge (where each section sits);
// this module owns label cleaning, the year axis, and value parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::PipelineError;
use crate::layout::SectionLayout;
use crate::sheet::RawGrid;

/// The three measures the publisher reports per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Capacity,
    Generation,
    LoadFactor,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Capacity => write!(f, "capacity"),
            Metric::Generation => write!(f, "generation"),
            Metric::LoadFactor => write!(f, "load factor"),
        }
    }
}

/// One (source row, year) observation, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub raw_label: String,
    pub year: i32,
    pub metric: Metric,
    pub value: Option<f64>,
}

/// Trailing footnote marker, e.g. "Offshore Wind [note 4]".
static FOOTNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\[\s*note\s*\d+\s*\]\s*$").expect("footnote pattern"));

/// Tokens the publisher uses for suppressed or inapplicable values.
/// Matched case-insensitively after trimming; kept in one place so a
/// vocabulary change is a one-line edit.
pub const PLACEHOLDER_TOKENS: &[&str] = &["[x]", "x", "-", ".."];

/// Strip trailing "[note N]" markers (there can be more than one) and
/// surrounding whitespace. Runs before classification and before
/// blank-row filtering.
pub fn clean_label(raw: &str) -> String {
    let mut label = raw.trim().to_string();
    loop {
        let stripped = FOOTNOTE.replace(&label, "").trim_end().to_string();
        if stripped == label {
            break;
        }
        label = stripped;
    }
    label
}

fn is_placeholder(token: &str) -> bool {
    PLACEHOLDER_TOKENS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(token))
}

/// Parse one value cell. Placeholders and empty cells are absent; commas
/// are accepted as thousands separators; anything else that fails a float
/// parse aborts the run rather than silently becoming absent.
fn parse_value(
    cell: Option<&str>,
    sheet: &str,
    row: usize,
    column: usize,
) -> Result<Option<f64>, PipelineError> {
    let raw = match cell {
        Some(text) => text.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() || is_placeholder(raw) {
        return Ok(None);
    }
    let numeric = raw.replace(',', "");
    match numeric.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(PipelineError::MalformedValue {
            sheet: sheet.to_string(),
            row,
            column,
            raw: raw.to_string(),
        }),
    }
}

/// The ordered run of years from one section's header row. Value columns
/// are matched to it positionally, so a gapped header must fail loudly
/// instead of misaligning every column to its right.
#[derive(Debug, Clone, PartialEq)]
pub struct YearAxis {
    years: Vec<i32>,
}

impl YearAxis {
    /// Read years from `header_row`, starting at column 1 (column 0 is the
    /// label column) and stopping at the first cell that is empty or not a
    /// year. Year cells may carry the same footnote markers as labels.
    pub fn parse(grid: &RawGrid, sheet: &str, header_row: usize) -> Result<Self, PipelineError> {
        let empty = Vec::new();
        let row = grid.get(header_row).unwrap_or(&empty);

        let mut years = Vec::new();
        for cell in row.iter().skip(1) {
            let text = match cell {
                Some(text) => clean_label(text),
                None => break,
            };
            match text.parse::<i32>() {
                Ok(year) => years.push(year),
                Err(_) => break,
            }
        }

        if years.is_empty() {
            return Err(PipelineError::EmptyYearAxis {
                sheet: sheet.to_string(),
                row: header_row,
            });
        }
        for pair in years.windows(2) {
            if pair[1] != pair[0] + 1 {
                return Err(PipelineError::YearAxisGap {
                    sheet: sheet.to_string(),
                    after: pair[0],
                    found: pair[1],
                });
            }
        }
        Ok(Self { years })
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Slice one metric block out of the grid. The row range is inclusive;
/// column 0 is the raw source label and columns `1..=N` are per-year
/// values matched positionally against `axis`. Rows whose cleaned label
/// is empty are spacer rows and contribute nothing.
///
/// The section title is validated at its expected offset first, so a
/// publisher layout drift surfaces as [`PipelineError::SectionTitleMismatch`]
/// instead of silently mis-sliced data.
pub fn extract_section(
    grid: &RawGrid,
    sheet: &str,
    section: &SectionLayout,
    axis: &YearAxis,
) -> Result<Vec<ExtractedRecord>, PipelineError> {
    let found_title = grid
        .get(section.title_row)
        .and_then(|row| row.first())
        .and_then(|cell| cell.as_deref())
        .map(clean_label)
        .unwrap_or_default();
    if !found_title.eq_ignore_ascii_case(section.title.trim()) {
        return Err(PipelineError::SectionTitleMismatch {
            sheet: sheet.to_string(),
            row: section.title_row,
            expected: section.title.clone(),
            found: found_title,
        });
    }

    let mut records = Vec::new();
    for row_idx in section.row_start..=section.row_end {
        let Some(row) = grid.get(row_idx) else {
            continue;
        };
        let label = row
            .first()
            .and_then(|cell| cell.as_deref())
            .map(clean_label)
            .unwrap_or_default();
        if label.is_empty() {
            continue;
        }

        for (i, &year) in axis.years().iter().enumerate() {
            let column = i + 1;
            let cell = row.get(column).and_then(|c| c.as_deref());
            let value = parse_value(cell, sheet, row_idx, column)?;
            records.push(ExtractedRecord {
                raw_label: label.clone(),
                year,
                metric: section.metric,
                value,
            });
        }
    }

    debug!(
        sheet = %sheet,
        metric = %section.metric,
        rows = section.row_end - section.row_start + 1,
        records = records.len(),
        "extracted section"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> RawGrid {
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            None
                        } else {
                            Some(cell.to_string())
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn section(metric: Metric, title_row: usize, row_start: usize, row_end: usize) -> SectionLayout {
        SectionLayout {
            metric,
            title: "Cumulative Installed Capacity (MW)".to_string(),
            title_row,
            year_row: title_row + 1,
            row_start,
            row_end,
        }
    }

    #[test]
    fn footnote_markers_strip_for_any_note_number() {
        assert_eq!(clean_label("Offshore Wind [note 4]"), "Offshore Wind");
        assert_eq!(clean_label("Offshore Wind [Note 17]"), "Offshore Wind");
        assert_eq!(clean_label("Total [note 1] [note 12]"), "Total");
        assert_eq!(clean_label("  Onshore Wind  "), "Onshore Wind");
        // Only trailing markers are footnotes.
        assert_eq!(clean_label("[note 2] Hydro"), "[note 2] Hydro");
    }

    #[test]
    fn placeholders_become_absent_in_any_case() {
        for token in ["[x]", "[X]", "x", "X", "-", "..", " [x] "] {
            let parsed = parse_value(Some(token), "Annual", 3, 1).unwrap();
            assert_eq!(parsed, None, "token {:?}", token);
        }
    }

    #[test]
    fn placeholder_is_never_zero() {
        assert_eq!(parse_value(Some("0"), "Annual", 3, 1).unwrap(), Some(0.0));
        assert_eq!(parse_value(Some("x"), "Annual", 3, 1).unwrap(), None);
    }

    #[test]
    fn thousands_separators_parse() {
        assert_eq!(
            parse_value(Some("1,234.5"), "Annual", 3, 1).unwrap(),
            Some(1234.5)
        );
    }

    #[test]
    fn unexpected_token_is_malformed_value() {
        let err = parse_value(Some("n/a"), "Annual", 7, 3).unwrap_err();
        match err {
            PipelineError::MalformedValue {
                sheet,
                row,
                column,
                raw,
            } => {
                assert_eq!(sheet, "Annual");
                assert_eq!((row, column), (7, 3));
                assert_eq!(raw, "n/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn year_axis_parses_and_ignores_footnotes() {
        let g = grid(&[&["", "2009 [note 1]", "2010", "2011"]]);
        let axis = YearAxis::parse(&g, "Annual", 0).unwrap();
        assert_eq!(axis.years(), &[2009, 2010, 2011]);
    }

    #[test]
    fn gapped_year_axis_fails() {
        let g = grid(&[&["", "2009", "2011"]]);
        let err = YearAxis::parse(&g, "Annual", 0).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::YearAxisGap {
                after: 2009,
                found: 2011,
                ..
            }
        ));
    }

    #[test]
    fn header_without_years_fails() {
        let g = grid(&[&["Source", "capacity", "generation"]]);
        let err = YearAxis::parse(&g, "Annual", 0).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyYearAxis { row: 0, .. }));
    }

    #[test]
    fn extracts_synthetic_capacity_block() {
        let g = grid(&[
            &["Cumulative Installed Capacity (MW)"],
            &["", "2009", "2010"],
            &["Onshore Wind", "100", "150"],
            &["Offshore Wind [note 2]", "10", "[x]"],
        ]);
        let axis = YearAxis::parse(&g, "Annual", 1).unwrap();
        let records =
            extract_section(&g, "Annual", &section(Metric::Capacity, 0, 2, 3), &axis).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].raw_label, "Onshore Wind");
        assert_eq!(records[0].year, 2009);
        assert_eq!(records[0].value, Some(100.0));
        assert_eq!(records[1].value, Some(150.0));
        assert_eq!(records[2].raw_label, "Offshore Wind");
        assert_eq!(records[2].value, Some(10.0));
        assert_eq!(records[3].year, 2010);
        assert_eq!(records[3].value, None);
        assert!(records.iter().all(|r| r.metric == Metric::Capacity));
    }

    #[test]
    fn blank_label_rows_contribute_nothing() {
        let g = grid(&[
            &["Cumulative Installed Capacity (MW)"],
            &["", "2009", "2010"],
            &["", "1", "2"],
            &["   ", "3", "4"],
            &["[note 3]", "5", "6"],
            &["Hydro", "7", "8"],
        ]);
        let axis = YearAxis::parse(&g, "Annual", 1).unwrap();
        let records =
            extract_section(&g, "Annual", &section(Metric::Capacity, 0, 2, 5), &axis).unwrap();
        // Blank, whitespace-only and footnote-only labels are all spacer
        // rows; only Hydro survives.
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.raw_label == "Hydro"));
    }

    #[test]
    fn wrong_section_title_fails_before_slicing() {
        let g = grid(&[
            &["Generation (GWh)"],
            &["", "2009"],
            &["Onshore Wind", "nonsense-that-would-error"],
        ]);
        let axis = YearAxis::parse(&g, "Annual", 1).unwrap();
        let err =
            extract_section(&g, "Annual", &section(Metric::Capacity, 0, 2, 2), &axis).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SectionTitleMismatch { row: 0, .. }
        ));
    }

    #[test]
    fn rows_past_grid_end_are_spacer_rows() {
        let g = grid(&[
            &["Cumulative Installed Capacity (MW)"],
            &["", "2009"],
            &["Hydro", "5"],
        ]);
        let axis = YearAxis::parse(&g, "Annual", 1).unwrap();
        let records =
            extract_section(&g, "Annual", &section(Metric::Capacity, 0, 2, 9), &axis).unwrap();
        assert_eq!(records.len(), 1);
    }
}
