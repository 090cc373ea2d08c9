// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::extract::Metric;

/// Everything that can abort a pipeline run. All variants are fatal:
/// either all five output tables are written from one coherent pass, or
/// none are. Row and column indices are zero-based sheet coordinates.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("cannot parse workbook {path}: {detail}")]
    CorruptWorkbook { path: PathBuf, detail: String },

    #[error("sheet '{sheet}' row {row} col {column}: '{raw}' is neither a placeholder nor a number")]
    MalformedValue {
        sheet: String,
        row: usize,
        column: usize,
        raw: String,
    },

    #[error("annual totals for {year} are missing the {missing} metric")]
    InconsistentTotals { year: i32, missing: Metric },

    #[error("sheet '{sheet}' year header: gap after {after}, found {found}")]
    YearAxisGap { sheet: String, after: i32, found: i32 },

    #[error("sheet '{sheet}' row {row} holds no parseable years")]
    EmptyYearAxis { sheet: String, row: usize },

    #[error("sheet '{sheet}' row {row}: expected section title '{expected}', found '{found}'")]
    SectionTitleMismatch {
        sheet: String,
        row: usize,
        expected: String,
        found: String,
    },
}
