// src/sheet.rs

use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use std::path::Path;
use tracing::debug;

use crate::error::PipelineError;

/// One sheet tab as read: text-or-absent cells at absolute (row, column)
/// positions. No numeric coercion happens here; the extractor decides what
/// a cell means.
pub type RawGrid = Vec<Vec<Option<String>>>;

/// Open `sheet` inside the workbook at `path` and materialize it as a
/// [`RawGrid`]. The workbook handle lives only for the duration of this
/// call; the file descriptor is released once the grid is built or the
/// read fails.
pub fn read_grid(path: &Path, sheet: &str) -> Result<RawGrid, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::SourceNotFound(format!(
            "workbook {}",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: XlsxError| PipelineError::CorruptWorkbook {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let range = workbook.worksheet_range(sheet).map_err(|e| match e {
        XlsxError::WorksheetNotFound(name) => PipelineError::SourceNotFound(format!(
            "sheet '{}' in {}",
            name,
            path.display()
        )),
        other => PipelineError::CorruptWorkbook {
            path: path.to_path_buf(),
            detail: other.to_string(),
        },
    })?;

    // calamine ranges start at the first populated cell; pad the grid back
    // out so layout row/column offsets stay absolute sheet coordinates.
    let grid = match range.start() {
        Some((row0, col0)) => {
            let mut grid: RawGrid = vec![Vec::new(); row0 as usize];
            for row in range.rows() {
                let mut cells: Vec<Option<String>> = vec![None; col0 as usize];
                cells.extend(row.iter().map(cell_to_text));
                grid.push(cells);
            }
            grid
        }
        None => Vec::new(),
    };

    debug!(sheet = %sheet, rows = grid.len(), "materialized grid");
    Ok(grid)
}

/// Render one cell as text, or `None` for an empty cell. Whole-number
/// floats lose their trailing `.0` so a year cell stored as `2009.0`
/// reads back as `"2009"`.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if *f == (*f as i64) as f64 && f.abs() < i64::MAX as f64 {
                Some(format!("{}", *f as i64))
            } else {
                Some(format!("{}", f))
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("#ERR:{:?}", e)),
    }
}
