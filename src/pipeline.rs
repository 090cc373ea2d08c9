// src/pipeline.rs
//
// One forward pass: Reader -> Extractor -> Classifier -> Assembler ->
// writer. Synchronous and single-threaded; the job is an offline,
// re-runnable batch transform.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, instrument};

use crate::assemble;
use crate::classify::{self, ClassifiedRecord};
use crate::extract::{self, YearAxis};
use crate::layout::WorkbookLayout;
use crate::output::{self, TidyTables};
use crate::sheet;

/// Run the whole pipeline against one workbook. Any extraction or
/// parsing failure aborts before anything is written; the five tables
/// land in `out_dir` together or not at all.
#[instrument(level = "info", skip_all, fields(workbook = %workbook.display(), edition = %layout.edition))]
pub fn run(workbook: &Path, layout: &WorkbookLayout, out_dir: &Path) -> Result<()> {
    layout.validate()?;

    let mut classified: Vec<ClassifiedRecord> = Vec::new();
    for sheet_layout in &layout.sheets {
        // The grid (and the workbook handle behind it) lives only for
        // this sheet's extraction.
        let grid = sheet::read_grid(workbook, &sheet_layout.sheet)?;
        for section in &sheet_layout.sections {
            let axis = YearAxis::parse(&grid, &sheet_layout.sheet, section.year_row)?;
            let records = extract::extract_section(&grid, &sheet_layout.sheet, section, &axis)?;
            classified.extend(classify::classify_records(
                records,
                sheet_layout.region,
                sheet_layout.granularity,
            ));
        }
        info!(sheet = %sheet_layout.sheet, records = classified.len(), "sheet done");
    }

    let tables = TidyTables {
        generation: assemble::generation_by_source(&classified),
        capacity: assemble::capacity_by_source(&classified),
        load_factors: assemble::load_factors(&classified),
        regions: assemble::region_comparison(&classified),
        totals: assemble::annual_totals(&classified)?,
    };

    output::write_tables(&tables, out_dir)
        .with_context(|| format!("writing tidy tables to {}", out_dir.display()))?;
    info!(
        records = classified.len(),
        totals_years = tables.totals.len(),
        "pipeline complete"
    );
    Ok(())
}
