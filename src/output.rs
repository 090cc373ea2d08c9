// src/output.rs
//
// Serializes the five tidy tables. Each file is staged as a NamedTempFile
// in the destination directory and only persisted over the real name once
// every table has serialized, so a failed run leaves no partial output
// and an overlapping rerun never interleaves with a finished one.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::assemble::{CapacityRow, GenerationRow, LoadFactorRow, RegionRow, TotalsRow};

pub const GENERATION_FILE: &str = "generation_by_source.csv";
pub const CAPACITY_FILE: &str = "capacity_by_source.csv";
pub const LOAD_FACTORS_FILE: &str = "load_factors.csv";
pub const REGION_FILE: &str = "region_comparison.csv";
pub const TOTALS_FILE: &str = "annual_totals.csv";

/// The full output of one pipeline pass.
#[derive(Debug)]
pub struct TidyTables {
    pub generation: Vec<GenerationRow>,
    pub capacity: Vec<CapacityRow>,
    pub load_factors: Vec<LoadFactorRow>,
    pub regions: Vec<RegionRow>,
    pub totals: Vec<TotalsRow>,
}

/// Write all five tables under `out_dir`, atomically.
pub fn write_tables(tables: &TidyTables, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let staged = vec![
        stage_csv(out_dir, GENERATION_FILE, &GenerationRow::HEADER, &tables.generation)?,
        stage_csv(out_dir, CAPACITY_FILE, &CapacityRow::HEADER, &tables.capacity)?,
        stage_csv(out_dir, LOAD_FACTORS_FILE, &LoadFactorRow::HEADER, &tables.load_factors)?,
        stage_csv(out_dir, REGION_FILE, &RegionRow::HEADER, &tables.regions)?,
        stage_csv(out_dir, TOTALS_FILE, &TotalsRow::HEADER, &tables.totals)?,
    ];

    for (tmp, dest) in staged {
        tmp.persist(&dest)
            .with_context(|| format!("replacing {}", dest.display()))?;
        info!(file = %dest.display(), "wrote table");
    }
    Ok(())
}

/// Serialize one table to a temp file next to its destination. The header
/// is written explicitly so an empty table still carries its column names.
fn stage_csv<T: Serialize>(
    out_dir: &Path,
    name: &str,
    header: &[&str],
    rows: &[T],
) -> Result<(NamedTempFile, PathBuf)> {
    let tmp = NamedTempFile::new_in(out_dir)
        .with_context(|| format!("staging {} in {}", name, out_dir.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(tmp);
    writer
        .write_record(header)
        .with_context(|| format!("writing header of {name}"))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("serializing a row of {name}"))?;
    }
    let tmp = writer
        .into_inner()
        .with_context(|| format!("flushing {name}"))?;

    Ok((tmp, out_dir.join(name)))
}
