// src/assemble.rs
//
// Pure filter/reshape operations from the classified record set to the
// five tidy output tables. Only the annual-totals pivot changes record
// shape; everything else is a filter.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::classify::{Category, ClassifiedRecord, Region};
use crate::error::PipelineError;
use crate::extract::Metric;

/// UK-level per-source generation, one row per (source, year).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRow {
    pub source: String,
    pub category: Category,
    pub year: i32,
    pub generation_gwh: Option<f64>,
}

impl GenerationRow {
    pub const HEADER: [&'static str; 4] = ["source", "category", "year", "generation_gwh"];
}

/// UK-level per-source installed capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRow {
    pub source: String,
    pub category: Category,
    pub year: i32,
    pub capacity_mw: Option<f64>,
}

impl CapacityRow {
    pub const HEADER: [&'static str; 4] = ["source", "category", "year", "capacity_mw"];
}

/// UK-level per-source load factors. Nation sheets never carry this
/// metric, so no region column is needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadFactorRow {
    pub source: String,
    pub category: Category,
    pub year: i32,
    pub load_factor_pct: Option<f64>,
}

impl LoadFactorRow {
    pub const HEADER: [&'static str; 4] = ["source", "category", "year", "load_factor_pct"];
}

/// Nation-level generation, Total rows retained so consumers can compute
/// share-of-total ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub region: Region,
    pub source: String,
    pub category: Category,
    pub year: i32,
    pub generation_gwh: Option<f64>,
}

impl RegionRow {
    pub const HEADER: [&'static str; 5] = ["region", "source", "category", "year", "generation_gwh"];
}

/// UK totals pivoted wide: one row per year, one column per metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsRow {
    pub year: i32,
    pub capacity_mw: Option<f64>,
    pub generation_gwh: Option<f64>,
    pub load_factor_pct: Option<f64>,
}

impl TotalsRow {
    pub const HEADER: [&'static str; 4] = ["year", "capacity_mw", "generation_gwh", "load_factor_pct"];
}

fn is_uk_source(r: &ClassifiedRecord, metric: Metric) -> bool {
    r.metric == metric && r.region == Region::UnitedKingdom && r.canonical_source != "Total"
}

pub fn generation_by_source(records: &[ClassifiedRecord]) -> Vec<GenerationRow> {
    records
        .iter()
        .filter(|r| is_uk_source(r, Metric::Generation))
        .map(|r| GenerationRow {
            source: r.canonical_source.clone(),
            category: r.category,
            year: r.year,
            generation_gwh: r.value,
        })
        .collect()
}

pub fn capacity_by_source(records: &[ClassifiedRecord]) -> Vec<CapacityRow> {
    records
        .iter()
        .filter(|r| is_uk_source(r, Metric::Capacity))
        .map(|r| CapacityRow {
            source: r.canonical_source.clone(),
            category: r.category,
            year: r.year,
            capacity_mw: r.value,
        })
        .collect()
}

pub fn load_factors(records: &[ClassifiedRecord]) -> Vec<LoadFactorRow> {
    // Only the UK sheet carries load factors; the Total row stays so the
    // fleet-wide figure is available alongside the per-source ones.
    records
        .iter()
        .filter(|r| r.metric == Metric::LoadFactor)
        .map(|r| LoadFactorRow {
            source: r.canonical_source.clone(),
            category: r.category,
            year: r.year,
            load_factor_pct: r.value,
        })
        .collect()
}

pub fn region_comparison(records: &[ClassifiedRecord]) -> Vec<RegionRow> {
    records
        .iter()
        .filter(|r| r.metric == Metric::Generation && r.region != Region::UnitedKingdom)
        .map(|r| RegionRow {
            region: r.region,
            source: r.canonical_source.clone(),
            category: r.category,
            year: r.year,
            generation_gwh: r.value,
        })
        .collect()
}

/// Pivot the UK "Total" slice wide. A year that reached the pivot without
/// all three metrics signals a wrong row range upstream, so it aborts the
/// run rather than producing a half-filled row.
pub fn annual_totals(records: &[ClassifiedRecord]) -> Result<Vec<TotalsRow>, PipelineError> {
    let mut by_year: BTreeMap<i32, BTreeMap<&str, Option<f64>>> = BTreeMap::new();
    for r in records {
        if r.region != Region::UnitedKingdom || r.canonical_source != "Total" {
            continue;
        }
        let key = match r.metric {
            Metric::Capacity => "capacity",
            Metric::Generation => "generation",
            Metric::LoadFactor => "load_factor",
        };
        by_year.entry(r.year).or_default().insert(key, r.value);
    }

    let mut rows = Vec::with_capacity(by_year.len());
    for (year, metrics) in by_year {
        for (key, metric) in [
            ("capacity", Metric::Capacity),
            ("generation", Metric::Generation),
            ("load_factor", Metric::LoadFactor),
        ] {
            if !metrics.contains_key(key) {
                return Err(PipelineError::InconsistentTotals {
                    year,
                    missing: metric,
                });
            }
        }
        rows.push(TotalsRow {
            year,
            capacity_mw: metrics["capacity"],
            generation_gwh: metrics["generation"],
            load_factor_pct: metrics["load_factor"],
        });
    }
    Ok(rows)
}
