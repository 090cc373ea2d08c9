// src/layout.rs
//
// The publisher's stacked-table geometry, as explicit named configuration
// instead of offsets buried in code. The compiled-in default describes the
// current edition; a YAML file with the same shape overrides it when the
// publisher moves rows around.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::classify::{Granularity, Region};
use crate::extract::Metric;

/// One metric block inside a sheet. All rows are zero-based absolute
/// sheet coordinates; `row_start..=row_end` is inclusive. `title` is the
/// text expected in column 0 of `title_row`, validated before slicing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionLayout {
    pub metric: Metric,
    pub title: String,
    pub title_row: usize,
    pub year_row: usize,
    pub row_start: usize,
    pub row_end: usize,
}

/// One tab of the workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet: String,
    pub region: Region,
    pub granularity: Granularity,
    pub sections: Vec<SectionLayout>,
}

/// The whole workbook. `edition` names the publication the offsets were
/// measured against, so a stale layout is identifiable in diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookLayout {
    pub edition: String,
    pub sheets: Vec<SheetLayout>,
}

impl WorkbookLayout {
    /// Layout for the current published edition: a UK "Annual" tab with
    /// three stacked sections and four nation tabs with two each.
    pub fn default_layout() -> Self {
        let nation = |sheet: &str, region: Region| SheetLayout {
            sheet: sheet.to_string(),
            region,
            granularity: Granularity::Nation,
            sections: vec![
                SectionLayout {
                    metric: Metric::Capacity,
                    title: "Cumulative Installed Capacity (MW)".to_string(),
                    title_row: 4,
                    year_row: 5,
                    row_start: 6,
                    row_end: 12,
                },
                SectionLayout {
                    metric: Metric::Generation,
                    title: "Generation (GWh)".to_string(),
                    title_row: 14,
                    year_row: 15,
                    row_start: 16,
                    row_end: 22,
                },
            ],
        };

        WorkbookLayout {
            edition: "renewables-regional-2023".to_string(),
            sheets: vec![
                SheetLayout {
                    sheet: "Annual".to_string(),
                    region: Region::UnitedKingdom,
                    granularity: Granularity::UkAggregate,
                    sections: vec![
                        SectionLayout {
                            metric: Metric::Capacity,
                            title: "Cumulative Installed Capacity (MW)".to_string(),
                            title_row: 4,
                            year_row: 5,
                            row_start: 6,
                            row_end: 21,
                        },
                        SectionLayout {
                            metric: Metric::Generation,
                            title: "Generation (GWh)".to_string(),
                            title_row: 23,
                            year_row: 24,
                            row_start: 25,
                            row_end: 40,
                        },
                        SectionLayout {
                            metric: Metric::LoadFactor,
                            title: "Load Factors (%)".to_string(),
                            title_row: 42,
                            year_row: 43,
                            row_start: 44,
                            row_end: 59,
                        },
                    ],
                },
                nation("England", Region::England),
                nation("Scotland", Region::Scotland),
                nation("Wales", Region::Wales),
                nation("Northern Ireland", Region::NorthernIreland),
            ],
        }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading layout file {}", path.display()))?;
        let layout: WorkbookLayout = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing layout file {}", path.display()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Cheap sanity checks so a bad override fails at load time, not
    /// halfway through extraction.
    pub fn validate(&self) -> Result<()> {
        if self.sheets.is_empty() {
            bail!("layout '{}' lists no sheets", self.edition);
        }
        for sheet in &self.sheets {
            if sheet.sections.is_empty() {
                bail!("layout sheet '{}' lists no sections", sheet.sheet);
            }
            for section in &sheet.sections {
                if section.row_start > section.row_end {
                    bail!(
                        "layout sheet '{}' section '{}': row_start {} > row_end {}",
                        sheet.sheet,
                        section.title,
                        section.row_start,
                        section.row_end
                    );
                }
                if section.year_row >= section.row_start {
                    bail!(
                        "layout sheet '{}' section '{}': year_row {} overlaps data rows",
                        sheet.sheet,
                        section.title,
                        section.year_row
                    );
                }
            }
        }
        Ok(())
    }
}
