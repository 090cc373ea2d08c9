// src/classify.rs
//
// Maps raw, footnote-cleaned source labels to a canonical source name and
// a broad category. First-match-wins over an ordered rule list; the rule
// order is load-bearing (seabed before generic offshore wind, Total after
// every energy-specific rule) and covered by tests.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extract::{ExtractedRecord, Metric};

/// Broad energy category, derived from the canonical source name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Wind,
    Solar,
    Hydro,
    Marine,
    Bioenergy,
    Waste,
    Total,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Wind => "Wind",
            Category::Solar => "Solar",
            Category::Hydro => "Hydro",
            Category::Marine => "Marine",
            Category::Bioenergy => "Bioenergy",
            Category::Waste => "Waste",
            Category::Total => "Total",
            Category::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Which rule set applies. The publisher reports nations at coarser
/// granularity than the UK aggregate, so the two sets are deliberately
/// not one parameterized list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    UkAggregate,
    Nation,
}

/// Where a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "United Kingdom")]
    UnitedKingdom,
    England,
    Scotland,
    Wales,
    #[serde(rename = "Northern Ireland")]
    NorthernIreland,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::UnitedKingdom => "United Kingdom",
            Region::England => "England",
            Region::Scotland => "Scotland",
            Region::Wales => "Wales",
            Region::NorthernIreland => "Northern Ireland",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub canonical: String,
    pub category: Category,
}

/// An [`ExtractedRecord`] plus everything the assembler needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub raw_label: String,
    pub canonical_source: String,
    pub category: Category,
    pub region: Region,
    pub year: i32,
    pub metric: Metric,
    pub value: Option<f64>,
}

struct Rule {
    pattern: Regex,
    canonical: &'static str,
}

fn rules(pairs: &[(&str, &'static str)]) -> Vec<Rule> {
    pairs
        .iter()
        .map(|&(pattern, canonical)| Rule {
            pattern: Regex::new(pattern).expect("classification pattern"),
            canonical,
        })
        .collect()
}

/// UK-aggregate rules, evaluated top to bottom. Seabed and floating
/// offshore wind must precede the generic offshore rule; Total comes
/// after every energy-specific rule.
static UK_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    rules(&[
        (r"(?i)offshore.*seabed", "Offshore Wind (Seabed)"),
        (r"(?i)offshore.*floating", "Offshore Wind (Floating)"),
        (r"(?i)offshore\s+wind", "Offshore Wind"),
        (r"(?i)onshore\s+wind", "Onshore Wind"),
        (r"(?i)solar|photovoltaic", "Solar PV"),
        (r"(?i)small\s+(scale\s+)?hydro", "Small Scale Hydro"),
        (r"(?i)large\s+(scale\s+)?hydro", "Large Scale Hydro"),
        (r"(?i)hydro", "Hydro"),
        (r"(?i)shoreline|wave|tidal", "Wave and Tidal"),
        (r"(?i)landfill", "Landfill Gas"),
        (r"(?i)sewage", "Sewage Gas"),
        (r"(?i)municipal\s+solid\s+waste|energy\s+from\s+waste", "Energy from Waste"),
        (r"(?i)co-?firing", "Co-firing"),
        (r"(?i)animal\s+biomass", "Animal Biomass"),
        (r"(?i)plant\s+biomass", "Plant Biomass"),
        (r"(?i)anaerobic", "Anaerobic Digestion"),
        (r"(?i)\btotal\b", "Total"),
    ])
});

/// Nation-level rules: the nation tabs only distinguish the broad
/// technologies.
static NATION_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    rules(&[
        (r"(?i)wind", "Wind"),
        (r"(?i)solar|photovoltaic", "Solar"),
        (r"(?i)hydro", "Hydro"),
        (r"(?i)shoreline|wave|tidal|marine", "Marine"),
        (r"(?i)bio|landfill|sewage|waste|anaerobic", "Bioenergy"),
        (r"(?i)\btotal\b", "Total"),
    ])
});

/// Canonicalize a cleaned label. Total by construction: an unmatched
/// label keeps its own text and lands in [`Category::Other`], so taxonomy
/// gaps surface as visible rows instead of hard failures.
pub fn classify(raw_label: &str, granularity: Granularity) -> Classification {
    let rule_set: &[Rule] = match granularity {
        Granularity::UkAggregate => &UK_RULES,
        Granularity::Nation => &NATION_RULES,
    };
    let canonical = rule_set
        .iter()
        .find(|rule| rule.pattern.is_match(raw_label))
        .map(|rule| rule.canonical.to_string())
        .unwrap_or_else(|| raw_label.to_string());
    let category = category_for(&canonical);
    Classification {
        canonical,
        category,
    }
}

/// Second pass, keyed off the canonical name (never the raw label).
fn category_for(canonical: &str) -> Category {
    if canonical == "Total" {
        return Category::Total;
    }
    let lower = canonical.to_lowercase();
    if lower.contains("wind") {
        Category::Wind
    } else if lower.contains("solar") {
        Category::Solar
    } else if lower.contains("hydro") {
        Category::Hydro
    } else if lower.contains("wave") || lower.contains("tidal") || lower.contains("marine") {
        Category::Marine
    } else if lower.contains("waste") {
        Category::Waste
    } else if lower.contains("landfill")
        || lower.contains("sewage")
        || lower.contains("biomass")
        || lower.contains("anaerobic")
        || lower.contains("co-firing")
        || lower.contains("bioenergy")
    {
        Category::Bioenergy
    } else {
        Category::Other
    }
}

/// Tag a section's records with their classification and region.
pub fn classify_records(
    records: Vec<ExtractedRecord>,
    region: Region,
    granularity: Granularity,
) -> Vec<ClassifiedRecord> {
    records
        .into_iter()
        .map(|r| {
            let Classification {
                canonical,
                category,
            } = classify(&r.raw_label, granularity);
            ClassifiedRecord {
                raw_label: r.raw_label,
                canonical_source: canonical,
                category,
                region,
                year: r.year,
                metric: r.metric,
                value: r.value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uk(label: &str) -> Classification {
        classify(label, Granularity::UkAggregate)
    }

    fn nation(label: &str) -> Classification {
        classify(label, Granularity::Nation)
    }

    #[test]
    fn seabed_rule_wins_over_generic_offshore() {
        let c = uk("Offshore Wind (Seabed)");
        assert_eq!(c.canonical, "Offshore Wind (Seabed)");
        assert_eq!(c.category, Category::Wind);

        let c = uk("Offshore Wind (Floating)");
        assert_eq!(c.canonical, "Offshore Wind (Floating)");

        let c = uk("Offshore Wind");
        assert_eq!(c.canonical, "Offshore Wind");
    }

    #[test]
    fn total_checked_after_energy_rules() {
        assert_eq!(uk("Total").canonical, "Total");
        assert_eq!(uk("Total").category, Category::Total);
        // A label that names a technology and merely contains "total"
        // must not be misrouted to Total.
        assert_eq!(uk("Onshore Wind total").canonical, "Onshore Wind");
        assert_eq!(nation("Wind total").canonical, "Wind");
    }

    #[test]
    fn hydro_sizes_precede_generic_hydro() {
        assert_eq!(uk("Small scale Hydro").canonical, "Small Scale Hydro");
        assert_eq!(uk("Large scale Hydro").canonical, "Large Scale Hydro");
        assert_eq!(uk("Hydro").canonical, "Hydro");
        assert_eq!(uk("Hydro").category, Category::Hydro);
    }

    #[test]
    fn uk_set_is_finer_than_nation_set() {
        assert_eq!(uk("Solar photovoltaics").canonical, "Solar PV");
        assert_eq!(nation("Solar photovoltaics").canonical, "Solar");
        assert_eq!(uk("Landfill gas").canonical, "Landfill Gas");
        assert_eq!(nation("Landfill gas").canonical, "Bioenergy");
        assert_eq!(nation("Onshore wind").canonical, "Wind");
    }

    #[test]
    fn categories_derive_from_canonical_names() {
        assert_eq!(uk("Shoreline wave / tidal").category, Category::Marine);
        assert_eq!(uk("Energy from waste").category, Category::Waste);
        assert_eq!(uk("Plant Biomass").category, Category::Bioenergy);
        assert_eq!(uk("Anaerobic Digestion").category, Category::Bioenergy);
        assert_eq!(nation("Sewage gas").category, Category::Bioenergy);
    }

    #[test]
    fn unmatched_labels_fall_through_to_other() {
        let c = uk("Geothermal aquifers");
        assert_eq!(c.canonical, "Geothermal aquifers");
        assert_eq!(c.category, Category::Other);
    }

    #[test]
    fn classification_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(uk("Offshore Wind (Seabed)"), uk("Offshore Wind (Seabed)"));
        }
    }
}
