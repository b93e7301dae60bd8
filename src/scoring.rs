//! Aggregate metrics over the living ecosystem.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, TrophicLevel},
    state::{EcosystemState, PopulationSnapshot},
};

const HEALTHY_RATIO_MIN: f64 = 0.5;
const HEALTHY_RATIO_MAX: f64 = 0.8;
const HEALTHY_BONUS: f64 = 0.2;
const RECOVERY_BONUS: f64 = 50.0;
const FOOD_CHAIN_BONUS: f64 = 100.0;

/// True when every food-chain tier has a living species.
pub fn has_complete_food_chain(ecosystem: &EcosystemState, catalog: &Catalog) -> bool {
    let present: BTreeSet<TrophicLevel> = ecosystem
        .populations
        .values()
        .filter(|data| data.current > 0)
        .filter_map(|data| catalog.species(&data.species_id))
        .map(|species| species.trophic_level)
        .collect();
    TrophicLevel::FOOD_CHAIN
        .iter()
        .all(|level| present.contains(level))
}

/// Unclamped biodiversity; invasive species can push it below zero.
pub fn raw_biodiversity(ecosystem: &EcosystemState, catalog: &Catalog) -> f64 {
    let mut score = 0.0;
    for data in ecosystem.populations.values().filter(|d| d.current > 0) {
        let Some(species) = catalog.species(&data.species_id) else {
            continue;
        };
        score += species.biodiversity_value;

        let ratio = data.capacity_ratio();
        if (HEALTHY_RATIO_MIN..=HEALTHY_RATIO_MAX).contains(&ratio) {
            score += species.biodiversity_value * HEALTHY_BONUS;
        }
        if species.endangered && data.current > species.base_population {
            score += RECOVERY_BONUS;
        }
    }
    if has_complete_food_chain(ecosystem, catalog) {
        score += FOOD_CHAIN_BONUS;
    }
    score
}

pub fn reported_biodiversity(raw: f64) -> f64 {
    raw.max(0.0)
}

/// Stability in `[0, 100]` from the coefficient of variation of each trace.
///
/// Reads the last `window` snapshots. A species missing from a snapshot counts
/// as zero there. Fewer than two snapshots means nothing has moved yet: 100.
pub fn stability<'a, I>(history: I, window: usize) -> f64
where
    I: IntoIterator<Item = &'a PopulationSnapshot>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut recent: Vec<&PopulationSnapshot> = history.into_iter().rev().take(window).collect();
    if recent.len() < 2 {
        return 100.0;
    }
    recent.reverse();

    let species: BTreeSet<&String> = recent
        .iter()
        .flat_map(|snapshot| snapshot.populations.keys())
        .collect();

    let mut traces: BTreeMap<&String, Vec<f64>> = BTreeMap::new();
    for id in species {
        let trace = recent
            .iter()
            .map(|snapshot| snapshot.populations.get(id).copied().unwrap_or(0) as f64)
            .collect();
        traces.insert(id, trace);
    }

    let cvs: Vec<f64> = traces
        .values()
        .filter_map(|trace| coefficient_of_variation(trace))
        .collect();
    if cvs.is_empty() {
        return 100.0;
    }
    let average = cvs.iter().sum::<f64>() / cvs.len() as f64;
    ((1.0 - average) * 100.0).clamp(0.0, 100.0)
}

fn coefficient_of_variation(trace: &[f64]) -> Option<f64> {
    if trace.is_empty() {
        return None;
    }
    let n = trace.len() as f64;
    let mean = trace.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return None;
    }
    let variance = trace.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / mean)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Critical,
    High,
    Moderate,
}

impl RiskTier {
    pub fn for_ratio(ratio: f64) -> Option<Self> {
        if ratio < 0.1 {
            Some(RiskTier::Critical)
        } else if ratio < 0.25 {
            Some(RiskTier::High)
        } else if ratio < 0.4 {
            Some(RiskTier::Moderate)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRisk {
    pub species_id: String,
    pub name: String,
    pub population: u64,
    pub capacity_ratio: f64,
    pub risk: RiskTier,
}

/// Living species below 40% of capacity, most threatened first.
pub fn species_at_risk(ecosystem: &EcosystemState, catalog: &Catalog) -> Vec<SpeciesRisk> {
    let mut at_risk: Vec<SpeciesRisk> = ecosystem
        .populations
        .values()
        .filter_map(|data| {
            let ratio = data.capacity_ratio();
            let risk = RiskTier::for_ratio(ratio)?;
            let name = catalog
                .species(&data.species_id)
                .map(|species| species.name.clone())
                .unwrap_or_else(|| data.species_id.clone());
            Some(SpeciesRisk {
                species_id: data.species_id.clone(),
                name,
                population: data.current,
                capacity_ratio: ratio,
                risk,
            })
        })
        .collect();
    at_risk.sort_by(|a, b| {
        a.capacity_ratio
            .total_cmp(&b.capacity_ratio)
            .then_with(|| a.species_id.cmp(&b.species_id))
    });
    at_risk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Species, state::PopulationData};

    fn catalog() -> Catalog {
        let mut grass = Species::new("grass", TrophicLevel::Producer);
        grass.biodiversity_value = 40.0;
        grass.carrying_capacity = 1_000.0;
        let mut vole = Species::new("vole", TrophicLevel::PrimaryConsumer);
        vole.biodiversity_value = 50.0;
        vole.carrying_capacity = 100.0;
        vole.diet = vec!["grass".into()];
        let mut weasel = Species::new("weasel", TrophicLevel::SecondaryConsumer);
        weasel.biodiversity_value = 60.0;
        weasel.carrying_capacity = 100.0;
        weasel.diet = vec!["vole".into()];
        let mut owl = Species::new("owl", TrophicLevel::TertiaryConsumer);
        owl.biodiversity_value = 80.0;
        owl.carrying_capacity = 100.0;
        owl.endangered = true;
        owl.base_population = 5;
        owl.diet = vec!["weasel".into()];
        let mut kudzu = Species::new("kudzu", TrophicLevel::Producer);
        kudzu.biodiversity_value = -300.0;
        kudzu.carrying_capacity = 1_000.0;
        kudzu.invasive = true;
        Catalog::new(vec![grass, vole, weasel, owl, kudzu], vec![], vec![]).unwrap()
    }

    fn ecosystem(catalog: &Catalog, counts: &[(&str, u64)]) -> EcosystemState {
        let populations = counts
            .iter()
            .map(|(id, count)| {
                let mut data = PopulationData::introduce(catalog.species(id).unwrap());
                data.current = *count;
                (id.to_string(), data)
            })
            .collect();
        EcosystemState {
            populations,
            season: 0,
            temperature: 20.0,
            precipitation: 600.0,
            biodiversity: 0.0,
            stability: 100.0,
        }
    }

    fn snapshot(season: u64, counts: &[(&str, u64)]) -> PopulationSnapshot {
        PopulationSnapshot {
            season,
            populations: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn sums_values_with_health_bonus() {
        let catalog = catalog();
        // grass at 0.6 of capacity earns the bonus, vole at 0.1 does not
        let eco = ecosystem(&catalog, &[("grass", 600), ("vole", 10)]);
        assert!((raw_biodiversity(&eco, &catalog) - (40.0 + 8.0 + 50.0)).abs() < 1e-9);
    }

    #[test]
    fn complete_chain_and_recovery_bonuses() {
        let catalog = catalog();
        let eco = ecosystem(
            &catalog,
            &[("grass", 100), ("vole", 10), ("weasel", 10), ("owl", 20)],
        );
        assert!(has_complete_food_chain(&eco, &catalog));
        let expected = 40.0 + 50.0 + 60.0 + 80.0 + 50.0 + 100.0;
        assert!((raw_biodiversity(&eco, &catalog) - expected).abs() < 1e-9);
    }

    #[test]
    fn invasive_species_can_go_negative() {
        let catalog = catalog();
        let eco = ecosystem(&catalog, &[("grass", 100), ("kudzu", 100)]);
        let raw = raw_biodiversity(&eco, &catalog);
        assert!(raw < 0.0);
        assert_eq!(reported_biodiversity(raw), 0.0);
    }

    #[test]
    fn stability_defaults_to_full_without_history() {
        let one = [snapshot(0, &[("grass", 10)])];
        assert_eq!(stability(&one, 10), 100.0);
        let none: [PopulationSnapshot; 0] = [];
        assert_eq!(stability(&none, 10), 100.0);
    }

    #[test]
    fn constant_traces_are_fully_stable() {
        let history: Vec<_> = (0..5).map(|s| snapshot(s, &[("grass", 50)])).collect();
        assert_eq!(stability(&history, 10), 100.0);
    }

    #[test]
    fn volatile_traces_lower_stability() {
        let history = vec![
            snapshot(0, &[("grass", 100)]),
            snapshot(1, &[("grass", 50)]),
            snapshot(2, &[("grass", 100)]),
            snapshot(3, &[("grass", 50)]),
        ];
        // mean 75, stdev 25
        let value = stability(&history, 10);
        assert!((value - (1.0 - 25.0 / 75.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn stability_reads_only_the_window() {
        let mut history = vec![snapshot(0, &[("grass", 1)]), snapshot(1, &[("grass", 900)])];
        history.extend((2..6).map(|s| snapshot(s, &[("grass", 40)])));
        assert_eq!(stability(&history, 4), 100.0);
        assert!(stability(&history, 6) < 100.0);
    }

    #[test]
    fn risk_tiers_sorted_by_ratio() {
        let catalog = catalog();
        let eco = ecosystem(
            &catalog,
            &[("grass", 900), ("vole", 30), ("weasel", 5), ("owl", 20)],
        );
        let risks = species_at_risk(&eco, &catalog);
        let ids: Vec<_> = risks.iter().map(|r| r.species_id.as_str()).collect();
        assert_eq!(ids, ["weasel", "owl", "vole"]);
        assert_eq!(risks[0].risk, RiskTier::Critical);
        assert_eq!(risks[1].risk, RiskTier::High);
        assert_eq!(risks[2].risk, RiskTier::Moderate);
    }
}
