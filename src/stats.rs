//! Aggregation over the scored population: global rank map, sector
//! statistics and the dashboard summaries.
//!
//! Everything here is a pure function of the snapshot it is given, so
//! recomputing over an unchanged population yields identical results. Ranks
//! are always computed over the entire scored population; filtered views
//! re-attach them instead of recounting positions.

use crate::models::ScoredCompany;
use crate::scoring::round2;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Descriptive statistics for one score series within a sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub average: f64,
    pub median: f64,
    pub percentile_75: f64,
}

/// Sector-relative statistics, per category and for the global score.
///
/// A category entry is `None` when no company in the sector carries a value
/// for it.
#[derive(Debug, Clone, Serialize)]
pub struct SectorStatistics {
    pub sector: String,
    pub company_count: usize,
    pub environmental: Option<CategoryStats>,
    pub social: Option<CategoryStats>,
    pub governance: Option<CategoryStats>,
    pub ethics: Option<CategoryStats>,
    pub global: Option<CategoryStats>,
}

/// Overview numbers for the dashboard header.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewStats {
    pub total_companies: usize,
    pub scored_companies: usize,
    pub avg_global_score: f64,
    /// Companies with a global score of 80 or more.
    pub top_performers: usize,
    /// Companies with a global score below 60.
    pub need_improvement: usize,
}

/// One bucket of the score distribution histogram.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionBucket {
    pub label: &'static str,
    pub count: usize,
}

/// Average global score and population of one sector.
#[derive(Debug, Clone, Serialize)]
pub struct SectorPerformance {
    pub sector: String,
    pub avg_score: f64,
    pub company_count: usize,
}

/// Indices of `population` in global-rank order: global score descending,
/// equal scores keeping their snapshot order (stable sort).
pub fn rank_order(population: &[ScoredCompany]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    // sort_by is stable, which is what makes the tie-break deterministic
    order.sort_by(|&a, &b| {
        population[b]
            .score
            .global_score
            .partial_cmp(&population[a].score.global_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// 1-based global rank per company id, over the whole scored population.
pub fn rank_map(population: &[ScoredCompany]) -> HashMap<Uuid, usize> {
    rank_order(population)
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| (population[idx].company.id, pos + 1))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// 75th percentile with linear interpolation between order statistics.
///
/// For a 0-indexed ascending series of length n the target position is
/// 0.75 x (n - 1); an integral position (or one whose ceiling falls outside
/// the series) returns the exact order statistic, anything else
/// interpolates with the fractional weight.
fn percentile_75(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    let position = 0.75 * (n - 1) as f64;
    let lower = position.floor() as usize;
    let weight = position - position.floor();
    if weight == 0.0 || lower + 1 >= n {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[lower + 1] - sorted[lower]) * weight
    }
}

/// Statistics over one series of values. `None` for an empty series; the
/// empty-population case must surface as explicit absence, not a fault.
fn series_stats(mut values: Vec<f64>) -> Option<CategoryStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(CategoryStats {
        average: round2(mean(&values)),
        median: round2(median(&values)),
        percentile_75: round2(percentile_75(&values)),
    })
}

/// Sector statistics for `sector`, or `None` when no scored company
/// belongs to it.
pub fn sector_statistics(
    population: &[ScoredCompany],
    sector: &str,
) -> Option<SectorStatistics> {
    let members: Vec<&ScoredCompany> = population
        .iter()
        .filter(|sc| sc.company.sector.as_deref() == Some(sector))
        .collect();
    if members.is_empty() {
        return None;
    }

    let collect = |f: fn(&ScoredCompany) -> Option<f64>| -> Vec<f64> {
        members.iter().filter_map(|sc| f(sc)).collect()
    };

    Some(SectorStatistics {
        sector: sector.to_string(),
        company_count: members.len(),
        environmental: series_stats(collect(|sc| sc.score.environmental_score)),
        social: series_stats(collect(|sc| sc.score.social_score)),
        governance: series_stats(collect(|sc| sc.score.governance_score)),
        ethics: series_stats(collect(|sc| sc.score.ethics_score)),
        global: series_stats(collect(|sc| Some(sc.score.global_score))),
    })
}

/// Dashboard overview numbers. `total_companies` counts every company in
/// storage, scored or not.
pub fn overview(population: &[ScoredCompany], total_companies: usize) -> OverviewStats {
    let avg = if population.is_empty() {
        0.0
    } else {
        round2(mean(
            &population
                .iter()
                .map(|sc| sc.score.global_score)
                .collect::<Vec<_>>(),
        ))
    };
    OverviewStats {
        total_companies,
        scored_companies: population.len(),
        avg_global_score: avg,
        top_performers: population
            .iter()
            .filter(|sc| sc.score.global_score >= 80.0)
            .count(),
        need_improvement: population
            .iter()
            .filter(|sc| sc.score.global_score < 60.0)
            .count(),
    }
}

/// Histogram of global scores over the fixed display buckets.
pub fn score_distribution(population: &[ScoredCompany]) -> Vec<DistributionBucket> {
    let mut excellent = 0;
    let mut good = 0;
    let mut average = 0;
    let mut weak = 0;
    for sc in population {
        let score = sc.score.global_score;
        if score >= 80.0 {
            excellent += 1;
        } else if score >= 60.0 {
            good += 1;
        } else if score >= 40.0 {
            average += 1;
        } else {
            weak += 1;
        }
    }
    vec![
        DistributionBucket { label: "Excellent (80-100)", count: excellent },
        DistributionBucket { label: "Bon (60-79)", count: good },
        DistributionBucket { label: "Moyen (40-59)", count: average },
        DistributionBucket { label: "Faible (0-39)", count: weak },
    ]
}

/// Average global score per sector, best sector first. Companies without a
/// sector are left out.
pub fn sector_performance(population: &[ScoredCompany]) -> Vec<SectorPerformance> {
    let mut by_sector: HashMap<&str, Vec<f64>> = HashMap::new();
    for sc in population {
        if let Some(sector) = sc.company.sector.as_deref() {
            by_sector
                .entry(sector)
                .or_default()
                .push(sc.score.global_score);
        }
    }

    let mut rows: Vec<SectorPerformance> = by_sector
        .into_iter()
        .map(|(sector, scores)| SectorPerformance {
            sector: sector.to_string(),
            avg_score: round2(mean(&scores)),
            company_count: scores.len(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.avg_score
            .partial_cmp(&a.avg_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    rows
}
