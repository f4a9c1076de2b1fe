//! Pure scoring engine: raw indicator payloads in, category scores, global
//! score, letter rating, detailed metrics and data-quality score out.
//!
//! Never fails: missing data only suppresses the matching bonus or metric.

use crate::models::{DataSource, DetailedMetrics, RawCompanyData, Rating, ScoreResult};

/// Scoring rule constants. Tuned values carried over as-is; do not retune.
pub mod rules {
    /// Every category starts here and only accumulates bonuses.
    pub const BASE_SCORE: f64 = 50.0;
    /// Upper clamp. Bonuses are non-negative so no lower clamp is needed.
    pub const MAX_SCORE: f64 = 100.0;

    pub const ENV_CARBON_REPORT_BONUS: f64 = 20.0;
    pub const ENV_ISO14001_BONUS: f64 = 15.0;
    pub const ENV_RENEWABLE_BONUS: f64 = 15.0;
    /// Renewable-energy share (percent) above which the bonus applies.
    pub const ENV_RENEWABLE_THRESHOLD: f64 = 50.0;
    pub const ISO_14001: &str = "ISO 14001";

    pub const SOCIAL_PARITY_BONUS: f64 = 20.0;
    /// Gender-equality index above which the parity bonus applies.
    pub const SOCIAL_PARITY_THRESHOLD: f64 = 75.0;
    pub const SOCIAL_TRAINING_BONUS: f64 = 15.0;
    pub const SOCIAL_DIVERSITY_BONUS: f64 = 15.0;

    pub const GOV_ACCOUNTS_BONUS: f64 = 20.0;
    pub const GOV_CERTIFICATION_BONUS: f64 = 15.0;

    pub const ETHICS_CODE_BONUS: f64 = 25.0;
    pub const ETHICS_ANTICORRUPTION_BONUS: f64 = 25.0;
}

/// Rounds to 2 decimal places, the precision of every stored score.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn environmental_score(data: &RawCompanyData) -> Option<f64> {
    let mut score = rules::BASE_SCORE;

    if data
        .environmental_info
        .as_ref()
        .is_some_and(|env| env.bilan_carbone.is_some())
    {
        score += rules::ENV_CARBON_REPORT_BONUS;
    }

    if data.rse_info.as_ref().is_some_and(|rse| {
        rse.certifications
            .as_ref()
            .is_some_and(|certs| certs.iter().any(|c| c == rules::ISO_14001))
    }) {
        score += rules::ENV_ISO14001_BONUS;
    }

    if data.environmental_info.as_ref().is_some_and(|env| {
        env.energie_renouvelable
            .is_some_and(|share| share > rules::ENV_RENEWABLE_THRESHOLD)
    }) {
        score += rules::ENV_RENEWABLE_BONUS;
    }

    Some(score.min(rules::MAX_SCORE))
}

pub fn social_score(data: &RawCompanyData) -> Option<f64> {
    let mut score = rules::BASE_SCORE;
    let rse = data.rse_info.as_ref();

    if rse.is_some_and(|r| {
        r.index_egalite
            .is_some_and(|idx| idx > rules::SOCIAL_PARITY_THRESHOLD)
    }) {
        score += rules::SOCIAL_PARITY_BONUS;
    }

    if rse.is_some_and(|r| r.formation_continue == Some(true)) {
        score += rules::SOCIAL_TRAINING_BONUS;
    }

    if rse.is_some_and(|r| r.politique_diversite.is_some()) {
        score += rules::SOCIAL_DIVERSITY_BONUS;
    }

    Some(score.min(rules::MAX_SCORE))
}

pub fn governance_score(data: &RawCompanyData) -> Option<f64> {
    let mut score = rules::BASE_SCORE;

    if data
        .basic_info
        .as_ref()
        .is_some_and(|basic| basic.publication_comptes == Some(true))
    {
        score += rules::GOV_ACCOUNTS_BONUS;
    }

    if data.rse_info.as_ref().is_some_and(|rse| {
        rse.certifications
            .as_ref()
            .is_some_and(|certs| !certs.is_empty())
    }) {
        score += rules::GOV_CERTIFICATION_BONUS;
    }

    Some(score.min(rules::MAX_SCORE))
}

pub fn ethics_score(data: &RawCompanyData) -> Option<f64> {
    let mut score = rules::BASE_SCORE;
    let rse = data.rse_info.as_ref();

    if rse.is_some_and(|r| r.code_ethique == Some(true)) {
        score += rules::ETHICS_CODE_BONUS;
    }

    if rse.is_some_and(|r| r.politique_anticorruption.is_some()) {
        score += rules::ETHICS_ANTICORRUPTION_BONUS;
    }

    Some(score.min(rules::MAX_SCORE))
}

/// Mean of the non-null category scores, rounded to 2 decimals.
/// 0 when every category is null.
pub fn global_score(categories: &[Option<f64>; 4]) -> f64 {
    let present: Vec<f64> = categories.iter().filter_map(|s| *s).collect();
    if present.is_empty() {
        return 0.0;
    }
    round2(present.iter().sum::<f64>() / present.len() as f64)
}

/// Maps a global score to its letter grade. Total over all inputs.
pub fn rating_letter(global: f64) -> Rating {
    if global >= 90.0 {
        Rating::APlus
    } else if global >= 80.0 {
        Rating::A
    } else if global >= 70.0 {
        Rating::B
    } else if global >= 60.0 {
        Rating::C
    } else if global >= 50.0 {
        Rating::D
    } else {
        Rating::E
    }
}

/// Projects the named display facts out of the raw payload.
pub fn extract_detailed_metrics(data: &RawCompanyData) -> DetailedMetrics {
    let env = data.environmental_info.as_ref();
    let rse = data.rse_info.as_ref();

    DetailedMetrics {
        co2_emissions: env.and_then(|e| e.co2_emissions),
        energy_consumption: env.and_then(|e| e.energy_consumption),
        waste_production: env.and_then(|e| e.waste_production),
        employee_count: data.basic_info.as_ref().and_then(|b| b.employee_count),
        gender_equality_index: rse.and_then(|r| r.index_egalite),
        certifications: rse
            .and_then(|r| r.certifications.clone())
            .unwrap_or_default(),
    }
}

/// Share of the known source registry that contributed, as an integer 0-100.
pub fn data_quality_score(data: &RawCompanyData) -> i32 {
    let available = data.present_sources().len();
    let total = DataSource::ALL.len();
    ((available as f64 / total as f64) * 100.0).round() as i32
}

/// Full calculation for one company's raw payload.
pub fn calculate(data: &RawCompanyData) -> ScoreResult {
    let categories = [
        environmental_score(data),
        social_score(data),
        governance_score(data),
        ethics_score(data),
    ];
    let global = global_score(&categories);

    ScoreResult {
        environmental_score: categories[0],
        social_score: categories[1],
        governance_score: categories[2],
        ethics_score: categories[3],
        global_score: global,
        rating_letter: rating_letter(global),
        detailed_metrics: extract_detailed_metrics(data),
        data_sources: data.present_sources(),
        data_quality_score: data_quality_score(data),
    }
}
