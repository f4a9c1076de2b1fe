//! Refresh workflow for one company:
//! 1. Fetch raw indicator data from the external sources
//! 2. Compute category scores, global score and letter rating
//! 3. Upsert the full record through the score store
//!
//! A refresh either completes and persists, or fails and persists nothing.
//! Unreachable sources never fail a refresh; only persistence errors do.

use crate::errors::{AppError, ResultExt};
use crate::models::{Company, RseScore};
use crate::score_store::ScoreStore;
use crate::scoring;
use crate::sources::IndicatorSources;
use chrono::Utc;
use regex::Regex;

/// SIREN registration numbers are exactly 9 digits.
pub fn is_valid_siren(siren: &str) -> bool {
    Regex::new(r"^[0-9]{9}$")
        .map(|re| re.is_match(siren))
        .unwrap_or(false)
}

pub async fn refresh_company_score(
    sources: &IndicatorSources,
    store: &ScoreStore,
    company: &Company,
) -> Result<RseScore, AppError> {
    if !is_valid_siren(&company.siren) {
        return Err(AppError::BadRequest(format!(
            "Company {} has a malformed SIREN '{}'",
            company.id, company.siren
        )));
    }

    let raw_data = sources.fetch_company_data(&company.siren).await;
    let result = scoring::calculate(&raw_data);

    tracing::info!(
        "Computed score for {} (SIREN {}): global {} ({}), quality {}",
        company.name,
        company.siren,
        result.global_score,
        result.rating_letter,
        result.data_quality_score
    );

    store
        .upsert_score(company.id, &result, Utc::now().date_naive())
        .await
        .context(format!("failed to persist score for company {}", company.id))
}
