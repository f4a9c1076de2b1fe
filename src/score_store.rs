//! Score persistence. The store exclusively owns `rse_scores`: the
//! calculator only computes, callers go through the upsert here.
//!
//! Contract: the *current* score of a company is the max-by(last_updated)
//! of its score rows. The unique index on company_id keeps that to exactly
//! one row today; the contract stays valid if history rows are added
//! later.

use crate::errors::AppError;
use crate::models::{Company, DataSource, DetailedMetrics, RseScore, RseScoreRow, ScoreResult, ScoredCompany};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

pub struct ScoreStore {
    pool: PgPool,
}

fn decimal_to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}

fn f64_to_decimal(value: f64) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(&format!("{:.2}", value))
        .map_err(|e| AppError::InternalError(format!("score did not convert to decimal: {}", e)))
}

fn row_to_score(row: RseScoreRow) -> RseScore {
    RseScore {
        company_id: row.company_id,
        environmental_score: row.environmental_score.as_ref().map(decimal_to_f64),
        social_score: row.social_score.as_ref().map(decimal_to_f64),
        governance_score: row.governance_score.as_ref().map(decimal_to_f64),
        ethics_score: row.ethics_score.as_ref().map(decimal_to_f64),
        global_score: decimal_to_f64(&row.global_score),
        rating_letter: row.rating_letter,
        detailed_metrics: row
            .detailed_metrics
            .and_then(|v| serde_json::from_value::<DetailedMetrics>(v).ok())
            .unwrap_or_default(),
        data_sources: row
            .data_sources
            .and_then(|v| serde_json::from_value::<Vec<DataSource>>(v).ok())
            .unwrap_or_default(),
        last_updated: row.last_updated,
        data_quality_score: row.data_quality_score,
    }
}

impl ScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(company)
    }

    pub async fn count_companies(&self) -> Result<usize, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 as usize)
    }

    /// Current score of one company: latest row by `last_updated`.
    pub async fn current_score(&self, company_id: Uuid) -> Result<Option<RseScore>, AppError> {
        let row = sqlx::query_as::<_, RseScoreRow>(
            "SELECT * FROM rse_scores
             WHERE company_id = $1
             ORDER BY last_updated DESC
             LIMIT 1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_score))
    }

    /// Snapshot of every company that currently has a score, joined with
    /// it.
    ///
    /// Ordered by score-row creation time: that is the insertion order the
    /// ranker's stable sort falls back to for equal global scores.
    pub async fn all_scored(&self) -> Result<Vec<ScoredCompany>, AppError> {
        // Two plain queries joined in memory beat one wide aliased join
        // for sqlx's runtime row mapping.
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies")
            .fetch_all(&self.pool)
            .await?;
        let rows = sqlx::query_as::<_, RseScoreRow>(
            "SELECT * FROM rse_scores ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: HashMap<Uuid, Company> =
            companies.into_iter().map(|c| (c.id, c)).collect();

        let mut scored = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(company) = by_id.remove(&row.company_id) {
                scored.push(ScoredCompany {
                    company,
                    score: row_to_score(row),
                });
            }
        }

        Ok(scored)
    }

    /// Replace-or-insert the current score of a company, as one atomic
    /// statement keyed on the unique company index.
    ///
    /// Either the full record (categories, global, letter, metrics,
    /// sources, quality, date) is committed or nothing is; two refreshes
    /// of the same company cannot interleave a partial write.
    pub async fn upsert_score(
        &self,
        company_id: Uuid,
        result: &ScoreResult,
        last_updated: NaiveDate,
    ) -> Result<RseScore, AppError> {
        let environmental = result.environmental_score.map(f64_to_decimal).transpose()?;
        let social = result.social_score.map(f64_to_decimal).transpose()?;
        let governance = result.governance_score.map(f64_to_decimal).transpose()?;
        let ethics = result.ethics_score.map(f64_to_decimal).transpose()?;
        let global = f64_to_decimal(result.global_score)?;
        let metrics = serde_json::to_value(&result.detailed_metrics)
            .map_err(|e| AppError::InternalError(format!("metrics did not serialize: {}", e)))?;
        let sources = serde_json::to_value(&result.data_sources)
            .map_err(|e| AppError::InternalError(format!("sources did not serialize: {}", e)))?;

        let row = sqlx::query_as::<_, RseScoreRow>(
            r#"
            INSERT INTO rse_scores (
                id, company_id,
                environmental_score, social_score, governance_score, ethics_score,
                global_score, rating_letter,
                detailed_metrics, data_sources, last_updated, data_quality_score,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            ON CONFLICT (company_id) DO UPDATE SET
                environmental_score = EXCLUDED.environmental_score,
                social_score = EXCLUDED.social_score,
                governance_score = EXCLUDED.governance_score,
                ethics_score = EXCLUDED.ethics_score,
                global_score = EXCLUDED.global_score,
                rating_letter = EXCLUDED.rating_letter,
                detailed_metrics = EXCLUDED.detailed_metrics,
                data_sources = EXCLUDED.data_sources,
                last_updated = EXCLUDED.last_updated,
                data_quality_score = EXCLUDED.data_quality_score,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(environmental)
        .bind(social)
        .bind(governance)
        .bind(ethics)
        .bind(global)
        .bind(result.rating_letter.as_str())
        .bind(metrics)
        .bind(sources)
        .bind(last_updated)
        .bind(result.data_quality_score)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Upserted score for company {}: global {} ({})",
            company_id,
            result.global_score,
            result.rating_letter
        );

        Ok(row_to_score(row))
    }
}
