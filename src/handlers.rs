use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::query;
use crate::refresh;
use crate::score_store::ScoreStore;
use crate::sources::IndicatorSources;
use crate::stats::{self, DistributionBucket, OverviewStats, SectorPerformance, SectorStatistics};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Indicator source clients (breakers and payload cache live here, so
    /// it is built once at startup).
    pub sources: IndicatorSources,
}

/// GET /api/v1/dashboard response body.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: OverviewStats,
    pub top_companies: Vec<RankedCompany>,
    pub score_distribution: Vec<DistributionBucket>,
    pub sector_performance: Vec<SectorPerformance>,
}

/// GET /api/v1/companies/:id response body.
#[derive(Debug, Serialize)]
pub struct CompanyDetailResponse {
    pub company: Company,
    /// `None` when the company has never been scored.
    pub score: Option<RseScore>,
    /// Global rank within the scored population, when scored.
    pub rank: Option<usize>,
    /// Up to 5 scored companies from the same sector.
    pub similar_companies: Vec<RankedCompany>,
    pub sector_statistics: Option<SectorStatistics>,
}

/// One side of a comparison.
#[derive(Debug, Serialize)]
pub struct CompareEntry {
    pub company: Company,
    pub score: RseScore,
    pub rank: usize,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rse-score-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /api/v1/dashboard
///
/// Overview numbers, top 10 companies, score distribution and per-sector
/// performance, all derived from the current scored population.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, AppError> {
    tracing::info!("GET /dashboard");

    let store = ScoreStore::new(state.db.clone());
    let total_companies = store.count_companies().await?;
    let population = store.all_scored().await?;

    let top_companies: Vec<RankedCompany> = stats::rank_order(&population)
        .into_iter()
        .take(10)
        .enumerate()
        .map(|(pos, idx)| RankedCompany::from_scored(&population[idx], pos + 1))
        .collect();

    Ok(Json(DashboardResponse {
        stats: stats::overview(&population, total_companies),
        top_companies,
        score_distribution: stats::score_distribution(&population),
        sector_performance: stats::sector_performance(&population),
    }))
}

/// GET /api/v1/companies
///
/// Filterable, sortable, paginated company listing. Ranks are computed
/// over the whole scored population before the filter is applied.
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompanyQueryParams>,
) -> Result<Json<CompanyListResponse>, AppError> {
    tracing::info!("GET /companies - params: {:?}", params);

    let store = ScoreStore::new(state.db.clone());
    let population = store.all_scored().await?;
    let ranks = stats::rank_map(&population);

    Ok(Json(query::run(
        &population,
        &ranks,
        &params,
        state.config.page_size,
    )))
}

/// GET /api/v1/companies/:id
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyDetailResponse>, AppError> {
    tracing::info!("GET /companies/{}", id);

    let store = ScoreStore::new(state.db.clone());
    let company = store
        .get_company(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company with id {} not found", id)))?;

    let score = store.current_score(id).await?;
    let population = store.all_scored().await?;
    let ranks = stats::rank_map(&population);

    let similar_companies: Vec<RankedCompany> = population
        .iter()
        .filter(|sc| {
            sc.company.id != id
                && company.sector.is_some()
                && sc.company.sector == company.sector
        })
        .take(5)
        .map(|sc| {
            RankedCompany::from_scored(sc, ranks.get(&sc.company.id).copied().unwrap_or(0))
        })
        .collect();

    let sector_statistics = company
        .sector
        .as_deref()
        .and_then(|sector| stats::sector_statistics(&population, sector));

    Ok(Json(CompanyDetailResponse {
        rank: ranks.get(&id).copied(),
        company,
        score,
        similar_companies,
        sector_statistics,
    }))
}

/// GET /api/v1/companies/compare?ids=a,b,c
///
/// Side-by-side view of scored companies, in global-rank order. Ids that
/// do not parse or are unscored are silently skipped.
pub async fn compare_companies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompareParams>,
) -> Result<Json<Vec<CompareEntry>>, AppError> {
    tracing::info!("GET /companies/compare - ids: {}", params.ids);

    let ids: Vec<Uuid> = params
        .ids
        .split(',')
        .filter_map(|s| Uuid::parse_str(s.trim()).ok())
        .collect();
    if ids.is_empty() {
        return Err(AppError::BadRequest(
            "At least one valid company id required".to_string(),
        ));
    }

    let store = ScoreStore::new(state.db.clone());
    let population = store.all_scored().await?;
    let ranks = stats::rank_map(&population);

    let mut entries: Vec<CompareEntry> = population
        .iter()
        .filter(|sc| ids.contains(&sc.company.id))
        .map(|sc| CompareEntry {
            company: sc.company.clone(),
            score: sc.score.clone(),
            rank: ranks.get(&sc.company.id).copied().unwrap_or(0),
        })
        .collect();
    entries.sort_by_key(|e| e.rank);

    Ok(Json(entries))
}

/// GET /api/v1/sectors/:sector/statistics
pub async fn sector_statistics(
    State(state): State<Arc<AppState>>,
    Path(sector): Path<String>,
) -> Result<Json<SectorStatistics>, AppError> {
    tracing::info!("GET /sectors/{}/statistics", sector);

    let store = ScoreStore::new(state.db.clone());
    let population = store.all_scored().await?;

    stats::sector_statistics(&population, &sector)
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("No scored companies in sector '{}'", sector))
        })
}

/// POST /api/v1/companies/:id/refresh
///
/// Re-fetches indicator data, recomputes the scores and replaces the
/// company's current record. Persistence failure surfaces as an error
/// response with nothing committed.
pub async fn refresh_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RefreshResponse>, AppError> {
    tracing::info!("POST /companies/{}/refresh", id);

    let store = ScoreStore::new(state.db.clone());
    let company = store
        .get_company(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company with id {} not found", id)))?;

    let score = refresh::refresh_company_score(&state.sources, &store, &company).await?;

    Ok(Json(RefreshResponse {
        success: true,
        message: "Score updated successfully".to_string(),
        score: Some(score),
    }))
}
