use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============ Database Models ============

/// A company tracked by the observatory.
///
/// Created once at seed/import time and rarely mutated afterwards. `size`
/// holds one of `micro`, `small`, `medium`, `large` when known.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier.
    pub id: Uuid,
    /// Business registration number (SIREN, 9 digits, unique).
    pub siren: String,
    /// Display name.
    pub name: String,
    /// Free-text activity sector.
    pub sector: Option<String>,
    /// Size class (micro/small/medium/large).
    pub size: Option<String>,
    /// Country of registration.
    pub country: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Company website.
    pub website: Option<String>,
    /// Free-form contact metadata.
    pub contact_info: Option<serde_json::Value>,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of last update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw `rse_scores` row as stored (NUMERIC(5,2) score columns).
#[derive(Debug, Clone, FromRow)]
pub struct RseScoreRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub environmental_score: Option<BigDecimal>,
    pub social_score: Option<BigDecimal>,
    pub governance_score: Option<BigDecimal>,
    pub ethics_score: Option<BigDecimal>,
    pub global_score: BigDecimal,
    pub rating_letter: String,
    pub detailed_metrics: Option<serde_json::Value>,
    pub data_sources: Option<serde_json::Value>,
    pub last_updated: NaiveDate,
    pub data_quality_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Current RSE score of a company, as served by the API.
///
/// Category scores are nullable: a category may be unscored when no
/// contributing data existed. The global score is always present and equals
/// the 2-decimal mean of the non-null categories (0 when all are null).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RseScore {
    pub company_id: Uuid,
    pub environmental_score: Option<f64>,
    pub social_score: Option<f64>,
    pub governance_score: Option<f64>,
    pub ethics_score: Option<f64>,
    pub global_score: f64,
    pub rating_letter: String,
    pub detailed_metrics: DetailedMetrics,
    pub data_sources: Vec<DataSource>,
    pub last_updated: NaiveDate,
    pub data_quality_score: i32,
}

/// A company joined with its current score. The unit the aggregator and
/// query layer operate on; unscored companies never appear in one.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCompany {
    pub company: Company,
    pub score: RseScore,
}

// ============ Data Sources ============

/// The registry of known indicator sources.
///
/// `DataGouv` is part of the registry but has no fetcher yet; the
/// data-quality denominator still counts it, so quality currently tops out
/// at 75 when every queried source answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Insee,
    PortailRse,
    Ademe,
    DataGouv,
}

impl DataSource {
    /// Every known source type, in registry order.
    pub const ALL: [DataSource; 4] = [
        DataSource::Insee,
        DataSource::PortailRse,
        DataSource::Ademe,
        DataSource::DataGouv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Insee => "insee",
            DataSource::PortailRse => "portail_rse",
            DataSource::Ademe => "ademe",
            DataSource::DataGouv => "data_gouv",
        }
    }
}

// ============ Raw Source Payloads ============

/// Basic company information from the INSEE establishment API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicInfo {
    /// Declared headcount.
    pub employee_count: Option<i64>,
    /// Whether the company publishes its financial accounts.
    pub publication_comptes: Option<bool>,
}

/// Declared CSR indicators from the Portail RSE.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RseInfo {
    /// Certifications held (e.g. "ISO 14001").
    pub certifications: Option<Vec<String>>,
    /// Professional gender-equality index (0-100).
    pub index_egalite: Option<f64>,
    /// Whether continuing-education programs are declared.
    pub formation_continue: Option<bool>,
    /// Diversity policy document, when declared. Presence is what counts.
    pub politique_diversite: Option<serde_json::Value>,
    /// Whether an ethics code is declared published.
    pub code_ethique: Option<bool>,
    /// Anti-corruption policy document, when declared. Presence is what counts.
    pub politique_anticorruption: Option<serde_json::Value>,
}

/// Environmental indicators from the ADEME open-data API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentalInfo {
    /// Carbon-footprint report, when one was filed. Presence is what counts.
    pub bilan_carbone: Option<serde_json::Value>,
    /// Share of renewable energy in consumption, in percent.
    pub energie_renouvelable: Option<f64>,
    /// CO2 emissions (tons/year).
    pub co2_emissions: Option<f64>,
    /// Energy consumption (MWh/year).
    pub energy_consumption: Option<f64>,
    /// Waste production (tons/year).
    pub waste_production: Option<f64>,
}

/// Everything the indicator sources returned for one company.
///
/// Each section maps to exactly one source; an unreachable or erroring
/// source simply leaves its section at `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCompanyData {
    pub basic_info: Option<BasicInfo>,
    pub rse_info: Option<RseInfo>,
    pub environmental_info: Option<EnvironmentalInfo>,
}

impl RawCompanyData {
    /// Source identifiers that actually contributed a section.
    pub fn present_sources(&self) -> Vec<DataSource> {
        let mut sources = Vec::new();
        if self.basic_info.is_some() {
            sources.push(DataSource::Insee);
        }
        if self.rse_info.is_some() {
            sources.push(DataSource::PortailRse);
        }
        if self.environmental_info.is_some() {
            sources.push(DataSource::Ademe);
        }
        sources
    }
}

// ============ Score Computation Output ============

/// Fixed-shape projection of the named facts callers display alongside the
/// scores. A projection, not a computation: absent inputs stay null/empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedMetrics {
    pub co2_emissions: Option<f64>,
    pub energy_consumption: Option<f64>,
    pub waste_production: Option<f64>,
    pub employee_count: Option<i64>,
    pub gender_equality_index: Option<f64>,
    pub certifications: Vec<String>,
}

/// Letter rating derived from the global score.
///
/// Variant order is best-first so that `Ord` sorts A+ before E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    E,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::APlus => "A+",
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::E => "E",
        }
    }

    /// Parses a stored letter. Unknown letters yield `None`.
    pub fn from_letter(letter: &str) -> Option<Rating> {
        match letter {
            "A+" => Some(Rating::APlus),
            "A" => Some(Rating::A),
            "B" => Some(Rating::B),
            "C" => Some(Rating::C),
            "D" => Some(Rating::D),
            "E" => Some(Rating::E),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the score calculator for one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub environmental_score: Option<f64>,
    pub social_score: Option<f64>,
    pub governance_score: Option<f64>,
    pub ethics_score: Option<f64>,
    pub global_score: f64,
    pub rating_letter: Rating,
    pub detailed_metrics: DetailedMetrics,
    pub data_sources: Vec<DataSource>,
    pub data_quality_score: i32,
}

// ============ Query Parameters ============

/// Query parameters for the company listing endpoint.
///
/// All filters are optional and combine with AND. Unrecognized sort values
/// fall back to safe defaults instead of erroring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyQueryParams {
    /// Substring match on name or SIREN.
    pub q: Option<String>,
    /// Exact sector match.
    pub sector: Option<String>,
    /// Inclusive lower bound on global score.
    pub min_score: Option<f64>,
    /// Inclusive upper bound on global score.
    pub max_score: Option<f64>,
    /// Sort field: name, sector, global_score, rating_letter, rank.
    pub sort_by: Option<String>,
    /// Sort order: asc or desc.
    pub sort_dir: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
}

/// Query parameters for the compare endpoint.
#[derive(Debug, Deserialize)]
pub struct CompareParams {
    /// Comma-separated company ids.
    pub ids: String,
}

// ============ API Responses ============

/// One company joined with its current score and global rank.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCompany {
    pub id: Uuid,
    pub siren: String,
    pub name: String,
    pub sector: Option<String>,
    pub size: Option<String>,
    pub country: String,
    pub global_score: f64,
    pub rating_letter: String,
    pub data_quality_score: i32,
    /// 1-based position within the full scored population.
    pub rank: usize,
}

impl RankedCompany {
    pub fn from_scored(sc: &ScoredCompany, rank: usize) -> Self {
        Self {
            id: sc.company.id,
            siren: sc.company.siren.clone(),
            name: sc.company.name.clone(),
            sector: sc.company.sector.clone(),
            size: sc.company.size.clone(),
            country: sc.company.country.clone(),
            global_score: sc.score.global_score,
            rating_letter: sc.score.rating_letter.clone(),
            data_quality_score: sc.score.data_quality_score,
            rank,
        }
    }
}

/// Echo of the filter/sort actually applied, for UI state restoration.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedQuery {
    pub q: Option<String>,
    pub sector: Option<String>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub sort_by: String,
    pub sort_dir: String,
    pub page: usize,
}

/// Paginated company listing.
#[derive(Debug, Serialize)]
pub struct CompanyListResponse {
    pub companies: Vec<RankedCompany>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub applied: AppliedQuery,
}

/// Response payload for the refresh endpoint.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub score: Option<RseScore>,
}
