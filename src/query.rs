//! Filtering, sorting and pagination of the company listing.
//!
//! Interprets an explicit filter value against the in-memory snapshot of
//! scored companies. Only scored companies are eligible; the global rank is
//! attached from the precomputed map before sorting, never recomputed from
//! a filtered subset. Invalid sort inputs fall back to safe defaults.

use crate::models::{
    AppliedQuery, CompanyListResponse, CompanyQueryParams, RankedCompany, Rating, ScoredCompany,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Sector,
    GlobalScore,
    RatingLetter,
    Rank,
}

impl SortField {
    pub fn parse(value: &str) -> Option<SortField> {
        match value {
            "name" => Some(SortField::Name),
            "sector" => Some(SortField::Sector),
            "global_score" => Some(SortField::GlobalScore),
            "rating_letter" => Some(SortField::RatingLetter),
            "rank" => Some(SortField::Rank),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Sector => "sector",
            SortField::GlobalScore => "global_score",
            SortField::RatingLetter => "rating_letter",
            SortField::Rank => "rank",
        }
    }

    /// Natural order when none is requested: score-like fields read best
    /// first, everything else alphabetically / rank ascending.
    fn default_order(&self) -> SortOrder {
        match self {
            SortField::GlobalScore => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<SortOrder> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filter predicates, combined with AND. Absent predicates match anything.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    /// Substring match on name or SIREN, case-insensitive.
    pub query: Option<String>,
    /// Exact sector match.
    pub sector: Option<String>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
}

impl CompanyFilter {
    pub fn from_params(params: &CompanyQueryParams) -> Self {
        Self {
            query: params.q.clone().filter(|s| !s.trim().is_empty()),
            sector: params.sector.clone().filter(|s| !s.trim().is_empty()),
            min_score: params.min_score,
            max_score: params.max_score,
        }
    }

    pub fn matches(&self, sc: &ScoredCompany) -> bool {
        if let Some(ref q) = self.query {
            let needle = q.to_lowercase();
            let name_hit = sc.company.name.to_lowercase().contains(&needle);
            let siren_hit = sc.company.siren.contains(q.trim());
            if !name_hit && !siren_hit {
                return false;
            }
        }
        if let Some(ref sector) = self.sector {
            if sc.company.sector.as_deref() != Some(sector.as_str()) {
                return false;
            }
        }
        if let Some(min) = self.min_score {
            if sc.score.global_score < min {
                return false;
            }
        }
        if let Some(max) = self.max_score {
            if sc.score.global_score > max {
                return false;
            }
        }
        true
    }
}

fn rating_sort_key(letter: &str) -> u8 {
    // Unknown letters sort last
    Rating::from_letter(letter).map(|r| r as u8).unwrap_or(u8::MAX)
}

/// Runs the listing query over the scored snapshot.
///
/// `ranks` must come from [`crate::stats::rank_map`] over the *entire*
/// population, so a filtered page still shows global positions.
pub fn run(
    population: &[ScoredCompany],
    ranks: &HashMap<Uuid, usize>,
    params: &CompanyQueryParams,
    page_size: usize,
) -> CompanyListResponse {
    let filter = CompanyFilter::from_params(params);

    let sort_field = params
        .sort_by
        .as_deref()
        .and_then(SortField::parse)
        .unwrap_or(SortField::Rank);
    let sort_order = params
        .sort_dir
        .as_deref()
        .and_then(SortOrder::parse)
        .unwrap_or_else(|| sort_field.default_order());
    let page = params.page.unwrap_or(1).max(1);

    // Attach ranks first, then filter and sort the decorated rows.
    let mut rows: Vec<RankedCompany> = population
        .iter()
        .filter(|sc| filter.matches(sc))
        .map(|sc| {
            RankedCompany::from_scored(
                sc,
                ranks.get(&sc.company.id).copied().unwrap_or(usize::MAX),
            )
        })
        .collect();

    // Reversing the comparator (not the sorted vec) keeps equal rows in
    // their snapshot order for both directions.
    rows.sort_by(|a, b| {
        let ordering = match sort_field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Sector => a.sector.cmp(&b.sector),
            SortField::GlobalScore => a
                .global_score
                .partial_cmp(&b.global_score)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortField::RatingLetter => {
                rating_sort_key(&a.rating_letter).cmp(&rating_sort_key(&b.rating_letter))
            }
            SortField::Rank => a.rank.cmp(&b.rank),
        };
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = rows.len();
    let offset = (page - 1) * page_size;
    let companies: Vec<RankedCompany> = if offset >= total {
        Vec::new()
    } else {
        rows.into_iter().skip(offset).take(page_size).collect()
    };

    CompanyListResponse {
        companies,
        total,
        page,
        page_size,
        applied: AppliedQuery {
            q: filter.query,
            sector: filter.sector,
            min_score: filter.min_score,
            max_score: filter.max_score,
            sort_by: sort_field.as_str().to_string(),
            sort_dir: sort_order.as_str().to_string(),
            page,
        },
    }
}
