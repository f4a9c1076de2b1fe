//! Indicator fetcher: one client per external source, queried concurrently
//! with independent timeouts.
//!
//! Failure policy: a timeout, non-success status, decode failure or open
//! circuit breaker leaves the source's section at `None` in the returned
//! payload. Scoring treats missing sections as "unscored", so a flaky
//! source can never fail a refresh.

use crate::circuit_breaker::{create_source_circuit_breaker, SourceBreaker};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{BasicInfo, EnvironmentalInfo, RawCompanyData, RseInfo};
use failsafe::futures::CircuitBreaker;
use moka::future::Cache;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Raw payloads are cached per SIREN so repeated refreshes within the
/// window do not hammer the public APIs.
const PAYLOAD_CACHE_TTL_SECS: u64 = 3600;
const PAYLOAD_CACHE_CAPACITY: u64 = 10_000;

pub struct IndicatorSources {
    client: Client,
    insee_base_url: String,
    portail_rse_base_url: String,
    ademe_base_url: String,
    timeout: Duration,
    insee_breaker: SourceBreaker,
    portail_rse_breaker: SourceBreaker,
    ademe_breaker: SourceBreaker,
    payload_cache: Cache<String, RawCompanyData>,
}

impl IndicatorSources {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            insee_base_url: config.insee_base_url.clone(),
            portail_rse_base_url: config.portail_rse_base_url.clone(),
            ademe_base_url: config.ademe_base_url.clone(),
            timeout: Duration::from_secs(config.source_timeout_secs),
            insee_breaker: create_source_circuit_breaker(),
            portail_rse_breaker: create_source_circuit_breaker(),
            ademe_breaker: create_source_circuit_breaker(),
            payload_cache: Cache::builder()
                .time_to_live(Duration::from_secs(PAYLOAD_CACHE_TTL_SECS))
                .max_capacity(PAYLOAD_CACHE_CAPACITY)
                .build(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, AppError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::SourceError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::SourceError(format!(
                "source returned status {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::SourceError(format!("failed to decode response: {}", e)))
    }

    /// Basic company information from the INSEE establishment API.
    pub async fn fetch_basic_info(&self, siren: &str) -> Option<BasicInfo> {
        let url = reqwest::Url::parse(&format!("{}/etablissements/{}", self.insee_base_url, siren));
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("INSEE URL for SIREN {} did not parse: {}", siren, e);
                return None;
            }
        };

        match self.insee_breaker.call(self.get_json::<BasicInfo>(url)).await {
            Ok(info) => Some(info),
            Err(failsafe::Error::Inner(e)) => {
                tracing::warn!("INSEE fetch failed for SIREN {}: {}", siren, e);
                None
            }
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("INSEE circuit open, skipping SIREN {}", siren);
                None
            }
        }
    }

    /// Declared CSR indicators from the Portail RSE.
    pub async fn fetch_rse_info(&self, siren: &str) -> Option<RseInfo> {
        let url = reqwest::Url::parse(&format!(
            "{}/entreprises/{}",
            self.portail_rse_base_url, siren
        ));
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Portail RSE URL for SIREN {} did not parse: {}", siren, e);
                return None;
            }
        };

        match self
            .portail_rse_breaker
            .call(self.get_json::<RseInfo>(url))
            .await
        {
            Ok(info) => Some(info),
            Err(failsafe::Error::Inner(e)) => {
                tracing::warn!("Portail RSE fetch failed for SIREN {}: {}", siren, e);
                None
            }
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("Portail RSE circuit open, skipping SIREN {}", siren);
                None
            }
        }
    }

    /// Environmental indicators (carbon reports and consumption figures)
    /// from the ADEME open-data API.
    pub async fn fetch_environmental_info(&self, siren: &str) -> Option<EnvironmentalInfo> {
        // Query-parameter endpoint, built with encoding to keep the SIREN
        // from mangling the URL.
        let url = reqwest::Url::parse_with_params(
            &format!("{}/bilans-carbone", self.ademe_base_url),
            &[("siren", siren)],
        );
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("ADEME URL for SIREN {} did not parse: {}", siren, e);
                return None;
            }
        };

        match self
            .ademe_breaker
            .call(self.get_json::<EnvironmentalInfo>(url))
            .await
        {
            Ok(info) => Some(info),
            Err(failsafe::Error::Inner(e)) => {
                tracing::warn!("ADEME fetch failed for SIREN {}: {}", siren, e);
                None
            }
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("ADEME circuit open, skipping SIREN {}", siren);
                None
            }
        }
    }

    /// Fetches every section for one company, concurrently.
    ///
    /// Sources are independent; each gets its own timeout and breaker, and
    /// an unavailable one only leaves its section empty.
    pub async fn fetch_company_data(&self, siren: &str) -> RawCompanyData {
        if let Some(cached) = self.payload_cache.get(siren).await {
            tracing::debug!("Raw payload cache hit for SIREN {}", siren);
            return cached;
        }

        let (basic_info, rse_info, environmental_info) = tokio::join!(
            self.fetch_basic_info(siren),
            self.fetch_rse_info(siren),
            self.fetch_environmental_info(siren),
        );

        let data = RawCompanyData {
            basic_info,
            rse_info,
            environmental_info,
        };

        tracing::info!(
            "Fetched indicator data for SIREN {}: {} of {} known sources answered",
            siren,
            data.present_sources().len(),
            crate::models::DataSource::ALL.len()
        );

        self.payload_cache.insert(siren.to_string(), data.clone()).await;
        data
    }
}
