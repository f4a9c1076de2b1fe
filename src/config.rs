use serde::Deserialize;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL of the INSEE establishment API (basic company info).
    pub insee_base_url: String,
    /// Base URL of the Portail RSE API (declared CSR indicators).
    pub portail_rse_base_url: String,
    /// Base URL of the ADEME open-data API (environmental indicators).
    pub ademe_base_url: String,
    /// Per-source fetch timeout in seconds.
    pub source_timeout_secs: u64,
    /// Page size for company listings.
    pub page_size: usize,
}

const DEFAULT_INSEE_BASE_URL: &str = "https://api.insee.fr/api";
const DEFAULT_PORTAIL_RSE_BASE_URL: &str = "https://portail-rse.beta.gouv.fr/api";
const DEFAULT_ADEME_BASE_URL: &str = "https://data.ademe.fr/api";

fn require_http_url(var: &str, value: String) -> anyhow::Result<String> {
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", var);
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", var);
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            insee_base_url: require_http_url(
                "INSEE_BASE_URL",
                std::env::var("INSEE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_INSEE_BASE_URL.to_string()),
            )?,
            portail_rse_base_url: require_http_url(
                "PORTAIL_RSE_BASE_URL",
                std::env::var("PORTAIL_RSE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_PORTAIL_RSE_BASE_URL.to_string()),
            )?,
            ademe_base_url: require_http_url(
                "ADEME_BASE_URL",
                std::env::var("ADEME_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_ADEME_BASE_URL.to_string()),
            )?,
            source_timeout_secs: std::env::var("SOURCE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SOURCE_TIMEOUT_SECS must be a positive integer"))?,
            page_size: std::env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow::anyhow!("PAGE_SIZE must be a positive integer"))?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("INSEE base URL: {}", config.insee_base_url);
        tracing::debug!("Portail RSE base URL: {}", config.portail_rse_base_url);
        tracing::debug!("ADEME base URL: {}", config.ademe_base_url);
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }
}
