/// Integration tests with mocked indicator source APIs
/// Exercises the fetch-and-score path without hitting the real services
use rse_score_api::config::Config;
use rse_score_api::models::DataSource;
use rse_score_api::scoring;
use rse_score_api::sources::IndicatorSources;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIREN: &str = "552120222";

/// Helper function to create a test config with every source pointed at
/// the mock server
fn create_test_config(base_url: String) -> Config {
    Config {
        database_url: "postgresql://test".to_string(),
        port: 8080,
        insee_base_url: base_url.clone(),
        portail_rse_base_url: base_url.clone(),
        ademe_base_url: base_url,
        source_timeout_secs: 5,
        page_size: 20,
    }
}

fn insee_body() -> serde_json::Value {
    serde_json::json!({
        "employee_count": 1200,
        "publication_comptes": true
    })
}

fn portail_rse_body() -> serde_json::Value {
    serde_json::json!({
        "certifications": ["ISO 14001"],
        "index_egalite": 88,
        "formation_continue": true,
        "code_ethique": true
    })
}

fn ademe_body() -> serde_json::Value {
    serde_json::json!({
        "bilan_carbone": {"year": 2024},
        "energie_renouvelable": 62.0,
        "co2_emissions": 12500.0
    })
}

async fn mount_insee(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/etablissements/{}", SIREN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(insee_body()))
        .mount(server)
        .await;
}

async fn mount_portail_rse(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/entreprises/{}", SIREN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(portail_rse_body()))
        .mount(server)
        .await;
}

async fn mount_ademe(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/bilans-carbone"))
        .and(query_param("siren", SIREN))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_all_sources_answering_fills_every_section() {
    let mock_server = MockServer::start().await;
    mount_insee(&mock_server).await;
    mount_portail_rse(&mock_server).await;
    mount_ademe(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(ademe_body()),
    )
    .await;

    let sources = IndicatorSources::new(&create_test_config(mock_server.uri()));
    let data = sources.fetch_company_data(SIREN).await;

    assert!(data.basic_info.is_some());
    assert!(data.rse_info.is_some());
    assert!(data.environmental_info.is_some());
    assert_eq!(
        data.present_sources(),
        vec![DataSource::Insee, DataSource::PortailRse, DataSource::Ademe]
    );

    let result = scoring::calculate(&data);
    // 3 of the 4 registry sources answered
    assert_eq!(result.data_quality_score, 75);
    assert_eq!(result.environmental_score, Some(100.0));
    assert_eq!(result.detailed_metrics.employee_count, Some(1200));
}

#[tokio::test]
async fn test_failing_source_is_omitted_not_fatal() {
    let mock_server = MockServer::start().await;
    mount_insee(&mock_server).await;
    mount_portail_rse(&mock_server).await;
    // ADEME is down
    mount_ademe(&mock_server, ResponseTemplate::new(500)).await;

    let sources = IndicatorSources::new(&create_test_config(mock_server.uri()));
    let data = sources.fetch_company_data(SIREN).await;

    assert!(data.basic_info.is_some());
    assert!(data.rse_info.is_some());
    assert!(data.environmental_info.is_none());

    let result = scoring::calculate(&data);
    assert_eq!(result.data_quality_score, 50);
    // Without the ADEME section the carbon and renewable bonuses vanish
    // but the ISO 14001 one still applies
    assert_eq!(result.environmental_score, Some(65.0));
}

#[tokio::test]
async fn test_no_source_reachable_still_scores() {
    // No mocks mounted: every fetch gets a 404
    let mock_server = MockServer::start().await;

    let sources = IndicatorSources::new(&create_test_config(mock_server.uri()));
    let data = sources.fetch_company_data(SIREN).await;

    assert!(data.present_sources().is_empty());

    let result = scoring::calculate(&data);
    assert_eq!(result.data_quality_score, 0);
    assert_eq!(result.global_score, 50.0);
    assert_eq!(result.rating_letter.as_str(), "D");
}

#[tokio::test]
async fn test_garbage_payload_is_treated_as_unavailable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/etablissements/{}", SIREN)))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;
    mount_portail_rse(&mock_server).await;
    mount_ademe(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(ademe_body()),
    )
    .await;

    let sources = IndicatorSources::new(&create_test_config(mock_server.uri()));
    let data = sources.fetch_company_data(SIREN).await;

    assert!(data.basic_info.is_none());
    assert!(data.rse_info.is_some());
    assert!(data.environmental_info.is_some());
}

#[tokio::test]
async fn test_raw_payloads_are_cached_per_siren() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/etablissements/{}", SIREN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(insee_body()))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_portail_rse(&mock_server).await;
    mount_ademe(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(ademe_body()),
    )
    .await;

    let sources = IndicatorSources::new(&create_test_config(mock_server.uri()));
    let first = sources.fetch_company_data(SIREN).await;
    let second = sources.fetch_company_data(SIREN).await;

    assert_eq!(first.present_sources(), second.present_sources());
    // The expect(1) above verifies INSEE was only hit once
}
