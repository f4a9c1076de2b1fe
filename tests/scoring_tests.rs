/// Unit tests for the scoring engine
/// Covers category bonuses, the global mean, metrics projection and the
/// data-quality score
use rse_score_api::models::{
    BasicInfo, DataSource, EnvironmentalInfo, RawCompanyData, Rating, RseInfo,
};
use rse_score_api::scoring;
use serde_json::json;

fn full_payload() -> RawCompanyData {
    RawCompanyData {
        basic_info: Some(BasicInfo {
            employee_count: Some(1200),
            publication_comptes: Some(true),
        }),
        rse_info: Some(RseInfo {
            certifications: Some(vec!["ISO 14001".to_string(), "ISO 9001".to_string()]),
            index_egalite: Some(88.0),
            formation_continue: Some(true),
            politique_diversite: Some(json!({"published": "2024-02-01"})),
            code_ethique: Some(true),
            politique_anticorruption: Some(json!({"published": "2023-11-15"})),
        }),
        environmental_info: Some(EnvironmentalInfo {
            bilan_carbone: Some(json!({"year": 2024})),
            energie_renouvelable: Some(62.0),
            co2_emissions: Some(12500.0),
            energy_consumption: Some(48000.0),
            waste_production: Some(320.0),
        }),
    }
}

#[cfg(test)]
mod category_score_tests {
    use super::*;

    #[test]
    fn empty_payload_yields_base_scores() {
        let data = RawCompanyData::default();
        assert_eq!(scoring::environmental_score(&data), Some(50.0));
        assert_eq!(scoring::social_score(&data), Some(50.0));
        assert_eq!(scoring::governance_score(&data), Some(50.0));
        assert_eq!(scoring::ethics_score(&data), Some(50.0));
    }

    #[test]
    fn full_payload_maxes_every_bonus() {
        let data = full_payload();
        // 50 + 20 (carbon report) + 15 (ISO 14001) + 15 (renewables) = 100
        assert_eq!(scoring::environmental_score(&data), Some(100.0));
        // 50 + 20 (parity) + 15 (training) + 15 (diversity) = 100
        assert_eq!(scoring::social_score(&data), Some(100.0));
        // 50 + 20 (accounts) + 15 (certifications) = 85, no cap hit
        assert_eq!(scoring::governance_score(&data), Some(85.0));
        // 50 + 25 (ethics code) + 25 (anti-corruption) = 100
        assert_eq!(scoring::ethics_score(&data), Some(100.0));
    }

    #[test]
    fn category_scores_are_clamped_at_100() {
        let data = full_payload();
        for score in [
            scoring::environmental_score(&data),
            scoring::social_score(&data),
            scoring::governance_score(&data),
            scoring::ethics_score(&data),
        ] {
            let value = score.expect("current rules always produce a value");
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn renewable_share_must_exceed_threshold() {
        let mut data = RawCompanyData::default();
        data.environmental_info = Some(EnvironmentalInfo {
            energie_renouvelable: Some(50.0),
            ..Default::default()
        });
        // exactly 50 is not "> 50"
        assert_eq!(scoring::environmental_score(&data), Some(50.0));

        data.environmental_info = Some(EnvironmentalInfo {
            energie_renouvelable: Some(50.1),
            ..Default::default()
        });
        assert_eq!(scoring::environmental_score(&data), Some(65.0));
    }

    #[test]
    fn parity_index_must_exceed_threshold() {
        let mut data = RawCompanyData::default();
        data.rse_info = Some(RseInfo {
            index_egalite: Some(75.0),
            ..Default::default()
        });
        assert_eq!(scoring::social_score(&data), Some(50.0));

        data.rse_info = Some(RseInfo {
            index_egalite: Some(76.0),
            ..Default::default()
        });
        assert_eq!(scoring::social_score(&data), Some(70.0));
    }

    #[test]
    fn iso_14001_required_for_environmental_certification_bonus() {
        let mut data = RawCompanyData::default();
        data.rse_info = Some(RseInfo {
            certifications: Some(vec!["ISO 9001".to_string()]),
            ..Default::default()
        });
        // Wrong certification: no environmental bonus, but the governance
        // non-empty-list bonus still applies
        assert_eq!(scoring::environmental_score(&data), Some(50.0));
        assert_eq!(scoring::governance_score(&data), Some(65.0));
    }

    #[test]
    fn declared_false_booleans_earn_no_bonus() {
        let mut data = RawCompanyData::default();
        data.basic_info = Some(BasicInfo {
            publication_comptes: Some(false),
            ..Default::default()
        });
        data.rse_info = Some(RseInfo {
            formation_continue: Some(false),
            code_ethique: Some(false),
            ..Default::default()
        });
        assert_eq!(scoring::governance_score(&data), Some(50.0));
        assert_eq!(scoring::social_score(&data), Some(50.0));
        assert_eq!(scoring::ethics_score(&data), Some(50.0));
    }

    #[test]
    fn presence_only_fields_count_regardless_of_value() {
        let mut data = RawCompanyData::default();
        data.rse_info = Some(RseInfo {
            politique_diversite: Some(json!("charte 2023")),
            politique_anticorruption: Some(json!(false)),
            ..Default::default()
        });
        assert_eq!(scoring::social_score(&data), Some(65.0));
        assert_eq!(scoring::ethics_score(&data), Some(75.0));
    }
}

#[cfg(test)]
mod calculate_tests {
    use super::*;

    #[test]
    fn calculate_on_full_payload() {
        let result = scoring::calculate(&full_payload());

        // (100 + 100 + 85 + 100) / 4 = 96.25
        assert_eq!(result.global_score, 96.25);
        assert_eq!(result.rating_letter, Rating::APlus);
        assert_eq!(
            result.data_sources,
            vec![DataSource::Insee, DataSource::PortailRse, DataSource::Ademe]
        );
        // 3 of 4 known sources answered
        assert_eq!(result.data_quality_score, 75);
    }

    #[test]
    fn calculate_never_fails_on_empty_payload() {
        let result = scoring::calculate(&RawCompanyData::default());

        assert_eq!(result.global_score, 50.0);
        assert_eq!(result.rating_letter, Rating::D);
        assert!(result.data_sources.is_empty());
        assert_eq!(result.data_quality_score, 0);
        assert_eq!(result.detailed_metrics.certifications.len(), 0);
        assert!(result.detailed_metrics.co2_emissions.is_none());
    }

    #[test]
    fn data_quality_counts_present_sources_over_known_registry() {
        // 2 of 4 known sources -> round(100 * 2/4) = 50
        let data = RawCompanyData {
            basic_info: Some(BasicInfo::default()),
            rse_info: Some(RseInfo::default()),
            environmental_info: None,
        };
        assert_eq!(scoring::data_quality_score(&data), 50);

        let one = RawCompanyData {
            basic_info: Some(BasicInfo::default()),
            ..Default::default()
        };
        // round(100 * 1/4) = 25
        assert_eq!(scoring::data_quality_score(&one), 25);
    }

    #[test]
    fn metrics_projection_pulls_named_fields() {
        let result = scoring::calculate(&full_payload());
        let metrics = result.detailed_metrics;

        assert_eq!(metrics.co2_emissions, Some(12500.0));
        assert_eq!(metrics.energy_consumption, Some(48000.0));
        assert_eq!(metrics.waste_production, Some(320.0));
        assert_eq!(metrics.employee_count, Some(1200));
        assert_eq!(metrics.gender_equality_index, Some(88.0));
        assert_eq!(
            metrics.certifications,
            vec!["ISO 14001".to_string(), "ISO 9001".to_string()]
        );
    }

    #[test]
    fn global_score_mean_is_rounded_to_two_decimals() {
        // Only a diversity policy: social = 65, others 50.
        // (50 + 65 + 50 + 50) / 4 = 53.75
        let mut data = RawCompanyData::default();
        data.rse_info = Some(RseInfo {
            politique_diversite: Some(json!({})),
            ..Default::default()
        });
        let result = scoring::calculate(&data);
        assert_eq!(result.global_score, 53.75);
        assert_eq!(result.rating_letter, Rating::D);
    }
}
