use serde::Serialize;

pub(crate) mod calendar_controller;
pub(crate) mod call_controller;
pub(crate) mod category_controller;
pub(crate) mod drive_controller;
pub(crate) mod health_check_controller;
pub(crate) mod integration_controller;
pub(crate) mod prompt_controller;
pub(crate) mod user_controller;

use domain::call_import::ImportSettings;
use domain::category_classifier::ClassifierSettings;
use domain::confidence_policy::ConfidencePolicy;
use domain::gateway::openai::OpenAiClient;
use domain::transcript_match::MatchConfig;
use service::config::Config;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }
}

/// Pipeline tunables as configured for this deployment.
pub(crate) fn import_settings(config: &Config) -> ImportSettings {
    ImportSettings {
        classifier: ClassifierSettings {
            transcript_char_budget: config.transcript_char_budget,
            review_floor: config.confidence_review_threshold,
            assign_floor: config.confidence_assign_threshold,
            ..Default::default()
        },
        policy: ConfidencePolicy {
            assign_threshold: config.confidence_assign_threshold,
            review_threshold: config.confidence_review_threshold,
        },
        matching: MatchConfig {
            tolerance_minutes: config.time_match_window_minutes,
            ..Default::default()
        },
        item_delay_ms: config.batch_item_delay_ms,
    }
}

pub(crate) fn openai_client(config: &Config) -> Result<OpenAiClient, crate::Error> {
    let api_key = config
        .openai_api_key()
        .ok_or_else(|| domain::error::Error::config("OPENAI_API_KEY is not set"))?;

    Ok(OpenAiClient::new(
        api_key,
        config.openai_base_url(),
        &config.openai_model,
    )
    .map_err(domain::error::Error::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_serialize_api_response_with_some() {
        let response = ApiResponse {
            status_code: StatusCode::OK.into(),
            data: Some(23),
        };
        let serialized = serde_json::to_string(&response).unwrap();

        // Serializing and then deserializing because the string output from serde_json::to_string is
        // non-deterministic as far as the order of the JSON keys. This ensures the test won't be flaky
        let deserialized_value: serde_json::Value = serde_json::from_str(&serialized).unwrap();
        let deserialized_expected_value: serde_json::Value =
            json!({"data": 23, "status_code": 200});
        assert_eq!(deserialized_value, deserialized_expected_value);
    }

    #[tokio::test]
    async fn test_serialize_api_response_with_none() {
        let response = ApiResponse::<()> {
            status_code: StatusCode::NO_CONTENT.into(),
            data: None,
        };
        // No need to deserialize here because there's only one key
        let serialized = serde_json::to_string(&response).unwrap();
        assert_eq!(serialized, json!({"status_code": 204}).to_string());
    }
}
