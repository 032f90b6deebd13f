//! OpenAI chat-completions client.
//!
//! Implements the completion provider trait used by summarization,
//! adjudication and call analysis.

use async_trait::async_trait;
use call_ai::traits::completion::Provider;
use call_ai::{CompletionOptions, Error};
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI API client
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new client with the given API key, base URL and model
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", api_key);
        let mut header_value =
            reqwest::header::HeaderValue::from_str(&auth_value).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error::Configuration("Invalid API key format".to_string())
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn retry_after_seconds(response: &reqwest::Response) -> u64 {
        response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(60)
    }
}

#[async_trait]
impl Provider for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, Error> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        debug!("OpenAI completion request to model {}", self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach OpenAI: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                retry_after_seconds: Self::retry_after_seconds(&response),
            });
        }
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication(
                "OpenAI rejected the API key".to_string(),
            ));
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("OpenAI API error: {}", error_text);
            return Err(Error::Provider(error_text));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse OpenAI response: {:?}", e);
            Error::MalformedResponse("Invalid response from OpenAI".to_string())
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::MalformedResponse("Completion had no content".to_string()))
    }

    fn provider_id(&self) -> &str {
        "openai"
    }

    /// Verify the API key is valid by listing models
    async fn verify_credentials(&self) -> Result<bool, Error> {
        let url = format!("{}/models", self.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to verify OpenAI API key: {:?}", e);
            Error::Network(e.to_string())
        })?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn complete_returns_first_choice_content() -> Result<(), Error> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("A focused summary."))
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", &server.url(), "gpt-4o-mini")?;
        let content = client
            .complete("system", "user", CompletionOptions::default())
            .await?;

        assert_eq!(content, "A focused summary.");
        mock.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn complete_maps_429_to_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", &server.url(), "gpt-4o-mini")
            .expect("client should build");
        let result = client
            .complete("system", "user", CompletionOptions::default())
            .await;

        match result {
            Err(Error::RateLimited {
                retry_after_seconds,
            }) => assert_eq!(retry_after_seconds, 7),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_content_is_a_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("   "))
            .create_async()
            .await;

        let client = OpenAiClient::new("test-key", &server.url(), "gpt-4o-mini")
            .expect("client should build");
        let result = client
            .complete("system", "user", CompletionOptions::structured(500))
            .await;

        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn verify_credentials_reports_status() -> Result<(), Error> {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models")
            .with_status(401)
            .create_async()
            .await;

        let client = OpenAiClient::new("bad-key", &server.url(), "gpt-4o-mini")?;
        assert!(!client.verify_credentials().await?);

        Ok(())
    }
}
