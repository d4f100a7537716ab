//! HTTP client for OpenAI-compatible text completion endpoints.
//!
//! Sends `POST {base_url}/completions` with the assembled prompt and the
//! plan's generation parameters, and normalizes the first choice into a
//! [`GenerationOutput`]. Works with OpenAI, vLLM, llama.cpp server, and
//! Ollama's `/v1` surface.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the Authorization header.

use std::time::Duration;

use parley_core::llm::generator::TextGenerator;
use parley_types::config::GenerationConfig;
use parley_types::llm::{GenerationOutput, GenerationRequest, LlmError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable holding the provider API key, if any.
pub const API_KEY_ENV: &str = "PARLEY_LLM_API_KEY";

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: Option<String>,
}

/// Generator backed by an OpenAI-compatible completions API.
///
/// Does NOT derive Debug so the API key cannot end up in logs.
pub struct CompletionsGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl CompletionsGenerator {
    /// Build a generator. `timeout` bounds the whole HTTP exchange; the chat
    /// service applies its own deadline on top.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    /// Build from the `[generation]` config section, reading the API key from
    /// `PARLEY_LLM_API_KEY` when set.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from);
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/completions", self.base_url)
    }
}

/// Pull the generated text out of a decoded response.
fn extract_text(response: CompletionResponse) -> Result<GenerationOutput, LlmError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.text)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(GenerationOutput { text })
}

impl TextGenerator for CompletionsGenerator {
    fn name(&self) -> &str {
        "completions"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput, LlmError> {
        let body = CompletionBody {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut builder = self.client.post(self.url()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Provider {
                    message: format!("HTTP request failed: {e}"),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let decoded: CompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Deserialization(format!("failed to parse response: {e}"))
            }
        })?;

        let output = extract_text(decoded)?;
        debug!(model = %self.model, chars = output.text.len(), "Completion received");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> CompletionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_first_choice() {
        let output = extract_text(decode(
            r#"{"id":"cmpl-1","choices":[{"text":" Hi there!\n","index":0},{"text":"other"}]}"#,
        ))
        .unwrap();
        assert_eq!(output.text, "Hi there!");
    }

    #[test]
    fn test_extract_empty_or_missing_text() {
        for json in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"text":"   "}]}"#,
            r#"{"choices":[{"index":0}]}"#,
            r#"{}"#,
        ] {
            assert!(matches!(
                extract_text(decode(json)).unwrap_err(),
                LlmError::EmptyResponse
            ));
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = CompletionBody {
            model: "llama3.2",
            prompt: "user: hi\nassistant:",
            max_tokens: 200,
            temperature: 0.2,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "llama3.2");
        assert_eq!(value["max_tokens"], 200);
        assert!(value["prompt"].as_str().unwrap().ends_with("assistant:"));
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let generator = CompletionsGenerator::new(
            "http://localhost:11434/v1/",
            "llama3.2",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(generator.url(), "http://localhost:11434/v1/completions");
        assert_eq!(generator.name(), "completions");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let generator = CompletionsGenerator::new(
            "http://127.0.0.1:9",
            "llama3.2",
            Some(SecretString::from("test-key-not-real")),
            Duration::from_secs(5),
        )
        .unwrap();
        let request = GenerationRequest {
            prompt: "hi".to_string(),
            max_tokens: 10,
            temperature: 0.2,
        };
        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::Provider { .. } | LlmError::Timeout));
    }
}
