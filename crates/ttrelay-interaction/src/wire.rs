//! Shared chat-completions wire format and error mapping.
//!
//! OpenAI, DeepSeek and Groq all accept the same request body and return
//! the same response shape, so one set of types serves all three clients.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ttrelay_core::conversation::Turn;
use ttrelay_core::provider::{Backend, ProviderError};

/// Request timeout applied to every provider call. Expiry surfaces as a
/// connectivity failure to the user rather than hanging a task forever.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client shared by the provider implementations.
pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Request body for a chat-completions POST.
///
/// [`Turn`] already serializes to the role/content shape the APIs expect,
/// so the bounded history is sent as-is.
#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Turn],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Posts one completion request and extracts the answer text.
///
/// All failure modes are folded into the [`ProviderError`] taxonomy here so
/// the individual clients stay declarative.
pub(crate) async fn post_chat(
    client: &Client,
    url: &str,
    api_key: &str,
    backend: Backend,
    request: &ChatCompletionRequest<'_>,
) -> Result<String, ProviderError> {
    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("content-type", "application/json")
        .json(request)
        .send()
        .await
        .map_err(|err| map_transport_error(backend, &err))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        return Err(map_status_error(backend, status, body));
    }

    let parsed: ChatCompletionResponse = match response.json().await {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(backend = %backend, error = %err, "malformed completion payload");
            return Err(ProviderError::EmptyResponse { backend });
        }
    };

    extract_answer(backend, parsed)
}

fn map_transport_error(backend: Backend, err: &reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::Connectivity {
            backend,
            message: err.to_string(),
        }
    } else {
        ProviderError::Unknown {
            backend,
            message: err.to_string(),
        }
    }
}

fn map_status_error(backend: Backend, status: StatusCode, body: String) -> ProviderError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    ProviderError::Provider {
        backend,
        status: status.as_u16(),
        message,
    }
}

fn extract_answer(
    backend: Backend,
    response: ChatCompletionResponse,
) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse { backend })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_openai_shape() {
        let history = vec![Turn::user("hello"), Turn::assistant("hi there")];
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &history,
            max_tokens: Some(200),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"][1]["content"], "hi there");
    }

    #[test]
    fn max_tokens_is_omitted_when_unset() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &[],
            max_tokens: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn status_error_prefers_provider_error_message() {
        let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#.to_string();
        let err = map_status_error(Backend::OpenAi, StatusCode::UNAUTHORIZED, body);
        match err {
            ProviderError::Provider {
                status, message, ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn status_error_falls_back_to_raw_body() {
        let err = map_status_error(
            Backend::Groq,
            StatusCode::BAD_GATEWAY,
            "upstream exploded".to_string(),
        );
        match err {
            ProviderError::Provider { message, .. } => assert_eq!(message, "upstream exploded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_choices_map_to_empty_response() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let err = extract_answer(Backend::DeepSeek, response).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse { .. }));
    }

    #[test]
    fn blank_content_maps_to_empty_response() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        let err = extract_answer(Backend::DeepSeek, response).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse { .. }));
    }

    #[test]
    fn answer_is_extracted_from_first_choice() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"hi there"}}]}"#).unwrap();
        assert_eq!(
            extract_answer(Backend::OpenAi, response).unwrap(),
            "hi there"
        );
    }
}
