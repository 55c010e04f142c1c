use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, field};

use crate::{
    conciseness::Conciseness,
    error::{Result, SummarizeError},
    prompt::{ChatMessage, build_messages},
    provider::{Backend, CredentialSource, EnvCredentials, StructuredOutput},
    types::{ContextBatch, SummaryResult},
};

/// Name of the function the model is forced to call in tool-call mode.
const SUMMARY_TOOL: &str = "Summary";

/// Sends context batches to a chat-completion backend and returns typed summaries.
///
/// Holds no per-call state: the same summarizer may serve any number of
/// independent calls, concurrently or not.
#[derive(Clone)]
pub struct Summarizer {
    client: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
    base_url: Option<String>,
    model: Option<String>,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Summarizer {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials: Arc::new(EnvCredentials),
            base_url: None,
            model: None,
        }
    }

    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// Send requests to `base_url` instead of the backend's own endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Summarize `batch` with one chat-completion request.
    ///
    /// Input validation and credential lookup happen before anything is sent;
    /// failures past that point are never retried.
    #[tracing::instrument(
        name = "summarize",
        skip_all,
        fields(
            request_id = %uuid::Uuid::new_v4(),
            backend = %backend,
            conciseness = %conciseness,
            entries = batch.len(),
            model = field::Empty,
        )
    )]
    pub async fn summarize(
        &self,
        batch: &ContextBatch,
        conciseness: Conciseness,
        backend: Backend,
        additional_instructions: Option<&str>,
    ) -> Result<SummaryResult> {
        batch.validate()?;

        let config = backend.config();
        let api_key = backend.api_key(self.credentials.as_ref())?;
        let model = self.model.as_deref().unwrap_or(config.model);
        let base_url = self.base_url.as_deref().unwrap_or(config.base_url);
        tracing::Span::current().record("model", model);

        let messages = build_messages(batch, conciseness, additional_instructions)?;
        let body = request_body(model, &messages, config.structured_output);
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

        debug!(%url, "sending chat completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!(%status, "chat completion request rejected");
            return Err(SummarizeError::ApiStatus { status, body: text });
        }

        let response: Value =
            serde_json::from_str(&text).map_err(|e| SummarizeError::InvalidResponse {
                reason: format!("body is not JSON ({e}): {text}"),
            })?;
        let summary = parse_completion(&response, config.structured_output)?;
        debug!(words = summary.summary.split_whitespace().count(), "summary received");

        Ok(summary)
    }

    /// Blocking form of [`Summarizer::summarize`] for callers without an async runtime.
    ///
    /// Runs on a private current-thread runtime, so it must not be called from
    /// inside one.
    pub fn summarize_blocking(
        &self,
        batch: &ContextBatch,
        conciseness: Conciseness,
        backend: Backend,
        additional_instructions: Option<&str>,
    ) -> Result<SummaryResult> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.summarize(batch, conciseness, backend, additional_instructions))
    }
}

/// JSON schema of [`SummaryResult`] as sent to the backend.
pub fn summary_schema() -> Value {
    let mut schema = schemars::schema_for!(SummaryResult).to_value();
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
    }
    schema
}

fn request_body(model: &str, messages: &[ChatMessage], mode: StructuredOutput) -> Value {
    let schema = summary_schema();
    let mut body = json!({
        "model": model,
        "messages": messages,
    });

    match mode {
        StructuredOutput::ToolCall => {
            body["tools"] = json!([{
                "type": "function",
                "function": {
                    "name": SUMMARY_TOOL,
                    "description": "Summary of the video built from its visual and audio context",
                    "parameters": schema,
                },
            }]);
            body["tool_choice"] = json!({
                "type": "function",
                "function": { "name": SUMMARY_TOOL },
            });
        }
        StructuredOutput::JsonObject => {
            body["response_format"] = json!({
                "type": "json_object",
                "schema": schema,
            });
        }
    }

    body
}

/// Extract and validate the summary from a chat-completion response.
///
/// Looks in the location `mode` asks the backend to use first, then in the other.
pub fn parse_completion(response: &Value, mode: StructuredOutput) -> Result<SummaryResult> {
    let message = &response["choices"][0]["message"];
    let from_tool = message["tool_calls"][0]["function"]["arguments"].as_str();
    let from_content = message["content"].as_str().filter(|c| !c.trim().is_empty());

    let raw = match mode {
        StructuredOutput::ToolCall => from_tool.or(from_content),
        StructuredOutput::JsonObject => from_content.or(from_tool),
    }
    .ok_or_else(|| SummarizeError::InvalidResponse {
        reason: format!("no structured output in response: {response}"),
    })?;

    let result: SummaryResult = serde_json::from_str(strip_code_fence(raw))?;
    if result.summary.trim().is_empty() {
        return Err(SummarizeError::InvalidResponse {
            reason: "summary is empty".to_string(),
        });
    }

    Ok(result)
}

// Some models wrap JSON-mode replies in a markdown code block.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Summarize `batch` with a fresh [`Summarizer`] reading credentials from the environment.
pub async fn summarize(
    batch: &ContextBatch,
    conciseness: Conciseness,
    backend: Backend,
    additional_instructions: Option<&str>,
) -> Result<SummaryResult> {
    Summarizer::new()
        .summarize(batch, conciseness, backend, additional_instructions)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn tool_response(arguments: &str) -> Value {
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "Summary", "arguments": arguments },
                    }],
                },
            }],
        })
    }

    fn content_response(content: &str) -> Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
        })
    }

    #[test]
    fn schema_requires_summary_string() {
        let schema = summary_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["summary"]["type"], "string");
        assert_eq!(schema["required"], json!(["summary"]));
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn tool_call_body_forces_summary_function() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let body = request_body("gpt-4-turbo-preview", &messages, StructuredOutput::ToolCall);
        assert_eq!(body["model"], "gpt-4-turbo-preview");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["tools"][0]["function"]["name"], "Summary");
        assert_eq!(body["tool_choice"]["function"]["name"], "Summary");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn json_object_body_attaches_schema() {
        let body = request_body("m", &[], StructuredOutput::JsonObject);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["response_format"]["schema"], summary_schema());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn parses_tool_call_arguments() {
        let response = tool_response(r#"{"summary": "A red car drives by, engine revving."}"#);
        let result = parse_completion(&response, StructuredOutput::ToolCall).unwrap();
        assert_eq!(result.summary, "A red car drives by, engine revving.");
    }

    #[test]
    fn parses_content_in_json_mode() {
        let response = content_response("```json\n{\"summary\": \"A red car.\"}\n```");
        let result = parse_completion(&response, StructuredOutput::JsonObject).unwrap();
        assert_eq!(result.summary, "A red car.");
    }

    #[test]
    fn falls_back_to_the_other_location() {
        let response = content_response(r#"{"summary": "from content"}"#);
        let result = parse_completion(&response, StructuredOutput::ToolCall).unwrap();
        assert_eq!(result.summary, "from content");
    }

    #[test]
    fn wrong_shape_is_response_parse_error() {
        for response in [
            tool_response(r#"{"text": "no summary field"}"#),
            tool_response(r#"{"summary": 42}"#),
            tool_response("not json"),
            tool_response(r#"{"summary": "   "}"#),
            content_response(""),
            json!({ "choices": [] }),
            json!({ "error": { "message": "boom" } }),
        ] {
            let err = parse_completion(&response, StructuredOutput::ToolCall).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ResponseParse, "response {response}");
        }
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```json{}```"), "{}");
    }
}
