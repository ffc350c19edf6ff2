use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// Sends one chat completion request and returns the assistant text, retrying
/// transient failures with exponential backoff up to `cfg.max_retries` extra
/// attempts.
pub async fn chat(
	cfg: &mtrag_config::LlmProviderConfig,
	system: &str,
	user: &str,
	temperature: f32,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": temperature,
		"messages": [
			{ "role": "system", "content": system },
			{ "role": "user", "content": user },
		],
	});
	let mut last_error = None;

	for attempt in 0..=cfg.max_retries {
		if attempt > 0 {
			tokio::time::sleep(backoff_for_attempt(attempt)).await;
		}

		let response = match client.post(&url).headers(headers.clone()).json(&body).send().await {
			Ok(response) => response,
			Err(err) => {
				warn!(error = %err, attempt, "Chat request failed.");

				last_error = Some(Error::from(err));

				continue;
			},
		};
		let json: Value = match response.error_for_status() {
			Ok(response) => match response.json().await {
				Ok(json) => json,
				Err(err) => {
					warn!(error = %err, attempt, "Chat response body was unreadable.");

					last_error = Some(Error::from(err));

					continue;
				},
			},
			Err(err) => {
				warn!(error = %err, attempt, "Chat request returned an error status.");

				last_error = Some(Error::from(err));

				continue;
			},
		};

		return extract_content(&json);
	}

	Err(last_error.unwrap_or(Error::InvalidResponse {
		message: "Chat request produced no response.".into(),
	}))
}

/// Pulls the assistant text out of a chat completion response. Content may be
/// a plain string or a list of text blocks.
pub fn extract_content(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing message content.".into(),
		})?;

	if let Some(text) = content.as_str() {
		return Ok(text.trim().to_string());
	}
	if let Some(blocks) = content.as_array() {
		let mut out = String::new();

		for block in blocks {
			if let Some(text) = block.get("text").and_then(|v| v.as_str()) {
				out.push_str(text);
			}
		}

		return Ok(out.trim().to_string());
	}

	Err(Error::InvalidResponse { message: "Chat response content has an unknown shape.".into() })
}

fn backoff_for_attempt(attempt: u32) -> Duration {
	let millis = 500_u64.saturating_mul(1_u64 << attempt.min(16));

	Duration::from_millis(millis.min(30_000))
}
