use mtrag_config::LlmProviderConfig;
use serde_json::Value;

use crate::error::Result;

/// Asks the model to score each context's usefulness for answering the
/// question. Returns one slot per context, aligned by position; contexts the
/// model skipped come back as `None`.
pub async fn score_contexts(
	cfg: &LlmProviderConfig,
	question: &str,
	contexts: &[String],
) -> Result<Vec<Option<f32>>> {
	if contexts.is_empty() {
		return Ok(Vec::new());
	}

	let numbered = contexts
		.iter()
		.enumerate()
		.map(|(index, ctx)| format!("{index}: {ctx}"))
		.collect::<Vec<_>>()
		.join("\n");
	let prompt = format!(
		"You are ranking passages for question answering.\n\
		Given the question and the numbered contexts below, assign each context a \
		confidence score between 0 and 1 for how useful it is to answer the question.\n\
		Return ONLY a JSON array like:\n\
		[{{\"index\": 0, \"confidence\": 0.9}}, {{\"index\": 1, \"confidence\": 0.1}}, ...]\n\n\
		Question:\n{question}\n\n\
		Contexts:\n{numbered}\n\n\
		JSON:"
	);
	let response = crate::chat(cfg, "Select contexts for QA", &prompt, 0.0).await?;

	Ok(parse_scores(&response, contexts.len()))
}

/// Parses `[{"index": n, "confidence": c}, ...]` out of model output, tolerating
/// prose around the array. Out-of-range indices are ignored, confidences are
/// clamped to [0, 1], and positions the model never mentioned stay `None`.
pub fn parse_scores(response: &str, count: usize) -> Vec<Option<f32>> {
	let mut scores = vec![None; count];
	let Some(entries) = extract_json_array(response) else {
		return scores;
	};

	for entry in entries {
		let Some(index) = entry.get("index").and_then(|v| v.as_u64()) else {
			continue;
		};
		let confidence = entry.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;

		if (index as usize) < count {
			scores[index as usize] = Some(confidence.clamp(0.0, 1.0));
		}
	}

	scores
}

fn extract_json_array(text: &str) -> Option<Vec<Value>> {
	if let Ok(Value::Array(entries)) = serde_json::from_str(text) {
		return Some(entries);
	}

	let start = text.find('[')?;
	let end = text.rfind(']')?;

	if end <= start {
		return None;
	}

	match serde_json::from_str(&text[start..=end]) {
		Ok(Value::Array(entries)) => Some(entries),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aligns_scores_by_index() {
		let response = r#"[{"index": 1, "confidence": 0.2}, {"index": 0, "confidence": 0.9}]"#;

		assert_eq!(parse_scores(response, 2), vec![Some(0.9), Some(0.2)]);
	}

	#[test]
	fn tolerates_surrounding_prose_and_clamps() {
		let response = r#"Here are the scores:
[{"index": 0, "confidence": 1.7}, {"index": 1, "confidence": -0.3}]
Done."#;

		assert_eq!(parse_scores(response, 2), vec![Some(1.0), Some(0.0)]);
	}

	#[test]
	fn unmentioned_positions_stay_unscored() {
		let response = r#"[{"index": 5, "confidence": 0.8}, {"index": 1, "confidence": 0.4}]"#;

		assert_eq!(parse_scores(response, 2), vec![None, Some(0.4)]);
	}

	#[test]
	fn unparseable_output_scores_nothing() {
		assert_eq!(parse_scores("no json here", 3), vec![None, None, None]);
	}
}
