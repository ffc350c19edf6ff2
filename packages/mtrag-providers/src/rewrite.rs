use mtrag_config::LlmProviderConfig;

use crate::error::Result;

const SYSTEM_PROMPT: &str =
	"You are a helpful assistant for query reformulation for a RAG system using a BM25 retriever.";

/// Lexical rewrites of the question, one per line, capped at `n`.
pub async fn simple_rewrites(
	cfg: &LlmProviderConfig,
	question: &str,
	n: usize,
) -> Result<Vec<String>> {
	let prompt = format!(
		"Rewrite the following question {n} different ways, keeping the meaning exactly \
		the same. The rewrites will be used for lexical (BM25) search.\n\n\
		Guidelines:\n\
		- Keep all important names and nouns exactly as they appear.\n\
		- Avoid pronouns like \"he\", \"she\", \"they\", \"it\".\n\
		- Keep the sentence structure simple.\n\
		- Keep the length under 20 words.\n\
		- Output ONE rewrite per line with NO bullets or numbering.\n\n\
		Question:\n\"{question}\""
	);
	let response = crate::chat(cfg, SYSTEM_PROMPT, &prompt, cfg.temperature).await?;

	Ok(parse_lines(&response, n))
}

/// Self-contained subquestions whose answers chain to the original question,
/// capped at `max_steps`.
pub async fn decomposition(
	cfg: &LlmProviderConfig,
	question: &str,
	max_steps: usize,
) -> Result<Vec<String>> {
	let prompt = format!(
		"The goal is multi-hop question answering over Wikipedia.\n\n\
		Decompose the question into up to {max_steps} subquestions that, if answered in \
		order, would allow you to answer the original question.\n\n\
		Guidelines:\n\
		- Each subquestion must be self-contained (repeat entity names explicitly).\n\
		- Keep each subquestion under 20 words.\n\
		- Output ONE subquestion per line with NO bullets or numbering.\n\n\
		Original question:\n\"{question}\""
	);
	let response = crate::chat(cfg, SYSTEM_PROMPT, &prompt, cfg.temperature).await?;

	Ok(parse_lines(&response, max_steps))
}

/// One background query per salient entity, in `<entity>: <query>` lines,
/// capped at `max_entities`.
pub async fn entity_focused(
	cfg: &LlmProviderConfig,
	question: &str,
	max_entities: usize,
) -> Result<Vec<String>> {
	let prompt = format!(
		"Identify up to {max_entities} important entities (people, places, organizations, \
		works, events, objects etc.) mentioned in this question.\n\n\
		For each entity you identify, write ONE query suitable for a Wikipedia search that \
		focuses on the background or key fact about that entity.\n\n\
		Format:\n\
		<entity>: <entity-focused query>\n\n\
		Guidelines:\n\
		- Include the entity name exactly.\n\
		- Optionally mention a relevant relation from the question.\n\
		- Keep each query under 20 words.\n\
		- Return ONE entity/query per line.\n\n\
		Question:\n\"{question}\""
	);
	let response = crate::chat(cfg, SYSTEM_PROMPT, &prompt, cfg.temperature).await?;

	Ok(parse_entity_lines(&response, max_entities))
}

fn parse_lines(response: &str, cap: usize) -> Vec<String> {
	response
		.lines()
		.map(|line| line.trim().trim_start_matches(['-', '*', ' ']).trim())
		.filter(|line| !line.is_empty())
		.take(cap)
		.map(str::to_string)
		.collect()
}

fn parse_entity_lines(response: &str, cap: usize) -> Vec<String> {
	response
		.lines()
		.filter_map(|line| {
			let (_, query) = line.trim().split_once(':')?;
			let query = query.trim();

			(!query.is_empty()).then(|| query.to_string())
		})
		.take(cap)
		.collect()
}
