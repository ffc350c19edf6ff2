//! Deterministic collaborators and fixtures for pipeline tests. Mocks answer
//! from canned tables instead of HTTP, so whole-pipeline tests stay exact and
//! repeatable.

use std::{collections::HashMap, sync::Arc};

use mtrag_config::{
	Config, Consensus, Index, LlmProviderConfig, Providers as ProvidersConfig, Retrieval, Runner,
	Service, Trajectories,
};
use mtrag_index::{Bm25Index, ChunkRecord};
use mtrag_providers::Error as ProviderError;
use mtrag_service::{AnswerProvider, BoxFuture, Providers, RerankProvider, RewriteProvider};
use serde_json::Map;

/// Canned reformulations per kind. `fail` makes every call error, which the
/// pipeline must absorb as a dropped kind.
#[derive(Clone, Default)]
pub struct MockRewrite {
	pub rewrites: Vec<String>,
	pub subquestions: Vec<String>,
	pub entity_queries: Vec<String>,
	pub fail: bool,
}

/// Scores contexts by exact text lookup; contexts missing from the table come
/// back unscored. `fail` simulates a wholesale collaborator failure.
#[derive(Clone, Default)]
pub struct MockRerank {
	pub scores_by_text: HashMap<String, f32>,
	pub fail: bool,
}

/// Answers by scanning the contexts for the first matching keyword; candidate
/// confidences come from a per-answer table (0.5 when absent). `delay_ms`
/// stalls generation so budget tests can force a timeout.
#[derive(Clone)]
pub struct MockAnswer {
	pub by_context_keyword: Vec<(String, String)>,
	pub default_answer: String,
	pub confidences: HashMap<String, f32>,
	pub delay_ms: u64,
	pub fail: bool,
}

impl Default for MockAnswer {
	fn default() -> Self {
		Self {
			by_context_keyword: Vec::new(),
			default_answer: mtrag_domain::FALLBACK_ANSWER.to_string(),
			confidences: HashMap::new(),
			delay_ms: 0,
			fail: false,
		}
	}
}

fn mock_failure() -> ProviderError {
	ProviderError::InvalidResponse { message: "Mock collaborator failure.".to_string() }
}

impl RewriteProvider for MockRewrite {
	fn simple_rewrites<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_question: &'a str,
		n: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>> {
		Box::pin(async move {
			if self.fail {
				return Err(mock_failure());
			}

			Ok(self.rewrites.iter().take(n).cloned().collect())
		})
	}

	fn decomposition<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_question: &'a str,
		max_steps: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>> {
		Box::pin(async move {
			if self.fail {
				return Err(mock_failure());
			}

			Ok(self.subquestions.iter().take(max_steps).cloned().collect())
		})
	}

	fn entity_focused<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_question: &'a str,
		max_entities: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>> {
		Box::pin(async move {
			if self.fail {
				return Err(mock_failure());
			}

			Ok(self.entity_queries.iter().take(max_entities).cloned().collect())
		})
	}
}

impl RerankProvider for MockRerank {
	fn score_contexts<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_question: &'a str,
		contexts: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<Option<f32>>>> {
		Box::pin(async move {
			if self.fail {
				return Err(mock_failure());
			}

			Ok(contexts.iter().map(|text| self.scores_by_text.get(text).copied()).collect())
		})
	}
}

impl AnswerProvider for MockAnswer {
	fn generate_answer<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_question: &'a str,
		contexts: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<String>> {
		Box::pin(async move {
			if self.delay_ms > 0 {
				tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
			}
			if self.fail {
				return Err(mock_failure());
			}

			for (keyword, answer) in &self.by_context_keyword {
				if contexts.iter().any(|text| text.contains(keyword.as_str())) {
					return Ok(answer.clone());
				}
			}

			Ok(self.default_answer.clone())
		})
	}

	fn score_answers<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_question: &'a str,
		_contexts: &'a [String],
		answers: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<f32>>> {
		Box::pin(async move {
			if self.fail {
				return Err(mock_failure());
			}

			Ok(answers
				.iter()
				.map(|answer| self.confidences.get(answer).copied().unwrap_or(0.5))
				.collect())
		})
	}
}

pub fn providers(rewrite: MockRewrite, rerank: MockRerank, answer: MockAnswer) -> Providers {
	Providers::new(Arc::new(rewrite), Arc::new(rerank), Arc::new(answer))
}

/// A tiny two-hop corpus: the Animorphs authorship chain plus a distractor.
pub fn sample_corpus() -> Vec<ChunkRecord> {
	[
		("10_0", "Animorphs", "Animorphs is a science fantasy series of young adult books."),
		("11_0", "K. A. Applegate", "K. A. Applegate is the author who wrote the Animorphs series."),
		("12_0", "Michael Grant", "Michael Grant co-wrote Animorphs with his spouse."),
		("13_0", "Paris", "Paris is the capital and most populous city of France."),
		("14_0", "Seine", "The Seine is a river in northern France flowing through Paris."),
	]
	.into_iter()
	.map(|(chunk_id, title, text)| ChunkRecord {
		chunk_id: chunk_id.to_string(),
		doc_id: chunk_id.split('_').next().map(str::to_string),
		title: Some(title.to_string()),
		text: text.to_string(),
	})
	.collect()
}

pub fn sample_index() -> Arc<Bm25Index> {
	Arc::new(Bm25Index::build(&sample_corpus()))
}

/// A config with all trajectory kinds enabled and no trajectory budget.
/// Provider endpoints are placeholders; tests must inject mocks.
pub fn sample_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		index: Index { chunks_path: "unused.jsonl".to_string() },
		providers: ProvidersConfig {
			llm: LlmProviderConfig {
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-model".to_string(),
				temperature: 0.2,
				timeout_ms: 1_000,
				max_retries: 0,
				default_headers: Map::new(),
			},
		},
		trajectories: Trajectories {
			rewrite: true,
			decomposition: true,
			entity: true,
			max_rewrites: 3,
			max_subquestions: 3,
			max_entities: 3,
		},
		retrieval: Retrieval { top_k_retrieval: 8, top_k_for_answer: 5, rerank_enabled: false },
		consensus: Consensus { aggregation: "sum".to_string() },
		runner: Runner { max_concurrent_questions: 2, trajectory_timeout_ms: 0 },
	}
}
