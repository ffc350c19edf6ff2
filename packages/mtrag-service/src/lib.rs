//! The per-question pipeline: trajectory generation, retrieval aggregation,
//! rerank, answer generation, and the consensus join point. Collaborators are
//! injected through provider seams so tests can run the whole pipeline with
//! deterministic mocks.

mod answer;
mod pipeline;
mod rerank;
mod retrieval;
mod trajectories;

use std::{future::Future, pin::Pin, sync::Arc};

use mtrag_config::{Config, LlmProviderConfig};
use mtrag_index::Bm25Index;
use mtrag_providers::{generate, rerank as rerank_provider, rewrite};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait RewriteProvider
where
	Self: Send + Sync,
{
	fn simple_rewrites<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		n: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>>;

	fn decomposition<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		max_steps: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>>;

	fn entity_focused<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		max_entities: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn score_contexts<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		contexts: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<Option<f32>>>>;
}

pub trait AnswerProvider
where
	Self: Send + Sync,
{
	fn generate_answer<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		contexts: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<String>>;

	fn score_answers<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		contexts: &'a [String],
		answers: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<f32>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub rewrite: Arc<dyn RewriteProvider>,
	pub rerank: Arc<dyn RerankProvider>,
	pub answer: Arc<dyn AnswerProvider>,
}

/// One instance per corpus; shared across questions by reference, never
/// through globals.
pub struct QaService {
	pub cfg: Config,
	pub index: Arc<Bm25Index>,
	pub providers: Providers,
}

struct DefaultProviders;

impl RewriteProvider for DefaultProviders {
	fn simple_rewrites<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		n: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>> {
		Box::pin(rewrite::simple_rewrites(cfg, question, n))
	}

	fn decomposition<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		max_steps: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>> {
		Box::pin(rewrite::decomposition(cfg, question, max_steps))
	}

	fn entity_focused<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		max_entities: usize,
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<String>>> {
		Box::pin(rewrite::entity_focused(cfg, question, max_entities))
	}
}

impl RerankProvider for DefaultProviders {
	fn score_contexts<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		contexts: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<Option<f32>>>> {
		Box::pin(rerank_provider::score_contexts(cfg, question, contexts))
	}
}

impl AnswerProvider for DefaultProviders {
	fn generate_answer<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		contexts: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<String>> {
		Box::pin(generate::generate_answer(cfg, question, contexts))
	}

	fn score_answers<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		question: &'a str,
		contexts: &'a [String],
		answers: &'a [String],
	) -> BoxFuture<'a, mtrag_providers::Result<Vec<f32>>> {
		Box::pin(generate::score_answers(cfg, question, contexts, answers))
	}
}

impl Providers {
	pub fn new(
		rewrite: Arc<dyn RewriteProvider>,
		rerank: Arc<dyn RerankProvider>,
		answer: Arc<dyn AnswerProvider>,
	) -> Self {
		Self { rewrite, rerank, answer }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { rewrite: provider.clone(), rerank: provider.clone(), answer: provider }
	}
}

impl QaService {
	pub fn new(cfg: Config, index: Arc<Bm25Index>) -> Self {
		Self { cfg, index, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, index: Arc<Bm25Index>, providers: Providers) -> Self {
		Self { cfg, index, providers }
	}
}
