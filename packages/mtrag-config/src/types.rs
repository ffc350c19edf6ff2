use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub index: Index,
	pub providers: Providers,
	pub trajectories: Trajectories,
	pub retrieval: Retrieval,
	pub consensus: Consensus,
	pub runner: Runner,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Index {
	pub chunks_path: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trajectories {
	pub rewrite: bool,
	pub decomposition: bool,
	pub entity: bool,
	#[serde(default = "default_variant_count")]
	pub max_rewrites: u32,
	#[serde(default = "default_variant_count")]
	pub max_subquestions: u32,
	#[serde(default = "default_variant_count")]
	pub max_entities: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Retrieval {
	pub top_k_retrieval: u32,
	pub top_k_for_answer: u32,
	pub rerank_enabled: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Consensus {
	/// How member confidences combine within an answer group: "sum" or "max".
	pub aggregation: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Runner {
	pub max_concurrent_questions: u32,
	/// Per-trajectory budget in milliseconds. Zero disables the budget.
	#[serde(default)]
	pub trajectory_timeout_ms: u64,
}

fn default_max_retries() -> u32 {
	2
}

fn default_variant_count() -> u32 {
	3
}
