use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
log_level = "info"

[index]
chunks_path = "data/processed/chunks.jsonl"

[providers.llm]
api_base    = "http://localhost"
api_key     = "key"
path        = "/v1/chat/completions"
model       = "m"
temperature = 0.2
timeout_ms  = 1000

[trajectories]
rewrite       = true
decomposition = true
entity        = true

[retrieval]
top_k_retrieval  = 8
top_k_for_answer = 10
rerank_enabled   = true

[consensus]
aggregation = "sum"

[runner]
max_concurrent_questions = 2
"#;

fn sample_toml<F>(mutate: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	mutate(root);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("mtrag_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_expecting_error(payload: String) -> String {
	let path = write_temp_config(payload);
	let result = mtrag_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result.expect_err("Expected a validation error.").to_string()
}

#[test]
fn sample_config_loads() {
	let path = write_temp_config(sample_toml(|_| {}));
	let result = mtrag_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Sample config must load.");

	assert_eq!(cfg.retrieval.top_k_for_answer, 10);
	assert_eq!(cfg.providers.llm.max_retries, 2);
	assert_eq!(cfg.trajectories.max_rewrites, 3);
	assert_eq!(cfg.runner.trajectory_timeout_ms, 0);
}

#[test]
fn rejects_empty_api_key() {
	let payload = sample_toml(|root| {
		let llm = root
			.get_mut("providers")
			.and_then(Value::as_table_mut)
			.and_then(|providers| providers.get_mut("llm"))
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [providers.llm].");

		llm.insert("api_key".to_string(), Value::String("  ".to_string()));
	});
	let message = load_expecting_error(payload);

	assert!(
		message.contains("providers.llm.api_key must be non-empty."),
		"Unexpected error message: {message}"
	);
}

#[test]
fn rejects_zero_top_k_for_answer() {
	let payload = sample_toml(|root| {
		let retrieval = root
			.get_mut("retrieval")
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [retrieval].");

		retrieval.insert("top_k_for_answer".to_string(), Value::Integer(0));
	});
	let message = load_expecting_error(payload);

	assert!(
		message.contains("retrieval.top_k_for_answer must be greater than zero."),
		"Unexpected error message: {message}"
	);
}

#[test]
fn rejects_unknown_aggregation() {
	let payload = sample_toml(|root| {
		let consensus = root
			.get_mut("consensus")
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [consensus].");

		consensus.insert("aggregation".to_string(), Value::String("median".to_string()));
	});
	let message = load_expecting_error(payload);

	assert!(
		message.contains("consensus.aggregation must be one of sum or max."),
		"Unexpected error message: {message}"
	);
}

#[test]
fn rejects_zero_concurrency() {
	let payload = sample_toml(|root| {
		let runner = root
			.get_mut("runner")
			.and_then(Value::as_table_mut)
			.expect("Sample config must include [runner].");

		runner.insert("max_concurrent_questions".to_string(), Value::Integer(0));
	});
	let message = load_expecting_error(payload);

	assert!(
		message.contains("runner.max_concurrent_questions must be greater than zero."),
		"Unexpected error message: {message}"
	);
}
