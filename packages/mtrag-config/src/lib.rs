mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Consensus, Index, LlmProviderConfig, Providers, Retrieval, Runner, Service,
	Trajectories,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.index.chunks_path.trim().is_empty() {
		return Err(Error::Validation {
			message: "index.chunks_path must be non-empty.".to_string(),
		});
	}
	if cfg.providers.llm.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.llm.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.llm.temperature.is_finite() || cfg.providers.llm.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number of zero or greater."
				.to_string(),
		});
	}
	if cfg.retrieval.top_k_retrieval == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k_retrieval must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.top_k_for_answer == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k_for_answer must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("trajectories.max_rewrites", cfg.trajectories.max_rewrites),
		("trajectories.max_subquestions", cfg.trajectories.max_subquestions),
		("trajectories.max_entities", cfg.trajectories.max_entities),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if !matches!(cfg.consensus.aggregation.as_str(), "sum" | "max") {
		return Err(Error::Validation {
			message: "consensus.aggregation must be one of sum or max.".to_string(),
		});
	}
	if cfg.runner.max_concurrent_questions == 0 {
		return Err(Error::Validation {
			message: "runner.max_concurrent_questions must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
