use std::collections::HashSet;

use mtrag_config::Config;
use mtrag_domain::{Trajectory, TrajectoryKind, normalize_query};
use tracing::warn;

use crate::Providers;

/// Builds the trajectory set for one question. The original trajectory is
/// always present; each enabled reformulation kind contributes only when its
/// collaborator call succeeds and leaves at least one query after dedup.
pub(crate) async fn build(cfg: &Config, providers: &Providers, question: &str) -> Vec<Trajectory> {
	let llm = &cfg.providers.llm;
	let mut candidates = vec![(TrajectoryKind::Original, vec![question.to_string()])];

	if cfg.trajectories.rewrite {
		match providers
			.rewrite
			.simple_rewrites(llm, question, cfg.trajectories.max_rewrites as usize)
			.await
		{
			Ok(queries) => candidates.push((TrajectoryKind::Rewrite, queries)),
			Err(err) => warn!(error = %err, "Rewrite reformulation failed, dropping the kind."),
		}
	}
	if cfg.trajectories.decomposition {
		match providers
			.rewrite
			.decomposition(llm, question, cfg.trajectories.max_subquestions as usize)
			.await
		{
			Ok(queries) => candidates.push((TrajectoryKind::Decomposition, queries)),
			Err(err) =>
				warn!(error = %err, "Decomposition reformulation failed, dropping the kind."),
		}
	}
	if cfg.trajectories.entity {
		match providers
			.rewrite
			.entity_focused(llm, question, cfg.trajectories.max_entities as usize)
			.await
		{
			Ok(queries) => candidates.push((TrajectoryKind::Entity, queries)),
			Err(err) => warn!(error = %err, "Entity reformulation failed, dropping the kind."),
		}
	}

	dedup_by_priority(candidates)
}

/// Drops queries already claimed by a higher-priority kind (and intra-kind
/// duplicates), then drops kinds left with no queries. Candidates must arrive
/// in priority order.
fn dedup_by_priority(candidates: Vec<(TrajectoryKind, Vec<String>)>) -> Vec<Trajectory> {
	let mut claimed = HashSet::new();
	let mut trajectories = Vec::new();

	for (kind, queries) in candidates {
		let mut kept = Vec::new();

		for query in queries {
			let normalized = normalize_query(&query);

			if normalized.is_empty() || !claimed.insert(normalized) {
				continue;
			}

			kept.push(query);
		}

		if kept.is_empty() {
			if kind != TrajectoryKind::Original {
				warn!(kind = kind.label(), "Reformulation produced no novel queries.");
			}

			continue;
		}

		trajectories.push(Trajectory::new(kind, kept));
	}

	trajectories
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn higher_priority_kind_claims_duplicate_queries() {
		let trajectories = dedup_by_priority(vec![
			(TrajectoryKind::Original, vec!["Who wrote Animorphs?".to_string()]),
			(TrajectoryKind::Rewrite, vec![
				"who wrote  animorphs?".to_string(),
				"Which author created Animorphs?".to_string(),
			]),
		]);

		assert_eq!(trajectories.len(), 2);
		assert_eq!(trajectories[0].queries, vec!["Who wrote Animorphs?"]);
		assert_eq!(trajectories[1].queries, vec!["Which author created Animorphs?"]);
	}

	#[test]
	fn fully_duplicated_kind_is_dropped() {
		let trajectories = dedup_by_priority(vec![
			(TrajectoryKind::Original, vec!["Who wrote Animorphs?".to_string()]),
			(TrajectoryKind::Rewrite, vec!["WHO WROTE ANIMORPHS?".to_string()]),
		]);

		assert_eq!(trajectories.len(), 1);
		assert_eq!(trajectories[0].kind, TrajectoryKind::Original);
	}

	#[test]
	fn blank_queries_are_ignored() {
		let trajectories = dedup_by_priority(vec![
			(TrajectoryKind::Original, vec!["Who wrote Animorphs?".to_string()]),
			(TrajectoryKind::Entity, vec!["  ".to_string(), "Animorphs author".to_string()]),
		]);

		assert_eq!(trajectories.len(), 2);
		assert_eq!(trajectories[1].queries, vec!["Animorphs author"]);
	}
}
