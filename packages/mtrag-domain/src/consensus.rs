//! Consensus voting over per-trajectory candidate answers.
//!
//! Answers are grouped by normalized text, ranked by (support, aggregated
//! confidence) descending, and the fallback sentinel is excluded from the
//! ranking whenever any real answer exists. More independent trajectory
//! agreement always beats higher confidence.

use serde::{Deserialize, Serialize};

use crate::answer::{FALLBACK_ANSWER, FinalAnswer, TrajectoryAnswer, is_fallback, normalize_answer};

/// How member confidences combine within one answer group.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
	Sum,
	Max,
}

impl Aggregation {
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"sum" => Some(Self::Sum),
			"max" => Some(Self::Max),
			_ => None,
		}
	}
}

struct Group<'a> {
	members: Vec<&'a TrajectoryAnswer>,
	first_index: usize,
	is_fallback: bool,
}

impl<'a> Group<'a> {
	fn support(&self) -> usize {
		self.members.len()
	}

	fn aggregated_confidence(&self, aggregation: Aggregation) -> f32 {
		match aggregation {
			Aggregation::Sum => self.members.iter().map(|member| member.confidence).sum(),
			Aggregation::Max =>
				self.members.iter().map(|member| member.confidence).fold(0.0, f32::max),
		}
	}

	fn representative(&self) -> &'a TrajectoryAnswer {
		let mut best = self.members[0];

		for member in &self.members[1..] {
			if member.confidence > best.confidence {
				best = member;
			}
		}

		best
	}
}

/// Reduces all trajectory answers for one question to a single final answer.
/// Never fails: an empty input yields the fallback sentinel with an explicit
/// rationale.
pub fn vote(
	question_id: &str,
	answers: &[TrajectoryAnswer],
	aggregation: Aggregation,
) -> FinalAnswer {
	if answers.is_empty() {
		return FinalAnswer {
			question_id: question_id.to_string(),
			answer: FALLBACK_ANSWER.to_string(),
			supporting_trajectories: Vec::new(),
			rationale: "no trajectories produced an answer".to_string(),
		};
	}

	let groups = build_groups(answers);
	let has_real_answer = groups.iter().any(|group| !group.is_fallback);
	let mut ranked: Vec<&Group<'_>> =
		groups.iter().filter(|group| !has_real_answer || !group.is_fallback).collect();

	ranked.sort_by(|a, b| {
		b.support()
			.cmp(&a.support())
			.then_with(|| {
				b.aggregated_confidence(aggregation)
					.partial_cmp(&a.aggregated_confidence(aggregation))
					.unwrap_or(std::cmp::Ordering::Equal)
			})
			.then_with(|| a.first_index.cmp(&b.first_index))
	});

	let winner = ranked[0];
	let representative = winner.representative();
	let mut supporting: Vec<_> = winner.members.iter().map(|member| member.kind).collect();

	supporting.sort();

	let rationale = if !has_real_answer {
		"fallback only".to_string()
	} else if winner.support() > 1 {
		format!("{}/{} agreement", winner.support(), answers.len())
	} else {
		"single-trajectory highest-confidence".to_string()
	};

	FinalAnswer {
		question_id: question_id.to_string(),
		answer: representative.answer.clone(),
		supporting_trajectories: supporting,
		rationale,
	}
}

fn build_groups(answers: &[TrajectoryAnswer]) -> Vec<Group<'_>> {
	let mut groups: Vec<(String, Group<'_>)> = Vec::new();

	for (index, answer) in answers.iter().enumerate() {
		let key = normalize_answer(&answer.answer);

		if let Some((_, group)) = groups.iter_mut().find(|(existing, _)| *existing == key) {
			group.members.push(answer);
		} else {
			let is_fallback = is_fallback(&answer.answer);

			groups.push((key, Group { members: vec![answer], first_index: index, is_fallback }));
		}
	}

	groups.into_iter().map(|(_, group)| group).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::trajectory::TrajectoryKind;

	fn answer(kind: TrajectoryKind, text: &str, confidence: f32) -> TrajectoryAnswer {
		TrajectoryAnswer {
			kind,
			answer: text.to_string(),
			confidence,
			context: Vec::new(),
		}
	}

	#[test]
	fn support_beats_confidence() {
		let answers = vec![
			answer(TrajectoryKind::Original, "A", 0.9),
			answer(TrajectoryKind::Rewrite, "A", 0.6),
			answer(TrajectoryKind::Entity, "B", 0.95),
		];
		let result = vote("q1", &answers, Aggregation::Sum);

		assert_eq!(result.answer, "A");
		assert_eq!(
			result.supporting_trajectories,
			vec![TrajectoryKind::Original, TrajectoryKind::Rewrite]
		);
		assert_eq!(result.rationale, "2/3 agreement");
	}

	#[test]
	fn confidence_breaks_single_support_ties() {
		let answers = vec![
			answer(TrajectoryKind::Original, "A", 0.2),
			answer(TrajectoryKind::Rewrite, "B", 0.4),
		];
		let result = vote("q1", &answers, Aggregation::Sum);

		assert_eq!(result.answer, "B");
		assert_eq!(result.rationale, "single-trajectory highest-confidence");
	}

	#[test]
	fn groups_ignore_case_and_whitespace() {
		let answers = vec![
			answer(TrajectoryKind::Original, "Chief of Protocol", 0.5),
			answer(TrajectoryKind::Rewrite, "  chief of  protocol ", 0.4),
			answer(TrajectoryKind::Entity, "Animorphs", 0.99),
		];
		let result = vote("q1", &answers, Aggregation::Sum);

		// The exact-cased text comes from the highest-confidence member.
		assert_eq!(result.answer, "Chief of Protocol");
	}

	#[test]
	fn fallback_excluded_when_real_answer_exists() {
		let answers = vec![
			answer(TrajectoryKind::Original, FALLBACK_ANSWER, 0.0),
			answer(TrajectoryKind::Rewrite, "A", 0.1),
		];
		let result = vote("q1", &answers, Aggregation::Sum);

		assert_eq!(result.answer, "A");
	}

	#[test]
	fn fallback_wins_when_it_is_the_only_group() {
		let answers = vec![
			answer(TrajectoryKind::Original, FALLBACK_ANSWER, 0.0),
			answer(TrajectoryKind::Rewrite, FALLBACK_ANSWER, 0.0),
		];
		let result = vote("q1", &answers, Aggregation::Sum);

		assert_eq!(result.answer, FALLBACK_ANSWER);
		assert_eq!(result.rationale, "fallback only");
	}

	#[test]
	fn empty_input_reports_no_trajectories() {
		let result = vote("q1", &[], Aggregation::Sum);

		assert_eq!(result.answer, FALLBACK_ANSWER);
		assert!(result.supporting_trajectories.is_empty());
		assert_eq!(result.rationale, "no trajectories produced an answer");
	}

	#[test]
	fn sum_and_max_aggregation_can_disagree_on_ties() {
		// Equal support. Sum favors the pair of moderate confidences, max
		// favors the single strong one.
		let answers = vec![
			answer(TrajectoryKind::Original, "A", 0.5),
			answer(TrajectoryKind::Rewrite, "A", 0.5),
			answer(TrajectoryKind::Decomposition, "B", 0.8),
			answer(TrajectoryKind::Entity, "B", 0.1),
		];

		assert_eq!(vote("q1", &answers, Aggregation::Sum).answer, "A");
		assert_eq!(vote("q1", &answers, Aggregation::Max).answer, "B");
	}
}
