use serde::{Deserialize, Serialize};

use crate::trajectory::TrajectoryKind;

/// Emitted when a trajectory cannot produce a grounded answer. Matches the
/// refusal string the answer prompt instructs the model to use, so model
/// refusals and local degradations collapse into the same group.
pub const FALLBACK_ANSWER: &str = "I cannot answer from the given context.";

/// One scored chunk from lexical retrieval. The same chunk_id may appear in
/// several trajectories' windows; that is expected and only reconciled at the
/// voting boundary.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RetrievedChunk {
	pub chunk_id: String,
	pub text: String,
	pub score: f32,
}

/// The bounded, ordered chunk sequence handed to answer generation, ordered
/// by descending relevance after whichever scoring stage ran last.
pub type ContextWindow = Vec<RetrievedChunk>;

/// One trajectory's candidate answer with its graded confidence and the
/// context window it was generated from.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TrajectoryAnswer {
	pub kind: TrajectoryKind,
	pub answer: String,
	pub confidence: f32,
	pub context: ContextWindow,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FinalAnswer {
	pub question_id: String,
	pub answer: String,
	pub supporting_trajectories: Vec<TrajectoryKind>,
	pub rationale: String,
}

/// Collapses an answer for equivalence grouping: case-insensitive,
/// whitespace-trimmed and -folded.
pub fn normalize_answer(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

pub fn is_fallback(text: &str) -> bool {
	normalize_answer(text) == normalize_answer(FALLBACK_ANSWER)
}

/// Forces a collaborator-reported confidence into [0, 1]. Non-finite values
/// collapse to zero.
pub fn clamp_confidence(value: f32) -> f32 {
	if !value.is_finite() {
		return 0.0;
	}

	value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fallback_matches_ignoring_case_and_whitespace() {
		assert!(is_fallback("  i cannot answer from the given context.  "));
		assert!(!is_fallback("Animorphs"));
	}

	#[test]
	fn clamps_out_of_range_confidence() {
		assert_eq!(clamp_confidence(1.5), 1.0);
		assert_eq!(clamp_confidence(-0.2), 0.0);
		assert_eq!(clamp_confidence(f32::NAN), 0.0);
		assert_eq!(clamp_confidence(0.73), 0.73);
	}
}
