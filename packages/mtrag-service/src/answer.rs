use mtrag_config::LlmProviderConfig;
use mtrag_domain::{
	ContextWindow, FALLBACK_ANSWER, TrajectoryAnswer, TrajectoryKind, clamp_confidence,
	is_fallback,
};
use tracing::warn;

use crate::Providers;

/// Generates and confidence-grades one trajectory's answer. Never fails: any
/// collaborator problem degrades to the fallback sentinel with confidence 0.
pub(crate) async fn answer_with_context(
	cfg: &LlmProviderConfig,
	providers: &Providers,
	kind: TrajectoryKind,
	question: &str,
	context: ContextWindow,
) -> TrajectoryAnswer {
	if context.is_empty() {
		warn!(kind = kind.label(), "No retrieved context, answering with the fallback.");

		return fallback(kind, context);
	}

	let contexts: Vec<String> = context.iter().map(|chunk| chunk.text.clone()).collect();
	let answer = match providers.answer.generate_answer(cfg, question, &contexts).await {
		Ok(answer) => answer,
		Err(err) => {
			warn!(kind = kind.label(), error = %err, "Answer generation failed.");

			return fallback(kind, context);
		},
	};

	if answer.trim().is_empty() {
		warn!(kind = kind.label(), "Answer generation returned empty text.");

		return fallback(kind, context);
	}
	if is_fallback(&answer) {
		return TrajectoryAnswer { kind, answer, confidence: 0.0, context };
	}

	let confidence = score_confidence(cfg, providers, kind, question, &contexts, &answer).await;

	TrajectoryAnswer { kind, answer, confidence, context }
}

async fn score_confidence(
	cfg: &LlmProviderConfig,
	providers: &Providers,
	kind: TrajectoryKind,
	question: &str,
	contexts: &[String],
	answer: &str,
) -> f32 {
	let candidates = [answer.to_string()];
	let scores = match providers.answer.score_answers(cfg, question, contexts, &candidates).await {
		Ok(scores) => scores,
		Err(err) => {
			warn!(kind = kind.label(), error = %err, "Confidence scoring failed.");

			return 0.0;
		},
	};
	let Some(raw) = scores.first().copied() else {
		warn!(kind = kind.label(), "Confidence scoring returned no score.");

		return 0.0;
	};
	let clamped = clamp_confidence(raw);

	if clamped != raw {
		warn!(kind = kind.label(), raw, "Confidence was out of range and got clamped.");
	}

	clamped
}

fn fallback(kind: TrajectoryKind, context: ContextWindow) -> TrajectoryAnswer {
	TrajectoryAnswer { kind, answer: FALLBACK_ANSWER.to_string(), confidence: 0.0, context }
}
