use mtrag_config::Config;
use mtrag_domain::{ContextWindow, RetrievedChunk};
use tracing::warn;

use crate::Providers;

/// Narrows a lexical window down to the answering context. With rerank
/// enabled, scored chunks are reordered among themselves by collaborator
/// score while unscored chunks hold their lexical positions; a wholesale
/// collaborator failure degrades to the lexical order. Always returns
/// `min(top_k_for_answer, window.len())` chunks.
pub(crate) async fn select_contexts(
	cfg: &Config,
	providers: &Providers,
	question: &str,
	mut window: ContextWindow,
) -> ContextWindow {
	let keep = cfg.retrieval.top_k_for_answer as usize;

	if !cfg.retrieval.rerank_enabled || window.is_empty() {
		window.truncate(keep);

		return window;
	}

	let contexts: Vec<String> = window.iter().map(|chunk| chunk.text.clone()).collect();
	let scores =
		match providers.rerank.score_contexts(&cfg.providers.llm, question, &contexts).await {
			Ok(scores) if scores.len() == window.len() => scores,
			Ok(_) => {
				warn!("Rerank returned a misaligned score list, keeping lexical order.");

				window.truncate(keep);

				return window;
			},
			Err(err) => {
				warn!(error = %err, "Rerank failed, keeping lexical order.");

				window.truncate(keep);

				return window;
			},
		};
	let mut reordered = apply_scores(window, &scores);

	reordered.truncate(keep);

	reordered
}

/// Rearranges the scored subset by score descending (stable within equal
/// scores) while every unscored chunk keeps its original index.
fn apply_scores(window: ContextWindow, scores: &[Option<f32>]) -> ContextWindow {
	let mut scored_positions = Vec::new();
	let mut scored_order = Vec::new();

	for (index, score) in scores.iter().enumerate() {
		if let Some(score) = score {
			scored_positions.push(index);
			scored_order.push((index, *score));
		}
	}

	scored_order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

	let mut slots: Vec<Option<RetrievedChunk>> = window.into_iter().map(Some).collect();
	let mut reordered: Vec<Option<RetrievedChunk>> = std::iter::repeat_with(|| None)
		.take(slots.len())
		.collect();

	for (target, (source, _)) in scored_positions.iter().zip(&scored_order) {
		reordered[*target] = slots[*source].take();
	}
	for (index, slot) in slots.into_iter().enumerate() {
		if let Some(chunk) = slot {
			reordered[index] = Some(chunk);
		}
	}

	reordered.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chunk(chunk_id: &str, score: f32) -> RetrievedChunk {
		RetrievedChunk { chunk_id: chunk_id.to_string(), text: chunk_id.to_string(), score }
	}

	#[test]
	fn scored_chunks_reorder_among_themselves() {
		let window = vec![chunk("a", 3.0), chunk("b", 2.0), chunk("c", 1.0)];
		let scores = vec![Some(0.1), Some(0.9), Some(0.5)];
		let ids: Vec<_> =
			apply_scores(window, &scores).into_iter().map(|chunk| chunk.chunk_id).collect();

		assert_eq!(ids, vec!["b", "c", "a"]);
	}

	#[test]
	fn unscored_chunks_hold_their_positions() {
		let window = vec![chunk("a", 3.0), chunk("b", 2.0), chunk("c", 1.0), chunk("d", 0.5)];
		let scores = vec![Some(0.2), None, Some(0.8), None];
		let ids: Vec<_> =
			apply_scores(window, &scores).into_iter().map(|chunk| chunk.chunk_id).collect();

		// "b" and "d" stay where lexical ranking put them.
		assert_eq!(ids, vec!["c", "b", "a", "d"]);
	}

	#[test]
	fn scoring_never_drops_chunks() {
		let window = vec![chunk("a", 3.0), chunk("b", 2.0), chunk("c", 1.0)];

		assert_eq!(apply_scores(window, &[Some(0.5), None, Some(0.9)]).len(), 3);
	}

	#[test]
	fn all_unscored_preserves_lexical_order() {
		let window = vec![chunk("a", 3.0), chunk("b", 2.0)];
		let ids: Vec<_> = apply_scores(window, &[None, None])
			.into_iter()
			.map(|chunk| chunk.chunk_id)
			.collect();

		assert_eq!(ids, vec!["a", "b"]);
	}
}
