use mtrag_domain::{ContextWindow, RetrievedChunk};
use mtrag_index::Bm25Index;

/// Runs one BM25 search per sub-query and merges the results by chunk_id,
/// keeping the maximum score a chunk earned across sub-queries. The merged
/// window is sorted by score descending, ties by ascending chunk_id.
pub(crate) fn retrieve_window(
	index: &Bm25Index,
	queries: &[String],
	top_k_per_query: usize,
) -> ContextWindow {
	let mut best: Vec<RetrievedChunk> = Vec::new();

	for query in queries {
		for chunk in index.search(query, top_k_per_query) {
			match best.iter_mut().find(|existing| existing.chunk_id == chunk.chunk_id) {
				Some(existing) =>
					if chunk.score > existing.score {
						existing.score = chunk.score;
					},
				None => best.push(chunk),
			}
		}
	}

	best.sort_by(|a, b| {
		b.score
			.partial_cmp(&a.score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| a.chunk_id.cmp(&b.chunk_id))
	});

	best
}

#[cfg(test)]
mod tests {
	use mtrag_index::ChunkRecord;

	use super::*;

	fn record(chunk_id: &str, text: &str) -> ChunkRecord {
		ChunkRecord {
			chunk_id: chunk_id.to_string(),
			doc_id: None,
			title: None,
			text: text.to_string(),
		}
	}

	#[test]
	fn merges_sub_query_results_keeping_max_score() {
		let index = Bm25Index::build(&[
			record("1_0", "animorphs series books"),
			record("2_0", "applegate wrote animorphs"),
			record("3_0", "capital of france"),
		]);
		let queries = vec!["animorphs books".to_string(), "applegate animorphs".to_string()];
		let window = retrieve_window(&index, &queries, 3);
		let ids: Vec<_> = window.iter().map(|chunk| chunk.chunk_id.as_str()).collect();

		assert!(ids.contains(&"1_0"));
		assert!(ids.contains(&"2_0"));
		assert_eq!(ids.iter().filter(|id| **id == "2_0").count(), 1);

		for pair in window.windows(2) {
			assert!(pair[0].score >= pair[1].score);
		}
	}

	#[test]
	fn empty_queries_produce_empty_window() {
		let index = Bm25Index::build(&[record("1_0", "animorphs series books")]);

		assert!(retrieve_window(&index, &[], 3).is_empty());
		assert!(retrieve_window(&index, &["zzzz".to_string()], 3).is_empty());
	}
}
