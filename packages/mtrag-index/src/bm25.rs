use std::collections::HashMap;

use mtrag_domain::RetrievedChunk;

use crate::corpus::ChunkRecord;

const K1: f32 = 1.5;
const B: f32 = 0.75;

struct IndexedDoc {
	chunk_id: String,
	passage: String,
	token_count: u32,
}

/// In-memory BM25 index over a fixed chunk corpus. Read-only after build;
/// `search` is deterministic for a given corpus and query.
pub struct Bm25Index {
	docs: Vec<IndexedDoc>,
	postings: HashMap<String, Vec<(u32, u32)>>,
	avg_doc_len: f32,
}

impl Bm25Index {
	pub fn build(records: &[ChunkRecord]) -> Self {
		let mut docs = Vec::with_capacity(records.len());
		let mut postings: HashMap<String, Vec<(u32, u32)>> = HashMap::new();
		let mut total_tokens = 0_u64;

		for (doc_index, record) in records.iter().enumerate() {
			let passage = record.passage();
			let tokens = tokenize(&passage);
			let mut term_freq: HashMap<&str, u32> = HashMap::new();

			for token in &tokens {
				*term_freq.entry(token.as_str()).or_default() += 1;
			}
			for (term, freq) in term_freq {
				postings.entry(term.to_string()).or_default().push((doc_index as u32, freq));
			}

			total_tokens += tokens.len() as u64;

			docs.push(IndexedDoc {
				chunk_id: record.chunk_id.clone(),
				passage,
				token_count: tokens.len() as u32,
			});
		}

		let avg_doc_len =
			if docs.is_empty() { 1.0 } else { (total_tokens as f32 / docs.len() as f32).max(1.0) };

		Self { docs, postings, avg_doc_len }
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}

	/// Returns up to `k` chunks ranked by BM25 score descending, ties broken
	/// by ascending chunk_id. An empty or fully out-of-vocabulary query
	/// returns an empty result rather than an error.
	pub fn search(&self, query: &str, k: usize) -> Vec<RetrievedChunk> {
		if k == 0 {
			return Vec::new();
		}

		let query_terms = unique_tokens(query);

		if query_terms.is_empty() {
			return Vec::new();
		}

		let doc_count = self.docs.len() as f32;
		let mut scores: HashMap<u32, f32> = HashMap::new();

		for term in &query_terms {
			let Some(entries) = self.postings.get(term) else {
				continue;
			};
			let doc_freq = entries.len() as f32;
			let idf = ((doc_count - doc_freq + 0.5) / (doc_freq + 0.5) + 1.0).ln();

			for (doc_index, term_freq) in entries {
				let doc = &self.docs[*doc_index as usize];
				let tf = *term_freq as f32;
				let norm = K1 * (1.0 - B + B * doc.token_count as f32 / self.avg_doc_len);
				let contribution = idf * tf * (K1 + 1.0) / (tf + norm);

				*scores.entry(*doc_index).or_default() += contribution;
			}
		}

		let mut ranked: Vec<(u32, f32)> = scores.into_iter().collect();

		ranked.sort_by(|a, b| {
			b.1.partial_cmp(&a.1)
				.unwrap_or(std::cmp::Ordering::Equal)
				.then_with(|| self.docs[a.0 as usize].chunk_id.cmp(&self.docs[b.0 as usize].chunk_id))
		});
		ranked.truncate(k);

		ranked
			.into_iter()
			.map(|(doc_index, score)| {
				let doc = &self.docs[doc_index as usize];

				RetrievedChunk { chunk_id: doc.chunk_id.clone(), text: doc.passage.clone(), score }
			})
			.collect()
	}
}

/// Lowercased ASCII-alphanumeric word tokens; anything shorter than two
/// characters is dropped.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut normalized = String::with_capacity(text.len());

	for ch in text.chars() {
		if ch.is_ascii_alphanumeric() {
			normalized.push(ch.to_ascii_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	normalized.split_whitespace().filter(|token| token.len() >= 2).map(str::to_string).collect()
}

fn unique_tokens(text: &str) -> Vec<String> {
	let mut out = Vec::new();

	for token in tokenize(text) {
		if !out.contains(&token) {
			out.push(token);
		}
	}

	out
}
