use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

fn write_temp_corpus(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("mtrag_corpus_test_{nanos}_{pid}_{ordinal}.jsonl"));

	fs::write(&path, payload).expect("Failed to write test corpus.");

	path
}

#[test]
fn loads_records_and_skips_junk_lines() {
	let payload = concat!(
		r#"{"chunk_id": "10_0", "doc_id": "10", "title": "Animorphs", "text": "A book series."}"#,
		"\n",
		"\n",
		"not json at all\n",
		r#"{"chunk_id": "11_0", "text": "   "}"#,
		"\n",
		r#"{"chunk_id": "12_0", "title": "Paris", "text": "The capital of France."}"#,
		"\n",
	);
	let path = write_temp_corpus(payload);
	let records = mtrag_index::load_chunks(&path).expect("Corpus must load.");

	fs::remove_file(&path).expect("Failed to remove test corpus.");

	assert_eq!(records.len(), 2);
	assert_eq!(records[0].chunk_id, "10_0");
	assert_eq!(records[0].passage(), "Animorphs: A book series.");
	assert_eq!(records[1].chunk_id, "12_0");
}

#[test]
fn rejects_a_corpus_with_no_usable_records() {
	let path = write_temp_corpus("\nnot json\n");
	let result = mtrag_index::load_chunks(&path);

	fs::remove_file(&path).expect("Failed to remove test corpus.");

	assert!(result.is_err());
}

#[test]
fn rejects_a_missing_corpus_file() {
	let mut path = env::temp_dir();

	path.push("mtrag_corpus_test_does_not_exist.jsonl");

	assert!(mtrag_index::load_chunks(&path).is_err());
}
