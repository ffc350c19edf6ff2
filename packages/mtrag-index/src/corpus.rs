use std::{
	fs::File,
	io::{BufRead, BufReader},
	path::Path,
};

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// One corpus record from the chunked-abstracts JSONL file. Unknown fields
/// (offsets, year metadata) are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct ChunkRecord {
	pub chunk_id: String,
	#[serde(default)]
	pub doc_id: Option<String>,
	#[serde(default)]
	pub title: Option<String>,
	pub text: String,
}

impl ChunkRecord {
	/// The text as indexed and as handed to answer generation: the page title
	/// prefixed onto the chunk body.
	pub fn passage(&self) -> String {
		match self.title.as_deref().map(str::trim).filter(|title| !title.is_empty()) {
			Some(title) => format!("{}: {}", title, self.text),
			None => self.text.clone(),
		}
	}
}

/// Loads chunk records from a JSONL file, skipping blank and malformed lines.
pub fn load_chunks(path: &Path) -> Result<Vec<ChunkRecord>> {
	let file = File::open(path)
		.map_err(|err| Error::ReadCorpus { path: path.to_path_buf(), source: err })?;
	let reader = BufReader::new(file);
	let mut records = Vec::new();
	let mut skipped = 0_usize;

	for (line_number, line) in reader.lines().enumerate() {
		let line =
			line.map_err(|err| Error::ReadCorpus { path: path.to_path_buf(), source: err })?;
		let trimmed = line.trim();

		if trimmed.is_empty() {
			continue;
		}

		match serde_json::from_str::<ChunkRecord>(trimmed) {
			Ok(record) if !record.text.trim().is_empty() => records.push(record),
			Ok(_) => skipped += 1,
			Err(err) => {
				if skipped == 0 {
					warn!(error = %err, line = line_number + 1, "Skipping malformed chunk record.");
				}

				skipped += 1;
			},
		}
	}

	if skipped > 0 {
		warn!(skipped, kept = records.len(), "Some chunk records were skipped.");
	}
	if records.is_empty() {
		return Err(Error::EmptyCorpus { path: path.to_path_buf() });
	}

	Ok(records)
}
