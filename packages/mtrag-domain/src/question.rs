use serde::{Deserialize, Serialize};

/// One dataset record. Immutable for the lifetime of a pipeline run.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Question {
	pub id: String,
	pub text: String,
	pub gold_answer: Option<String>,
}

impl Question {
	pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
		Self { id: id.into(), text: text.into(), gold_answer: None }
	}
}
