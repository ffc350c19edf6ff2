use serde::{Deserialize, Serialize};

/// Query reformulation paths, in priority order. When two trajectories end up
/// with identical normalized query text, the lower-priority one is dropped.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryKind {
	Original,
	Rewrite,
	Decomposition,
	Entity,
}

impl TrajectoryKind {
	pub const ALL: [Self; 4] = [Self::Original, Self::Rewrite, Self::Decomposition, Self::Entity];

	pub fn label(self) -> &'static str {
		match self {
			Self::Original => "original",
			Self::Rewrite => "rewrite",
			Self::Decomposition => "decomposition",
			Self::Entity => "entity",
		}
	}
}

/// One reformulation path through retrieval and answering. Decomposition and
/// entity trajectories may carry several sub-queries; their retrieval results
/// are merged downstream.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Trajectory {
	pub kind: TrajectoryKind,
	pub queries: Vec<String>,
}

impl Trajectory {
	pub fn new(kind: TrajectoryKind, queries: Vec<String>) -> Self {
		Self { kind, queries }
	}
}

/// Collapses a query string for duplicate detection: trimmed, lowercased,
/// inner whitespace runs folded to single spaces.
pub fn normalize_query(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
