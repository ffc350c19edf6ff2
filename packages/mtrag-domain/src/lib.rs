pub mod answer;
pub mod consensus;
pub mod question;
pub mod trajectory;

pub use answer::{
	ContextWindow, FALLBACK_ANSWER, FinalAnswer, RetrievedChunk, TrajectoryAnswer,
	clamp_confidence, is_fallback, normalize_answer,
};
pub use consensus::{Aggregation, vote};
pub use question::Question;
pub use trajectory::{Trajectory, TrajectoryKind, normalize_query};
