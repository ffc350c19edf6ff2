use std::{sync::Arc, time::Duration};

use mtrag_config::Config;
use mtrag_domain::{Aggregation, FinalAnswer, Question, Trajectory, TrajectoryAnswer, vote};
use mtrag_index::Bm25Index;
use tokio::{task::JoinSet, time::timeout};
use tracing::warn;

use crate::{Providers, QaService, answer, rerank, retrieval, trajectories};

impl QaService {
	/// Answers one question end to end: trajectory generation, parallel
	/// per-trajectory retrieval/rerank/answer, then consensus voting over
	/// whatever completed. Infallible; total degradation yields the fallback
	/// sentinel.
	pub async fn answer_question(&self, question: &Question) -> FinalAnswer {
		let trajectories = trajectories::build(&self.cfg, &self.providers, &question.text).await;
		let budget_ms = self.cfg.runner.trajectory_timeout_ms;
		let mut tasks = JoinSet::new();

		for trajectory in trajectories {
			let cfg = self.cfg.clone();
			let index = self.index.clone();
			let providers = self.providers.clone();
			let question_text = question.text.clone();

			tasks.spawn(async move {
				run_trajectory(&cfg, &index, &providers, &question_text, trajectory, budget_ms)
					.await
			});
		}

		let mut answers = Vec::new();

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok(Some(answer)) => answers.push(answer),
				Ok(None) => {},
				Err(err) => warn!(error = %err, "Trajectory task failed to join."),
			}
		}

		// Join completion order is nondeterministic; voting tie-breaks depend
		// on priority order.
		answers.sort_by_key(|answer| answer.kind);

		let aggregation =
			Aggregation::parse(&self.cfg.consensus.aggregation).unwrap_or(Aggregation::Sum);

		vote(&question.id, &answers, aggregation)
	}
}

async fn run_trajectory(
	cfg: &Config,
	index: &Arc<Bm25Index>,
	providers: &Providers,
	question: &str,
	trajectory: Trajectory,
	budget_ms: u64,
) -> Option<TrajectoryAnswer> {
	let kind = trajectory.kind;
	let work = async {
		let window = retrieval::retrieve_window(
			index,
			&trajectory.queries,
			cfg.retrieval.top_k_retrieval as usize,
		);
		let context = rerank::select_contexts(cfg, providers, question, window).await;

		answer::answer_with_context(&cfg.providers.llm, providers, kind, question, context).await
	};

	if budget_ms == 0 {
		return Some(work.await);
	}

	match timeout(Duration::from_millis(budget_ms), work).await {
		Ok(answer) => Some(answer),
		Err(_) => {
			warn!(kind = kind.label(), budget_ms, "Trajectory exceeded its budget, abandoning.");

			None
		},
	}
}
