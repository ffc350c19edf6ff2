use std::{
	fs,
	io::{BufWriter, Write},
	path::{Path, PathBuf},
	sync::Arc,
	time::Instant,
};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mtrag_domain::Question;
use mtrag_index::Bm25Index;
use mtrag_service::QaService;

#[derive(Debug, Parser)]
#[command(
	version = mtrag_cli::VERSION,
	rename_all = "kebab",
	styles = mtrag_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// HotpotQA-style JSON array with `_id`/`id`, `question` and optionally
	/// `answer` per record.
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, short = 'o', value_name = "FILE", default_value = "predictions.jsonl")]
	pub output: PathBuf,
	/// Answer only the first N questions.
	#[arg(long, value_name = "N")]
	pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DatasetRecord {
	#[serde(default, alias = "_id")]
	id: Option<String>,
	#[serde(default)]
	question: String,
	#[serde(default)]
	answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictionRecord {
	question_id: String,
	predicted_answer: String,
	supporting_trajectories: Vec<String>,
	rationale: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	gold_answer: Option<String>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = mtrag_config::load(&args.config)?;
	let filter = EnvFilter::new(cfg.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let questions = load_questions(&args.dataset, args.limit)?;
	let chunks = mtrag_index::load_chunks(Path::new(&cfg.index.chunks_path))?;
	let index = Arc::new(Bm25Index::build(&chunks));

	info!(chunks = chunks.len(), questions = questions.len(), "Corpus indexed, starting run.");

	let max_concurrent = cfg.runner.max_concurrent_questions as usize;
	let service = Arc::new(QaService::new(cfg, index));
	let semaphore = Arc::new(Semaphore::new(max_concurrent));
	let started = Instant::now();
	let total = questions.len();
	let mut tasks = JoinSet::new();

	for (position, question) in questions.into_iter().enumerate() {
		let service = service.clone();
		let semaphore = semaphore.clone();

		tasks.spawn(async move {
			let _permit = match semaphore.acquire_owned().await {
				Ok(permit) => permit,
				Err(_) => return None,
			};
			let gold_answer = question.gold_answer.clone();
			let result = service.answer_question(&question).await;

			Some((position, PredictionRecord {
				question_id: result.question_id,
				predicted_answer: result.answer,
				supporting_trajectories: result
					.supporting_trajectories
					.iter()
					.map(|kind| kind.label().to_string())
					.collect(),
				rationale: result.rationale,
				gold_answer,
			}))
		});
	}

	let mut predictions: Vec<Option<PredictionRecord>> = (0..total).map(|_| None).collect();
	let mut completed = 0_usize;

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok(Some((position, record))) => {
				predictions[position] = Some(record);
				completed += 1;

				if completed % 100 == 0 {
					info!(completed, total, "Progress.");
				}
			},
			Ok(None) => {},
			Err(err) => warn!(error = %err, "Question task failed to join."),
		}
	}

	let written = write_predictions(&args.output, predictions)?;

	info!(
		written,
		total,
		elapsed_secs = started.elapsed().as_secs(),
		output = %args.output.display(),
		"Run finished."
	);

	Ok(())
}

fn load_questions(path: &Path, limit: Option<usize>) -> color_eyre::Result<Vec<Question>> {
	let raw = fs::read_to_string(path)?;
	let records: Vec<DatasetRecord> = serde_json::from_str(&raw)?;
	let mut questions = Vec::new();

	for record in records {
		let Some(id) = record.id.filter(|id| !id.trim().is_empty()) else {
			warn!("Skipping a dataset record without an id.");

			continue;
		};

		questions.push(Question {
			id,
			text: record.question,
			gold_answer: record.answer,
		});

		if let Some(limit) = limit
			&& questions.len() >= limit
		{
			break;
		}
	}

	Ok(questions)
}

fn write_predictions(
	path: &Path,
	predictions: Vec<Option<PredictionRecord>>,
) -> color_eyre::Result<usize> {
	let file = fs::File::create(path)?;
	let mut writer = BufWriter::new(file);
	let mut written = 0_usize;

	for record in predictions.into_iter().flatten() {
		serde_json::to_writer(&mut writer, &record)?;
		writer.write_all(b"\n")?;

		written += 1;
	}

	writer.flush()?;

	Ok(written)
}
