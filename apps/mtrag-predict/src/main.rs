// crates.io
use clap::Parser;
// self
use mtrag_predict::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	mtrag_predict::run(args).await
}
