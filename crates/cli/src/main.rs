use clap::Parser;
use surf_cli::{cli::Cli, commands};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();

	if let Err(err) = commands::dispatch(cli).await {
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}
