use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, ConfigAction};
use crate::config::{self, Config, LoadedConfig};
use crate::logging;
use crate::server::{self, AppState};

pub async fn dispatch(cli: Cli) -> Result<()> {
	if cli.command() == Commands::Config(ConfigAction::Path) {
		let path = match &cli.config {
			Some(path) => path.clone(),
			None => config::default_path()?,
		};
		println!("{}", path.display());
		return Ok(());
	}

	let LoadedConfig {
		mut config,
		path,
		written,
	} = Config::load_or_create(cli.config.as_deref()).context("loading configuration")?;
	config.apply_env();
	if let Some(addr) = &cli.addr {
		config.daemon.addr = addr.clone();
	}

	logging::init_logging(cli.verbose, config.logging.level.as_deref());
	if written {
		tracing::info!(target = "surf.config", path = %path.display(), "wrote config file");
	}

	match cli.command() {
		Commands::Serve => serve(config).await,
		Commands::Config(ConfigAction::Show) => {
			let rendered = toml::to_string_pretty(&config).context("rendering configuration")?;
			println!("# {}\n{rendered}", path.display());
			Ok(())
		}
		Commands::Config(ConfigAction::Path) => Ok(()),
	}
}

async fn serve(config: Config) -> Result<()> {
	config.validate().context("invalid configuration")?;
	let addr = config.socket_addr()?;
	let state = AppState::from_config(&config);

	server::bind_and_serve(addr, state, shutdown_signal()).await?;
	tracing::info!(target = "surf.http", "bridge daemon stopped");
	Ok(())
}

async fn shutdown_signal() {
	match tokio::signal::ctrl_c().await {
		Ok(()) => tracing::info!(target = "surf.http", "shutdown requested"),
		Err(err) => {
			tracing::warn!(target = "surf.http", error = %err, "cannot listen for ctrl-c, running until killed");
			std::future::pending::<()>().await;
		}
	}
}
