use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};

fn help_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser, Debug)]
#[command(name = "surfd")]
#[command(about = "SurfingBro bridge daemon - drive browser extensions over WebSocket")]
#[command(version)]
#[command(styles = help_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Config file (defaults to $XDG_CONFIG_HOME/surfingbro/config.toml)
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Listen address, overriding the config file and SURF_ADDR
	#[arg(long, global = true, value_name = "HOST:PORT")]
	pub addr: Option<String>,

	#[command(subcommand)]
	pub command: Option<Commands>,
}

impl Cli {
	/// `serve` when no subcommand is given.
	pub fn command(&self) -> Commands {
		self.command.clone().unwrap_or(Commands::Serve)
	}
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
	/// Run the bridge daemon (default)
	Serve,

	/// Inspect the configuration file
	#[command(subcommand)]
	Config(ConfigAction),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
	/// Print the config file location
	Path,
	/// Print the effective configuration, creating the file if needed
	Show,
}

#[cfg(test)]
mod tests;
