use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_without_subcommand_serves() {
	let cli = Cli::try_parse_from(["surfd"]).unwrap();
	assert_eq!(cli.command(), Commands::Serve);
	assert_eq!(cli.verbose, 0);
	assert!(cli.config.is_none());
	assert!(cli.addr.is_none());
}

#[test]
fn parse_global_flags_after_subcommand() {
	let cli = Cli::try_parse_from([
		"surfd",
		"serve",
		"-vv",
		"--config",
		"/tmp/surf.toml",
		"--addr",
		"0.0.0.0:9100",
	])
	.unwrap();
	assert_eq!(cli.command(), Commands::Serve);
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.config, Some(PathBuf::from("/tmp/surf.toml")));
	assert_eq!(cli.addr.as_deref(), Some("0.0.0.0:9100"));
}

#[test]
fn parse_config_actions() {
	let cli = Cli::try_parse_from(["surfd", "config", "path"]).unwrap();
	assert_eq!(cli.command(), Commands::Config(ConfigAction::Path));

	let cli = Cli::try_parse_from(["surfd", "-c", "x.toml", "config", "show"]).unwrap();
	assert_eq!(cli.command(), Commands::Config(ConfigAction::Show));
	assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
}

#[test]
fn parse_rejects_unknown_subcommand() {
	assert!(Cli::try_parse_from(["surfd", "relay"]).is_err());
}
