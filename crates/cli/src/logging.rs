use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter directives for a `-v` count.
///
/// Without flags the configured level applies, falling back to warnings plus
/// the daemon's own info lines (session connects, listen address).
pub fn filter_for(verbosity: u8, configured: Option<&str>) -> String {
	match verbosity {
		0 => configured
			.map(str::trim)
			.filter(|level| !level.is_empty())
			.unwrap_or("warn,surf=info")
			.to_string(),
		1 => "info".to_string(),
		_ => "debug,hyper=info".to_string(),
	}
}

/// Installs the stderr subscriber. `RUST_LOG` wins over everything else.
pub fn init_logging(verbosity: u8, configured: Option<&str>) {
	let filter = filter_for(verbosity, configured);
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}
