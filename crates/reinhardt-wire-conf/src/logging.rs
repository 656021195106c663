//! Logging initialisation.

use crate::settings::{LogFormat, LoggingSettings, SettingsError};
use tracing_subscriber::EnvFilter;

/// Builds the event filter. `RUST_LOG` wins over the configured level.
pub fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, SettingsError> {
	if let Ok(filter) = EnvFilter::try_from_default_env() {
		return Ok(filter);
	}
	EnvFilter::try_new(&settings.level).map_err(|e| SettingsError::InvalidLogLevel {
		level: settings.level.clone(),
		message: e.to_string(),
	})
}

/// Installs a global `fmt` subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case nothing changes.
pub fn init_logging(settings: &LoggingSettings) -> Result<bool, SettingsError> {
	let filter = build_filter(settings)?;
	let builder = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(settings.target)
		.with_ansi(settings.ansi);
	let installed = match settings.format {
		LogFormat::Full => builder.try_init(),
		LogFormat::Compact => builder.compact().try_init(),
	}
	.is_ok();
	if installed {
		tracing::debug!(level = %settings.level, format = ?settings.format, "logging initialised");
	}
	Ok(installed)
}
