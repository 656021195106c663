//! Wire settings.
//!
//! Settings are read from TOML and then overridden from the environment:
//!
//! ```toml
//! secret_key = "change-me-to-at-least-thirty-two-bytes"
//! date_format = "%d.%m.%Y"
//! timezone_offset = 540
//! strict_updates = false
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `REINHARDT_WIRE_SECRET_KEY` | `secret_key` |
//! | `REINHARDT_WIRE_LOG_LEVEL` | `logging.level` |
//! | `REINHARDT_WIRE_STRICT_UPDATES` | `strict_updates` |

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Minimum length of the snapshot signing key, in bytes.
pub const MIN_SECRET_KEY_LEN: usize = 32;

/// Environment variable overriding [`WireSettings::secret_key`].
pub const ENV_SECRET_KEY: &str = "REINHARDT_WIRE_SECRET_KEY";
/// Environment variable overriding [`LoggingSettings::level`].
pub const ENV_LOG_LEVEL: &str = "REINHARDT_WIRE_LOG_LEVEL";
/// Environment variable overriding [`WireSettings::strict_updates`].
pub const ENV_STRICT_UPDATES: &str = "REINHARDT_WIRE_STRICT_UPDATES";

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

/// Settings errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// The settings file could not be read.
	#[error("failed to read {path}: {source}")]
	Io {
		/// File path.
		path: PathBuf,
		/// Underlying error.
		#[source]
		source: std::io::Error,
	},

	/// The settings file is not valid TOML for these settings.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// No signing key was configured.
	#[error("secret_key is not set")]
	MissingSecretKey,

	/// The signing key is too short.
	#[error("secret_key must be at least {min} bytes, got {len}")]
	SecretKeyTooShort {
		/// Actual length in bytes.
		len: usize,
		/// Required length in bytes.
		min: usize,
	},

	/// `timezone_offset` is outside one day.
	#[error("timezone_offset must be within ±1440 minutes, got {0}")]
	InvalidTimezoneOffset(i32),

	/// An environment variable holds an unusable value.
	#[error("invalid value for {var}: {message}")]
	InvalidEnv {
		/// Variable name.
		var: &'static str,
		/// Error message.
		message: String,
	},

	/// The log level is not a valid filter directive.
	#[error("invalid log level '{level}': {message}")]
	InvalidLogLevel {
		/// Configured level.
		level: String,
		/// Error message.
		message: String,
	},
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	/// Default multi-field format.
	#[default]
	Full,
	/// Single-line compact format.
	Compact,
}

/// Logging configuration
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// Filter directive, e.g. `info` or `reinhardt_wire_core=debug`.
	pub level: String,
	pub format: LogFormat,
	/// Include the event target in each line.
	pub target: bool,
	/// Colourise output.
	pub ansi: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Full,
			target: true,
			ansi: true,
		}
	}
}

impl LoggingSettings {
	/// Sets the filter directive.
	pub fn with_level(mut self, level: impl Into<String>) -> Self {
		self.level = level.into();
		self
	}

	/// Sets the output format.
	pub fn with_format(mut self, format: LogFormat) -> Self {
		self.format = format;
		self
	}
}

#[derive(Deserialize)]
#[serde(default)]
struct SettingsFile {
	secret_key: Option<String>,
	date_format: Option<String>,
	timezone_offset: Option<i32>,
	strict_updates: bool,
	logging: LoggingSettings,
}

impl Default for SettingsFile {
	fn default() -> Self {
		Self {
			secret_key: None,
			date_format: None,
			timezone_offset: None,
			strict_updates: false,
			logging: LoggingSettings::default(),
		}
	}
}

/// Component state settings
#[non_exhaustive]
pub struct WireSettings {
	/// Key used to sign snapshot checksums.
	pub secret_key: Option<SecretString>,
	/// Extra `strftime` format accepted by the date caster.
	pub date_format: Option<String>,
	/// UTC offset, in minutes, for zoneless dates and relative days.
	pub timezone_offset: Option<i32>,
	/// Reject every client update to a locked property, even a no-op.
	pub strict_updates: bool,
	/// Logging configuration.
	pub logging: LoggingSettings,
}

impl WireSettings {
	/// Creates settings with the given signing key and defaults elsewhere.
	pub fn new(secret_key: impl Into<String>) -> Self {
		Self {
			secret_key: Some(SecretString::from(secret_key.into())),
			..Self::default()
		}
	}

	/// Settings with a fixed key, for tests.
	pub fn for_testing() -> Self {
		Self::new("reinhardt-wire-insecure-test-key-0123456789")
	}

	/// Parses settings from a TOML document.
	pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
		let file: SettingsFile = toml::from_str(contents)?;
		Ok(Self {
			secret_key: file.secret_key.map(SecretString::from),
			date_format: file.date_format,
			timezone_offset: file.timezone_offset,
			strict_updates: file.strict_updates,
			logging: file.logging,
		})
	}

	/// Loads settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let settings = Self::from_toml_str(&contents)?;
		tracing::debug!(path = %path.display(), "loaded wire settings");
		Ok(settings)
	}

	/// Applies overrides from the process environment.
	pub fn apply_env(self) -> Result<Self, SettingsError> {
		self.apply_env_from(|var| std::env::var(var).ok())
	}

	/// Applies overrides from an arbitrary variable lookup.
	pub fn apply_env_from(
		mut self,
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<Self, SettingsError> {
		if let Some(key) = lookup(ENV_SECRET_KEY) {
			self.secret_key = Some(SecretString::from(key));
		}
		if let Some(level) = lookup(ENV_LOG_LEVEL) {
			self.logging.level = level;
		}
		if let Some(strict) = lookup(ENV_STRICT_UPDATES) {
			self.strict_updates = parse_bool(&strict).ok_or_else(|| SettingsError::InvalidEnv {
				var: ENV_STRICT_UPDATES,
				message: format!("expected a boolean, got '{strict}'"),
			})?;
		}
		Ok(self)
	}

	/// Checks the settings are usable.
	pub fn validate(&self) -> Result<(), SettingsError> {
		let key = self.secret_key.as_ref().ok_or(SettingsError::MissingSecretKey)?;
		let len = key.expose_secret().len();
		if len < MIN_SECRET_KEY_LEN {
			return Err(SettingsError::SecretKeyTooShort {
				len,
				min: MIN_SECRET_KEY_LEN,
			});
		}
		match self.timezone_offset {
			Some(offset) if offset.abs() >= MAX_OFFSET_MINUTES => {
				Err(SettingsError::InvalidTimezoneOffset(offset))
			}
			_ => Ok(()),
		}
	}

	/// Raw signing key bytes, once validated.
	pub fn secret_key_bytes(&self) -> Result<&[u8], SettingsError> {
		self.validate()?;
		self.secret_key
			.as_ref()
			.map(|key| key.expose_secret().as_bytes())
			.ok_or(SettingsError::MissingSecretKey)
	}

	/// UTC offset in seconds.
	pub fn timezone_offset_seconds(&self) -> Option<i32> {
		self.timezone_offset.map(|minutes| minutes * 60)
	}
}

impl Default for WireSettings {
	fn default() -> Self {
		let file = SettingsFile::default();
		Self {
			secret_key: None,
			date_format: file.date_format,
			timezone_offset: file.timezone_offset,
			strict_updates: file.strict_updates,
			logging: file.logging,
		}
	}
}

impl Clone for WireSettings {
	fn clone(&self) -> Self {
		Self {
			secret_key: self
				.secret_key
				.as_ref()
				.map(|key| SecretString::from(key.expose_secret().to_string())),
			date_format: self.date_format.clone(),
			timezone_offset: self.timezone_offset,
			strict_updates: self.strict_updates,
			logging: self.logging.clone(),
		}
	}
}

impl fmt::Debug for WireSettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WireSettings")
			.field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
			.field("date_format", &self.date_format)
			.field("timezone_offset", &self.timezone_offset)
			.field("strict_updates", &self.strict_updates)
			.field("logging", &self.logging)
			.finish()
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}
