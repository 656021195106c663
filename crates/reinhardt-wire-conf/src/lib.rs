//! # Reinhardt Wire Configuration
//!
//! Settings for component state handling and logging initialisation.
//!
//! ## Quick Start
//!
//! ```rust
//! use reinhardt_wire_conf::{WireSettings, init_logging};
//!
//! let settings = WireSettings::from_toml_str(r#"
//!     secret_key = "0123456789abcdef0123456789abcdef"
//!
//!     [logging]
//!     level = "warn"
//! "#)
//! .unwrap()
//! .apply_env()
//! .unwrap();
//!
//! settings.validate().unwrap();
//! init_logging(&settings.logging).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`settings`]: [`WireSettings`] loading, environment overrides and validation
//! - [`logging`]: `tracing-subscriber` setup

pub mod logging;
pub mod settings;

pub use logging::init_logging;
pub use settings::{LogFormat, LoggingSettings, SettingsError, WireSettings};
