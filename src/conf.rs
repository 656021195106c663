//! Settings-driven setup.
//!
//! ```rust
//! use reinhardt_wire::conf::{WireSettings, build_manager};
//! use reinhardt_wire::ComponentFactory;
//!
//! let manager = build_manager(ComponentFactory::new(), &WireSettings::for_testing()).unwrap();
//! assert!(manager.factory().names().is_empty());
//! ```

pub use reinhardt_wire_conf::*;

use chrono::FixedOffset;
use reinhardt_wire_core::cast::{CastType, CasterRegistry, DateCaster};
use reinhardt_wire_core::{ComponentFactory, SnapshotSigner, WireManager};

/// Built-in casters, with the date caster configured from `settings`.
pub fn casters_from_settings(settings: &WireSettings) -> Result<CasterRegistry, SettingsError> {
	settings.validate()?;
	let mut date = DateCaster::new();
	if let Some(format) = &settings.date_format {
		date = date.input_format(format.clone());
	}
	if let Some(seconds) = settings.timezone_offset_seconds() {
		let offset = FixedOffset::east_opt(seconds)
			.ok_or(SettingsError::InvalidTimezoneOffset(seconds / 60))?;
		date = date.with_offset(offset);
	}
	Ok(CasterRegistry::new().with_caster(CastType::Date, date))
}

/// Builds a [`WireManager`] from validated settings.
pub fn build_manager(
	factory: ComponentFactory,
	settings: &WireSettings,
) -> Result<WireManager, SettingsError> {
	let signer = SnapshotSigner::new(settings.secret_key_bytes()?);
	let casters = casters_from_settings(settings)?;
	tracing::debug!(
		components = ?factory.names(),
		strict_updates = settings.strict_updates,
		"configured wire manager"
	);
	Ok(WireManager::new(factory, signer)
		.with_casters(casters)
		.strict_locks(settings.strict_updates))
}
