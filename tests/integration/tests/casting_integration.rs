//! Cast pipeline behaviour inside registries and request cycles

use chrono::{TimeZone, Utc};
use reinhardt_wire::prelude::*;
use reinhardt_wire_integration_tests::{HookLog, TEST_SECRET, factory};
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

/// Semantic version held as numbers, sent as `"major.minor.patch"`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Version(u32, u32, u32);

/// Server-owned value: clients may echo it but never change it.
struct VersionCaster;

fn version_type() -> CastType {
	CastType::custom("version")
}

impl Caster for VersionCaster {
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue> {
		let parts: Option<Vec<u32>> = raw
			.as_str()
			.and_then(|s| s.split('.').map(|p| p.parse().ok()).collect());
		match parts.as_deref() {
			Some([major, minor, patch]) => Ok(RichValue::custom(Version(*major, *minor, *patch))),
			_ => Err(WireError::cast_failed(version_type(), format!("invalid version {raw}"))),
		}
	}

	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue> {
		rich.downcast_custom::<Version>()
			.map(|&Version(major, minor, patch)| PropertyValue::from(format!("{major}.{minor}.{patch}")))
			.ok_or_else(|| WireError::cast_failed(version_type(), "expected a version"))
	}

	fn client_mutable(&self) -> bool {
		false
	}
}

#[derive(Default)]
struct Release;

impl Component for Release {
	fn name(&self) -> &'static str {
		"release"
	}

	fn properties(&self, registry: &mut PropertyRegistry) -> WireResult<()> {
		registry
			.register_property("version", RichValue::custom(Version(1, 0, 0)), Some(version_type()))?
			.register_property("notes", PropertyValue::from(""), None)?;
		Ok(())
	}

	fn call(
		&mut self,
		instance: &mut ComponentInstance,
		method: &str,
		_params: &[PropertyValue],
	) -> WireResult<PropertyValue> {
		match method {
			"bumpMinor" => {
				let Version(major, minor, _) = *instance
					.get("version")?
					.downcast_custom::<Version>()
					.ok_or_else(|| WireError::Component("version is not loaded".to_string()))?;
				instance.set("version", RichValue::custom(Version(major, minor + 1, 0)))?;
				Ok(PropertyValue::Null)
			}
			_ => Err(self.method_not_found(method)),
		}
	}
}

fn casters() -> CasterRegistry {
	let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 9, 15, 30, 0).unwrap());
	CasterRegistry::new()
		.with_caster(CastType::Date, DateCaster::with_clock(clock))
		.with_caster(version_type(), VersionCaster)
}

#[fixture]
fn wire() -> WireManager {
	let mut factory = factory(&HookLog::default());
	factory.register::<Release>();
	WireManager::new(factory, SnapshotSigner::new(TEST_SECRET)).with_casters(casters())
}

#[fixture]
fn registry() -> PropertyRegistry {
	PropertyRegistry::new(Arc::new(casters()))
}

#[rstest]
fn test_options_collection_unique(mut registry: PropertyRegistry) {
	// Arrange
	registry
		.register_property(
			"options",
			PropertyValue::from(vec!["foo", "bar", "bar"]),
			Some(CastType::Collection),
		)
		.unwrap();
	let definition = registry.require("options").unwrap();

	// Act
	let rich = registry
		.casters()
		.load(definition.default_value(), definition.cast_type())
		.unwrap();
	let unique = rich.as_collection().unwrap().unique();
	let saved = registry
		.casters()
		.save(&RichValue::from(unique), definition.cast_type())
		.unwrap();

	// Assert
	assert_eq!(saved, PropertyValue::from(vec!["foo", "bar"]));
}

#[rstest]
fn test_options_deduplicated_by_updated_hook(wire: WireManager) {
	// Arrange
	let snapshot = wire.mount("post-form", MountArgs::new()).unwrap().snapshot;
	let request = WireRequest::new(snapshot)
		.update("options", PropertyValue::from(vec!["foo", "bar", "bar"]));

	// Act
	let outcome = wire.update(&request).unwrap();

	// Assert
	assert_eq!(
		outcome.snapshot.get("options"),
		Some(&PropertyValue::from(vec!["foo", "bar"]))
	);
}

#[rstest]
fn test_expires_at_tomorrow_formats_as_us_date(wire: WireManager) {
	// Arrange
	let snapshot = wire.mount("post-form", MountArgs::new()).unwrap().snapshot;
	let request = WireRequest::new(snapshot).update("expiresAt", "tomorrow");

	// Act
	let outcome = wire.update(&request).unwrap();
	let view = outcome.view();
	let formatted = view
		.get("expiresAt")
		.and_then(RichValue::as_date)
		.map(|date| date.format("%m/%d/%Y").to_string())
		.unwrap();

	// Assert
	assert_eq!(formatted, "03/10/2024");
	assert!(formatted.chars().enumerate().all(|(i, c)| match i {
		2 | 5 => c == '/',
		_ => c.is_ascii_digit(),
	}));
	assert_eq!(
		outcome.snapshot.get("expiresAt"),
		Some(&PropertyValue::from("2024-03-10T00:00:00Z"))
	);
}

#[rstest]
fn test_rich_default_without_caster_is_invalid(mut registry: PropertyRegistry) {
	// Act
	let result = registry.register_property("version", RichValue::custom(Version(1, 0, 0)), None);

	// Assert
	assert!(matches!(
		result,
		Err(WireError::InvalidPropertyType { ref property, .. }) if property == "version"
	));
	assert!(registry.is_empty());
}

#[rstest]
#[case::object(json!({"nested": true}))]
#[case::object_in_array(json!([1, {"nested": true}]))]
fn test_object_default_is_invalid(mut registry: PropertyRegistry, #[case] default: serde_json::Value) {
	let result = registry.register_json("config", default, None);
	assert!(matches!(result, Err(WireError::InvalidPropertyType { .. })));
}

#[rstest]
fn test_unregistered_cast_type(mut registry: PropertyRegistry) {
	let result =
		registry.register_property("price", PropertyValue::from(100), Some(CastType::custom("money")));
	assert!(matches!(
		result,
		Err(WireError::UnknownCaster(ref cast)) if cast.name() == "money"
	));
}

#[rstest]
fn test_custom_caster_round_trips_through_cycle(wire: WireManager) {
	// Arrange
	let mounted = wire.mount("release", MountArgs::new()).unwrap();
	assert_eq!(mounted.snapshot.get("version"), Some(&PropertyValue::from("1.0.0")));
	let request = WireRequest::new(mounted.snapshot).call(ActionCall::new("bumpMinor"));

	// Act
	let outcome = wire.update(&request).unwrap();

	// Assert
	assert_eq!(outcome.snapshot.get("version"), Some(&PropertyValue::from("1.1.0")));
	assert_eq!(
		outcome.view().get("version").and_then(|v| v.downcast_custom::<Version>()),
		Some(&Version(1, 1, 0))
	);
}

#[rstest]
fn test_immutable_cast_type_rejects_client_change(wire: WireManager) {
	// Arrange
	let snapshot = wire.mount("release", MountArgs::new()).unwrap().snapshot;
	let request = WireRequest::new(snapshot).update("version", "9.9.9");

	// Act
	let err = wire.update(&request).unwrap_err();

	// Assert
	assert_eq!(
		err.tamper_reason(),
		Some(&TamperReason::LockedProperty("version".to_string()))
	);
}

#[rstest]
fn test_invalid_date_input_fails_cast(wire: WireManager) {
	let snapshot = wire.mount("post-form", MountArgs::new()).unwrap().snapshot;
	let request = WireRequest::new(snapshot).update("expiresAt", "someday");
	assert!(matches!(
		wire.update(&request),
		Err(WireError::CastFailed { caster: CastType::Date, .. })
	));
}

#[rstest]
fn test_date_beyond_year_9999_is_refused(wire: WireManager) {
	// Arrange
	let snapshot = wire.mount("post-form", MountArgs::new()).unwrap().snapshot;
	let request = WireRequest::new(snapshot.clone()).update("expiresAt", 253_402_300_800_i64);

	// Act
	let result = wire.update(&request);

	// Assert
	assert!(matches!(
		result,
		Err(WireError::CastFailed { caster: CastType::Date, .. })
	));
	assert!(wire.update(&WireRequest::new(snapshot)).is_ok());
}

#[rstest]
fn test_last_representable_date_survives_later_requests(wire: WireManager) {
	// Arrange
	let snapshot = wire.mount("post-form", MountArgs::new()).unwrap().snapshot;
	let first = WireRequest::new(snapshot).update("expiresAt", 253_402_300_799_i64);

	// Act
	let stored = wire.update(&first).unwrap().snapshot;
	let second = wire.update(&WireRequest::new(stored)).unwrap();

	// Assert
	assert_eq!(
		second.snapshot.get("expiresAt"),
		Some(&PropertyValue::from("9999-12-31T23:59:59Z"))
	);
}
