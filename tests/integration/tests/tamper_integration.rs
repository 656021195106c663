//! Rejection of forged or out-of-bounds payloads

use reinhardt_wire::prelude::*;
use reinhardt_wire_integration_tests::{HookLog, TEST_SECRET, factory, take_log};
use rstest::{fixture, rstest};

struct Harness {
	log: HookLog,
	wire: WireManager,
}

#[fixture]
fn harness() -> Harness {
	let log = HookLog::default();
	let wire = WireManager::new(factory(&log), SnapshotSigner::new(TEST_SECRET));
	Harness { log, wire }
}

fn mounted(harness: &Harness, name: &str) -> Snapshot {
	let snapshot = harness.wire.mount(name, MountArgs::new()).unwrap().snapshot;
	take_log(&harness.log);
	snapshot
}

fn assert_rejected(harness: &Harness, request: &WireRequest, expected: TamperReason) {
	let before = request.clone();
	let err = harness.wire.update(request).unwrap_err();
	assert_eq!(err.tamper_reason(), Some(&expected), "unexpected error: {err}");
	assert_eq!(*request, before);
	assert!(take_log(&harness.log).is_empty(), "component code ran");
}

#[rstest]
fn test_forged_value_fails_checksum(harness: Harness) {
	let mut request = WireRequest::new(mounted(&harness, "tracked"));
	request
		.snapshot
		.data
		.insert("label".to_string(), PropertyValue::from("forged"));
	assert_rejected(&harness, &request, TamperReason::ChecksumMismatch);
}

#[rstest]
fn test_forged_component_name_fails_checksum(harness: Harness) {
	let mut request = WireRequest::new(mounted(&harness, "counter"));
	request.snapshot.memo.name = "tracked".to_string();
	assert_rejected(&harness, &request, TamperReason::ChecksumMismatch);
}

#[rstest]
#[case::not_hex("zz")]
#[case::empty("")]
#[case::truncated("abcd")]
fn test_malformed_checksum(harness: Harness, #[case] checksum: &str) {
	let mut request = WireRequest::new(mounted(&harness, "tracked"));
	request.snapshot.checksum = checksum.to_string();
	assert_rejected(&harness, &request, TamperReason::ChecksumMismatch);
}

#[rstest]
fn test_snapshot_signed_with_other_key(harness: Harness) {
	// Arrange
	let snapshot = mounted(&harness, "tracked");
	let other = SnapshotSigner::new("another-secret-key-that-is-long-enough");
	let forged = other.sign(snapshot.data, snapshot.memo).unwrap();

	// Act & Assert
	assert_rejected(&harness, &WireRequest::new(forged), TamperReason::ChecksumMismatch);
}

#[rstest]
fn test_reordered_keys_are_accepted(harness: Harness) {
	// Arrange
	let mut snapshot = mounted(&harness, "post-form");
	snapshot.data.reverse();

	// Act
	let outcome = harness.wire.update(&WireRequest::new(snapshot));

	// Assert
	assert!(outcome.is_ok());
}

#[rstest]
fn test_unregistered_snapshot_property(harness: Harness) {
	// Arrange
	let snapshot = mounted(&harness, "tracked");
	let mut data = snapshot.data.clone();
	data.insert("isAdmin".to_string(), PropertyValue::Bool(true));
	let signed = harness.wire.signer().sign(data, snapshot.memo).unwrap();

	// Act & Assert
	assert_rejected(
		&harness,
		&WireRequest::new(signed),
		TamperReason::UnknownProperty("isAdmin".to_string()),
	);
}

#[rstest]
#[case::plain("isAdmin", TamperReason::UnknownProperty("isAdmin".to_string()))]
#[case::dotted("isAdmin.0", TamperReason::UnknownProperty("isAdmin".to_string()))]
#[case::reserved("$parent", TamperReason::ReservedName("$parent".to_string()))]
fn test_unregistered_update(
	harness: Harness,
	#[case] property: &str,
	#[case] expected: TamperReason,
) {
	let request = WireRequest::new(mounted(&harness, "tracked")).update(property, true);
	assert_rejected(&harness, &request, expected);
}

#[rstest]
fn test_set_on_unregistered_property(harness: Harness) {
	let request = WireRequest::new(mounted(&harness, "tracked"))
		.call(ActionCall::new("$set").param("isAdmin").param(true));
	assert_rejected(
		&harness,
		&request,
		TamperReason::UnknownProperty("isAdmin".to_string()),
	);
}

#[rstest]
fn test_locked_property_change_rejected(harness: Harness) {
	let request = WireRequest::new(mounted(&harness, "post-form")).update("authorId", 99);
	assert_rejected(
		&harness,
		&request,
		TamperReason::LockedProperty("authorId".to_string()),
	);
}

#[rstest]
#[case::set(ActionCall::new("$set").param("step").param(100))]
#[case::toggle(ActionCall::new("$toggle").param("step"))]
fn test_locked_property_via_builtin_action(harness: Harness, #[case] call: ActionCall) {
	let request = WireRequest::new(mounted(&harness, "counter")).call(call);
	assert_rejected(
		&harness,
		&request,
		TamperReason::LockedProperty("step".to_string()),
	);
}

#[rstest]
#[case::exact(PropertyValue::from(1))]
#[case::form_string(PropertyValue::from("1"))]
#[case::padded_form_string(PropertyValue::from(" 1 "))]
fn test_locked_property_unchanged_echo_is_allowed(harness: Harness, #[case] echo: PropertyValue) {
	// Arrange
	let request = WireRequest::new(mounted(&harness, "counter")).update("step", echo);

	// Act
	let outcome = harness.wire.update(&request).unwrap();

	// Assert
	assert!(outcome.effects.dirty.is_empty());
	assert_eq!(outcome.snapshot.get("step"), Some(&PropertyValue::from(1)));
}

#[rstest]
#[case::form_string(PropertyValue::from("2"))]
#[case::not_an_integer(PropertyValue::from("one"))]
fn test_locked_property_changed_form_echo_rejected(harness: Harness, #[case] echo: PropertyValue) {
	let request = WireRequest::new(mounted(&harness, "counter")).update("step", echo);
	assert_rejected(
		&harness,
		&request,
		TamperReason::LockedProperty("step".to_string()),
	);
}

#[rstest]
fn test_strict_locks_reject_unchanged_echo() {
	// Arrange
	let log = HookLog::default();
	let wire = WireManager::new(factory(&log), SnapshotSigner::new(TEST_SECRET)).strict_locks(true);
	let snapshot = wire.mount("counter", MountArgs::new()).unwrap().snapshot;
	let request = WireRequest::new(snapshot).update("step", 1);

	// Act
	let err = wire.update(&request).unwrap_err();

	// Assert
	assert_eq!(
		err.tamper_reason(),
		Some(&TamperReason::LockedProperty("step".to_string()))
	);
}

#[rstest]
fn test_server_side_changes_to_locked_property_are_signed(harness: Harness) {
	// Arrange
	let snapshot = mounted(&harness, "post-form");
	let mut data = snapshot.data.clone();
	data.insert("authorId".to_string(), PropertyValue::from(5));
	let signed = harness.wire.signer().sign(data, snapshot.memo).unwrap();

	// Act
	let outcome = harness.wire.update(&WireRequest::new(signed)).unwrap();

	// Assert
	assert_eq!(outcome.snapshot.get("authorId"), Some(&PropertyValue::from(5)));
	assert!(harness.wire.signer().verify(&outcome.snapshot).is_ok());
}
