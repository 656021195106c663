//! Full request cycles: updates, actions and built-in actions

use reinhardt_wire::prelude::*;
use reinhardt_wire_integration_tests::{HookLog, manager};
use rstest::{fixture, rstest};

#[fixture]
fn wire() -> WireManager {
	manager(&HookLog::default())
}

fn mount(wire: &WireManager, name: &str) -> Snapshot {
	wire.mount(name, MountArgs::new()).unwrap().snapshot
}

#[rstest]
fn test_counter_actions_and_returns(wire: WireManager) {
	// Arrange
	let snapshot = mount(&wire, "counter");
	let request = WireRequest::new(snapshot)
		.call(ActionCall::new("increment"))
		.call(ActionCall::new("add").param(10))
		.call(ActionCall::new("decrement"));

	// Act
	let outcome = wire.update(&request).unwrap();

	// Assert
	assert_eq!(outcome.snapshot.get("count"), Some(&PropertyValue::from(10)));
	assert_eq!(
		outcome.effects.returns,
		vec![
			PropertyValue::from(1),
			PropertyValue::from(11),
			PropertyValue::from(10)
		]
	);
	assert_eq!(outcome.effects.dirty, vec!["count"]);
}

#[rstest]
fn test_mount_hook_reads_arguments(wire: WireManager) {
	// Arrange
	let args = MountArgs::from([("start".to_string(), PropertyValue::from("41"))]);

	// Act
	let mounted = wire.mount("counter", args).unwrap();
	let outcome = wire
		.update(&WireRequest::new(mounted.snapshot).call(ActionCall::new("increment")))
		.unwrap();

	// Assert
	assert_eq!(outcome.snapshot.get("count"), Some(&PropertyValue::from(42)));
}

#[rstest]
fn test_string_input_is_coerced_by_caster(wire: WireManager) {
	// Arrange
	let request = WireRequest::new(mount(&wire, "counter")).update("count", "7");

	// Act
	let outcome = wire.update(&request).unwrap();

	// Assert
	assert_eq!(outcome.snapshot.get("count"), Some(&PropertyValue::from(7)));
	assert_eq!(outcome.view().raw("count"), Some(PropertyValue::from(7)));
}

#[rstest]
fn test_uncoercible_input_fails_cast(wire: WireManager) {
	let request = WireRequest::new(mount(&wire, "counter")).update("count", "seven");
	let result = wire.update(&request);
	assert!(matches!(
		result,
		Err(WireError::CastFailed { caster: CastType::Integer, .. })
	));
}

#[rstest]
fn test_set_and_toggle_builtin_actions(wire: WireManager) {
	// Arrange
	let request = WireRequest::new(mount(&wire, "post-form"))
		.call(ActionCall::new("$set").param("title").param("Hello world"))
		.call(ActionCall::new("$toggle").param("published"));

	// Act
	let outcome = wire.update(&request).unwrap();

	// Assert
	assert_eq!(outcome.snapshot.get("title"), Some(&PropertyValue::from("Hello world")));
	assert_eq!(outcome.snapshot.get("published"), Some(&PropertyValue::Bool(true)));
	assert_eq!(outcome.effects.dirty, vec!["title", "published"]);
	assert_eq!(outcome.effects.returns, vec![PropertyValue::Null, PropertyValue::Null]);
}

#[rstest]
fn test_toggle_non_boolean_is_rejected(wire: WireManager) {
	let request =
		WireRequest::new(mount(&wire, "post-form")).call(ActionCall::new("$toggle").param("title"));
	assert!(matches!(
		wire.update(&request),
		Err(WireError::InvalidActionParams { ref method, .. }) if method == "$toggle"
	));
}

#[rstest]
#[case::unknown_action(ActionCall::new("publishNow"))]
#[case::unknown_builtin(ActionCall::new("$destroy"))]
fn test_unknown_actions(wire: WireManager, #[case] call: ActionCall) {
	let request = WireRequest::new(mount(&wire, "post-form")).call(call);
	assert!(matches!(wire.update(&request), Err(WireError::MethodNotFound { .. })));
}

#[rstest]
fn test_dotted_update_replaces_array_element(wire: WireManager) {
	// Arrange
	let first = WireRequest::new(mount(&wire, "post-form")).update(
		"options",
		PropertyValue::from(vec!["foo", "bar", "baz"]),
	);
	let snapshot = wire.update(&first).unwrap().snapshot;
	let request = WireRequest::new(snapshot).update("options.1", "qux");

	// Act
	let outcome = wire.update(&request).unwrap();

	// Assert
	assert_eq!(
		outcome.snapshot.get("options"),
		Some(&PropertyValue::from(vec!["foo", "qux", "baz"]))
	);
	assert_eq!(outcome.effects.dirty, vec!["options"]);
}

#[rstest]
fn test_dotted_update_out_of_range_fails(wire: WireManager) {
	let request = WireRequest::new(mount(&wire, "post-form")).update("options.3", "x");
	assert!(matches!(
		wire.update(&request),
		Err(WireError::InvalidPropertyType { .. })
	));
}

#[rstest]
fn test_action_can_read_rich_values(wire: WireManager) {
	// Arrange
	let request = WireRequest::new(mount(&wire, "post-form"))
		.update("title", "  Release Notes 2.0 ")
		.call(ActionCall::new("slugTitle"));

	// Act
	let outcome = wire.update(&request).unwrap();

	// Assert
	assert_eq!(outcome.effects.returns, vec![PropertyValue::from("release-notes-2-0")]);
	assert_eq!(outcome.snapshot.get("title"), Some(&PropertyValue::from("Release Notes 2.0")));
}

#[rstest]
fn test_json_wire_round_trip(wire: WireManager) {
	// Arrange
	let snapshot = mount(&wire, "counter");
	let body = format!(
		r#"{{"snapshot":{},"updates":{{"count":"3"}},"calls":[{{"method":"increment"}}]}}"#,
		snapshot.to_json().unwrap()
	);

	// Act
	let request = WireRequest::from_json(&body).unwrap();
	let response = wire.update(&request).unwrap().into_response();
	let json: serde_json::Value = serde_json::to_value(&response).unwrap();

	// Assert
	assert_eq!(json["snapshot"]["data"]["count"], 4);
	assert_eq!(json["snapshot"]["memo"]["name"], "counter");
	assert_eq!(json["effects"]["dirty"], serde_json::json!(["count"]));
	assert_eq!(json["effects"]["returns"], serde_json::json!([4]));
}

#[rstest]
fn test_view_exposes_only_registered_properties(wire: WireManager) {
	// Arrange
	let outcome = wire.mount("post-form", MountArgs::new()).unwrap();

	// Act
	let view = outcome.view();
	let context = view.to_context().unwrap();

	// Assert
	assert_eq!(view.component_name(), "post-form");
	assert_eq!(
		context.keys().map(String::as_str).collect::<Vec<_>>(),
		vec!["title", "expiresAt", "options", "published", "authorId"]
	);
	assert!(!view.contains("secret"));
}
