//! Lifecycle hook ordering across mount and update cycles

use reinhardt_wire::prelude::*;
use reinhardt_wire_integration_tests::{HookLog, manager, take_log};
use rstest::{fixture, rstest};

#[fixture]
fn log() -> HookLog {
	HookLog::default()
}

#[rstest]
fn test_mount_runs_boot_mount_dehydrate(log: HookLog) {
	// Arrange
	let manager = manager(&log);
	let args = MountArgs::from([
		("label".to_string(), PropertyValue::from("hello")),
		("unrelated".to_string(), PropertyValue::from(5)),
	]);

	// Act
	let outcome = manager.mount("tracked", args).unwrap();

	// Assert
	assert_eq!(take_log(&log), vec!["boot", "mount:hello", "dehydrate"]);
	assert_eq!(outcome.snapshot.get("label"), Some(&PropertyValue::from("hello")));
	assert!(outcome.snapshot.get("unrelated").is_none());
	assert_eq!(outcome.effects.dirty, vec!["label"]);
}

#[rstest]
fn test_update_runs_hooks_in_order_without_mount(log: HookLog) {
	// Arrange
	let manager = manager(&log);
	let mounted = manager.mount("tracked", MountArgs::new()).unwrap();
	take_log(&log);
	let request = WireRequest::new(mounted.snapshot)
		.update("label", "changed")
		.call(ActionCall::new("save"));

	// Act
	let outcome = manager.update(&request).unwrap();

	// Assert
	assert_eq!(
		take_log(&log),
		vec![
			"boot",
			"hydrate",
			"updating:label",
			"updated:label",
			"call:save",
			"dehydrate"
		]
	);
	assert_eq!(outcome.snapshot.get("label"), Some(&PropertyValue::from("changed")));
}

#[rstest]
fn test_mount_never_reruns_across_requests(log: HookLog) {
	// Arrange
	let manager = manager(&log);
	let mut snapshot = manager.mount("tracked", MountArgs::new()).unwrap().snapshot;

	// Act
	for label in ["a", "b", "c"] {
		let request = WireRequest::new(snapshot).update("label", label);
		snapshot = manager.update(&request).unwrap().snapshot;
	}

	// Assert
	let mounts = take_log(&log)
		.into_iter()
		.filter(|entry| entry.starts_with("mount"))
		.count();
	assert_eq!(mounts, 1);
	assert_eq!(snapshot.get("label"), Some(&PropertyValue::from("c")));
}

#[rstest]
fn test_instance_identity_is_stable(log: HookLog) {
	// Arrange
	let manager = manager(&log);
	let mounted = manager.mount("tracked", MountArgs::new()).unwrap();
	let id = mounted.snapshot.id().clone();

	// Act
	let outcome = manager
		.update(&WireRequest::new(mounted.snapshot).call(ActionCall::new("$refresh")))
		.unwrap();

	// Assert
	assert_eq!(outcome.snapshot.id(), &id);
	assert_eq!(outcome.instance.id(), &id);
	assert!(outcome.effects.dirty.is_empty());
}

#[rstest]
fn test_failing_updating_hook_aborts_cycle(log: HookLog) {
	// Arrange
	let manager = manager(&log);
	let mounted = manager.mount("tracked", MountArgs::new()).unwrap();
	take_log(&log);
	let request = WireRequest::new(mounted.snapshot.clone()).update("label", "forbidden");

	// Act
	let result = manager.update(&request);

	// Assert
	assert!(matches!(result, Err(WireError::Hook { hook: "updating", .. })));
	assert_eq!(take_log(&log), vec!["boot", "hydrate"]);
	assert_eq!(request.snapshot, mounted.snapshot);
}

#[rstest]
fn test_mount_of_unknown_component(log: HookLog) {
	let manager = manager(&log);
	let result = manager.mount("nonexistent", MountArgs::new());
	assert!(matches!(result, Err(WireError::ComponentNotFound(ref name)) if name == "nonexistent"));
	assert!(take_log(&log).is_empty());
}
