//! Component request cycle.
//!
//! [`WireManager`] drives one request for one component instance through
//! the phases
//!
//! ```text
//! Idle -> Hydrating -> Executing -> Serializing -> Idle
//! ```
//!
//! (a first mount skips `Hydrating`). Inbound payloads are validated in
//! full during `Hydrating`, before any component code runs; a rejected
//! request never reaches a hook and the caller's snapshot is left as it was.
//!
//! The manager keeps no per-instance state. Concurrent requests for the same
//! logical instance must be serialised by the caller.
//!
//! ## Example
//!
//! ```
//! use reinhardt_wire_core::prelude::*;
//!
//! #[derive(Default)]
//! struct Counter;
//!
//! impl Component for Counter {
//!     fn name(&self) -> &'static str {
//!         "counter"
//!     }
//!
//!     fn properties(&self, registry: &mut PropertyRegistry) -> WireResult<()> {
//!         registry.register_property("count", PropertyValue::from(0), Some(CastType::Integer))?;
//!         Ok(())
//!     }
//! }
//!
//! let mut factory = ComponentFactory::new();
//! factory.register::<Counter>();
//! let manager = WireManager::new(factory, SnapshotSigner::new(b"a-secret-key-of-at-least-32-bytes"));
//!
//! let mounted = manager.mount("counter", MountArgs::new()).unwrap();
//! let request = WireRequest::new(mounted.snapshot).update("count", "5");
//! let updated = manager.update(&request).unwrap();
//!
//! assert_eq!(updated.snapshot.get("count"), Some(&PropertyValue::from(5)));
//! assert_eq!(updated.effects.dirty, vec!["count"]);
//! ```

use crate::cast::CasterRegistry;
use crate::checksum::SnapshotSigner;
use crate::component::{ActionCall, Component, MagicAction, MountArgs};
use crate::error::{TamperReason, WireError, WireResult};
use crate::instance::ComponentInstance;
use crate::lifecycle::LifecycleDispatcher;
use crate::registry::PropertyRegistry;
use crate::snapshot::{Snapshot, SnapshotMemo};
use crate::value::PropertyValue;
use crate::view::PropertyView;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Phase of a request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
	/// No request in flight.
	Idle,
	/// Inbound payload is being verified and applied.
	Hydrating,
	/// Hooks and actions are running.
	Executing,
	/// State is being reduced to a new snapshot.
	Serializing,
}

impl CyclePhase {
	/// Whether `self -> next` is a legal transition.
	pub fn can_transition_to(self, next: CyclePhase) -> bool {
		use CyclePhase::*;
		matches!(
			(self, next),
			(Idle, Hydrating)
				| (Idle, Executing)
				| (Hydrating, Executing)
				| (Executing, Serializing)
				| (Serializing, Idle)
		)
	}
}

/// Phase tracker for a single request.
#[derive(Debug)]
pub struct RequestCycle {
	component: String,
	phase: CyclePhase,
}

impl RequestCycle {
	pub fn new(component: impl Into<String>) -> Self {
		Self {
			component: component.into(),
			phase: CyclePhase::Idle,
		}
	}

	pub fn phase(&self) -> CyclePhase {
		self.phase
	}

	/// Moves to `next`, rejecting out-of-order transitions.
	pub fn transition(&mut self, next: CyclePhase) -> WireResult<()> {
		if !self.phase.can_transition_to(next) {
			return Err(WireError::InvalidPhaseTransition {
				from: self.phase,
				to: next,
			});
		}
		tracing::debug!(
			component = %self.component,
			from = ?self.phase,
			to = ?next,
			"request cycle transition"
		);
		self.phase = next;
		Ok(())
	}
}

type Constructor = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Maps component names to constructors.
///
/// The factory is an ordinary value owned by the [`WireManager`]; there is
/// no process-wide component registry.
#[derive(Clone, Default)]
pub struct ComponentFactory {
	constructors: HashMap<String, Constructor>,
}

impl ComponentFactory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a component under its own [`Component::name`].
	pub fn register<C>(&mut self) -> &mut Self
	where
		C: Component + Default + 'static,
	{
		let name = C::default().name();
		self.register_with(name, || Box::new(C::default()))
	}

	/// Registers a constructor under an explicit name.
	pub fn register_with<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
	where
		F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
	{
		let name = name.into();
		tracing::debug!(component = %name, "registering component");
		self.constructors.insert(name, Arc::new(constructor));
		self
	}

	/// Builds a fresh component value.
	pub fn create(&self, name: &str) -> WireResult<Box<dyn Component>> {
		self.constructors
			.get(name)
			.map(|constructor| constructor())
			.ok_or_else(|| WireError::ComponentNotFound(name.to_string()))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.constructors.contains_key(name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl fmt::Debug for ComponentFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentFactory")
			.field("components", &self.names())
			.finish()
	}
}

/// Inbound payload for a subsequent request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
	/// Snapshot returned by the previous response.
	pub snapshot: Snapshot,
	/// Client-side property changes, keyed by property name or dotted path.
	#[serde(default)]
	pub updates: IndexMap<String, PropertyValue>,
	/// Actions to run after the updates, in order.
	#[serde(default)]
	pub calls: Vec<ActionCall>,
}

impl WireRequest {
	pub fn new(snapshot: Snapshot) -> Self {
		Self {
			snapshot,
			updates: IndexMap::new(),
			calls: Vec::new(),
		}
	}

	/// Adds a property update.
	pub fn update(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
		self.updates.insert(property.into(), value.into());
		self
	}

	/// Adds an action call.
	pub fn call(mut self, call: ActionCall) -> Self {
		self.calls.push(call);
		self
	}

	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}
}

/// Side effects reported back to the client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Effects {
	/// Properties whose transport value changed during the request.
	pub dirty: Vec<String>,
	/// Return values of the called actions, in call order.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub returns: Vec<PropertyValue>,
}

/// Serializable outbound payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
	pub snapshot: Snapshot,
	pub effects: Effects,
}

/// Result of a completed request cycle.
#[derive(Debug)]
pub struct CycleOutcome {
	/// Signed snapshot to send to the client.
	pub snapshot: Snapshot,
	/// Effects to send alongside the snapshot.
	pub effects: Effects,
	/// The instance as it stood after serialization, for rendering.
	pub instance: ComponentInstance,
}

impl CycleOutcome {
	/// Read-only view for rendering.
	pub fn view(&self) -> PropertyView<'_> {
		self.instance.view()
	}

	/// Drops the instance, keeping what goes over the wire.
	pub fn into_response(self) -> WireResponse {
		WireResponse {
			snapshot: self.snapshot,
			effects: self.effects,
		}
	}
}

/// Drives component request cycles.
#[derive(Debug, Clone)]
pub struct WireManager {
	factory: ComponentFactory,
	casters: Arc<CasterRegistry>,
	signer: SnapshotSigner,
	strict_locks: bool,
}

impl WireManager {
	/// Creates a manager with the built-in casters.
	pub fn new(factory: ComponentFactory, signer: SnapshotSigner) -> Self {
		Self {
			factory,
			casters: Arc::new(CasterRegistry::new()),
			signer,
			strict_locks: false,
		}
	}

	/// Replaces the caster registry.
	pub fn with_casters(mut self, casters: CasterRegistry) -> Self {
		self.casters = Arc::new(casters);
		self
	}

	/// When enabled, any update naming a locked property is rejected, even
	/// one that would leave its value unchanged.
	pub fn strict_locks(mut self, strict: bool) -> Self {
		self.strict_locks = strict;
		self
	}

	pub fn factory(&self) -> &ComponentFactory {
		&self.factory
	}

	pub fn casters(&self) -> &Arc<CasterRegistry> {
		&self.casters
	}

	pub fn signer(&self) -> &SnapshotSigner {
		&self.signer
	}

	fn prepare(&self, name: &str) -> WireResult<(LifecycleDispatcher, PropertyRegistry)> {
		let component = self.factory.create(name)?;
		let mut registry = PropertyRegistry::new(self.casters.clone());
		component.properties(&mut registry)?;
		Ok((LifecycleDispatcher::new(component), registry))
	}

	/// Creates a new instance: the component's first appearance.
	///
	/// Mount arguments matching registered properties are assigned before
	/// the mount hook runs; all arguments are passed to the hook.
	pub fn mount(&self, name: &str, args: MountArgs) -> WireResult<CycleOutcome> {
		let mut cycle = RequestCycle::new(name);
		let (mut dispatcher, registry) = self.prepare(name)?;
		let mut instance = ComponentInstance::new(name, registry)?;

		cycle.transition(CyclePhase::Executing)?;
		dispatcher.boot(&mut instance)?;
		for (property, value) in &args {
			if instance.registry().contains(property) {
				instance.set_raw(property, value.clone())?;
			}
		}
		dispatcher.initialize(&mut instance, &args)?;

		cycle.transition(CyclePhase::Serializing)?;
		let snapshot = self.serialize(&mut dispatcher, &mut instance)?;
		cycle.transition(CyclePhase::Idle)?;

		tracing::info!(component = name, id = %instance.id(), "mounted component");
		let dirty = snapshot.data.keys().cloned().collect();
		Ok(CycleOutcome {
			snapshot,
			effects: Effects {
				dirty,
				returns: Vec::new(),
			},
			instance,
		})
	}

	/// Runs a subsequent request against the state carried in `request`.
	///
	/// # Errors
	///
	/// [`WireError::TamperedState`] if the checksum fails, the payload names
	/// an unregistered or reserved property, or it changes a locked one. No
	/// component code runs in that case.
	pub fn update(&self, request: &WireRequest) -> WireResult<CycleOutcome> {
		let snapshot = &request.snapshot;
		let name = snapshot.name();
		let mut cycle = RequestCycle::new(name);

		cycle.transition(CyclePhase::Hydrating)?;
		let (mut dispatcher, registry) = self
			.verify(request)
			.and_then(|()| self.prepare(name))
			.and_then(|(dispatcher, registry)| {
				self.check_payload(&registry, request)?;
				Ok((dispatcher, registry))
			})
			.inspect_err(|err| {
				if err.is_tampered() {
					tracing::warn!(
						component = name,
						id = %snapshot.id(),
						reason = %err,
						"rejected tampered component state"
					);
				}
			})?;
		let mut instance =
			ComponentInstance::restore(snapshot.id().clone(), name, registry, &snapshot.data)?;

		cycle.transition(CyclePhase::Executing)?;
		dispatcher.boot(&mut instance)?;
		dispatcher.hydrate(&mut instance)?;
		for (property, value) in &request.updates {
			apply_update(&mut dispatcher, &mut instance, property, value.clone())?;
		}
		let mut returns = Vec::with_capacity(request.calls.len());
		for call in &request.calls {
			returns.push(dispatch(&mut dispatcher, &mut instance, call)?);
		}

		cycle.transition(CyclePhase::Serializing)?;
		let next = self.serialize(&mut dispatcher, &mut instance)?;
		cycle.transition(CyclePhase::Idle)?;

		let dirty = snapshot.diff(&next);
		tracing::debug!(component = name, id = %instance.id(), dirty = ?dirty, "updated component");
		Ok(CycleOutcome {
			snapshot: next,
			effects: Effects { dirty, returns },
			instance,
		})
	}

	fn verify(&self, request: &WireRequest) -> WireResult<()> {
		self.signer.verify(&request.snapshot)
	}

	fn serialize(
		&self,
		dispatcher: &mut LifecycleDispatcher,
		instance: &mut ComponentInstance,
	) -> WireResult<Snapshot> {
		dispatcher.dehydrate(instance)?;
		let data = instance.dehydrate()?;
		let memo = SnapshotMemo::new(instance.id().clone(), instance.name());
		self.signer.sign(data, memo)
	}

	/// Validates every part of the payload against the registry.
	fn check_payload(&self, registry: &PropertyRegistry, request: &WireRequest) -> WireResult<()> {
		let snapshot = &request.snapshot;
		if let Some(unknown) = snapshot.data.keys().find(|name| !registry.contains(name)) {
			return Err(TamperReason::UnknownProperty(unknown.clone()).into());
		}
		for (property, value) in &request.updates {
			self.check_writable(registry, snapshot, property, value)?;
		}
		for call in &request.calls {
			match MagicAction::parse(&call.method) {
				Some(action @ MagicAction::Set) => {
					if let Some(target) = action.target(call)? {
						self.check_writable(registry, snapshot, target, &call.params[1])?;
					}
				}
				Some(action @ MagicAction::Toggle) => {
					if let Some(target) = action.target(call)? {
						let (root, _) = split_path(target);
						check_known(registry, root)?;
						if !registry.is_client_mutable(root)? {
							return Err(TamperReason::LockedProperty(root.to_string()).into());
						}
					}
				}
				Some(MagicAction::Refresh) => {}
				None if call.method.starts_with('$') => {
					return Err(WireError::MethodNotFound {
						component: snapshot.name().to_string(),
						method: call.method.clone(),
					});
				}
				None => {}
			}
		}
		Ok(())
	}

	/// A locked target passes only if its value is unchanged once cast.
	fn check_writable(
		&self,
		registry: &PropertyRegistry,
		snapshot: &Snapshot,
		property: &str,
		value: &PropertyValue,
	) -> WireResult<()> {
		let (root, path) = split_path(property);
		check_known(registry, root)?;
		if registry.is_client_mutable(root)? {
			return Ok(());
		}
		if self.strict_locks {
			return Err(TamperReason::LockedProperty(root.to_string()).into());
		}
		let definition = registry.require(root)?;
		let current = match snapshot.get(root) {
			Some(value) => value.clone(),
			None => definition.default_value().clone(),
		};
		let mut proposed = current.clone();
		let casters = registry.casters();
		let unchanged = proposed
			.set_path(&path, value.clone())
			.and_then(|()| casters.load(&proposed, definition.cast_type()))
			.and_then(|rich| casters.save(&rich, definition.cast_type()))
			.is_ok_and(|normalised| normalised == current);
		if !unchanged {
			return Err(TamperReason::LockedProperty(root.to_string()).into());
		}
		Ok(())
	}
}

fn check_known(registry: &PropertyRegistry, root: &str) -> WireResult<()> {
	if root.starts_with('$') {
		return Err(TamperReason::ReservedName(root.to_string()).into());
	}
	if !registry.contains(root) {
		return Err(TamperReason::UnknownProperty(root.to_string()).into());
	}
	Ok(())
}

/// Splits `options.1.0` into `("options", ["1", "0"])`.
fn split_path(property: &str) -> (&str, Vec<&str>) {
	match property.split_once('.') {
		Some((root, rest)) => (root, rest.split('.').collect()),
		None => (property, Vec::new()),
	}
}

fn apply_update(
	dispatcher: &mut LifecycleDispatcher,
	instance: &mut ComponentInstance,
	property: &str,
	value: PropertyValue,
) -> WireResult<()> {
	let (root, path) = split_path(property);
	let mut raw = instance.get_raw(root)?;
	raw.set_path(&path, value.clone())?;

	dispatcher.updating(instance, property, &value)?;
	instance.set_raw(root, raw)?;
	dispatcher.updated(instance, property)
}

fn dispatch(
	dispatcher: &mut LifecycleDispatcher,
	instance: &mut ComponentInstance,
	call: &ActionCall,
) -> WireResult<PropertyValue> {
	let Some(action) = MagicAction::parse(&call.method) else {
		return dispatcher.call(instance, &call.method, &call.params);
	};
	let Some(target) = action.target(call)? else {
		return Ok(PropertyValue::Null);
	};
	let value = match action {
		MagicAction::Set => call.params[1].clone(),
		MagicAction::Toggle => {
			let (root, path) = split_path(target);
			let current = instance.get_raw(root)?;
			match current.get_path(&path) {
				Some(PropertyValue::Bool(b)) => PropertyValue::Bool(!b),
				Some(PropertyValue::Null) => PropertyValue::Bool(true),
				_ => {
					return Err(WireError::InvalidActionParams {
						method: call.method.clone(),
						message: format!("'{target}' is not a boolean"),
					});
				}
			}
		}
		MagicAction::Refresh => return Ok(PropertyValue::Null),
	};
	apply_update(dispatcher, instance, target, value)?;
	Ok(PropertyValue::Null)
}
