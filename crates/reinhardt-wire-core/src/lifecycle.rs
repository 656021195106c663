//! Lifecycle hook dispatch.
//!
//! Hook order for a first appearance:
//!
//! ```text
//! boot -> (assign matching mount args) -> mount -> dehydrate
//! ```
//!
//! and for every later request:
//!
//! ```text
//! boot -> hydrate -> [updating -> apply -> updated]* -> actions* -> dehydrate
//! ```
//!
//! A failing hook aborts the cycle; the error is wrapped in
//! [`WireError::Hook`] so callers can tell which stage failed.

use crate::component::{Component, MountArgs};
use crate::error::{WireError, WireResult};
use crate::instance::ComponentInstance;
use crate::value::PropertyValue;
use std::fmt;

/// Lifecycle hooks, in the order they can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
	Boot,
	Mount,
	Hydrate,
	Updating,
	Updated,
	Dehydrate,
}

impl Hook {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Boot => "boot",
			Self::Mount => "mount",
			Self::Hydrate => "hydrate",
			Self::Updating => "updating",
			Self::Updated => "updated",
			Self::Dehydrate => "dehydrate",
		}
	}
}

impl fmt::Display for Hook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Drives one component's hooks for one request.
pub struct LifecycleDispatcher {
	component: Box<dyn Component>,
	initialized: bool,
}

impl LifecycleDispatcher {
	pub fn new(component: Box<dyn Component>) -> Self {
		Self {
			component,
			initialized: false,
		}
	}

	pub fn component(&self) -> &dyn Component {
		self.component.as_ref()
	}

	/// Whether [`initialize`](Self::initialize) has run.
	pub fn is_initialized(&self) -> bool {
		self.initialized
	}

	fn run<T>(
		&mut self,
		hook: Hook,
		instance_id: &str,
		f: impl FnOnce(&mut dyn Component) -> WireResult<T>,
	) -> WireResult<T> {
		let span = tracing::debug_span!(
			"wire_hook",
			hook = hook.as_str(),
			component = self.component.name(),
			id = instance_id
		);
		let _enter = span.enter();
		tracing::debug!("running hook");
		f(self.component.as_mut()).map_err(|source| {
			tracing::debug!(error = %source, "hook failed");
			WireError::Hook {
				hook: hook.as_str(),
				source: Box::new(source),
			}
		})
	}

	pub fn boot(&mut self, instance: &mut ComponentInstance) -> WireResult<()> {
		let id = instance.id().to_string();
		self.run(Hook::Boot, &id, |c| c.boot(instance))
	}

	/// Runs the initialization hook. It runs exactly once per instance
	/// creation; a second call fails without invoking the component.
	pub fn initialize(&mut self, instance: &mut ComponentInstance, args: &MountArgs) -> WireResult<()> {
		if self.initialized {
			return Err(WireError::AlreadyInitialized(instance.id().clone()));
		}
		let id = instance.id().to_string();
		self.run(Hook::Mount, &id, |c| c.mount(instance, args))?;
		self.initialized = true;
		Ok(())
	}

	pub fn hydrate(&mut self, instance: &mut ComponentInstance) -> WireResult<()> {
		let id = instance.id().to_string();
		self.run(Hook::Hydrate, &id, |c| c.hydrate(instance))
	}

	pub fn updating(
		&mut self,
		instance: &ComponentInstance,
		property: &str,
		value: &PropertyValue,
	) -> WireResult<()> {
		let id = instance.id().to_string();
		self.run(Hook::Updating, &id, |c| c.updating(instance, property, value))
	}

	pub fn updated(&mut self, instance: &mut ComponentInstance, property: &str) -> WireResult<()> {
		let id = instance.id().to_string();
		self.run(Hook::Updated, &id, |c| c.updated(instance, property))
	}

	/// Dispatches a component action. Action errors are returned as-is.
	pub fn call(
		&mut self,
		instance: &mut ComponentInstance,
		method: &str,
		params: &[PropertyValue],
	) -> WireResult<PropertyValue> {
		let _span = tracing::debug_span!(
			"wire_action",
			component = self.component.name(),
			method
		)
		.entered();
		self.component.call(instance, method, params)
	}

	pub fn dehydrate(&mut self, instance: &mut ComponentInstance) -> WireResult<()> {
		let id = instance.id().to_string();
		self.run(Hook::Dehydrate, &id, |c| c.dehydrate(instance))
	}
}

impl fmt::Debug for LifecycleDispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LifecycleDispatcher")
			.field("component", &self.component.name())
			.field("initialized", &self.initialized)
			.finish()
	}
}
