//! # Reinhardt Wire
//!
//! Server-driven UI components for Reinhardt: a component's public state is
//! declared once, carried by the client between requests as a signed
//! snapshot, and rebuilt on the server for every interaction.
//!
//! ## Core Principles
//!
//! - **Declared state only**: only registered public properties cross the wire
//! - **Typed casting**: dates, collections and strings are rich values in
//!   memory and plain JSON on the wire
//! - **Tamper detection**: every snapshot is HMAC-signed; forged values,
//!   unknown properties and writes to locked properties are rejected before
//!   any component code runs
//!
//! ## Feature Flags
//!
//! - `conf` (default) - TOML settings, environment overrides and logging setup
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_wire::prelude::*;
//!
//! #[derive(Default)]
//! struct TodoList;
//!
//! impl Component for TodoList {
//!     fn name(&self) -> &'static str {
//!         "todo-list"
//!     }
//!
//!     fn properties(&self, registry: &mut PropertyRegistry) -> WireResult<()> {
//!         registry
//!             .register_property("draft", PropertyValue::from(""), None)?
//!             .register_property("items", PropertyValue::from(Vec::<String>::new()), Some(CastType::Collection))?;
//!         Ok(())
//!     }
//!
//!     fn call(
//!         &mut self,
//!         instance: &mut ComponentInstance,
//!         method: &str,
//!         _params: &[PropertyValue],
//!     ) -> WireResult<PropertyValue> {
//!         match method {
//!             "add" => {
//!                 let draft = instance.get_raw("draft")?;
//!                 if let Some(items) = instance.get_mut("items")?.as_collection_mut() {
//!                     items.push(draft);
//!                 }
//!                 instance.set("draft", "")?;
//!                 Ok(PropertyValue::Null)
//!             }
//!             _ => Err(self.method_not_found(method)),
//!         }
//!     }
//! }
//!
//! let mut factory = ComponentFactory::new();
//! factory.register::<TodoList>();
//! let manager = reinhardt_wire::conf::build_manager(factory, &WireSettings::for_testing()).unwrap();
//!
//! let mounted = manager.mount("todo-list", MountArgs::new()).unwrap();
//! let request = WireRequest::new(mounted.snapshot)
//!     .update("draft", "write docs")
//!     .call(ActionCall::new("add"));
//! let outcome = manager.update(&request).unwrap();
//!
//! assert_eq!(outcome.snapshot.get("items"), Some(&PropertyValue::from(vec!["write docs"])));
//! assert_eq!(outcome.effects.dirty, vec!["items"]);
//! ```

#[cfg(feature = "conf")]
pub mod conf;

pub use reinhardt_wire_core::{
	cast, checksum, component, engine, error, instance, lifecycle, registry, snapshot, value, view,
};

pub use reinhardt_wire_core::{
	ActionCall, CastType, Caster, CasterRegistry, Component, ComponentFactory, ComponentId,
	ComponentInstance, CycleOutcome, CyclePhase, Effects, MountArgs, PropertyDefinition,
	PropertyRegistry, PropertyValue, PropertyView, RichValue, Snapshot, SnapshotMemo,
	SnapshotSigner, TamperReason, WireError, WireManager, WireRequest, WireResponse, WireResult,
};

#[cfg(feature = "conf")]
pub use reinhardt_wire_conf::{LoggingSettings, SettingsError, WireSettings, init_logging};

/// Re-export commonly used types.
pub mod prelude {
	pub use reinhardt_wire_core::prelude::*;

	#[cfg(feature = "conf")]
	pub use reinhardt_wire_conf::{LoggingSettings, SettingsError, WireSettings, init_logging};
}
