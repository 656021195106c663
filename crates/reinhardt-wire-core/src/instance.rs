//! Component instances.
//!
//! An instance lives for one request only. Between requests its state exists
//! solely as a [`Snapshot`](crate::snapshot::Snapshot); the next request
//! rebuilds the instance from it.

use crate::cast::RichValue;
use crate::error::{WireError, WireResult};
use crate::registry::PropertyRegistry;
use crate::value::PropertyValue;
use crate::view::PropertyView;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of a logical component instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
	/// Generates a fresh random identifier.
	pub fn new() -> Self {
		Self(uuid::Uuid::new_v4().simple().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Default for ComponentId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ComponentId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for ComponentId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// Live state of one component during a request.
#[derive(Debug, Clone)]
pub struct ComponentInstance {
	id: ComponentId,
	name: String,
	registry: PropertyRegistry,
	values: IndexMap<String, RichValue>,
}

impl ComponentInstance {
	/// Creates an instance with a fresh id and every property at its default.
	pub fn new(name: impl Into<String>, registry: PropertyRegistry) -> WireResult<Self> {
		Self::with_id(ComponentId::new(), name, registry)
	}

	/// Creates an instance with a known id and every property at its default.
	pub fn with_id(
		id: ComponentId,
		name: impl Into<String>,
		registry: PropertyRegistry,
	) -> WireResult<Self> {
		let mut values = IndexMap::with_capacity(registry.len());
		for definition in registry.iter() {
			let rich = registry
				.casters()
				.load(definition.default_value(), definition.cast_type())?;
			values.insert(definition.name().to_string(), rich);
		}
		Ok(Self {
			id,
			name: name.into(),
			registry,
			values,
		})
	}

	/// Rebuilds an instance from transport data.
	///
	/// Properties missing from `data` keep their defaults. Unregistered keys
	/// are an error; callers validating untrusted input check them first.
	pub fn restore(
		id: ComponentId,
		name: impl Into<String>,
		registry: PropertyRegistry,
		data: &IndexMap<String, PropertyValue>,
	) -> WireResult<Self> {
		let mut instance = Self::with_id(id, name, registry)?;
		for (property, raw) in data {
			instance.set_raw(property, raw.clone())?;
		}
		Ok(instance)
	}

	pub fn id(&self) -> &ComponentId {
		&self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn registry(&self) -> &PropertyRegistry {
		&self.registry
	}

	/// Current rich value of a property.
	pub fn get(&self, name: &str) -> WireResult<&RichValue> {
		self.values
			.get(name)
			.ok_or_else(|| WireError::UnknownProperty(name.to_string()))
	}

	/// Mutable access to a property's rich value.
	///
	/// The value is validated when the instance is next dehydrated.
	pub fn get_mut(&mut self, name: &str) -> WireResult<&mut RichValue> {
		self.values
			.get_mut(name)
			.ok_or_else(|| WireError::UnknownProperty(name.to_string()))
	}

	/// Current value of a property in transport form.
	pub fn get_raw(&self, name: &str) -> WireResult<PropertyValue> {
		let definition = self.registry.require(name)?;
		let rich = self.get(name)?;
		self.registry
			.casters()
			.save(rich, definition.cast_type())
			.map_err(|e| with_property(name, e))
	}

	/// Sets a property.
	///
	/// Raw values are cast when the property declares a caster; rich values
	/// are accepted only by properties whose caster can save them.
	pub fn set(&mut self, name: &str, value: impl Into<RichValue>) -> WireResult<()> {
		let value = value.into();
		let definition = self.registry.require(name)?;
		let casters = self.registry.casters();
		let rich = match (value, definition.cast_type()) {
			(RichValue::Raw(raw), cast @ Some(_)) => {
				casters.load(&raw, cast).map_err(|e| with_property(name, e))?
			}
			(rich, cast) => {
				casters.save(&rich, cast).map_err(|e| with_property(name, e))?;
				rich
			}
		};
		self.values.insert(name.to_string(), rich);
		Ok(())
	}

	/// Sets a property from its transport form.
	pub fn set_raw(&mut self, name: &str, raw: PropertyValue) -> WireResult<()> {
		let definition = self.registry.require(name)?;
		let rich = self
			.registry
			.casters()
			.load(&raw, definition.cast_type())
			.map_err(|e| with_property(name, e))?;
		self.values.insert(name.to_string(), rich);
		Ok(())
	}

	/// Resets a property to its registered default.
	pub fn reset(&mut self, name: &str) -> WireResult<()> {
		let default = self.registry.require(name)?.default_value().clone();
		self.set_raw(name, default)
	}

	/// Reduces every property to transport form, in registration order.
	pub fn dehydrate(&self) -> WireResult<IndexMap<String, PropertyValue>> {
		self.registry
			.names()
			.map(|name| Ok((name.to_string(), self.get_raw(name)?)))
			.collect()
	}

	/// Read-only view over the registered properties.
	pub fn view(&self) -> PropertyView<'_> {
		PropertyView::new(self)
	}

	pub(crate) fn values(&self) -> &IndexMap<String, RichValue> {
		&self.values
	}
}

fn with_property(property: &str, error: WireError) -> WireError {
	match error {
		WireError::InvalidPropertyType { reason, .. } => WireError::invalid_type(property, reason),
		other => other,
	}
}
