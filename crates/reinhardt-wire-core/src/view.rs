//! Read-only property view handed to rendering code.

use crate::cast::RichValue;
use crate::error::WireResult;
use crate::instance::{ComponentId, ComponentInstance};
use crate::value::PropertyValue;
use indexmap::IndexMap;

/// Read-only access to the registered properties of a component.
///
/// This is the only state a template or renderer should see: it exposes
/// registered public properties and nothing else, and offers no way to
/// mutate them.
#[derive(Debug, Clone, Copy)]
pub struct PropertyView<'a> {
	instance: &'a ComponentInstance,
}

impl<'a> PropertyView<'a> {
	pub(crate) fn new(instance: &'a ComponentInstance) -> Self {
		Self { instance }
	}

	pub fn component_id(&self) -> &'a ComponentId {
		self.instance.id()
	}

	pub fn component_name(&self) -> &'a str {
		self.instance.name()
	}

	/// Rich value of a property.
	pub fn get(&self, name: &str) -> Option<&'a RichValue> {
		self.instance.values().get(name)
	}

	/// Transport form of a property.
	pub fn raw(&self, name: &str) -> Option<PropertyValue> {
		self.instance.get_raw(name).ok()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.instance.values().contains_key(name)
	}

	/// Property names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &'a str> + 'a {
		self.instance.registry().names()
	}

	/// `(name, value)` pairs in registration order.
	pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a RichValue)> + 'a {
		self.instance
			.values()
			.iter()
			.map(|(name, value)| (name.as_str(), value))
	}

	pub fn len(&self) -> usize {
		self.instance.values().len()
	}

	pub fn is_empty(&self) -> bool {
		self.instance.values().is_empty()
	}

	/// Every property in transport form, for template contexts.
	///
	/// # Errors
	///
	/// Fails on the first property whose value its caster cannot save.
	pub fn to_context(&self) -> WireResult<IndexMap<String, PropertyValue>> {
		self.names()
			.map(|name| Ok((name.to_string(), self.instance.get_raw(name)?)))
			.collect()
	}
}
