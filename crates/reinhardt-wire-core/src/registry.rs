//! Public property registry.
//!
//! Every piece of component state that survives a round trip is declared
//! here, in order, with its default and optional cast type. Anything not
//! registered is private to a single request and never reaches the client.
//!
//! ```
//! use reinhardt_wire_core::cast::{CastType, CasterRegistry};
//! use reinhardt_wire_core::registry::PropertyRegistry;
//! use reinhardt_wire_core::PropertyValue;
//! use std::sync::Arc;
//!
//! let mut registry = PropertyRegistry::new(Arc::new(CasterRegistry::new()));
//! registry
//!     .register_property("title", PropertyValue::from("Untitled"), None)
//!     .unwrap()
//!     .register_property("expiresAt", PropertyValue::from("2024-01-01"), Some(CastType::Date))
//!     .unwrap();
//!
//! assert_eq!(registry.names().collect::<Vec<_>>(), vec!["title", "expiresAt"]);
//! ```

use crate::cast::{CastType, CasterRegistry, RichValue};
use crate::error::{WireError, WireResult};
use crate::value::PropertyValue;
use indexmap::IndexMap;
use std::sync::Arc;

/// Declaration of one public property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
	name: String,
	default: PropertyValue,
	cast: Option<CastType>,
	locked: bool,
}

impl PropertyDefinition {
	/// Declares a property with a transport-safe default.
	pub fn new(name: impl Into<String>, default: impl Into<PropertyValue>) -> Self {
		Self {
			name: name.into(),
			default: default.into(),
			cast: None,
			locked: false,
		}
	}

	/// Routes the property through a caster.
	pub fn cast(mut self, cast_type: CastType) -> Self {
		self.cast = Some(cast_type);
		self
	}

	/// Forbids clients from changing the property.
	pub fn locked(mut self) -> Self {
		self.locked = true;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Default in transport form.
	pub fn default_value(&self) -> &PropertyValue {
		&self.default
	}

	pub fn cast_type(&self) -> Option<&CastType> {
		self.cast.as_ref()
	}

	pub fn is_locked(&self) -> bool {
		self.locked
	}
}

/// Ordered set of [`PropertyDefinition`]s for one component.
#[derive(Debug, Clone)]
pub struct PropertyRegistry {
	casters: Arc<CasterRegistry>,
	properties: IndexMap<String, PropertyDefinition>,
}

impl PropertyRegistry {
	/// Creates an empty registry resolving casts through `casters`.
	pub fn new(casters: Arc<CasterRegistry>) -> Self {
		Self {
			casters,
			properties: IndexMap::new(),
		}
	}

	/// Registers a property.
	///
	/// A raw default with a cast type is passed through the caster and stored
	/// in normalised transport form. A rich default requires a cast type.
	///
	/// # Errors
	///
	/// - [`WireError::InvalidPropertyType`] if the default is not transport-safe
	///   and no caster is given, or the caster rejects it.
	/// - [`WireError::UnknownCaster`] if the cast type is not registered.
	/// - [`WireError::DuplicateProperty`] / [`WireError::InvalidPropertyName`].
	pub fn register_property(
		&mut self,
		name: impl Into<String>,
		default: impl Into<RichValue>,
		cast: Option<CastType>,
	) -> WireResult<&mut Self> {
		let name = name.into();
		let default = default.into();
		let raw = match (&default, &cast) {
			(RichValue::Raw(value), None) => value.clone(),
			(rich, None) => {
				return Err(WireError::invalid_type(
					name,
					format!("{} default is not transport-safe without a caster", rich.kind()),
				));
			}
			(RichValue::Raw(value), Some(cast_type)) => {
				let rich = self
					.casters
					.load(value, Some(cast_type))
					.map_err(|e| reject_default(&name, e))?;
				self.casters
					.save(&rich, Some(cast_type))
					.map_err(|e| reject_default(&name, e))?
			}
			(rich, Some(cast_type)) => {
				let raw = self
					.casters
					.save(rich, Some(cast_type))
					.map_err(|e| reject_default(&name, e))?;
				self.casters
					.load(&raw, Some(cast_type))
					.map_err(|e| reject_default(&name, e))?;
				raw
			}
		};

		let mut definition = PropertyDefinition::new(name, raw);
		definition.cast = cast;
		self.insert(definition)
	}

	/// Registers a property whose default is given as JSON.
	///
	/// Objects are rejected with [`WireError::InvalidPropertyType`] unless a
	/// caster is given; casters only ever see transport-safe input, so an
	/// object default is rejected either way.
	pub fn register_json(
		&mut self,
		name: impl Into<String>,
		default: serde_json::Value,
		cast: Option<CastType>,
	) -> WireResult<&mut Self> {
		let name = name.into();
		let raw = PropertyValue::try_from_json(default)
			.map_err(|e| reject_default(&name, e))?;
		self.register_property(name, raw, cast)
	}

	/// Registers a fully specified definition, validating its default.
	pub fn register(&mut self, definition: PropertyDefinition) -> WireResult<&mut Self> {
		let locked = definition.locked;
		let name = definition.name.clone();
		self.register_property(definition.name, definition.default, definition.cast)?;
		if locked {
			self.lock(&name)?;
		}
		Ok(self)
	}

	/// Marks an already registered property as locked.
	pub fn lock(&mut self, name: &str) -> WireResult<&mut Self> {
		self.properties
			.get_mut(name)
			.ok_or_else(|| WireError::UnknownProperty(name.to_string()))?
			.locked = true;
		Ok(self)
	}

	fn insert(&mut self, definition: PropertyDefinition) -> WireResult<&mut Self> {
		validate_name(&definition.name)?;
		if self.properties.contains_key(&definition.name) {
			return Err(WireError::DuplicateProperty(definition.name));
		}
		tracing::trace!(
			property = %definition.name,
			cast = ?definition.cast,
			"registered property"
		);
		self.properties.insert(definition.name.clone(), definition);
		Ok(self)
	}

	pub fn get(&self, name: &str) -> Option<&PropertyDefinition> {
		self.properties.get(name)
	}

	/// Looks up a definition, failing with [`WireError::UnknownProperty`].
	pub fn require(&self, name: &str) -> WireResult<&PropertyDefinition> {
		self.get(name)
			.ok_or_else(|| WireError::UnknownProperty(name.to_string()))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.properties.contains_key(name)
	}

	/// Property names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.properties.keys().map(String::as_str)
	}

	/// Definitions in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &PropertyDefinition> {
		self.properties.values()
	}

	pub fn len(&self) -> usize {
		self.properties.len()
	}

	pub fn is_empty(&self) -> bool {
		self.properties.is_empty()
	}

	/// The caster registry used for this component's properties.
	pub fn casters(&self) -> &Arc<CasterRegistry> {
		&self.casters
	}

	/// Whether clients may change `name` between requests.
	///
	/// False for locked properties and for casters that opt out of client
	/// mutation.
	pub fn is_client_mutable(&self, name: &str) -> WireResult<bool> {
		let definition = self.require(name)?;
		if definition.locked {
			return Ok(false);
		}
		self.casters.is_client_mutable(definition.cast_type())
	}
}

fn reject_default(property: &str, error: WireError) -> WireError {
	match error {
		WireError::UnknownCaster(_) => error,
		WireError::InvalidPropertyType { reason, .. } => WireError::invalid_type(property, reason),
		other => WireError::invalid_type(property, other.to_string()),
	}
}

fn validate_name(name: &str) -> WireResult<()> {
	if name.is_empty() || name.starts_with('$') || name.contains('.') {
		return Err(WireError::InvalidPropertyName(name.to_string()));
	}
	Ok(())
}
