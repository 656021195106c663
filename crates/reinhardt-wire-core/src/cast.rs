//! Cast pipeline.
//!
//! A [`Caster`] converts a transport-safe [`PropertyValue`] into a richer
//! in-memory [`RichValue`] when state is loaded (`cast`), and reduces it back
//! when state is saved (`uncast`). Casters are looked up through a typed
//! [`CastType`] key chosen when a property is registered.
//!
//! ## Laws
//!
//! - `cast` is deterministic for the same raw input (relative dates go
//!   through an injected [`Clock`]).
//! - For every rich value `r` a caster produces, `cast(uncast(r)) == r`.
//! - Without a cast type, `load`/`save` are the identity over
//!   [`RichValue::Raw`].
//!
//! ## Example
//!
//! ```
//! use reinhardt_wire_core::cast::{CastType, CasterRegistry, RichValue};
//! use reinhardt_wire_core::PropertyValue;
//!
//! let casters = CasterRegistry::new();
//! let raw = PropertyValue::from(vec!["foo", "bar", "bar"]);
//!
//! let rich = casters.load(&raw, Some(&CastType::Collection)).unwrap();
//! let unique = rich.as_collection().unwrap().unique();
//!
//! let saved = casters.save(&RichValue::from(unique), Some(&CastType::Collection)).unwrap();
//! assert_eq!(saved, PropertyValue::from(vec!["foo", "bar"]));
//! ```

mod collection;
mod date;
mod primitive;
mod stringable;

pub use collection::{Collection, CollectionCaster};
pub use date::{Clock, DateCaster, FixedClock, SystemClock};
pub use primitive::{BooleanCaster, FloatCaster, IntegerCaster};
pub use stringable::{Stringable, StringableCaster};

use crate::error::{WireError, WireResult};
use crate::value::PropertyValue;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Key identifying a caster in a [`CasterRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CastType {
	/// Numbers and numeric strings coerced to integers.
	Integer,
	/// Numbers and numeric strings coerced to floats.
	Float,
	/// Booleans and boolean-like strings.
	Boolean,
	/// Temporal values ([`RichValue::Date`]).
	Date,
	/// Ordered collections ([`RichValue::Collection`]).
	Collection,
	/// String helpers ([`RichValue::Stringable`]).
	Stringable,
	/// A caster registered by the application under a name.
	Custom(Cow<'static, str>),
}

impl CastType {
	/// Creates a key for an application-defined caster.
	pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
		Self::Custom(name.into())
	}

	/// Name of the cast type as shown in errors and logs.
	pub fn name(&self) -> &str {
		match self {
			Self::Integer => "integer",
			Self::Float => "float",
			Self::Boolean => "boolean",
			Self::Date => "date",
			Self::Collection => "collection",
			Self::Stringable => "stringable",
			Self::Custom(name) => name,
		}
	}
}

impl fmt::Display for CastType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// An application-defined rich value.
///
/// Implemented automatically for every `Debug + PartialEq + Send + Sync`
/// type, so custom casters can store their own structs in a [`RichValue`].
pub trait CustomValue: fmt::Debug + Send + Sync + 'static {
	/// Upcast used for downcasting back to the concrete type.
	fn as_any(&self) -> &dyn Any;

	/// Equality across trait objects.
	fn eq_value(&self, other: &dyn CustomValue) -> bool;
}

impl<T> CustomValue for T
where
	T: fmt::Debug + PartialEq + Send + Sync + 'static,
{
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn eq_value(&self, other: &dyn CustomValue) -> bool {
		other
			.as_any()
			.downcast_ref::<T>()
			.is_some_and(|other| other == self)
	}
}

/// In-memory value of a public property.
#[derive(Debug, Clone)]
pub enum RichValue {
	/// A transport-safe value with no caster applied.
	Raw(PropertyValue),
	/// A point in time, always held in UTC.
	Date(DateTime<Utc>),
	/// An ordered collection.
	Collection(Collection),
	/// A string with helper operations.
	Stringable(Stringable),
	/// A value produced by an application caster.
	Custom(Arc<dyn CustomValue>),
}

impl RichValue {
	/// Wraps an application-defined value.
	pub fn custom<T: CustomValue>(value: T) -> Self {
		Self::Custom(Arc::new(value))
	}

	/// Returns `true` if no caster is involved.
	pub fn is_raw(&self) -> bool {
		matches!(self, Self::Raw(_))
	}

	/// The raw value, if no caster is involved.
	pub fn as_raw(&self) -> Option<&PropertyValue> {
		match self {
			Self::Raw(value) => Some(value),
			_ => None,
		}
	}

	/// The date, if this is a temporal value.
	pub fn as_date(&self) -> Option<&DateTime<Utc>> {
		match self {
			Self::Date(value) => Some(value),
			_ => None,
		}
	}

	/// The collection, if this is a collection.
	pub fn as_collection(&self) -> Option<&Collection> {
		match self {
			Self::Collection(value) => Some(value),
			_ => None,
		}
	}

	/// Mutable access to the collection, if this is a collection.
	pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
		match self {
			Self::Collection(value) => Some(value),
			_ => None,
		}
	}

	/// The string helper, if this is a stringable.
	pub fn as_stringable(&self) -> Option<&Stringable> {
		match self {
			Self::Stringable(value) => Some(value),
			_ => None,
		}
	}

	/// Downcasts a custom value to its concrete type.
	pub fn downcast_custom<T: 'static>(&self) -> Option<&T> {
		match self {
			Self::Custom(value) => value.as_any().downcast_ref::<T>(),
			_ => None,
		}
	}

	/// Short description of the variant, used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Raw(value) => value.type_name(),
			Self::Date(_) => "date",
			Self::Collection(_) => "collection",
			Self::Stringable(_) => "stringable",
			Self::Custom(_) => "custom",
		}
	}
}

impl PartialEq for RichValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Raw(a), Self::Raw(b)) => a == b,
			(Self::Date(a), Self::Date(b)) => a == b,
			(Self::Collection(a), Self::Collection(b)) => a == b,
			(Self::Stringable(a), Self::Stringable(b)) => a == b,
			(Self::Custom(a), Self::Custom(b)) => a.eq_value(b.as_ref()),
			_ => false,
		}
	}
}

impl Default for RichValue {
	fn default() -> Self {
		Self::Raw(PropertyValue::Null)
	}
}

impl From<PropertyValue> for RichValue {
	fn from(value: PropertyValue) -> Self {
		Self::Raw(value)
	}
}

impl From<DateTime<Utc>> for RichValue {
	fn from(value: DateTime<Utc>) -> Self {
		Self::Date(value)
	}
}

impl From<Collection> for RichValue {
	fn from(value: Collection) -> Self {
		Self::Collection(value)
	}
}

impl From<Stringable> for RichValue {
	fn from(value: Stringable) -> Self {
		Self::Stringable(value)
	}
}

impl From<&str> for RichValue {
	fn from(value: &str) -> Self {
		Self::Raw(value.into())
	}
}

impl From<String> for RichValue {
	fn from(value: String) -> Self {
		Self::Raw(value.into())
	}
}

impl From<bool> for RichValue {
	fn from(value: bool) -> Self {
		Self::Raw(value.into())
	}
}

impl From<i64> for RichValue {
	fn from(value: i64) -> Self {
		Self::Raw(value.into())
	}
}

/// Converts between transport-safe and rich values.
pub trait Caster: Send + Sync {
	/// Builds the rich value from its transport form.
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue>;

	/// Reduces a rich value to its transport form.
	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue>;

	/// Whether clients may change values of this type between requests.
	fn client_mutable(&self) -> bool {
		true
	}
}

/// Typed lookup from [`CastType`] to caster implementations.
///
/// Owned by whoever drives the request cycle; there is no global registry.
#[derive(Clone)]
pub struct CasterRegistry {
	casters: HashMap<CastType, Arc<dyn Caster>>,
}

impl CasterRegistry {
	/// Creates a registry with every built-in caster installed.
	pub fn new() -> Self {
		Self::empty()
			.with_caster(CastType::Integer, IntegerCaster)
			.with_caster(CastType::Float, FloatCaster)
			.with_caster(CastType::Boolean, BooleanCaster)
			.with_caster(CastType::Date, DateCaster::new())
			.with_caster(CastType::Collection, CollectionCaster)
			.with_caster(CastType::Stringable, StringableCaster)
	}

	/// Creates a registry with no casters at all.
	pub fn empty() -> Self {
		Self {
			casters: HashMap::new(),
		}
	}

	/// Registers (or replaces) a caster.
	pub fn register(&mut self, cast_type: CastType, caster: impl Caster + 'static) -> &mut Self {
		tracing::debug!(cast_type = %cast_type, "registering caster");
		self.casters.insert(cast_type, Arc::new(caster));
		self
	}

	/// Builder form of [`register`](Self::register).
	pub fn with_caster(mut self, cast_type: CastType, caster: impl Caster + 'static) -> Self {
		self.register(cast_type, caster);
		self
	}

	/// Returns `true` if a caster is registered for `cast_type`.
	pub fn contains(&self, cast_type: &CastType) -> bool {
		self.casters.contains_key(cast_type)
	}

	/// Looks up a caster.
	pub fn get(&self, cast_type: &CastType) -> WireResult<&Arc<dyn Caster>> {
		self.casters
			.get(cast_type)
			.ok_or_else(|| WireError::UnknownCaster(cast_type.clone()))
	}

	/// Casts a transport value. With no cast type this is the identity.
	pub fn load(&self, raw: &PropertyValue, cast_type: Option<&CastType>) -> WireResult<RichValue> {
		match cast_type {
			Some(cast_type) => self.get(cast_type)?.cast(raw),
			None => Ok(RichValue::Raw(raw.clone())),
		}
	}

	/// Uncasts a rich value. With no cast type only raw values are accepted.
	pub fn save(&self, rich: &RichValue, cast_type: Option<&CastType>) -> WireResult<PropertyValue> {
		match (cast_type, rich) {
			(Some(cast_type), _) => self.get(cast_type)?.uncast(rich),
			(None, RichValue::Raw(value)) => Ok(value.clone()),
			(None, other) => Err(WireError::invalid_type(
				"<value>",
				format!("{} value requires a caster", other.kind()),
			)),
		}
	}

	/// Whether clients may mutate values of the given cast type.
	pub fn is_client_mutable(&self, cast_type: Option<&CastType>) -> WireResult<bool> {
		match cast_type {
			Some(cast_type) => Ok(self.get(cast_type)?.client_mutable()),
			None => Ok(true),
		}
	}
}

impl Default for CasterRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for CasterRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&str> = self.casters.keys().map(CastType::name).collect();
		names.sort_unstable();
		f.debug_struct("CasterRegistry").field("casters", &names).finish()
	}
}
