//! Transport-safe property values.
//!
//! [`PropertyValue`] is the only shape that crosses the wire: null, string,
//! number, boolean, or an ordered sequence of those. Anything richer has to
//! go through a [`Caster`](crate::cast::Caster) first.

use crate::error::{WireError, WireResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transport-safe value.
///
/// Serializes as plain JSON. JSON objects are rejected on deserialization,
/// so a decoded payload can never smuggle a map into component state.
///
/// # Examples
///
/// ```
/// use reinhardt_wire_core::PropertyValue;
///
/// let value = PropertyValue::from(vec!["foo", "bar"]);
/// assert_eq!(value.to_string(), r#"["foo","bar"]"#);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
	/// Absence of a value.
	#[default]
	Null,
	/// A boolean.
	Bool(bool),
	/// A finite JSON number (integer or float).
	Number(serde_json::Number),
	/// A UTF-8 string.
	String(String),
	/// An ordered sequence of transport-safe values.
	Array(Vec<PropertyValue>),
}

impl PropertyValue {
	/// Converts a JSON value, rejecting objects at any depth.
	pub fn try_from_json(value: serde_json::Value) -> WireResult<Self> {
		Self::from_json_at("<value>", value)
	}

	fn from_json_at(path: &str, value: serde_json::Value) -> WireResult<Self> {
		Ok(match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(b) => Self::Bool(b),
			serde_json::Value::Number(n) => Self::Number(n),
			serde_json::Value::String(s) => Self::String(s),
			serde_json::Value::Array(items) => Self::Array(
				items
					.into_iter()
					.enumerate()
					.map(|(i, item)| Self::from_json_at(&format!("{path}.{i}"), item))
					.collect::<WireResult<Vec<_>>>()?,
			),
			serde_json::Value::Object(_) => {
				return Err(WireError::invalid_type(
					path,
					"objects are not transport-safe",
				));
			}
		})
	}

	/// Converts back into a JSON value.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Self::Null => serde_json::Value::Null,
			Self::Bool(b) => serde_json::Value::Bool(*b),
			Self::Number(n) => serde_json::Value::Number(n.clone()),
			Self::String(s) => serde_json::Value::String(s.clone()),
			Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
		}
	}

	/// Builds a number from a float. NaN and infinities are not transport-safe.
	pub fn from_f64(value: f64) -> WireResult<Self> {
		serde_json::Number::from_f64(value)
			.map(Self::Number)
			.ok_or_else(|| WireError::invalid_type("<value>", format!("{value} is not a finite number")))
	}

	/// Returns `true` for [`PropertyValue::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Returns the string slice, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the integer, if this number is representable as `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Number(n) => n.as_i64(),
			_ => None,
		}
	}

	/// Returns the number as `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(n) => n.as_f64(),
			_ => None,
		}
	}

	/// Returns the boolean, if this is a boolean.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Returns the items, if this is an array.
	pub fn as_array(&self) -> Option<&[PropertyValue]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Short name of the variant, used in error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "boolean",
			Self::Number(_) => "number",
			Self::String(_) => "string",
			Self::Array(_) => "array",
		}
	}

	/// Looks up a nested value by array indices.
	///
	/// An empty path returns `self`.
	pub fn get_path(&self, path: &[&str]) -> Option<&PropertyValue> {
		let Some((head, rest)) = path.split_first() else {
			return Some(self);
		};
		let index: usize = head.parse().ok()?;
		self.as_array()?.get(index)?.get_path(rest)
	}

	/// Replaces a nested value addressed by array indices.
	///
	/// Indexing one past the end appends. Intermediate segments must
	/// address existing arrays.
	pub fn set_path(&mut self, path: &[&str], value: PropertyValue) -> WireResult<()> {
		let Some((head, rest)) = path.split_first() else {
			*self = value;
			return Ok(());
		};
		let index: usize = head
			.parse()
			.map_err(|_| WireError::invalid_type(*head, "path segment is not an array index"))?;
		let type_name = self.type_name();
		let Self::Array(items) = self else {
			return Err(WireError::invalid_type(
				*head,
				format!("cannot index into {type_name}"),
			));
		};
		if index == items.len() && rest.is_empty() {
			items.push(value);
			return Ok(());
		}
		items
			.get_mut(index)
			.ok_or_else(|| WireError::invalid_type(*head, "array index out of bounds"))?
			.set_path(rest, value)
	}
}

impl fmt::Display for PropertyValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_json())
	}
}

impl From<bool> for PropertyValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<&str> for PropertyValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for PropertyValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

macro_rules! impl_from_integer {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for PropertyValue {
				fn from(value: $ty) -> Self {
					Self::Number(serde_json::Number::from(value))
				}
			}
		)*
	};
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
	fn from(value: Vec<T>) -> Self {
		Self::Array(value.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Self::Null)
	}
}

impl TryFrom<serde_json::Value> for PropertyValue {
	type Error = WireError;

	fn try_from(value: serde_json::Value) -> WireResult<Self> {
		Self::try_from_json(value)
	}
}
