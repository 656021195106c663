//! String helper caster.

use super::{CastType, Caster, RichValue};
use crate::error::{WireError, WireResult};
use crate::value::PropertyValue;
use std::fmt;

/// A string with fluent helpers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stringable(String);

impl Stringable {
	/// Wraps a string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Borrow the inner string.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Length in characters.
	pub fn len(&self) -> usize {
		self.0.chars().count()
	}

	/// Returns `true` for the empty string.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `true` if `needle` occurs in the string.
	pub fn contains(&self, needle: &str) -> bool {
		self.0.contains(needle)
	}

	pub fn upper(&self) -> Self {
		Self(self.0.to_uppercase())
	}

	pub fn lower(&self) -> Self {
		Self(self.0.to_lowercase())
	}

	pub fn trim(&self) -> Self {
		Self(self.0.trim().to_string())
	}

	/// Capitalises the first letter of every word.
	pub fn title(&self) -> Self {
		let mut out = String::with_capacity(self.0.len());
		let mut at_word_start = true;
		for c in self.0.chars() {
			if c.is_alphanumeric() {
				if at_word_start {
					out.extend(c.to_uppercase());
				} else {
					out.extend(c.to_lowercase());
				}
				at_word_start = false;
			} else {
				out.push(c);
				at_word_start = true;
			}
		}
		Self(out)
	}

	/// Lowercase, ASCII-alphanumeric words joined by `-`.
	pub fn slug(&self) -> Self {
		let words: Vec<String> = self
			.0
			.split(|c: char| !c.is_ascii_alphanumeric())
			.filter(|word| !word.is_empty())
			.map(str::to_ascii_lowercase)
			.collect();
		Self(words.join("-"))
	}

	/// Consumes the wrapper.
	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for Stringable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Stringable {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// Casts strings to [`RichValue::Stringable`]. Null loads as the empty string,
/// numbers load as their decimal representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringableCaster;

impl Caster for StringableCaster {
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue> {
		match raw {
			PropertyValue::Null => Ok(RichValue::Stringable(Stringable::default())),
			PropertyValue::String(s) => Ok(RichValue::Stringable(Stringable::new(s.as_str()))),
			PropertyValue::Number(n) => Ok(RichValue::Stringable(Stringable::new(n.to_string()))),
			other => Err(WireError::cast_failed(
				CastType::Stringable,
				format!("cannot cast {} to string", other.type_name()),
			)),
		}
	}

	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue> {
		match rich {
			RichValue::Stringable(s) => Ok(PropertyValue::String(s.0.clone())),
			other => Err(WireError::cast_failed(
				CastType::Stringable,
				format!("cannot save {} as string", other.kind()),
			)),
		}
	}
}
