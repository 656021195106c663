//! Ordered collection caster.

use super::{CastType, Caster, RichValue};
use crate::error::{WireError, WireResult};
use crate::value::PropertyValue;
use std::cmp::Ordering;

/// An ordered collection of transport-safe values with fluent helpers.
///
/// Operations that reshape the collection return a new one, so a loaded
/// property can be transformed and written back in one expression.
///
/// # Examples
///
/// ```
/// use reinhardt_wire_core::cast::Collection;
/// use reinhardt_wire_core::PropertyValue;
///
/// let options = Collection::from(vec!["foo", "bar", "bar"]);
/// assert_eq!(options.unique().into_vec(), vec![
///     PropertyValue::from("foo"),
///     PropertyValue::from("bar"),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
	items: Vec<PropertyValue>,
}

impl Collection {
	/// Creates an empty collection.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of items.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns `true` if the collection has no items.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Iterates over the items in order.
	pub fn iter(&self) -> std::slice::Iter<'_, PropertyValue> {
		self.items.iter()
	}

	/// First item.
	pub fn first(&self) -> Option<&PropertyValue> {
		self.items.first()
	}

	/// Last item.
	pub fn last(&self) -> Option<&PropertyValue> {
		self.items.last()
	}

	/// Item at `index`.
	pub fn get(&self, index: usize) -> Option<&PropertyValue> {
		self.items.get(index)
	}

	/// Returns `true` if an equal item is present.
	pub fn contains(&self, value: &PropertyValue) -> bool {
		self.items.contains(value)
	}

	/// Appends an item in place.
	pub fn push(&mut self, value: impl Into<PropertyValue>) {
		self.items.push(value.into());
	}

	/// Removes duplicates, keeping the first occurrence of each item.
	pub fn unique(&self) -> Self {
		let mut items: Vec<PropertyValue> = Vec::with_capacity(self.items.len());
		for item in &self.items {
			if !items.contains(item) {
				items.push(item.clone());
			}
		}
		Self { items }
	}

	/// Keeps the items matching `predicate`.
	pub fn filter(&self, mut predicate: impl FnMut(&PropertyValue) -> bool) -> Self {
		Self {
			items: self.items.iter().filter(|item| predicate(item)).cloned().collect(),
		}
	}

	/// Transforms every item.
	pub fn map(&self, f: impl FnMut(&PropertyValue) -> PropertyValue) -> Self {
		Self {
			items: self.items.iter().map(f).collect(),
		}
	}

	/// Sorts items: null, booleans, numbers, strings, then arrays.
	pub fn sort(&self) -> Self {
		let mut items = self.items.clone();
		items.sort_by(compare);
		Self { items }
	}

	/// Reverses the order of the items.
	pub fn reverse(&self) -> Self {
		Self {
			items: self.items.iter().rev().cloned().collect(),
		}
	}

	/// Consumes the collection, returning its items.
	pub fn into_vec(self) -> Vec<PropertyValue> {
		self.items
	}
}

fn rank(value: &PropertyValue) -> u8 {
	match value {
		PropertyValue::Null => 0,
		PropertyValue::Bool(_) => 1,
		PropertyValue::Number(_) => 2,
		PropertyValue::String(_) => 3,
		PropertyValue::Array(_) => 4,
	}
}

fn compare(a: &PropertyValue, b: &PropertyValue) -> Ordering {
	match (a, b) {
		(PropertyValue::Bool(x), PropertyValue::Bool(y)) => x.cmp(y),
		(PropertyValue::Number(x), PropertyValue::Number(y)) => x
			.as_f64()
			.partial_cmp(&y.as_f64())
			.unwrap_or(Ordering::Equal),
		(PropertyValue::String(x), PropertyValue::String(y)) => x.cmp(y),
		(PropertyValue::Array(x), PropertyValue::Array(y)) => x
			.iter()
			.zip(y)
			.map(|(a, b)| compare(a, b))
			.find(|ordering| ordering.is_ne())
			.unwrap_or_else(|| x.len().cmp(&y.len())),
		_ => rank(a).cmp(&rank(b)),
	}
}

impl<T: Into<PropertyValue>> From<Vec<T>> for Collection {
	fn from(items: Vec<T>) -> Self {
		Self {
			items: items.into_iter().map(Into::into).collect(),
		}
	}
}

impl FromIterator<PropertyValue> for Collection {
	fn from_iter<I: IntoIterator<Item = PropertyValue>>(iter: I) -> Self {
		Self {
			items: iter.into_iter().collect(),
		}
	}
}

impl IntoIterator for Collection {
	type Item = PropertyValue;
	type IntoIter = std::vec::IntoIter<PropertyValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.into_iter()
	}
}

impl<'a> IntoIterator for &'a Collection {
	type Item = &'a PropertyValue;
	type IntoIter = std::slice::Iter<'a, PropertyValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

/// Casts arrays to [`RichValue::Collection`]. Null loads as an empty collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionCaster;

impl Caster for CollectionCaster {
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue> {
		match raw {
			PropertyValue::Null => Ok(RichValue::Collection(Collection::new())),
			PropertyValue::Array(items) => Ok(RichValue::Collection(Collection {
				items: items.clone(),
			})),
			other => Err(WireError::cast_failed(
				CastType::Collection,
				format!("cannot cast {} to collection", other.type_name()),
			)),
		}
	}

	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue> {
		match rich {
			RichValue::Collection(collection) => Ok(PropertyValue::Array(collection.items.clone())),
			other => Err(WireError::cast_failed(
				CastType::Collection,
				format!("cannot save {} as collection", other.kind()),
			)),
		}
	}
}
