//! Transport snapshots.
//!
//! A [`Snapshot`] is the complete transport-safe state of one component at
//! the end of a request, plus identity and a checksum. It is sent to the
//! client with every response and comes back with the next request.

use crate::instance::ComponentId;
use crate::value::PropertyValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identity of the component a snapshot belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMemo {
	/// Instance id, stable across requests.
	pub id: ComponentId,
	/// Registered component name.
	pub name: String,
}

impl SnapshotMemo {
	pub fn new(id: impl Into<ComponentId>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
		}
	}
}

/// Signed, transport-safe state of one component.
///
/// Snapshots are plain values: they are passed between request boundaries
/// by the caller and never retained by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
	/// Public properties in transport form, in registration order.
	pub data: IndexMap<String, PropertyValue>,
	/// Component identity.
	pub memo: SnapshotMemo,
	/// Hex HMAC-SHA256 over `data` and `memo`.
	pub checksum: String,
}

impl Snapshot {
	/// Transport value of a property.
	pub fn get(&self, name: &str) -> Option<&PropertyValue> {
		self.data.get(name)
	}

	pub fn id(&self) -> &ComponentId {
		&self.memo.id
	}

	pub fn name(&self) -> &str {
		&self.memo.name
	}

	/// Names of properties whose values differ between `self` and `other`.
	///
	/// Properties present on only one side count as changed. Names from
	/// `self` come first, in order, followed by names only `other` has.
	pub fn diff(&self, other: &Snapshot) -> Vec<String> {
		let mut changed: Vec<String> = self
			.data
			.iter()
			.filter(|(name, value)| other.data.get(*name) != Some(*value))
			.map(|(name, _)| name.clone())
			.collect();
		changed.extend(
			other
				.data
				.keys()
				.filter(|name| !self.data.contains_key(*name))
				.cloned(),
		);
		changed
	}

	/// Serializes the snapshot to JSON.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Deserializes a snapshot from JSON.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}
