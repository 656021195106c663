//! HMAC-SHA256 snapshot signing.
//!
//! The checksum covers a canonical encoding of the snapshot's data and memo
//! (object keys sorted), so a client may reorder keys freely but cannot
//! change a single value without the server noticing.

use crate::error::{TamperReason, WireError, WireResult};
use crate::snapshot::{Snapshot, SnapshotMemo};
use crate::value::PropertyValue;
use hmac::{Hmac, Mac};
use indexmap::IndexMap;
use serde::Serialize;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize)]
struct CanonicalSnapshot<'a> {
	data: BTreeMap<&'a str, &'a PropertyValue>,
	memo: &'a SnapshotMemo,
}

/// Signs and verifies [`Snapshot`]s with an application secret.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use reinhardt_wire_core::checksum::SnapshotSigner;
/// use reinhardt_wire_core::snapshot::SnapshotMemo;
/// use reinhardt_wire_core::PropertyValue;
///
/// let signer = SnapshotSigner::new(b"a-secret-key-of-at-least-32-bytes");
/// let mut data = IndexMap::new();
/// data.insert("count".to_string(), PropertyValue::from(1));
///
/// let snapshot = signer.sign(data, SnapshotMemo::new("abc", "counter")).unwrap();
/// assert!(signer.verify(&snapshot).is_ok());
/// ```
#[derive(Clone)]
pub struct SnapshotSigner {
	secret_key: Vec<u8>,
}

impl SnapshotSigner {
	/// Creates a signer. The key should be at least 32 bytes.
	pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
		Self {
			secret_key: secret_key.as_ref().to_vec(),
		}
	}

	fn mac(&self, data: &IndexMap<String, PropertyValue>, memo: &SnapshotMemo) -> WireResult<HmacSha256> {
		let canonical = CanonicalSnapshot {
			data: data.iter().map(|(k, v)| (k.as_str(), v)).collect(),
			memo,
		};
		let payload = serde_json::to_vec(&canonical)?;
		let mut mac =
			HmacSha256::new_from_slice(&self.secret_key).expect("HMAC accepts any key length");
		mac.update(&payload);
		Ok(mac)
	}

	/// Computes the hex checksum for `data` and `memo`.
	pub fn checksum(
		&self,
		data: &IndexMap<String, PropertyValue>,
		memo: &SnapshotMemo,
	) -> WireResult<String> {
		Ok(hex::encode(self.mac(data, memo)?.finalize().into_bytes()))
	}

	/// Builds a signed snapshot.
	pub fn sign(
		&self,
		data: IndexMap<String, PropertyValue>,
		memo: SnapshotMemo,
	) -> WireResult<Snapshot> {
		let checksum = self.checksum(&data, &memo)?;
		Ok(Snapshot {
			data,
			memo,
			checksum,
		})
	}

	/// Verifies a snapshot's checksum in constant time.
	///
	/// # Errors
	///
	/// [`WireError::TamperedState`] with [`TamperReason::ChecksumMismatch`].
	pub fn verify(&self, snapshot: &Snapshot) -> WireResult<()> {
		let provided = hex::decode(&snapshot.checksum)
			.map_err(|_| WireError::from(TamperReason::ChecksumMismatch))?;
		self.mac(&snapshot.data, &snapshot.memo)?
			.verify_slice(&provided)
			.map_err(|_| WireError::from(TamperReason::ChecksumMismatch))
	}
}

impl fmt::Debug for SnapshotSigner {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SnapshotSigner")
			.field("secret_key", &"[REDACTED]")
			.finish()
	}
}
