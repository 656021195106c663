//! # Reinhardt Wire Core
//!
//! Server-side state for server-driven UI components.
//!
//! A component declares its public properties in a [`PropertyRegistry`].
//! Between requests the component's state exists only as a signed
//! [`Snapshot`] held by the client; each request verifies the snapshot,
//! rebuilds the instance through the cast pipeline, applies client updates
//! and actions through the lifecycle hooks, and signs a fresh snapshot.
//!
//! ## Modules
//!
//! - [`value`]: the transport-safe [`PropertyValue`] union
//! - [`cast`]: [`Caster`] implementations and the [`CasterRegistry`]
//! - [`registry`]: public property declarations
//! - [`instance`], [`view`]: per-request component state and its read-only view
//! - [`snapshot`], [`checksum`]: transport snapshots and HMAC signing
//! - [`component`], [`lifecycle`]: the [`Component`] trait and hook dispatch
//! - [`engine`]: the [`WireManager`] request cycle
//!
//! ## Request Cycle
//!
//! ```text
//! mount:   boot -> assign args -> mount -> dehydrate -> sign
//! update:  verify -> validate payload -> restore -> boot -> hydrate
//!          -> [updating -> apply -> updated]* -> actions* -> dehydrate -> sign
//! ```

pub mod cast;
pub mod checksum;
pub mod component;
pub mod engine;
pub mod error;
pub mod instance;
pub mod lifecycle;
pub mod registry;
pub mod snapshot;
pub mod value;
pub mod view;

pub use cast::{CastType, Caster, CasterRegistry, RichValue};
pub use checksum::SnapshotSigner;
pub use component::{ActionCall, Component, MountArgs};
pub use engine::{
	ComponentFactory, CycleOutcome, CyclePhase, Effects, WireManager, WireRequest, WireResponse,
};
pub use error::{TamperReason, WireError, WireResult};
pub use instance::{ComponentId, ComponentInstance};
pub use registry::{PropertyDefinition, PropertyRegistry};
pub use snapshot::{Snapshot, SnapshotMemo};
pub use value::PropertyValue;
pub use view::PropertyView;

/// Re-export commonly used types.
pub mod prelude {
	pub use crate::cast::{
		CastType, Caster, CasterRegistry, Clock, Collection, DateCaster, FixedClock, RichValue,
		Stringable, SystemClock,
	};
	pub use crate::checksum::SnapshotSigner;
	pub use crate::component::{ActionCall, Component, MountArgs};
	pub use crate::engine::{
		ComponentFactory, CycleOutcome, CyclePhase, Effects, WireManager, WireRequest,
		WireResponse,
	};
	pub use crate::error::{TamperReason, WireError, WireResult};
	pub use crate::instance::{ComponentId, ComponentInstance};
	pub use crate::registry::{PropertyDefinition, PropertyRegistry};
	pub use crate::snapshot::{Snapshot, SnapshotMemo};
	pub use crate::value::PropertyValue;
	pub use crate::view::PropertyView;
}
