//! Error types for the component state engine.
//!
//! Every failure is local and synchronous: nothing here is retried, and a
//! rejected request leaves the caller's snapshot exactly as it was.

use crate::cast::CastType;
use thiserror::Error;

/// Result type for component state operations.
pub type WireResult<T> = Result<T, WireError>;

/// Why an inbound payload was rejected as tampered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TamperReason {
	/// The snapshot checksum does not match its contents.
	#[error("snapshot checksum mismatch")]
	ChecksumMismatch,

	/// The payload references a property that is not registered.
	#[error("property '{0}' is not registered")]
	UnknownProperty(String),

	/// The payload changes a property that clients may not mutate.
	#[error("property '{0}' is locked")]
	LockedProperty(String),

	/// The payload targets a reserved (`$`-prefixed) name.
	#[error("property name '{0}' is reserved")]
	ReservedName(String),
}

/// Errors raised by the property registry, cast pipeline and request cycle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WireError {
	/// A default that is not transport-safe was registered without a caster,
	/// or a value could not be reduced to a transport-safe shape.
	#[error("invalid type for property '{property}': {reason}")]
	InvalidPropertyType {
		/// Property name.
		property: String,
		/// What was wrong with the value.
		reason: String,
	},

	/// A declared cast type has no registered implementation.
	#[error("no caster registered for '{0}'")]
	UnknownCaster(CastType),

	/// The inbound payload was modified outside the allowed surface.
	#[error("tampered component state: {0}")]
	TamperedState(#[from] TamperReason),

	/// A caster rejected its input.
	#[error("{caster} cast failed: {message}")]
	CastFailed {
		/// Caster that failed.
		caster: CastType,
		/// Error message.
		message: String,
	},

	/// Component code touched a property that is not registered.
	#[error("unknown property '{0}'")]
	UnknownProperty(String),

	/// The same property was registered twice.
	#[error("property '{0}' is already registered")]
	DuplicateProperty(String),

	/// A property name is empty, reserved, or contains a path separator.
	#[error("invalid property name '{0}'")]
	InvalidPropertyName(String),

	/// No constructor is registered for the component name.
	#[error("component not found: {0}")]
	ComponentNotFound(String),

	/// The component does not expose the requested action.
	#[error("component '{component}' has no action '{method}'")]
	MethodNotFound {
		/// Component name.
		component: String,
		/// Requested method.
		method: String,
	},

	/// An action was called with the wrong parameters.
	#[error("invalid parameters for action '{method}': {message}")]
	InvalidActionParams {
		/// Action name.
		method: String,
		/// Error message.
		message: String,
	},

	/// A lifecycle hook failed and aborted the cycle.
	#[error("hook '{hook}' failed: {source}")]
	Hook {
		/// Hook name (boot, mount, hydrate, ...).
		hook: &'static str,
		/// Underlying error.
		#[source]
		source: Box<WireError>,
	},

	/// The initialization hook was invoked a second time for one instance.
	#[error("component instance {0} is already initialized")]
	AlreadyInitialized(crate::instance::ComponentId),

	/// Component logic reported a failure of its own.
	#[error("{0}")]
	Component(String),

	/// The request cycle was driven out of order.
	#[error("invalid phase transition: cannot transition from {from:?} to {to:?}")]
	InvalidPhaseTransition {
		/// Current phase.
		from: crate::engine::CyclePhase,
		/// Attempted phase.
		to: crate::engine::CyclePhase,
	},

	/// JSON encoding or decoding failed.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl WireError {
	/// Shorthand for [`WireError::InvalidPropertyType`].
	pub fn invalid_type(property: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidPropertyType {
			property: property.into(),
			reason: reason.into(),
		}
	}

	/// Shorthand for [`WireError::CastFailed`].
	pub fn cast_failed(caster: CastType, message: impl Into<String>) -> Self {
		Self::CastFailed {
			caster,
			message: message.into(),
		}
	}

	/// Returns `true` if the error rejected an inbound payload as tampered.
	pub fn is_tampered(&self) -> bool {
		match self {
			Self::TamperedState(_) => true,
			Self::Hook { source, .. } => source.is_tampered(),
			_ => false,
		}
	}

	/// The tamper reason, if this is a tamper rejection.
	pub fn tamper_reason(&self) -> Option<&TamperReason> {
		match self {
			Self::TamperedState(reason) => Some(reason),
			Self::Hook { source, .. } => source.tamper_reason(),
			_ => None,
		}
	}
}
