//! Component trait and request payload types.

use crate::error::{WireError, WireResult};
use crate::instance::ComponentInstance;
use crate::registry::PropertyRegistry;
use crate::value::PropertyValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Arguments passed to [`Component::mount`], in call order.
pub type MountArgs = IndexMap<String, PropertyValue>;

/// A server-driven component.
///
/// A component value holds only per-request state; everything that must
/// survive a round trip is declared in [`properties`](Self::properties) and
/// lives in the [`ComponentInstance`]. Every hook defaults to a no-op.
///
/// # Example
///
/// ```
/// use reinhardt_wire_core::component::{Component, MountArgs};
/// use reinhardt_wire_core::error::WireResult;
/// use reinhardt_wire_core::instance::ComponentInstance;
/// use reinhardt_wire_core::registry::PropertyRegistry;
/// use reinhardt_wire_core::PropertyValue;
///
/// #[derive(Default)]
/// struct Counter;
///
/// impl Component for Counter {
///     fn name(&self) -> &'static str {
///         "counter"
///     }
///
///     fn properties(&self, registry: &mut PropertyRegistry) -> WireResult<()> {
///         registry.register_property("count", PropertyValue::from(0), None)?;
///         Ok(())
///     }
///
///     fn call(
///         &mut self,
///         instance: &mut ComponentInstance,
///         method: &str,
///         _params: &[PropertyValue],
///     ) -> WireResult<PropertyValue> {
///         match method {
///             "increment" => {
///                 let count = instance.get_raw("count")?.as_i64().unwrap_or(0);
///                 instance.set("count", PropertyValue::from(count + 1))?;
///                 Ok(PropertyValue::Null)
///             }
///             _ => Err(self.method_not_found(method)),
///         }
///     }
/// }
/// ```
pub trait Component: Send {
	/// Name the component is registered and snapshotted under.
	fn name(&self) -> &'static str;

	/// Declares the public properties.
	fn properties(&self, registry: &mut PropertyRegistry) -> WireResult<()>;

	/// Runs at the start of every request, before anything else.
	fn boot(&mut self, _instance: &mut ComponentInstance) -> WireResult<()> {
		Ok(())
	}

	/// Runs once, when the instance is first created.
	///
	/// Mount arguments that match registered properties have already been
	/// assigned when this runs.
	fn mount(&mut self, _instance: &mut ComponentInstance, _args: &MountArgs) -> WireResult<()> {
		Ok(())
	}

	/// Runs on every subsequent request once state has been restored.
	fn hydrate(&mut self, _instance: &mut ComponentInstance) -> WireResult<()> {
		Ok(())
	}

	/// Runs before a client update is applied; an error rejects it.
	fn updating(
		&mut self,
		_instance: &ComponentInstance,
		_property: &str,
		_value: &PropertyValue,
	) -> WireResult<()> {
		Ok(())
	}

	/// Runs after a client update has been applied.
	fn updated(&mut self, _instance: &mut ComponentInstance, _property: &str) -> WireResult<()> {
		Ok(())
	}

	/// Dispatches an action called from the client.
	fn call(
		&mut self,
		_instance: &mut ComponentInstance,
		method: &str,
		_params: &[PropertyValue],
	) -> WireResult<PropertyValue> {
		Err(self.method_not_found(method))
	}

	/// Runs at the end of every request, before state is serialized.
	fn dehydrate(&mut self, _instance: &mut ComponentInstance) -> WireResult<()> {
		Ok(())
	}

	/// Error for an action this component does not expose.
	fn method_not_found(&self, method: &str) -> WireError {
		WireError::MethodNotFound {
			component: self.name().to_string(),
			method: method.to_string(),
		}
	}
}

/// An action invocation sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
	/// Action name. Names starting with `$` are built-in actions.
	pub method: String,
	/// Positional parameters.
	#[serde(default)]
	pub params: Vec<PropertyValue>,
}

impl ActionCall {
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			params: Vec::new(),
		}
	}

	/// Appends a parameter.
	pub fn param(mut self, value: impl Into<PropertyValue>) -> Self {
		self.params.push(value.into());
		self
	}
}

/// Built-in actions available on every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicAction {
	/// Re-runs the cycle without changing anything.
	Refresh,
	/// `$set(property, value)`.
	Set,
	/// `$toggle(property)` on a boolean property.
	Toggle,
}

impl MagicAction {
	/// Parses a `$`-prefixed action name.
	pub fn parse(method: &str) -> Option<Self> {
		match method {
			"$refresh" => Some(Self::Refresh),
			"$set" => Some(Self::Set),
			"$toggle" => Some(Self::Toggle),
			_ => None,
		}
	}

	/// The property this action writes to, if any.
	pub(crate) fn target<'a>(&self, call: &'a ActionCall) -> WireResult<Option<&'a str>> {
		let arity = match self {
			Self::Refresh => return Ok(None),
			Self::Set => 2,
			Self::Toggle => 1,
		};
		if call.params.len() != arity {
			return Err(WireError::InvalidActionParams {
				method: call.method.clone(),
				message: format!("expected {arity} parameter(s), got {}", call.params.len()),
			});
		}
		call.params[0]
			.as_str()
			.map(Some)
			.ok_or_else(|| WireError::InvalidActionParams {
				method: call.method.clone(),
				message: "first parameter must be a property name".to_string(),
			})
	}
}
