//! Scalar coercion casters.
//!
//! Form inputs arrive from the browser as strings. These casters coerce them
//! into the scalar type a property declares, so `"5"` bound to an integer
//! property is stored as `5`.

use super::{CastType, Caster, RichValue};
use crate::error::{WireError, WireResult};
use crate::value::PropertyValue;

/// Coerces numbers and numeric strings to integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCaster;

impl Caster for IntegerCaster {
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue> {
		let value = match raw {
			PropertyValue::Null => PropertyValue::Null,
			PropertyValue::Number(n) => match n.as_i64() {
				Some(i) => PropertyValue::from(i),
				None => integral(n.as_f64(), raw)?,
			},
			PropertyValue::String(s) if s.trim().is_empty() => PropertyValue::Null,
			PropertyValue::String(s) => match s.trim().parse::<i64>() {
				Ok(i) => PropertyValue::from(i),
				Err(_) => integral(s.trim().parse::<f64>().ok(), raw)?,
			},
			other => return Err(mismatch(CastType::Integer, other)),
		};
		Ok(RichValue::Raw(value))
	}

	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue> {
		match rich {
			RichValue::Raw(value @ PropertyValue::Null) => Ok(value.clone()),
			RichValue::Raw(value) if value.as_i64().is_some() => Ok(value.clone()),
			other => Err(WireError::cast_failed(
				CastType::Integer,
				format!("cannot save {} as integer", other.kind()),
			)),
		}
	}
}

fn integral(value: Option<f64>, raw: &PropertyValue) -> WireResult<PropertyValue> {
	match value {
		Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
			Ok(PropertyValue::from(f as i64))
		}
		_ => Err(WireError::cast_failed(
			CastType::Integer,
			format!("{raw} is not an integer"),
		)),
	}
}

/// Coerces numbers and numeric strings to floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCaster;

impl Caster for FloatCaster {
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue> {
		let parsed = match raw {
			PropertyValue::Null => return Ok(RichValue::Raw(PropertyValue::Null)),
			PropertyValue::Number(n) => n.as_f64(),
			PropertyValue::String(s) if s.trim().is_empty() => {
				return Ok(RichValue::Raw(PropertyValue::Null));
			}
			PropertyValue::String(s) => s.trim().parse::<f64>().ok(),
			other => return Err(mismatch(CastType::Float, other)),
		};
		parsed
			.and_then(serde_json::Number::from_f64)
			.map(|n| RichValue::Raw(PropertyValue::Number(n)))
			.ok_or_else(|| {
				WireError::cast_failed(CastType::Float, format!("{raw} is not a finite number"))
			})
	}

	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue> {
		match rich {
			RichValue::Raw(value @ (PropertyValue::Null | PropertyValue::Number(_))) => {
				Ok(value.clone())
			}
			other => Err(WireError::cast_failed(
				CastType::Float,
				format!("cannot save {} as float", other.kind()),
			)),
		}
	}
}

/// Coerces booleans, `0`/`1` and checkbox-style strings to booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCaster;

impl Caster for BooleanCaster {
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue> {
		let value = match raw {
			PropertyValue::Null => PropertyValue::Null,
			PropertyValue::Bool(b) => PropertyValue::Bool(*b),
			PropertyValue::Number(n) => match n.as_i64() {
				Some(0) => PropertyValue::Bool(false),
				Some(1) => PropertyValue::Bool(true),
				_ => return Err(mismatch(CastType::Boolean, raw)),
			},
			PropertyValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
				"1" | "true" | "on" | "yes" => PropertyValue::Bool(true),
				"0" | "false" | "off" | "no" | "" => PropertyValue::Bool(false),
				_ => return Err(mismatch(CastType::Boolean, raw)),
			},
			other => return Err(mismatch(CastType::Boolean, other)),
		};
		Ok(RichValue::Raw(value))
	}

	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue> {
		match rich {
			RichValue::Raw(value @ (PropertyValue::Null | PropertyValue::Bool(_))) => {
				Ok(value.clone())
			}
			other => Err(WireError::cast_failed(
				CastType::Boolean,
				format!("cannot save {} as boolean", other.kind()),
			)),
		}
	}
}

fn mismatch(cast_type: CastType, raw: &PropertyValue) -> WireError {
	let message = format!("cannot cast {} {raw}", raw.type_name());
	WireError::cast_failed(cast_type, message)
}
