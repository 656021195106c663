//! Temporal caster.
//!
//! Dates travel as RFC 3339 strings in UTC and are held as
//! [`DateTime<Utc>`]. Relative terms (`now`, `today`, `tomorrow`,
//! `yesterday`) are resolved against a [`Clock`], so casting stays
//! deterministic for a given clock. Inputs without a zone, and the calendar
//! day behind relative terms, are read in the caster's UTC offset.
//!
//! Only years 0001 through 9999 are accepted, on load and on save; RFC 3339
//! cannot express any other year.

use super::{CastType, Caster, RichValue};
use crate::error::{WireError, WireResult};
use crate::value::PropertyValue;
use chrono::{
	DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
	TimeZone, Utc,
};
use std::fmt;
use std::sync::Arc;

/// Source of the current time for relative date terms.
pub trait Clock: Send + Sync {
	/// Returns the current instant.
	fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		self.0
	}
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Years an RFC 3339 timestamp can carry.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn representable(date: DateTime<Utc>) -> WireResult<DateTime<Utc>> {
	if YEARS.contains(&date.year()) {
		Ok(date)
	} else {
		Err(WireError::cast_failed(
			CastType::Date,
			format!("year {} is outside 0001-9999", date.year()),
		))
	}
}

/// Casts strings and unix timestamps to [`RichValue::Date`].
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use reinhardt_wire_core::cast::{Caster, DateCaster, FixedClock};
/// use reinhardt_wire_core::PropertyValue;
///
/// let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 9, 15, 30, 0).unwrap());
/// let caster = DateCaster::with_clock(clock);
///
/// let rich = caster.cast(&PropertyValue::from("tomorrow")).unwrap();
/// let date = rich.as_date().unwrap();
/// assert_eq!(date.format("%m/%d/%Y").to_string(), "03/10/2024");
/// ```
#[derive(Clone)]
pub struct DateCaster {
	clock: Arc<dyn Clock>,
	offset: FixedOffset,
	input_formats: Vec<String>,
}

impl DateCaster {
	/// Creates a caster that reads the wall clock.
	pub fn new() -> Self {
		Self::with_clock(SystemClock)
	}

	/// Creates a caster with a specific clock.
	pub fn with_clock(clock: impl Clock + 'static) -> Self {
		Self {
			clock: Arc::new(clock),
			offset: Utc.fix(),
			input_formats: Vec::new(),
		}
	}

	/// Accepts an additional `strftime` input format.
	///
	/// Formats with a time component are tried as date-times, others as
	/// dates at midnight.
	pub fn input_format(mut self, format: impl Into<String>) -> Self {
		self.input_formats.push(format.into());
		self
	}

	/// Reads zoneless inputs and relative days in `offset` instead of UTC.
	pub fn with_offset(mut self, offset: FixedOffset) -> Self {
		self.offset = offset;
		self
	}

	fn local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
		self.offset
			.from_local_datetime(&naive)
			.single()
			.map(|date| date.with_timezone(&Utc))
	}

	fn parse(&self, input: &str) -> Option<DateTime<Utc>> {
		let trimmed = input.trim();
		let midnight = |date: NaiveDate| self.local(date.and_time(NaiveTime::MIN));
		let today = self.clock.now().with_timezone(&self.offset).date_naive();

		match trimmed.to_ascii_lowercase().as_str() {
			"now" => return Some(self.clock.now()),
			"today" => return midnight(today),
			"tomorrow" => return today.checked_add_days(Days::new(1)).and_then(midnight),
			"yesterday" => return today.checked_sub_days(Days::new(1)).and_then(midnight),
			_ => {}
		}

		if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
			return Some(parsed.with_timezone(&Utc));
		}

		let custom = self.input_formats.iter().map(String::as_str);
		for format in custom.clone().chain(DATETIME_FORMATS.iter().copied()) {
			if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
				return self.local(parsed);
			}
		}
		for format in custom.chain(DATE_FORMATS.iter().copied()) {
			if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
				return midnight(parsed);
			}
		}
		None
	}
}

impl Default for DateCaster {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for DateCaster {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DateCaster")
			.field("now", &self.clock.now())
			.field("offset", &self.offset)
			.field("input_formats", &self.input_formats)
			.finish()
	}
}

impl Caster for DateCaster {
	fn cast(&self, raw: &PropertyValue) -> WireResult<RichValue> {
		match raw {
			PropertyValue::Null => Ok(RichValue::Raw(PropertyValue::Null)),
			PropertyValue::String(s) if s.trim().is_empty() => Ok(RichValue::Raw(PropertyValue::Null)),
			PropertyValue::String(s) => self
				.parse(s)
				.ok_or_else(|| {
					WireError::cast_failed(CastType::Date, format!("unrecognised date '{s}'"))
				})
				.and_then(representable)
				.map(RichValue::Date),
			PropertyValue::Number(n) => n
				.as_i64()
				.and_then(|secs| DateTime::from_timestamp(secs, 0))
				.ok_or_else(|| WireError::cast_failed(CastType::Date, format!("invalid timestamp {n}")))
				.and_then(representable)
				.map(RichValue::Date),
			other => Err(WireError::cast_failed(
				CastType::Date,
				format!("cannot cast {} to date", other.type_name()),
			)),
		}
	}

	fn uncast(&self, rich: &RichValue) -> WireResult<PropertyValue> {
		match rich {
			RichValue::Date(date) => representable(*date)
				.map(|date| PropertyValue::String(date.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
			RichValue::Raw(PropertyValue::Null) => Ok(PropertyValue::Null),
			other => Err(WireError::cast_failed(
				CastType::Date,
				format!("cannot save {} as date", other.kind()),
			)),
		}
	}
}
