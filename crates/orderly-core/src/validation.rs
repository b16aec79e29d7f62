//! Parameter validation.
//!
//! Every check here is pure: it runs before any signing or network work and
//! fails with the name of the offending field.

use std::str::FromStr;

use alloy_primitives::Address;
use chrono::NaiveDate;

use crate::{Error, Result};

/// Values that can be absent.
///
/// Strings are absent when empty or whitespace, numbers when zero, options
/// when `None` or when their content is absent. Booleans are never absent.
pub trait Presence {
    fn is_absent(&self) -> bool;
}

impl Presence for str {
    fn is_absent(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Presence for String {
    fn is_absent(&self) -> bool {
        self.as_str().is_absent()
    }
}

impl Presence for bool {
    fn is_absent(&self) -> bool {
        false
    }
}

macro_rules! impl_presence_for_numbers {
    ($($ty:ty),*) => {
        $(impl Presence for $ty {
            fn is_absent(&self) -> bool {
                *self == 0
            }
        })*
    };
}

impl_presence_for_numbers!(u8, u16, u32, u64, u128, i32, i64);

impl<T: Presence> Presence for Option<T> {
    fn is_absent(&self) -> bool {
        self.as_ref().map_or(true, Presence::is_absent)
    }
}

impl<T: Presence + ?Sized> Presence for &T {
    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

/// Fail with `MissingParameter` naming the first absent value.
#[allow(clippy::result_large_err)]
pub fn check_required(params: &[(&dyn Presence, &'static str)]) -> Result<()> {
    match params.iter().find(|(value, _)| value.is_absent()) {
        Some((_, field)) => Err(Error::MissingParameter { field }),
        None => Ok(()),
    }
}

/// A closed set of string values accepted by an endpoint parameter.
pub trait ParamEnum: Sized + Copy + 'static {
    const VARIANTS: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn allowed() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.as_str()).collect()
    }
}

/// Parse `value` into one of `E`'s variants (case-sensitive, as sent on the wire).
#[allow(clippy::result_large_err)]
pub fn parse_enum<E: ParamEnum>(field: &'static str, value: &str) -> Result<E> {
    E::VARIANTS
        .iter()
        .copied()
        .find(|variant| variant.as_str() == value)
        .ok_or_else(|| Error::InvalidEnumValue {
            field,
            value: value.to_string(),
            allowed: E::allowed(),
        })
}

/// Parse an optional enum parameter; `None` passes through.
#[allow(clippy::result_large_err)]
pub fn parse_optional_enum<E: ParamEnum>(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<E>> {
    value.map(|v| parse_enum(field, v)).transpose()
}

/// Check that `value` is a 20-byte hex EVM address.
#[allow(clippy::result_large_err)]
pub fn check_address(field: &'static str, value: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .map_err(|e| Error::invalid(field, format!("not an EVM address: {}", e)))
}

/// Check that `value` is a `YYYY-MM-DD` date.
#[allow(clippy::result_large_err)]
pub fn check_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| Error::invalid(field, format!("'{}' is not a YYYY-MM-DD date", value)))
}

/// Check an inclusive date range, optionally bounded in length.
#[allow(clippy::result_large_err)]
pub fn check_date_range(start_date: &str, end_date: &str, max_days: Option<i64>) -> Result<()> {
    let start = check_date("start_date", start_date)?;
    let end = check_date("end_date", end_date)?;

    if end < start {
        return Err(Error::invalid("end_date", "end_date is before start_date"));
    }
    if let Some(max_days) = max_days {
        if (end - start).num_days() > max_days {
            return Err(Error::invalid(
                "end_date",
                format!("range exceeds {} days", max_days),
            ));
        }
    }
    Ok(())
}
