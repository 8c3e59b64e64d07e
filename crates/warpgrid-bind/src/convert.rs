//! Type-directed conversion of raw text values.
//!
//! [`Scalar`] covers the primitive kinds a field can hold directly or as a
//! sequence element. [`OptionalValue`] covers everything an `Option<_>`
//! field can hold: every scalar plus the RFC 3339 timestamp types.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{BindError, BindResult};

/// The closed set of kinds the binder knows how to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Int,
    Uint,
    Float,
    Bool,
    Instant,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Int => "integer",
            PrimitiveKind::Uint => "unsigned integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Instant => "timestamp",
        };
        f.write_str(name)
    }
}

/// A primitive that can be parsed from a single present text value.
///
/// `Default` is the value a field takes when its key is absent.
pub trait Scalar: Default + Sized {
    const KIND: PrimitiveKind;

    /// Parse a present value. `field` names the key in error messages.
    fn parse(field: &str, raw: &str) -> BindResult<Self>;
}

/// Convert an optional raw value. Absence yields the zero value for
/// every kind and is never an error.
pub fn convert_scalar<V: Scalar>(field: &str, raw: Option<&str>) -> BindResult<V> {
    match raw {
        Some(raw) => V::parse(field, raw),
        None => Ok(V::default()),
    }
}

/// A value that can sit behind an `Option<_>` field.
pub trait OptionalValue: Sized {
    const KIND: PrimitiveKind;

    fn parse_present(field: &str, raw: &str) -> BindResult<Self>;
}

impl<T: Scalar> OptionalValue for T {
    const KIND: PrimitiveKind = <T as Scalar>::KIND;

    fn parse_present(field: &str, raw: &str) -> BindResult<Self> {
        T::parse(field, raw)
    }
}

impl OptionalValue for DateTime<FixedOffset> {
    const KIND: PrimitiveKind = PrimitiveKind::Instant;

    fn parse_present(field: &str, raw: &str) -> BindResult<Self> {
        DateTime::parse_from_rfc3339(raw).map_err(|_| BindError::InvalidTimestamp {
            field: field.to_string(),
        })
    }
}

impl OptionalValue for DateTime<Utc> {
    const KIND: PrimitiveKind = PrimitiveKind::Instant;

    fn parse_present(field: &str, raw: &str) -> BindResult<Self> {
        DateTime::<FixedOffset>::parse_present(field, raw).map(|ts| ts.with_timezone(&Utc))
    }
}

/// Convert an optional raw value for an `Option<_>` field.
///
/// `Ok(None)` means the key was absent and the field must stay untouched.
pub fn convert_optional<V: OptionalValue>(field: &str, raw: Option<&str>) -> BindResult<Option<V>> {
    raw.map(|raw| V::parse_present(field, raw)).transpose()
}

/// Convert every value of a multi-valued entry, preserving order.
///
/// The first failing element aborts the conversion; no partial sequence
/// is returned.
pub fn convert_sequence<V: Scalar>(field: &str, raw: &[String]) -> BindResult<Vec<V>> {
    raw.iter().map(|value| V::parse(field, value)).collect()
}

impl Scalar for String {
    const KIND: PrimitiveKind = PrimitiveKind::String;

    fn parse(_field: &str, raw: &str) -> BindResult<Self> {
        Ok(raw.to_string())
    }
}

/// Tokens accepted as `true`, compared case-insensitively.
const TRUE_TOKENS: [&str; 4] = ["1", "true", "on", "enabled"];

/// Boolean conversion never fails: anything outside [`TRUE_TOKENS`] is `false`.
pub fn parse_bool(raw: &str) -> bool {
    TRUE_TOKENS
        .iter()
        .any(|token| raw.eq_ignore_ascii_case(token))
}

impl Scalar for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;

    fn parse(_field: &str, raw: &str) -> BindResult<Self> {
        Ok(parse_bool(raw))
    }
}

fn not_an_integer(field: &str) -> BindError {
    BindError::NotAnInteger {
        field: field.to_string(),
    }
}

fn not_a_positive_integer(field: &str) -> BindError {
    BindError::NotAPositiveInteger {
        field: field.to_string(),
    }
}

fn not_a_number(field: &str) -> BindError {
    BindError::NotANumber {
        field: field.to_string(),
    }
}

// Values are parsed at 64 bits and narrowed; out-of-range values fail
// like malformed ones.
macro_rules! signed_scalar {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            const KIND: PrimitiveKind = PrimitiveKind::Int;

            fn parse(field: &str, raw: &str) -> BindResult<Self> {
                let wide: i64 = raw.parse().map_err(|_| not_an_integer(field))?;
                <$ty>::try_from(wide).map_err(|_| not_an_integer(field))
            }
        }
    )*};
}

macro_rules! unsigned_scalar {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            const KIND: PrimitiveKind = PrimitiveKind::Uint;

            fn parse(field: &str, raw: &str) -> BindResult<Self> {
                let wide: u64 = raw.parse().map_err(|_| not_a_positive_integer(field))?;
                <$ty>::try_from(wide).map_err(|_| not_a_positive_integer(field))
            }
        }
    )*};
}

signed_scalar!(i8, i16, i32, i64, isize);
unsigned_scalar!(u8, u16, u32, u64, usize);

impl Scalar for f64 {
    const KIND: PrimitiveKind = PrimitiveKind::Float;

    fn parse(field: &str, raw: &str) -> BindResult<Self> {
        raw.parse().map_err(|_| not_a_number(field))
    }
}

impl Scalar for f32 {
    const KIND: PrimitiveKind = PrimitiveKind::Float;

    fn parse(field: &str, raw: &str) -> BindResult<Self> {
        f64::parse(field, raw).map(|wide| wide as f32)
    }
}
