//! WarpGrid request binding.
//!
//! Populates typed records from an incoming request. Each record declares a
//! [`Schema`] listing its fields and, per field, a binding annotation of the
//! form `<source>.<key>` where the source is `query`, `path` or `header`.
//! Binding looks the key up in the matching request map and converts the
//! raw text into the field's type:
//!
//! - `String`, signed and unsigned integers of every width, floats, `bool`
//! - `Option<_>` of any of those, or of an RFC 3339 `chrono::DateTime`
//! - `Vec<_>` of any scalar, fed from the multi-valued query/header maps
//!
//! Booleans accept `1`, `true`, `on` and `enabled` in any case; everything
//! else (including absence) is `false`.
//!
//! Optionally the JSON request body (possibly base64 encoded) is decoded
//! into the record first, and annotated fields are layered on top.
//!
//! Errors are fail-fast and classified as either a bad request (malformed
//! input, answer 400) or an internal error (a broken schema, answer 500).

pub mod annotation;
pub mod config;
pub mod convert;
mod error;
pub mod payload;
pub mod schema;
pub mod source;

pub use annotation::{Annotation, SourceKind};
pub use config::BindConfig;
pub use convert::{OptionalValue, PrimitiveKind, Scalar};
pub use error::{BindError, BindResult, ErrorClass};
pub use schema::{Bindable, FieldBinding, FieldShape, Schema, SchemaBuilder, bind, bind_with};
pub use source::{RequestBundle, Sources};
