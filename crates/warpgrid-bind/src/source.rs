//! Request bundle and source dispatch.
//!
//! A [`RequestBundle`] carries everything a record can be bound from:
//! single-valued maps for query, path and header parameters, multi-valued
//! maps for query and header parameters, and the raw body. Its serde shape
//! follows the API gateway proxy event, so a bundle can be decoded straight
//! from an event document with [`RequestBundle::from_event_json`].

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::annotation::SourceKind;
use crate::error::BindResult;

/// Everything the binder can read from an incoming request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBundle {
    #[serde(rename = "queryStringParameters", default, deserialize_with = "null_as_default")]
    pub query: HashMap<String, String>,

    #[serde(
        rename = "multiValueQueryStringParameters",
        default,
        deserialize_with = "null_as_default"
    )]
    pub multi_query: HashMap<String, Vec<String>>,

    #[serde(rename = "pathParameters", default, deserialize_with = "null_as_default")]
    pub path: HashMap<String, String>,

    #[serde(rename = "headers", default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,

    #[serde(rename = "multiValueHeaders", default, deserialize_with = "null_as_default")]
    pub multi_headers: HashMap<String, Vec<String>>,

    #[serde(
        rename = "body",
        default,
        serialize_with = "body_to_text",
        deserialize_with = "body_text"
    )]
    pub body: Bytes,

    /// Whether `body` is base64 encoded.
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Gateway events carry the body as a (possibly null) string.
fn body_text<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Bytes::from)
        .unwrap_or_default())
}

fn body_to_text<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(body))
}

impl RequestBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a bundle from an API gateway proxy event document.
    ///
    /// Event fields the binder does not use are ignored; `null` maps are
    /// treated as empty.
    pub fn from_event_json(event: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(event)
    }

    /// Encode the bundle as an API gateway proxy event document.
    ///
    /// The body is written as text; binary bodies should be stored base64
    /// encoded.
    pub fn to_event_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_multi_query<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.multi_query
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_path(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_multi_header<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.multi_headers
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Set a plain (not transport-encoded) body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.is_base64_encoded = false;
        self
    }

    /// Set a base64-encoded body.
    pub fn with_base64_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self.is_base64_encoded = true;
        self
    }

    /// Select the maps backing `kind`.
    pub fn sources(&self, kind: SourceKind) -> Sources<'_> {
        let (single, multi) = match kind {
            SourceKind::Query => (&self.query, Some(&self.multi_query)),
            SourceKind::Path => (&self.path, None),
            SourceKind::Header => (&self.headers, Some(&self.multi_headers)),
        };
        Sources {
            kind,
            single,
            multi,
            case_insensitive: false,
        }
    }
}

/// Dispatch an unvalidated source component to the bundle's maps.
///
/// Fails with `UnknownSourceKind` for anything outside query, path and header.
pub fn dispatch<'a>(bundle: &'a RequestBundle, field: &str, kind: &str) -> BindResult<Sources<'a>> {
    Ok(bundle.sources(SourceKind::parse(field, kind)?))
}

/// The single-valued map, and the multi-valued map where one exists,
/// for a single source kind.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    kind: SourceKind,
    single: &'a HashMap<String, String>,
    multi: Option<&'a HashMap<String, Vec<String>>>,
    case_insensitive: bool,
}

impl<'a> Sources<'a> {
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn single(&self) -> &'a HashMap<String, String> {
        self.single
    }

    pub fn multi(&self) -> Option<&'a HashMap<String, Vec<String>>> {
        self.multi
    }

    /// Fall back to ASCII case-insensitive key matching for header lookups.
    pub(crate) fn with_case_insensitive_headers(self, enabled: bool) -> Self {
        Self {
            case_insensitive: enabled && self.kind == SourceKind::Header,
            ..self
        }
    }

    /// Look up a single value. `None` means the key is absent.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        lookup(self.single, key, self.case_insensitive).map(String::as_str)
    }

    /// Look up every value for `key` in the multi-valued map.
    pub fn get_all(&self, key: &str) -> Option<&'a [String]> {
        self.multi
            .and_then(|multi| lookup(multi, key, self.case_insensitive))
            .map(Vec::as_slice)
    }
}

// The case-insensitive fallback picks the lexicographically smallest
// matching name so the result never depends on map iteration order.
fn lookup<'a, V>(map: &'a HashMap<String, V>, key: &str, case_insensitive: bool) -> Option<&'a V> {
    map.get(key).or_else(|| {
        if !case_insensitive {
            return None;
        }
        map.iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(key))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, value)| value)
    })
}
