//! Binding annotations of the form `<source-kind>.<key>`.

use std::fmt;

use crate::error::{BindError, BindResult};

/// Where in the request a field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Query,
    Path,
    Header,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Query => "query",
            SourceKind::Path => "path",
            SourceKind::Header => "header",
        }
    }

    /// Resolve a source component, reporting `field` on failure.
    pub fn parse(field: &str, kind: &str) -> BindResult<Self> {
        match kind {
            "query" => Ok(SourceKind::Query),
            "path" => Ok(SourceKind::Path),
            "header" => Ok(SourceKind::Header),
            other => Err(BindError::UnknownSourceKind {
                field: field.to_string(),
                source_kind: other.to_string(),
            }),
        }
    }

    /// Whether the request carries a multi-valued map for this source.
    pub fn has_multi_values(self) -> bool {
        !matches!(self, SourceKind::Path)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split an annotation into its `(source-kind, key)` components.
///
/// Exactly one `.` is allowed and neither side may be empty. The source
/// component is returned unvalidated; see [`SourceKind::parse`].
pub fn split_annotation<'a>(field: &str, annotation: &'a str) -> BindResult<(&'a str, &'a str)> {
    let invalid = || BindError::InvalidAnnotation {
        field: field.to_string(),
        annotation: annotation.to_string(),
    };

    let (kind, key) = annotation.split_once('.').ok_or_else(invalid)?;
    if kind.is_empty() || key.is_empty() || key.contains('.') {
        return Err(invalid());
    }
    Ok((kind, key))
}

/// A parsed and validated binding annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub source: SourceKind,
    pub key: String,
}

impl Annotation {
    pub fn parse(field: &str, annotation: &str) -> BindResult<Self> {
        let (kind, key) = split_annotation(field, annotation)?;
        Ok(Self {
            source: SourceKind::parse(field, kind)?,
            key: key.to_string(),
        })
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_annotation() {
        let ann = Annotation::parse("page", "query.page").unwrap();
        assert_eq!(ann.source, SourceKind::Query);
        assert_eq!(ann.key, "page");
    }

    #[test]
    fn header_key_keeps_dashes_and_case() {
        let ann = Annotation::parse("flag", "header.X-Flag").unwrap();
        assert_eq!(ann.source, SourceKind::Header);
        assert_eq!(ann.key, "X-Flag");
    }

    #[test]
    fn missing_separator_is_invalid() {
        let err = Annotation::parse("id", "pathid").unwrap_err();
        assert!(matches!(err, BindError::InvalidAnnotation { .. }));
    }

    #[test]
    fn extra_separator_is_invalid() {
        let err = Annotation::parse("id", "path.id.extra").unwrap_err();
        assert!(matches!(err, BindError::InvalidAnnotation { .. }));
    }

    #[test]
    fn empty_components_are_invalid() {
        for text in [".id", "path.", "."] {
            let err = Annotation::parse("id", text).unwrap_err();
            assert!(
                matches!(err, BindError::InvalidAnnotation { .. }),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_source_kind() {
        let err = Annotation::parse("session", "cookie.session").unwrap_err();
        match err {
            BindError::UnknownSourceKind { field, source_kind } => {
                assert_eq!(field, "session");
                assert_eq!(source_kind, "cookie");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn path_has_no_multi_values() {
        assert!(SourceKind::Query.has_multi_values());
        assert!(SourceKind::Header.has_multi_values());
        assert!(!SourceKind::Path.has_multi_values());
    }

    #[test]
    fn display_roundtrips_text() {
        let ann = Annotation::parse("id", "path.id").unwrap();
        assert_eq!(ann.to_string(), "path.id");
    }
}
