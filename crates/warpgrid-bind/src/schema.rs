//! Record schemas and the field/record binders.
//!
//! A [`Schema`] describes a destination record once: for every field, its
//! name, shape (scalar, optional or sequence), primitive kind, binding
//! annotation and an accessor into the record. Binding then walks the
//! fields in declaration order and stops at the first error.
//!
//! ```ignore
//! static SCHEMA: OnceLock<Schema<ListPosts>> = OnceLock::new();
//!
//! impl Bindable for ListPosts {
//!     fn schema() -> &'static Schema<Self> {
//!         SCHEMA.get_or_init(|| {
//!             Schema::builder()
//!                 .scalar("id", "path.id", |r: &mut Self| &mut r.id)
//!                 .scalar("page", "query.page", |r: &mut Self| &mut r.page)
//!                 .sequence("languages", "header.Accept-Language", |r: &mut Self| &mut r.languages)
//!                 .build()
//!         })
//!     }
//! }
//! ```

use std::any::{Any, type_name};
use std::fmt;

use serde::de::DeserializeOwned;

use crate::annotation::{Annotation, split_annotation};
use crate::config::BindConfig;
use crate::convert::{
    OptionalValue, PrimitiveKind, Scalar, convert_optional, convert_scalar, convert_sequence,
};
use crate::error::{BindError, BindResult};
use crate::payload::bind_payload;
use crate::source::{RequestBundle, dispatch};

/// How a field holds its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `V`, set to the zero value when the key is absent.
    Scalar,
    /// `Option<V>`, left untouched when the key is absent.
    Optional,
    /// `Vec<V>`, read from the multi-valued map and left untouched when absent.
    Sequence,
}

type ScalarSetter<T> = Box<dyn Fn(&mut T, &str, Option<&str>) -> BindResult<()> + Send + Sync>;
type SequenceSetter<T> = Box<dyn Fn(&mut T, &str, &[String]) -> BindResult<()> + Send + Sync>;

enum Setter<T> {
    Single(ScalarSetter<T>),
    Multi(SequenceSetter<T>),
}

/// One declared field of a destination record.
pub struct FieldBinding<T> {
    name: String,
    annotation: String,
    shape: FieldShape,
    kind: PrimitiveKind,
    setter: Setter<T>,
}

impl<T> FieldBinding<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw annotation; `None` for fields that are never bound.
    pub fn annotation(&self) -> Option<&str> {
        (!self.annotation.is_empty()).then_some(self.annotation.as_str())
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Parse the annotation and check it against the field's shape.
    pub fn validate(&self) -> BindResult<Option<Annotation>> {
        let Some(text) = self.annotation() else {
            return Ok(None);
        };
        let annotation = Annotation::parse(&self.name, text)?;
        if self.shape == FieldShape::Sequence && !annotation.source.has_multi_values() {
            return Err(self.no_multi_values(annotation.source.as_str()));
        }
        Ok(Some(annotation))
    }

    fn no_multi_values(&self, source_kind: &str) -> BindError {
        BindError::UnknownSourceKind {
            field: self.name.clone(),
            source_kind: source_kind.to_string(),
        }
    }

    /// Bind this field from `bundle`. Unannotated fields are skipped.
    pub fn bind(&self, bundle: &RequestBundle, config: &BindConfig, record: &mut T) -> BindResult<()> {
        let Some(text) = self.annotation() else {
            return Ok(());
        };
        let (kind, key) = split_annotation(&self.name, text)?;
        let sources =
            dispatch(bundle, &self.name, kind)?.with_case_insensitive_headers(config.case_insensitive_headers);

        match &self.setter {
            Setter::Single(set) => set(record, key, sources.get(key))?,
            Setter::Multi(set) => {
                if !sources.kind().has_multi_values() {
                    return Err(self.no_multi_values(kind));
                }
                if let Some(values) = sources.get_all(key) {
                    set(record, key, values)?;
                }
            }
        }

        tracing::debug!(field = %self.name, source = kind, key, "bound field");
        Ok(())
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("annotation", &self.annotation)
            .field("shape", &self.shape)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The binding descriptor for a destination record type `T`.
pub struct Schema<T> {
    fields: Vec<FieldBinding<T>>,
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("record", &type_name::<T>())
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[FieldBinding<T>] {
        &self.fields
    }

    /// Check every annotation up front, returning the first configuration error.
    ///
    /// Binding performs the same checks lazily, so calling this is optional;
    /// it lets a schema mistake surface at startup instead of on first request.
    pub fn validate(&self) -> BindResult<()> {
        for field in &self.fields {
            field.validate()?;
        }
        Ok(())
    }

    /// Bind annotated fields only, with the default configuration.
    pub fn bind_fields(&self, bundle: &RequestBundle, record: &mut T) -> BindResult<()> {
        self.bind_fields_with(&BindConfig::default(), bundle, record)
    }

    /// Bind annotated fields in declaration order, stopping at the first error.
    ///
    /// Fields bound before a failure are not rolled back.
    pub fn bind_fields_with(
        &self,
        config: &BindConfig,
        bundle: &RequestBundle,
        record: &mut T,
    ) -> BindResult<()> {
        for field in &self.fields {
            field.bind(bundle, config, record)?;
        }
        Ok(())
    }
}

impl<T: DeserializeOwned> Schema<T> {
    /// Bind the body (when `include_body`) and then the annotated fields.
    ///
    /// Requires `T: DeserializeOwned` even when `include_body` is false;
    /// records that never take a body can use [`Schema::bind_fields`]
    /// without deriving `Deserialize`.
    pub fn bind(&self, bundle: &RequestBundle, include_body: bool, record: &mut T) -> BindResult<()> {
        self.bind_with(&BindConfig::default(), bundle, include_body, record)
    }

    pub fn bind_with(
        &self,
        config: &BindConfig,
        bundle: &RequestBundle,
        include_body: bool,
        record: &mut T,
    ) -> BindResult<()> {
        if include_body {
            bind_payload(bundle, config, record)?;
        }
        self.bind_fields_with(config, bundle, record)
    }
}

impl<T: DeserializeOwned + 'static> Schema<T> {
    /// Bind into a type-erased destination, failing with `InvalidTarget`
    /// unless it is a `T`.
    pub fn bind_any(
        &self,
        bundle: &RequestBundle,
        include_body: bool,
        target: &mut dyn Any,
    ) -> BindResult<()> {
        let record = target
            .downcast_mut::<T>()
            .ok_or(BindError::InvalidTarget {
                expected: type_name::<T>(),
            })?;
        self.bind(bundle, include_body, record)
    }
}

/// Collects field declarations for a [`Schema`].
///
/// An empty annotation declares a field that is never bound.
pub struct SchemaBuilder<T> {
    fields: Vec<FieldBinding<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    fn push(
        mut self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        shape: FieldShape,
        kind: PrimitiveKind,
        setter: Setter<T>,
    ) -> Self {
        self.fields.push(FieldBinding {
            name: name.into(),
            annotation: annotation.into(),
            shape,
            kind,
            setter,
        });
        self
    }

    /// Declare a plain primitive field.
    pub fn scalar<V>(
        self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        accessor: fn(&mut T) -> &mut V,
    ) -> Self
    where
        V: Scalar + 'static,
    {
        let setter: ScalarSetter<T> = Box::new(move |record: &mut T, key: &str, raw: Option<&str>| {
            *accessor(record) = convert_scalar(key, raw)?;
            Ok(())
        });
        self.push(
            name,
            annotation,
            FieldShape::Scalar,
            <V as Scalar>::KIND,
            Setter::Single(setter),
        )
    }

    /// Declare an `Option<V>` field.
    pub fn optional<V>(
        self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        accessor: fn(&mut T) -> &mut Option<V>,
    ) -> Self
    where
        V: OptionalValue + 'static,
    {
        let setter: ScalarSetter<T> = Box::new(move |record: &mut T, key: &str, raw: Option<&str>| {
            if let Some(value) = convert_optional(key, raw)? {
                *accessor(record) = Some(value);
            }
            Ok(())
        });
        self.push(
            name,
            annotation,
            FieldShape::Optional,
            V::KIND,
            Setter::Single(setter),
        )
    }

    /// Declare a `Vec<V>` field fed from a multi-valued source.
    pub fn sequence<V>(
        self,
        name: impl Into<String>,
        annotation: impl Into<String>,
        accessor: fn(&mut T) -> &mut Vec<V>,
    ) -> Self
    where
        V: Scalar + 'static,
    {
        let setter: SequenceSetter<T> = Box::new(move |record: &mut T, key: &str, raw: &[String]| {
            *accessor(record) = convert_sequence(key, raw)?;
            Ok(())
        });
        self.push(
            name,
            annotation,
            FieldShape::Sequence,
            <V as Scalar>::KIND,
            Setter::Multi(setter),
        )
    }

    pub fn build(self) -> Schema<T> {
        Schema {
            fields: self.fields,
        }
    }
}

/// A destination record with a cached schema.
pub trait Bindable: Sized + 'static {
    fn schema() -> &'static Schema<Self>;
}

/// Populate `record` from `bundle`: the body first when `include_body`,
/// then every annotated field.
///
/// For records without a JSON body shape, call
/// `T::schema().bind_fields(bundle, record)` instead; it has no
/// `Deserialize` bound.
pub fn bind<T>(bundle: &RequestBundle, include_body: bool, record: &mut T) -> BindResult<()>
where
    T: Bindable + DeserializeOwned,
{
    T::schema().bind(bundle, include_body, record)
}

/// Like [`bind`] with an explicit configuration.
pub fn bind_with<T>(
    config: &BindConfig,
    bundle: &RequestBundle,
    include_body: bool,
    record: &mut T,
) -> BindResult<()>
where
    T: Bindable + DeserializeOwned,
{
    T::schema().bind_with(config, bundle, include_body, record)
}
