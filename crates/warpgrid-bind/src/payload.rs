//! Whole-record body binding.
//!
//! The body is decoded as a single JSON document straight into the
//! destination type. This is independent of field annotations and runs
//! before them, so annotated query/path/header values land on top of
//! whatever the body supplied.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;

use crate::config::BindConfig;
use crate::error::{BindError, BindResult};
use crate::source::RequestBundle;

/// Undo transport encoding, if any.
pub fn decode_payload(body: &[u8], base64_encoded: bool) -> BindResult<Cow<'_, [u8]>> {
    if base64_encoded {
        Ok(Cow::Owned(STANDARD.decode(body)?))
    } else {
        Ok(Cow::Borrowed(body))
    }
}

/// Replace `record` with the request body decoded as JSON.
///
/// Fields missing from the document must be covered by the type's serde
/// defaults; otherwise the body is rejected as malformed.
pub fn bind_payload<T: DeserializeOwned>(
    bundle: &RequestBundle,
    config: &BindConfig,
    record: &mut T,
) -> BindResult<()> {
    if let Some(limit) = config.max_payload_bytes {
        if bundle.body.len() > limit {
            return Err(BindError::PayloadTooLarge {
                size: bundle.body.len(),
                limit,
            });
        }
    }

    tracing::debug!(
        size = bundle.body.len(),
        base64 = bundle.is_base64_encoded,
        "binding request body"
    );

    let body = decode_payload(&bundle.body, bundle.is_base64_encoded)?;
    *record = serde_json::from_slice(&body)?;
    Ok(())
}
