//! Payment notification encoding

use serde::Serialize;
use std::collections::HashMap;

use crate::config::BlobEncoding;
use crate::error::{AdapterError, AdapterResult};
use shared::order::AnyBlob;

/// Encode every notification value independently into an [`AnyBlob`]
///
/// Under [`BlobEncoding::Lenient`] a value that fails to encode becomes an
/// empty blob and a warning is logged; under [`BlobEncoding::Strict`] the
/// first failure is returned.
pub fn encode_notification<I, K, V>(
    notification: I,
    encoding: BlobEncoding,
) -> AdapterResult<HashMap<String, AnyBlob>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Serialize,
{
    let mut blobs = HashMap::new();
    for (key, value) in notification {
        let key = key.into();
        let bytes = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes,
            Err(source) if encoding == BlobEncoding::Strict => {
                return Err(AdapterError::Encode { key, source });
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Notification value not encodable, sending empty blob");
                Vec::new()
            }
        };
        blobs.insert(key, AnyBlob::new(bytes));
    }
    Ok(blobs)
}
