//! Conversion between `RecipeAttributes` and the stored column payload.

use crate::error::CodecError;
use recipe_rs_protocol::RecipeAttributes;
use rusqlite::types::ValueRef;

/// Encodes attributes as compact JSON bytes and decodes them back.
///
/// Absent fields are omitted, so attributes with no fields encode to `{}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeCodec;

impl AttributeCodec {
    /// Serialize attributes into the payload bound to the `attributes` column.
    pub fn encode(attributes: &RecipeAttributes) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(attributes).map_err(CodecError::Encode)
    }

    /// Parse a payload previously produced by [`AttributeCodec::encode`].
    pub fn decode_bytes(bytes: &[u8]) -> Result<RecipeAttributes, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Malformed)
    }

    /// Decode a scanned column value.
    ///
    /// BLOB and TEXT values are byte sequences and are parsed as JSON. Any
    /// other storage class is a storage contract violation and is reported as
    /// [`CodecError::UnexpectedType`] rather than a malformed payload.
    pub fn decode_column(value: ValueRef<'_>) -> Result<RecipeAttributes, CodecError> {
        match value {
            ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Self::decode_bytes(bytes),
            other => Err(CodecError::UnexpectedType {
                found: other.data_type(),
            }),
        }
    }
}
