//! CBOR encoding of stored entities.
//!
//! Entities are encoded with ciborium in field-declaration order, so the
//! same entity value always produces the same bytes. The entity kind is not
//! part of the body; stores keep it as a separate tag and decoding checks it.

use crate::address::EntityKind;
use crate::entity::StoredEntity;
use crate::error::CoreError;

/// Encode an entity body.
pub fn encode_entity<T: StoredEntity>(entity: &T) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(entity, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode an entity body stored under `kind`.
///
/// Fails with [`CoreError::KindMismatch`] if `kind` is not `T::KIND`.
pub fn decode_entity<T: StoredEntity>(kind: EntityKind, body: &[u8]) -> Result<T, CoreError> {
    if kind != T::KIND {
        return Err(CoreError::KindMismatch {
            expected: T::KIND,
            found: kind,
        });
    }
    ciborium::from_reader(body).map_err(|e| CoreError::DecodingError(e.to_string()))
}
