//! # Canonical Serialization: JCS-Compatible Byte Production
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes used in
//! digest computation.
//!
//! ## Invariant
//!
//! The inner field is private. The only constructor is
//! `CanonicalBytes::new()`, which rejects floats and then serializes with
//! RFC 8785 (JSON Canonicalization Scheme): sorted keys, compact separators,
//! deterministic byte sequence. Two equal values always yield equal bytes,
//! on every platform, which is what the pack determinism digest relies on.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// non-integer number, or `SerializationFailed` if serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Floats have edge cases in JCS number formatting; digested content uses
// integers, strings, booleans and nulls only.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    proptest! {
        #[test]
        fn canonical_bytes_are_insertion_order_independent(
            entries in proptest::collection::vec(("[a-z]{1,8}", any::<i64>()), 0..16)
        ) {
            let forward: BTreeMap<String, i64> = entries.iter().cloned().collect();
            let mut reversed_map = serde_json::Map::new();
            for (k, v) in entries.iter().rev() {
                if forward.get(k) == Some(v) {
                    reversed_map.insert(k.clone(), serde_json::json!(v));
                }
            }
            let a = CanonicalBytes::new(&forward).unwrap();
            let b = CanonicalBytes::new(&serde_json::Value::Object(reversed_map)).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
