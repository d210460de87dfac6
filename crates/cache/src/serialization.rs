//! JSON encoding of cached values

use cachext_core::{Error, Result, SerializationOp};
use serde::{de::DeserializeOwned, Serialize};

/// Encode a value for storage under `key`
pub fn encode<T>(key: &str, value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    serde_json::to_vec(value).map_err(|e| Error::serialization(key, SerializationOp::Encode, e))
}

/// Decode a value stored under `key`
pub fn decode<T>(key: &str, bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|e| Error::serialization(key, SerializationOp::Decode, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachext_core::ErrorKind;

    #[test]
    fn test_decode_reports_key() {
        let bytes = encode("list", &vec!["a", "b"]).unwrap();
        let err = decode::<u64>("list", &bytes).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert_eq!(err.key(), Some("list"));
        assert!(err.to_string().starts_with("failed to decode cache entry 'list'"));
    }
}
