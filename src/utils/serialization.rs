// bincode 2.x with the standard configuration, used for everything the store writes
use crate::error::{LedgerError, Result};

pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    bincode::encode_to_vec(data, bincode::config::standard())
        .map_err(|e| LedgerError::Serialization(format!("Encoding failed: {e}")))
}

pub fn deserialize<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T> {
    let (data, read) = bincode::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| LedgerError::Serialization(format!("Decoding failed: {e}")))?;
    if read != bytes.len() {
        return Err(LedgerError::Serialization(format!(
            "Trailing bytes after record: consumed {read} of {}",
            bytes.len()
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, bincode::Encode, bincode::Decode)]
    struct Balances {
        issued: u64,
        accounts: BTreeMap<String, u64>,
    }

    #[test]
    fn test_encode_decode_map_record() {
        let mut accounts = BTreeMap::new();
        accounts.insert("alice".to_string(), 10);
        accounts.insert("bob".to_string(), 5);
        let original = Balances {
            issued: 15,
            accounts,
        };

        let bytes = serialize(&original).expect("encoding should work");
        let decoded: Balances = deserialize(&bytes).expect("decoding should work");
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = serialize(&7u64).unwrap();
        bytes.push(0);
        let result: Result<u64> = deserialize(&bytes);
        assert!(matches!(result, Err(LedgerError::Serialization(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        let result: Result<Balances> = deserialize(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(result.is_err());
    }
}
