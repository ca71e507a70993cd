//! Lowercase hex helpers for identities and commitments.

use crate::error::CryptoError;

pub fn encode(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

pub fn decode_32(hex: &str) -> Result<[u8; 32], CryptoError> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() != 64 {
        return Err(CryptoError::InvalidLength {
            expected: 32,
            actual: hex.len() / 2,
        });
    }

    let mut out = [0u8; 32];
    ::hex::decode_to_slice(hex, &mut out)
        .map_err(|e| CryptoError::InvalidHex(format!("{hex}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i * 7) as u8;
        }
        let encoded = encode(&bytes);
        assert_eq!(encoded.len(), 64);
        assert_eq!(decode_32(&encoded).unwrap(), bytes);
    }

    #[test]
    fn accepts_0x_prefix() {
        let encoded = format!("0x{}", encode(&[0xab; 32]));
        assert_eq!(decode_32(&encoded).unwrap(), [0xab; 32]);
    }

    #[test]
    fn rejects_wrong_length_and_bad_digits() {
        assert!(matches!(
            decode_32("abcd"),
            Err(CryptoError::InvalidLength { expected: 32, .. })
        ));
        let bad = "zz".repeat(32);
        assert!(matches!(decode_32(&bad), Err(CryptoError::InvalidHex(_))));
    }

    #[test]
    fn rejects_non_ascii_without_panicking() {
        let mut input = "é".to_string();
        input.push_str(&"a".repeat(62));
        assert_eq!(input.len(), 64);
        assert!(matches!(decode_32(&input), Err(CryptoError::InvalidHex(_))));
    }
}
