use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hex;

const KEYLESS_CONTEXT: &str = "zklend 2024 keyless account point v1";

/// Identity — an authenticated principal (lender, borrower, admin, pool).
///
/// The identity IS the Ed25519 public key. It is `Copy`, totally ordered (so it
/// can key deterministic maps) and serialises as a lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Identity([u8; 32]);

impl Identity {
    /// Build an identity from raw public key bytes, rejecting points that are
    /// not valid Ed25519 keys.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(hex::decode_32(hex)?)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Short display form (first 8 bytes hex).
    pub fn short_id(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Verify an Ed25519 signature made by this identity's key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let signature =
            Signature::from_slice(signature).map_err(|_| CryptoError::MalformedSignature)?;
        key.verify(message, &signature)
            .map_err(|_| CryptoError::SignatureMismatch(self.short_id()))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id:{}", self.short_id())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short_id())
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_hex()
    }
}

impl TryFrom<String> for Identity {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

/// Signing key that supports an identity.
///
/// The secret scalar is wiped when the keypair is dropped.
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            signing: SigningKey::generate(rng),
        }
    }

    /// Deterministic keypair from a 32-byte seed. Intended for tests and
    /// reproducible fixtures.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let seed = Zeroizing::new(seed);
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::from_verifying_key(&self.signing.verifying_key())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

/// Generate an account identity with no retained signing capability.
///
/// The private key lives only for the duration of this call and is zeroized
/// on drop; only the public identity escapes.
pub fn keyless_identity<R: RngCore + CryptoRng>(rng: &mut R) -> Identity {
    let keypair = Keypair::generate_with(rng);
    keypair.identity()
}

/// Deterministic keyless identity for a 32-byte seed.
///
/// The seed is hashed (with a counter) until the digest decodes as a valid,
/// non-weak Ed25519 point. That point is the identity. It is never derived
/// from a scalar, so no signing key exists for it, and the seed is only a
/// public label: knowing it does not let anyone sign for the account.
pub fn keyless_identity_from_seed(seed: &[u8; 32]) -> Identity {
    let mut counter: u32 = 0;
    loop {
        let mut hasher = blake3::Hasher::new_derive_key(KEYLESS_CONTEXT);
        hasher.update(seed);
        hasher.update(&counter.to_le_bytes());
        let candidate = *hasher.finalize().as_bytes();

        if let Ok(key) = VerifyingKey::from_bytes(&candidate) {
            if !key.is_weak() {
                return Identity::from_verifying_key(&key);
            }
        }
        counter = counter.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seeded_keypair_is_deterministic() {
        let a = Keypair::from_seed([7u8; 32]);
        let b = Keypair::from_seed([7u8; 32]);
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), Keypair::from_seed([8u8; 32]).identity());
    }

    #[test]
    fn signature_verifies_only_for_signer() {
        let alice = Keypair::from_seed([1u8; 32]);
        let bob = Keypair::from_seed([2u8; 32]);
        let sig = alice.sign(b"transfer 100");

        assert!(alice.identity().verify(b"transfer 100", &sig).is_ok());
        assert!(matches!(
            alice.identity().verify(b"transfer 101", &sig),
            Err(CryptoError::SignatureMismatch(_))
        ));
        assert!(bob.identity().verify(b"transfer 100", &sig).is_err());
        assert_eq!(
            alice.identity().verify(b"transfer 100", &sig[..10]),
            Err(CryptoError::MalformedSignature)
        );
    }

    #[test]
    fn seeded_keyless_identity_is_stable_and_unsignable() {
        let seed = [3u8; 32];
        let keyless = keyless_identity_from_seed(&seed);
        assert_eq!(keyless, keyless_identity_from_seed(&seed));
        assert_ne!(keyless, keyless_identity_from_seed(&[4u8; 32]));

        // Neither the seed nor its KDF output is a signing key for the point.
        let derived = blake3::derive_key(KEYLESS_CONTEXT, &seed);
        for candidate in [Keypair::from_seed(seed), Keypair::from_seed(derived)] {
            assert_ne!(candidate.identity(), keyless);
            let sig = candidate.sign(b"drain pool");
            assert!(keyless.verify(b"drain pool", &sig).is_err());
        }
    }

    #[test]
    fn random_keyless_identities_are_distinct() {
        let a = keyless_identity(&mut OsRng);
        let b = keyless_identity(&mut OsRng);
        assert_ne!(a, b);
    }

    #[test]
    fn serde_uses_hex_string() {
        let id = Keypair::from_seed([9u8; 32]).identity();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn debug_never_prints_secret() {
        let keypair = Keypair::from_seed([0x5a; 32]);
        let debug = format!("{:?}", keypair);
        assert!(debug.contains("identity"));
        assert!(!debug.contains(&"5a".repeat(8)));
    }

    #[test]
    fn display_uses_short_id() {
        let id = Keypair::from_seed([4u8; 32]).identity();
        assert_eq!(format!("{}", id), format!("id:{}", id.short_id()));
    }

    proptest! {
        #[test]
        fn hex_roundtrip_preserves_identity(seed in any::<[u8; 32]>()) {
            let id = Keypair::from_seed(seed).identity();
            prop_assert_eq!(Identity::from_hex(&id.to_hex()).unwrap(), id);
        }
    }
}
