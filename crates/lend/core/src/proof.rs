//! Eligibility proofs and the verifier contract.
//!
//! A proof exposes a structured public input; the acceptance gateway checks
//! those fields against on-chain state and then asks a [`ProofVerifier`]
//! whether the proof itself holds under its fixed verification key.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use zklend_crypto::{Commitment, Identity, Keypair};

const PUBLIC_INPUT_DOMAIN: &str = "zklend-eligibility-public-input-v1";

/// Non-secret values an eligibility proof commits to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicInput {
    pub address: Identity,
    pub credential_commitment: Commitment,
    pub min_property_value: u64,
    pub min_income_monthly: u64,
}

impl PublicInput {
    /// Canonical digest of the public input; the message an attestation signs.
    pub fn digest(&self) -> Commitment {
        Commitment::builder(PUBLIC_INPUT_DOMAIN)
            .bytes(self.address.as_bytes())
            .commitment(&self.credential_commitment)
            .u64(self.min_property_value)
            .u64(self.min_income_monthly)
            .finish()
    }
}

/// Proof submitted with `accept_offer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProof {
    pub public_input: PublicInput,
    /// Opaque proof bytes interpreted by the verifier.
    pub proof: Vec<u8>,
}

impl CredentialProof {
    /// Produce an attestation-style proof: the attester signs the public
    /// input digest after checking the borrower's credential off-chain.
    pub fn attest(attester: &Keypair, public_input: PublicInput) -> Self {
        let proof = attester.sign(public_input.digest().as_bytes()).to_vec();
        Self {
            public_input,
            proof,
        }
    }
}

/// Verifier outcome when a proof does not hold.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifierError {
    #[error("malformed proof: {0}")]
    Malformed(String),

    #[error("{0}")]
    Rejected(String),
}

/// Pass/fail contract of the external proof system.
pub trait ProofVerifier {
    fn verify(&self, proof: &CredentialProof) -> Result<(), VerifierError>;
}

impl<V: ProofVerifier + ?Sized> ProofVerifier for Box<V> {
    fn verify(&self, proof: &CredentialProof) -> Result<(), VerifierError> {
        (**self).verify(proof)
    }
}

/// Verifier for attestation proofs: an Ed25519 signature over
/// [`PublicInput::digest`] by a single pre-registered verification key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttestationVerifier {
    verification_key: Identity,
}

impl AttestationVerifier {
    pub fn new(verification_key: Identity) -> Self {
        Self { verification_key }
    }

    pub fn verification_key(&self) -> Identity {
        self.verification_key
    }
}

impl ProofVerifier for AttestationVerifier {
    fn verify(&self, proof: &CredentialProof) -> Result<(), VerifierError> {
        if proof.proof.len() != 64 {
            return Err(VerifierError::Malformed(format!(
                "expected 64-byte attestation, got {} bytes",
                proof.proof.len()
            )));
        }

        let digest = proof.public_input.digest();
        self.verification_key
            .verify(digest.as_bytes(), &proof.proof)
            .map_err(|e| VerifierError::Rejected(e.to_string()))?;

        debug!(
            verification_key = %self.verification_key,
            address = %proof.public_input.address,
            "Attestation proof verified"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(seed: u8) -> PublicInput {
        PublicInput {
            address: Keypair::from_seed([seed; 32]).identity(),
            credential_commitment: Commitment::credential(&[0u8; 32], &[1, 2]),
            min_property_value: 50_000,
            min_income_monthly: 2_000,
        }
    }

    #[test]
    fn accepts_attestation_from_registered_key() {
        let attester = Keypair::from_seed([42u8; 32]);
        let verifier = AttestationVerifier::new(attester.identity());
        let proof = CredentialProof::attest(&attester, input(1));
        assert!(verifier.verify(&proof).is_ok());
    }

    #[test]
    fn rejects_attestation_from_other_key() {
        let attester = Keypair::from_seed([42u8; 32]);
        let impostor = Keypair::from_seed([43u8; 32]);
        let verifier = AttestationVerifier::new(attester.identity());
        let proof = CredentialProof::attest(&impostor, input(1));
        assert!(matches!(
            verifier.verify(&proof),
            Err(VerifierError::Rejected(_))
        ));
    }

    #[test]
    fn rejects_public_input_edited_after_signing() {
        let attester = Keypair::from_seed([42u8; 32]);
        let verifier = AttestationVerifier::new(attester.identity());
        let mut proof = CredentialProof::attest(&attester, input(1));
        proof.public_input.min_income_monthly = 1_000;
        assert!(verifier.verify(&proof).is_err());
    }

    #[test]
    fn rejects_truncated_proof_bytes() {
        let attester = Keypair::from_seed([42u8; 32]);
        let verifier = AttestationVerifier::new(attester.identity());
        let mut proof = CredentialProof::attest(&attester, input(1));
        proof.proof.truncate(10);
        assert!(matches!(
            verifier.verify(&proof),
            Err(VerifierError::Malformed(_))
        ));
    }

    #[test]
    fn digest_binds_every_field() {
        let base = input(1);
        let mut other = base.clone();
        other.address = Keypair::from_seed([2u8; 32]).identity();
        assert_ne!(base.digest(), other.digest());

        let mut other = base.clone();
        other.min_property_value += 1;
        assert_ne!(base.digest(), other.digest());
    }
}
