//! # zklend-crypto
//!
//! Cryptographic primitives shared by the lending core:
//!
//! - **Identity** — an opaque principal derived from an Ed25519 public key.
//!   Authorization is always identity equality, never string comparison.
//! - **Keypair** — a signing key that supports an identity. Dropping it wipes
//!   the secret scalar.
//! - **Keyless identities** — accounts (such as the escrow pool) whose private
//!   key is generated and immediately discarded, or that are hashed straight
//!   onto the curve from a public seed so no private key ever exists.
//! - **Commitment** — a 32-byte BLAKE3 digest used as the on-chain credential
//!   commitment and as a general domain-separated hash.

#![deny(unsafe_code)]

mod commitment;
mod error;
pub mod hex;
mod identity;

pub use commitment::{Commitment, CommitmentBuilder};
pub use error::CryptoError;
pub use identity::{keyless_identity, keyless_identity_from_seed, Identity, Keypair};
