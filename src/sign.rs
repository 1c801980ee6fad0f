// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! ### Ed25519 signature creation and verification.
//!
//! Collective signatures use this same format and verification
//! equation, so `PublicKey::verify` checks both.

use core::fmt::{Debug};

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroize;

use crate::errors::{SignatureError, SignatureResult};
use crate::keys::{Keypair, PublicKey, SecretKey};
use crate::scalars;


// === Actual signature type === //

/// The length of an Ed25519 `Signature`, in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// An Ed25519 signature "detached" from the signed message.
///
/// Byte for byte the RFC 8032 format, whether produced by one signer
/// or assembled from the partial signatures of a collective.
#[allow(non_snake_case)]
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Signature {
    /// `R` is an `EdwardsPoint` formed by multiplying the basepoint by
    /// the nonce `r`, or the sum of all cosigners' commitments.
    ///
    /// We keep it compressed because verification only compares
    /// encodings.
    pub(crate) R: CompressedEdwardsY,

    /// `s` is a `Scalar` formed as `r + c a`, where the challenge `c`
    /// hashes `R`, the public key, and the message.
    pub(crate) s: Scalar,
}

impl Debug for Signature {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "Signature( R: {:?}, s: {:?} )", &self.R, &self.s)
    }
}

impl Signature {
    const DESCRIPTION: &'static str = "A 64 byte Ed25519 signature, as specified in RFC 8032";

    /// Convert this `Signature` to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes: [u8; SIGNATURE_LENGTH] = [0u8; SIGNATURE_LENGTH];
        bytes[..32].copy_from_slice(&self.R.as_bytes()[..]);
        bytes[32..].copy_from_slice(&self.s.as_bytes()[..]);
        bytes
    }

    /// Construct a `Signature` from a slice of bytes.
    ///
    /// We reject any `s` not fully reduced mod l, which prevents the
    /// trivial malleability `s + l`.  We leave `R` compressed, so a bad
    /// `R` surfaces only as a failed verification.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<Signature> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name: "Signature",
                description: Signature::DESCRIPTION,
                length: SIGNATURE_LENGTH
            });
        }

        let mut lower: [u8; 32] = [0u8; 32];
        let mut upper: [u8; 32] = [0u8; 32];
        lower.copy_from_slice(&bytes[..32]);
        upper.copy_from_slice(&bytes[32..]);

        Ok(Signature { R: CompressedEdwardsY(lower), s: scalars::check_scalar(upper)? })
    }
}

serde_boilerplate!(Signature);


/// The Ed25519 challenge `c = H(R || A || M) mod l`.
///
/// Cosigners pass the aggregate commitment and aggregate public key.
#[allow(non_snake_case)]
pub(crate) fn challenge_scalar(R: &CompressedEdwardsY, A: &CompressedEdwardsY, message: &[u8]) -> Scalar {
    scalars::hash_to_scalar(&[R.as_bytes(), A.as_bytes(), message])
}


// === Implement signing and verification operations on key types === //

impl SecretKey {
    /// Sign a message with this `SecretKey`.
    ///
    /// Deterministic as in RFC 8032: the nonce `r = H(nonce || M)`
    /// depends only upon the key and the message, so signing twice
    /// yields identical signatures and never reuses `r` across messages.
    ///
    /// The caller supplies the `PublicKey` hashed into the challenge.
    /// A public key belonging to another secret key produces a signature
    /// that fails to verify.
    #[allow(non_snake_case)]
    pub fn sign(&self, message: &[u8], public_key: &PublicKey) -> Signature {
        let mut r = scalars::hash_to_scalar(&[&self.nonce, message]);
        let R = EdwardsPoint::mul_base(&r).compress();

        let c = challenge_scalar(&R, public_key.as_compressed(), message);
        let s = r + c * self.key;

        r.zeroize();

        Signature { R, s }
    }
}

impl PublicKey {
    /// Verify a signature by this public key on a message.
    ///
    /// Checks the cofactorless equation `[s]B = R + [c]A` by computing
    /// `[s]B - [c]A` and comparing its encoding with `R`.
    #[allow(non_snake_case)]
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let A: &EdwardsPoint = self.as_point();
        let c = challenge_scalar(&signature.R, self.as_compressed(), message);
        let R = EdwardsPoint::vartime_double_scalar_mul_basepoint(&c, &(-A), &signature.s);

        R.compress() == signature.R
    }
}

impl Keypair {
    /// Sign a message with this keypair's secret key.
    ///
    /// # Example
    ///
    /// ```
    /// use ed25519_cosi::{Keypair, Signature};
    ///
    /// let keypair: Keypair = Keypair::generate_with(rand::thread_rng());
    /// let message: &[u8] = b"All I want is to pet all of the dogs.";
    /// let signature: Signature = keypair.sign(message);
    /// assert!(keypair.verify(message, &signature));
    /// ```
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message, &self.public)
    }

    /// Verify a signature by this keypair's public key on a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.public.verify(message, signature)
    }
}
