// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! Scalar tooling
//!
//! Hashing into scalars, and the checks we apply to scalars arriving
//! from the wire or from randomness, none of which curve25519-dalek
//! provides directly.

use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

use crate::errors::{SignatureError, SignatureResult};


/// Length of the SHA-512 output used for nonces, challenges, and key set hashes.
pub(crate) const HASH_LENGTH: usize = 64;

/// SHA-512 of the concatenation of `parts`.
pub(crate) fn sha512(parts: &[&[u8]]) -> [u8; HASH_LENGTH] {
    let mut h = Sha512::new();
    for part in parts {
        h.update(part);
    }
    let mut out = [0u8; HASH_LENGTH];
    out.copy_from_slice(h.finalize().as_slice());
    out
}

/// SHA-512 of the concatenation of `parts`, reduced mod l.
///
/// Ed25519 derives both its nonce `r = H(k || M)` and its challenge
/// `c = H(R || A || M)` this way, as do our delinearization weights.
pub(crate) fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    let mut h = Sha512::new();
    for part in parts {
        h.update(part);
    }
    Scalar::from_hash(h)
}

/// Parse a scalar, requiring the canonical encoding below l.
pub(crate) fn check_scalar(bytes: [u8; 32]) -> SignatureResult<Scalar> {
    Option::from(Scalar::from_canonical_bytes(bytes))
        .ok_or(SignatureError::ScalarFormatError)
}

/// Returns true for scalars congruent to 0 or 1 mod l, whose multiples
/// of the basepoint are the identity or the basepoint itself.
pub(crate) fn is_degenerate(r: &Scalar) -> bool {
    (r.ct_eq(&Scalar::ZERO) | r.ct_eq(&Scalar::ONE)).into()
}
