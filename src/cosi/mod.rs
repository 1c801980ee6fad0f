// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! ### n-of-n collective Ed25519 signatures with delinearized keys
//!
//! All `n` cosigners in a `KeySet` jointly produce one signature, which
//! verifies like any Ed25519 signature against the aggregate public key
//! `P_agg = sum h_i P_i`, with weights `h_i = H(C || P_i)` bound to the
//! key set hash `C`.
//!
//! A session runs in lock step over some transport we leave to callers:
//!
//! 1. All cosigners build the same `KeySet`, and should compare its
//!    `KeySetHash` before going further.
//! 2. Each cosigner creates a fresh `CommitmentPair` and sends its
//!    `Commitment` `R_i` to the others, who sum them into `R_agg`.
//! 3. Each cosigner computes the challenge `c = H(R_agg || P_agg || M)`
//!    and sends its `PartialSignature` `s_i = r_i + c h_i a_i`.
//! 4. Anyone sums the `s_i` into `S`, giving the signature `R_agg || S`.
//!
//! The functions here perform each step statelessly, while `CoSig`
//! tracks a session and enforces the order of its stages.
//!
//! We never reuse a commitment, as two partial signatures on different
//! messages under the same `r_i` reveal the cosigner's secret key.

use core::fmt::{Debug};

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;

use crate::errors::{SignatureError, SignatureResult};
use crate::keys::{Keypair, PublicKey};
use crate::scalars;
use crate::sign::{challenge_scalar, Signature};

mod keyset;
mod commitment;
mod session;

pub use self::keyset::*;
pub use self::commitment::*;
pub use self::session::*;



/// The length of a `PartialSignature`, in bytes.
pub const PARTIAL_SIGNATURE_LENGTH: usize = 32;

/// One cosigner's contribution `s_i = r_i + c s'_i` to a collective signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PartialSignature(pub(crate) Scalar);

impl Debug for PartialSignature {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "PartialSignature( {:?} )", &self.0)
    }
}

impl PartialSignature {
    const DESCRIPTION: &'static str = "A 32 byte scalar contributed to a collective Ed25519 signature";

    /// Convert this partial signature to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; PARTIAL_SIGNATURE_LENGTH] {
        self.0.to_bytes()
    }

    /// Construct a `PartialSignature` from a slice of bytes, rejecting
    /// scalars not reduced mod l.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<PartialSignature> {
        if bytes.len() != PARTIAL_SIGNATURE_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name: "PartialSignature",
                description: PartialSignature::DESCRIPTION,
                length: PARTIAL_SIGNATURE_LENGTH
            });
        }
        let mut bits = [0u8; 32];
        bits.copy_from_slice(bytes);
        Ok(PartialSignature(scalars::check_scalar(bits)?))
    }
}

serde_boilerplate!(PartialSignature);


/// Sum partial signatures into the signature scalar `S = sum s_i`.
pub fn aggregate_partial_signatures<'a, I>(partial_signatures: I) -> Scalar
where I: IntoIterator<Item = &'a PartialSignature>
{
    partial_signatures.into_iter().map(|partial| partial.0).sum()
}

/// Compute our partial signature `s_i = r_i + c s'_i` on `message`.
///
/// Consumes our `secret_commitment` so it cannot sign again.  Fails with
/// `UnknownCosigner` if `keypair` lies outside `key_set`.
pub fn partial_sign(
    message: &[u8],
    aggregate_commitment: &Commitment,
    secret_commitment: SecretCommitment,
    key_set: &KeySet,
    keypair: &Keypair,
) -> SignatureResult<PartialSignature>
{
    let delinearized = key_set.delinearize_secret_key(keypair)?;
    let c = challenge_scalar(
        aggregate_commitment.as_compressed(),
        key_set.aggregate_public_key().as_compressed(),
        message,
    );
    Ok(partial_sign_with_challenge(&c, secret_commitment, &delinearized))
}

/// `s_i = r_i + c s'_i` for an already computed challenge `c`.
pub(crate) fn partial_sign_with_challenge(
    c: &Scalar,
    secret_commitment: SecretCommitment,
    delinearized: &DelinearizedSecret,
) -> PartialSignature
{
    PartialSignature(secret_commitment.0 + c * delinearized.0)
}

/// Check one cosigner's partial signature, `[s_i]B = R_i + [c]P'_i`.
///
/// Fails with `UnknownCosigner` if `public_key` lies outside `key_set`,
/// and with `InvalidPartialSignature` if the equation does not hold.
pub fn verify_partial_signature(
    message: &[u8],
    aggregate_commitment: &Commitment,
    commitment: &Commitment,
    key_set: &KeySet,
    public_key: &PublicKey,
    partial_signature: &PartialSignature,
) -> SignatureResult<()>
{
    let delinearized = key_set.position(public_key)
        .and_then(|index| key_set.delinearized_public_key(index))
        .ok_or(SignatureError::UnknownCosigner)?;
    let c = challenge_scalar(
        aggregate_commitment.as_compressed(),
        key_set.aggregate_public_key().as_compressed(),
        message,
    );
    if check_partial_signature(&c, commitment, delinearized, partial_signature) {
        Ok(())
    } else {
        Err(SignatureError::InvalidPartialSignature)
    }
}

#[allow(non_snake_case)]
pub(crate) fn check_partial_signature(
    c: &Scalar,
    R: &Commitment,
    delinearized: &PublicKey,
    partial_signature: &PartialSignature,
) -> bool
{
    let A: &EdwardsPoint = delinearized.as_point();
    let R_check = EdwardsPoint::vartime_double_scalar_mul_basepoint(c, &(-A), &partial_signature.0);
    R_check == *R.as_point()
}

impl Signature {
    /// Assemble the collective signature `R_agg || sum s_i`.
    ///
    /// We do not check the partial signatures here, so invalid ones
    /// yield a signature that fails verification.
    pub fn from_partial_signatures<'a, I>(aggregate_commitment: &Commitment, partial_signatures: I) -> Signature
    where I: IntoIterator<Item = &'a PartialSignature>
    {
        Signature {
            R: *aggregate_commitment.as_compressed(),
            s: aggregate_partial_signatures(partial_signatures),
        }
    }
}
