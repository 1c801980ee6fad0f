// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! ### Commitments `R_i = r_i B` to cosigners' single use nonces.

use core::fmt::{Debug};

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{SignatureError, SignatureResult};
use crate::points::EdwardsBoth;
use crate::scalars;


/// The length of the randomness from which we derive a commitment, in bytes.
pub const RANDOMNESS_LENGTH: usize = 32;

/// The length of a `Commitment`, in bytes.
pub const COMMITMENT_LENGTH: usize = 32;

/// A cosigner's public commitment `R_i`, or the aggregate `R_agg`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Commitment(pub(crate) EdwardsBoth);

impl Debug for Commitment {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "Commitment( {:?} )", self.0.as_compressed())
    }
}

impl Commitment {
    const DESCRIPTION: &'static str = "A 32 byte compressed Edwards point committing to a cosigner's nonce";

    /// Access the compressed Edwards form
    pub fn as_compressed(&self) -> &CompressedEdwardsY { self.0.as_compressed() }

    /// Access the point form
    pub fn as_point(&self) -> &EdwardsPoint { self.0.as_point() }

    /// Compress a point into a `Commitment`.
    pub fn from_point(point: EdwardsPoint) -> Commitment {
        Commitment(EdwardsBoth::from_point(point))
    }

    /// Convert this commitment to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; COMMITMENT_LENGTH] {
        self.0.to_bytes()
    }

    /// Construct a `Commitment` from a slice of bytes, failing with
    /// `PointDecompressionError` if they do not encode a curve point.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<Commitment> {
        Ok(Commitment(EdwardsBoth::from_bytes_ser("Commitment", Commitment::DESCRIPTION, bytes)?))
    }
}

serde_boilerplate!(Commitment);


/// A cosigner's secret nonce `r_i`.
///
/// Neither `Clone` nor `Copy`, and consumed by partial signing, so each
/// commitment signs at most one message.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretCommitment(pub(crate) Scalar);

impl Debug for SecretCommitment {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "SecretCommitment( .. )")
    }
}


/// A secret nonce `r_i` together with its commitment `R_i`.
#[derive(Debug)]
pub struct CommitmentPair {
    secret: SecretCommitment,
    commitment: Commitment,
}

impl CommitmentPair {
    /// Derive a commitment from 32 bytes of fresh randomness.
    ///
    /// We reduce `H(randomness)` mod l to obtain `r_i`, failing with
    /// `DegenerateCommitment` if `r_i` is 0 or 1, in which case the
    /// caller should supply new randomness.
    ///
    /// Never reuse randomness across two messages, as two partial
    /// signatures with the same nonce reveal the secret key.
    pub fn from_randomness(randomness: &[u8; RANDOMNESS_LENGTH]) -> SignatureResult<CommitmentPair> {
        CommitmentPair::from_secret_scalar(scalars::hash_to_scalar(&[randomness]))
    }

    pub(crate) fn from_secret_scalar(mut r: Scalar) -> SignatureResult<CommitmentPair> {
        if scalars::is_degenerate(&r) {
            r.zeroize();
            return Err(SignatureError::DegenerateCommitment);
        }
        let commitment = Commitment::from_point(EdwardsPoint::mul_base(&r));
        Ok(CommitmentPair { secret: SecretCommitment(r), commitment })
    }

    /// Generate a commitment from a `csprng`, drawing fresh randomness
    /// until it is not degenerate.
    pub fn generate_with<R>(mut csprng: R) -> CommitmentPair
    where R: CryptoRng + RngCore,
    {
        loop {
            let mut randomness = [0u8; RANDOMNESS_LENGTH];
            csprng.fill_bytes(&mut randomness);
            let pair = CommitmentPair::from_randomness(&randomness);
            randomness.zeroize();
            match pair {
                Ok(pair) => return pair,
                Err(_) => tracing::debug!("degenerate commitment, retrying with fresh randomness"),
            }
        }
    }

    /// Generate a commitment from the operating system's randomness.
    #[cfg(feature = "getrandom")]
    pub fn generate() -> CommitmentPair {
        CommitmentPair::generate_with(crate::getrandom_or_panic())
    }

    /// Our public commitment `R_i` to send to all other cosigners.
    pub fn commitment(&self) -> &Commitment { &self.commitment }

    /// Split into the secret nonce, for partial signing, and its commitment.
    pub fn into_parts(self) -> (SecretCommitment, Commitment) {
        (self.secret, self.commitment)
    }
}


/// The aggregate commitment `R_agg = sum R_i`.
///
/// Any ordering of `commitments` gives the same result.  No commitments
/// yield the identity point, which sessions never ask for, as a key set
/// always has a cosigner.
pub fn aggregate_commitments<'a, I>(commitments: I) -> Commitment
where I: IntoIterator<Item = &'a Commitment>
{
    Commitment::from_point(commitments.into_iter().map(|commitment| commitment.as_point()).sum())
}


#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rand_chacha::ChaChaRng;
    use rand_chacha::rand_core::SeedableRng;

    // l, little endian
    const L_BYTES: [u8; 32] = hex!("edd3f55c1a631258d69cf7a2def9de1400000000000000000000000000000010");

    #[test]
    fn aggregation_matches_known_sum() {
        let c1 = Commitment::from_bytes(&hex!("2b7f01b07c6339ed3a720016e74d340a3750a4dbbacd0233b33bda79a1f28a3f")).unwrap();
        let c2 = Commitment::from_bytes(&hex!("388aa8cdaa5b9b212bd007403c3768eb4acaf872fbff88e31fb9769a8a8e3b05")).unwrap();
        let c3 = hex!("864764b078fa6af5c706e4ef1347d398e3f62e615a0e5bfdf47327304160b71c");
        assert_eq!(aggregate_commitments(&[c1, c2]).to_bytes(), c3);
        assert_eq!(aggregate_commitments(&[c2, c1]).to_bytes(), c3);
        assert_eq!(aggregate_commitments(&[c1]), c1);
        assert_eq!(aggregate_commitments(core::iter::empty()), Commitment::from_point(EdwardsPoint::default()));
    }

    #[test]
    fn commitment_from_randomness() {
        let pair = CommitmentPair::from_randomness(&[0x11; 32]).unwrap();
        assert_eq!(
            pair.commitment().to_bytes(),
            hex!("294095c37d35ee52546aee4f0ba4447fe89d123d0949bf609ff3540d1271e456")
        );
        let again = CommitmentPair::from_randomness(&[0x11; 32]).unwrap();
        assert_eq!(pair.commitment(), again.commitment());

        let (secret, commitment) = pair.into_parts();
        assert_eq!(EdwardsPoint::mul_base(&secret.0), *commitment.as_point());
    }

    #[test]
    fn degenerate_commitments_are_rejected() {
        let mut l_plus_one = L_BYTES;
        l_plus_one[0] += 1;
        let degenerate = [
            Scalar::ZERO,
            Scalar::ONE,
            Scalar::from_bytes_mod_order(L_BYTES),
            Scalar::from_bytes_mod_order(l_plus_one),
        ];
        for r in degenerate.iter() {
            assert_eq!(
                CommitmentPair::from_secret_scalar(*r).map(|pair| *pair.commitment()),
                Err(SignatureError::DegenerateCommitment)
            );
        }

        let mut l_plus_two = L_BYTES;
        l_plus_two[0] += 2;
        for r in [Scalar::from(2u8), Scalar::from_bytes_mod_order(l_plus_two), -Scalar::ONE].iter() {
            assert!(CommitmentPair::from_secret_scalar(*r).is_ok());
        }
    }

    #[test]
    fn generated_commitments_are_fresh() {
        let mut csprng = ChaChaRng::from_seed([3u8; 32]);
        let a = CommitmentPair::generate_with(&mut csprng);
        let b = CommitmentPair::generate_with(&mut csprng);
        assert_ne!(a.commitment(), b.commitment());
    }

    #[test]
    fn commitment_rejects_bad_bytes() {
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        assert_eq!(Commitment::from_bytes(&bytes), Err(SignatureError::PointDecompressionError));
        assert!(matches!(
            Commitment::from_bytes(&bytes[..16]),
            Err(SignatureError::BytesLengthError { name: "Commitment", length: 32, .. })
        ));
    }
}
