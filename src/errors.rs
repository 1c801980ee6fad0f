// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2017-2019 Isis Lovecruft and Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Isis Agora Lovecruft <isis@patternsinthevoid.net>
// - Jeff Burdges <jeff@web3.foundation>

//! ### Errors which may occur when parsing keys and/or signatures to or from wire formats,
//! or when running a collective signing session.

// rustc seems to think the typenames in match statements (e.g. in
// Display) should be snake cased, for some reason.
#![allow(non_snake_case)]

use core::fmt;
use core::fmt::Display;


/// `Result` specialized to this crate for convenience.
pub type SignatureResult<T> = Result<T, SignatureError>;

/// Rounds of a collective signing session in which a cosigner may
/// fail to contribute, or contribute inconsistently.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MultiSignatureStage {
    /// Exchange of the commitments `R_i`
    Commitment,
    /// Exchange of the partial signatures `s_i`
    Cosignature,
}

impl Display for MultiSignatureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::MultiSignatureStage::*;
        match self {
            Commitment => write!(f, "commitment"),
            Cosignature => write!(f, "cosignature"),
        }
    }
}

/// Errors which may occur while processing signatures, keypairs,
/// and collective signing sessions.
///
/// This error may arise due to:
///
/// * Being given bytes with a length different to what was expected.
///
/// * A problem decompressing `R`, a curve point, in the `Signature`,
///   a `Commitment`, or the curve point for a `PublicKey`.
///
/// * A problem with the format of `s`, a scalar, in the `Signature`
///   or a `PartialSignature`.  Scalars must be fully reduced mod l.
///
/// * A commitment scalar congruent to 0 or 1, which the caller must
///   replace with fresh randomness.
///
/// * Cosigners disagreeing about the session, which aborts it.
///
/// Failure of the verification equation is reported as `false` by the
/// `verify` methods, not through this type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SignatureError {
    /// Invalid point provided, usually to `verify` methods.
    PointDecompressionError,
    /// Invalid scalar provided, usually to `Signature::from_bytes`.
    ScalarFormatError,
    /// An error in the length of bytes handed to a constructor.
    ///
    /// To use this, pass a string specifying the `name` of the type which is
    /// returning the error, and the `length` in bytes which its constructor
    /// expects.
    BytesLengthError {
        /// Identifies the type returning the error
        name: &'static str,
        /// Describes the type returning the error
        description: &'static str,
        /// Length expected by the constructor in bytes
        length: usize
    },
    /// The commitment scalar reduced to 0 or 1 mod l, so the caller
    /// must retry with fresh randomness.
    DegenerateCommitment,
    /// Cosigners computed different key set hashes, so they disagree
    /// upon the key set or its ordering.
    KeySetMismatch,
    /// A key set must contain at least one public key.
    EmptyKeySet,
    /// A key set listed the same public key twice.
    DuplicateCosigner,
    /// A message came from a public key outside the key set.
    UnknownCosigner,
    /// A cosigner's contribution was missing when the session needed it.
    CosignerAbsent {
        /// Identifies the stage during which the contribution went missing
        stage: MultiSignatureStage,
    },
    /// A cosigner sent two different contributions for the same stage.
    CosignerInconsistent {
        /// Identifies the stage during which the inconsistency arose
        stage: MultiSignatureStage,
        /// Set when the contribution conflicts with one already recorded
        duplicate: bool,
    },
    /// A partial signature does not match its cosigner's commitment and
    /// delinearized public key.
    InvalidPartialSignature,
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::SignatureError::*;
        match *self {
            PointDecompressionError =>
                write!(f, "Cannot decompress Edwards point"),
            ScalarFormatError =>
                write!(f, "Cannot use scalar not reduced mod l"),
            BytesLengthError { name, length, .. } =>
                write!(f, "{} must be {} bytes in length", name, length),
            DegenerateCommitment =>
                write!(f, "Commitment scalar is 0 or 1 mod l, retry with fresh randomness"),
            KeySetMismatch =>
                write!(f, "Cosigners disagree upon the key set or its ordering"),
            EmptyKeySet =>
                write!(f, "Key set contains no public keys"),
            DuplicateCosigner =>
                write!(f, "Key set contains a public key twice"),
            UnknownCosigner =>
                write!(f, "Public key is not a member of the key set"),
            CosignerAbsent { stage } =>
                write!(f, "Cosigner missing during the {} stage", stage),
            CosignerInconsistent { stage, duplicate: true } =>
                write!(f, "Cosigner sent conflicting values during the {} stage", stage),
            CosignerInconsistent { stage, duplicate: false } =>
                write!(f, "Cosigner sent an inconsistent value during the {} stage", stage),
            InvalidPartialSignature =>
                write!(f, "Partial signature does not match its commitment and public key"),
        }
    }
}

#[cfg(feature = "std")]
impl ::std::error::Error for SignatureError {}

/// Convert `SignatureError` into `::serde::de::Error` aka `SerdeError`
///
/// We should do this with `From` but right now the orphan rules prohibit
/// `impl From<SignatureError> for E where E: serde::de::Error`.
#[cfg(feature = "serde")]
pub(crate) fn serde_error_from_signature_error<E>(err: SignatureError) -> E
where E: ::serde_crate::de::Error
{
    use self::SignatureError::*;
    match err {
        PointDecompressionError =>
            E::custom("Edwards point decompression failed"),
        ScalarFormatError =>
            E::custom("improper scalar not reduced mod l"),
        BytesLengthError { name: _, description, length } =>
            E::invalid_length(length, &description),
        // Key sets may also be empty or repeat a key.
        _ => E::custom(err),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_stage() {
        let err = SignatureError::CosignerAbsent { stage: MultiSignatureStage::Commitment };
        assert_eq!(std::format!("{}", err), "Cosigner missing during the commitment stage");

        let err = SignatureError::BytesLengthError {
            name: "PublicKey", description: "A 32 byte point", length: 32,
        };
        assert_eq!(std::format!("{}", err), "PublicKey must be 32 bytes in length");
    }
}
