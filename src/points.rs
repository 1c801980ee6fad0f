// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! ### Edwards point tooling
//!
//! Compressed and decompressed forms of the same point kept together,
//! so that we hash exactly the bytes a peer sent us while doing
//! arithmetic on the decompressed point.

use core::fmt::{Debug};
use core::hash::{Hash, Hasher};
use core::cmp::Ordering;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};

use crate::errors::{SignatureError, SignatureResult};


/// Compressed Edwards point length
pub const EDWARDS_POINT_LENGTH: usize = 32;

/// An Edwards point together with its compressed form.
///
/// We only construct these by decompressing bytes, which validates them,
/// or by compressing a point we computed ourselves, so both halves always
/// describe the same point.  Comparisons and hashing use the compressed
/// bytes.
#[derive(Copy, Clone)]
pub struct EdwardsBoth {
    compressed: CompressedEdwardsY,
    point: EdwardsPoint,
}

impl Debug for EdwardsBoth {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "EdwardsBoth( {:?} )", self.compressed)
    }
}

impl Default for EdwardsBoth {
    fn default() -> EdwardsBoth {
        EdwardsBoth::from_point(EdwardsPoint::default())
    }
}

impl EdwardsBoth {
    /// Access the compressed Edwards form
    pub fn as_compressed(&self) -> &CompressedEdwardsY { &self.compressed }

    /// Extract the compressed Edwards form
    pub fn into_compressed(self) -> CompressedEdwardsY { self.compressed }

    /// Access the point form
    pub fn as_point(&self) -> &EdwardsPoint { &self.point }

    /// Extract the point form
    pub fn into_point(self) -> EdwardsPoint { self.point }

    /// Decompress into the `EdwardsBoth` format that also retains the
    /// compressed form.
    ///
    /// This is our only decoding path, so callers always receive the
    /// point the encoding denotes, never some sign-flipped variant.
    pub fn from_compressed(compressed: CompressedEdwardsY) -> SignatureResult<EdwardsBoth> {
        Ok(EdwardsBoth {
            point: compressed.decompress().ok_or(SignatureError::PointDecompressionError) ?,
            compressed,
        })
    }

    /// Compress into the `EdwardsBoth` format that also retains the
    /// uncompressed form.
    pub fn from_point(point: EdwardsPoint) -> EdwardsBoth {
        EdwardsBoth {
            compressed: point.compress(),
            point,
        }
    }

    /// Convert this point to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; EDWARDS_POINT_LENGTH] {
        self.compressed.to_bytes()
    }

    /// Construct an `EdwardsBoth` from a slice of bytes.
    ///
    /// `name` and `description` identify the wrapping type in any
    /// `BytesLengthError`.
    #[inline]
    pub fn from_bytes_ser(name: &'static str, description: &'static str, bytes: &[u8])
     -> SignatureResult<EdwardsBoth>
    {
        if bytes.len() != EDWARDS_POINT_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name, description, length: EDWARDS_POINT_LENGTH,
            });
        }
        let mut compressed = CompressedEdwardsY([0u8; EDWARDS_POINT_LENGTH]);
        compressed.0.copy_from_slice(&bytes[..32]);
        EdwardsBoth::from_compressed(compressed)
    }
}

// Only the compressed form, consistent with `Eq`.
impl Hash for EdwardsBoth {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.compressed.as_bytes().hash(state);
    }
}

impl PartialEq<Self> for EdwardsBoth {
    fn eq(&self, other: &Self) -> bool {
        self.compressed.eq(&other.compressed)
    }
}

impl Eq for EdwardsBoth {}

impl PartialOrd<EdwardsBoth> for EdwardsBoth {
    fn partial_cmp(&self, other: &EdwardsBoth) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdwardsBoth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compressed.as_bytes().cmp(other.compressed.as_bytes())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
    use curve25519_dalek::scalar::Scalar;

    #[test]
    fn decompress_gives_the_encoded_point() {
        let p = ED25519_BASEPOINT_POINT * Scalar::from(7u8);
        let both = EdwardsBoth::from_bytes_ser("Point", "", p.compress().as_bytes()).unwrap();
        assert_eq!(both.as_point(), &p);
        assert_eq!(both.to_bytes(), p.compress().to_bytes());
        assert_eq!(both, EdwardsBoth::from_point(p));
        // Adding must use the point itself, not its negation.
        assert_eq!(
            (both.into_point() + ED25519_BASEPOINT_POINT).compress(),
            (ED25519_BASEPOINT_POINT * Scalar::from(8u8)).compress()
        );
    }

    #[test]
    fn rejects_bad_encodings() {
        assert_eq!(
            EdwardsBoth::from_bytes_ser("Point", "", &[0u8; 31]),
            Err(SignatureError::BytesLengthError { name: "Point", description: "", length: 32 })
        );
        // y = 2 is not the y-coordinate of any curve point
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        assert_eq!(
            EdwardsBoth::from_bytes_ser("Point", "", &bytes),
            Err(SignatureError::PointDecompressionError)
        );
    }
}
