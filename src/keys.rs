// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2017-2019 Isis Lovecruft and Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Isis Agora Lovecruft <isis@patternsinthevoid.net>
// - Jeff Burdges <jeff@web3.foundation>

//! ### Ed25519 keys: seeds, expanded secret keys, public keys, and keypairs.

use core::fmt::{Debug};

use arrayref::array_refs;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::{Scalar, clamp_integer};
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{SignatureError, SignatureResult};
use crate::points::EdwardsBoth;
use crate::scalars;


/// The length of an Ed25519 `MiniSecretKey`, aka seed, in bytes.
pub const MINI_SECRET_KEY_LENGTH: usize = 32;

/// The length of an Ed25519 `PublicKey`, in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// The length of the "key" portion of an expanded Ed25519 secret key, in bytes.
const SECRET_KEY_KEY_LENGTH: usize = 32;

/// The length of the "nonce" portion of an expanded Ed25519 secret key, in bytes.
const SECRET_KEY_NONCE_LENGTH: usize = 32;

/// The length of an expanded Ed25519 secret key, `SecretKey`, in bytes.
pub const SECRET_KEY_LENGTH: usize = SECRET_KEY_KEY_LENGTH + SECRET_KEY_NONCE_LENGTH;

/// The length of an Ed25519 `Keypair`, in bytes.
pub const KEYPAIR_LENGTH: usize = SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH;


/// An Ed25519 secret key seed.
///
/// RFC 8032 calls this 32 byte value the private key.  We hash it
/// into a `SecretKey`, which RFC 8032 treats as an implementation
/// detail, because the collective signing protocol needs the scalar
/// itself, not merely the seed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MiniSecretKey(pub(crate) [u8; MINI_SECRET_KEY_LENGTH]);

impl Debug for MiniSecretKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "MiniSecretKey( .. )")
    }
}

impl Eq for MiniSecretKey {}
impl PartialEq for MiniSecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}
impl ConstantTimeEq for MiniSecretKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl MiniSecretKey {
    const DESCRIPTION: &'static str = "An Ed25519 secret key seed as 32 bytes, as specified in RFC 8032.";

    /// Expand this `MiniSecretKey` into a `SecretKey`.
    ///
    /// We hash the seed with SHA-512, clamp the lower half as RFC 8032
    /// requires, clearing the low 3 bits and the top bit while setting
    /// the second highest bit, and keep the upper half for deriving
    /// signing nonces.
    ///
    /// We reduce the clamped scalar mod l, which leaves every multiple
    /// of the basepoint unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use ed25519_cosi::{MiniSecretKey, SecretKey};
    ///
    /// let mini_secret_key = MiniSecretKey::from_bytes(&[7u8; 32]).unwrap();
    /// let secret_key: SecretKey = mini_secret_key.expand();
    /// assert_eq!(secret_key.to_public(), mini_secret_key.expand_to_public());
    /// ```
    pub fn expand(&self) -> SecretKey {
        let mut h = scalars::sha512(&[&self.0]);
        let (lower, upper) = array_refs!(&h, SECRET_KEY_KEY_LENGTH, SECRET_KEY_NONCE_LENGTH);
        let key = Scalar::from_bytes_mod_order(clamp_integer(*lower));
        let nonce = *upper;
        h.zeroize();

        SecretKey { key, nonce }
    }

    /// Derive the `Keypair` corresponding to this `MiniSecretKey`.
    pub fn expand_to_keypair(&self) -> Keypair {
        self.expand().into()
    }

    /// Derive the `PublicKey` corresponding to this `MiniSecretKey`.
    pub fn expand_to_public(&self) -> PublicKey {
        self.expand().to_public()
    }

    /// Convert this secret key to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; MINI_SECRET_KEY_LENGTH] {
        self.0
    }

    /// View this secret key as a byte array.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; MINI_SECRET_KEY_LENGTH] {
        &self.0
    }

    /// Construct a `MiniSecretKey` from a slice of bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use ed25519_cosi::{MiniSecretKey, MINI_SECRET_KEY_LENGTH, SignatureError};
    ///
    /// let secret_key_bytes: [u8; MINI_SECRET_KEY_LENGTH] = [
    ///    157, 097, 177, 157, 239, 253, 090, 096,
    ///    186, 132, 074, 244, 146, 236, 044, 196,
    ///    068, 073, 197, 105, 123, 050, 105, 025,
    ///    112, 059, 172, 003, 028, 174, 127, 096, ];
    ///
    /// let secret_key: MiniSecretKey = MiniSecretKey::from_bytes(&secret_key_bytes).unwrap();
    /// assert!(MiniSecretKey::from_bytes(&secret_key_bytes[1..]).is_err());
    /// ```
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<MiniSecretKey> {
        if bytes.len() != MINI_SECRET_KEY_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name: "MiniSecretKey",
                description: MiniSecretKey::DESCRIPTION,
                length: MINI_SECRET_KEY_LENGTH
            });
        }
        let mut bits: [u8; 32] = [0u8; 32];
        bits.copy_from_slice(&bytes[..32]);
        Ok(MiniSecretKey(bits))
    }

    /// Generate a `MiniSecretKey` from a `csprng`.
    pub fn generate_with<R>(mut csprng: R) -> MiniSecretKey
    where R: CryptoRng + RngCore,
    {
        let mut sk: MiniSecretKey = MiniSecretKey([0u8; 32]);
        csprng.fill_bytes(&mut sk.0);
        sk
    }

    /// Generate a `MiniSecretKey` from the operating system's randomness.
    #[cfg(feature = "getrandom")]
    pub fn generate() -> MiniSecretKey {
        Self::generate_with(super::getrandom_or_panic())
    }
}

serde_boilerplate!(MiniSecretKey);


/// An expanded Ed25519 secret key.
///
/// Holds the secret scalar `a`, already clamped and reduced mod l, and
/// the 32 byte `nonce` seed from which `sign` derives its deterministic
/// nonces.  Both halves come from hashing a `MiniSecretKey`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    /// Secret scalar `a`, reduced mod l.
    pub(crate) key: Scalar,
    /// Seed for deterministic signing nonces.
    pub(crate) nonce: [u8; SECRET_KEY_NONCE_LENGTH],
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "SecretKey {{ key: .., nonce: .. }}")
    }
}

impl Eq for SecretKey {}
impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}
impl ConstantTimeEq for SecretKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.key.ct_eq(&other.key) & self.nonce.ct_eq(&other.nonce)
    }
}

impl From<&MiniSecretKey> for SecretKey {
    fn from(msk: &MiniSecretKey) -> SecretKey {
        msk.expand()
    }
}

impl SecretKey {
    const DESCRIPTION: &'static str = "An expanded Ed25519 secret key as 64 bytes, a canonical scalar followed by a nonce seed.";

    /// Convert this `SecretKey` into an array of 64 bytes, the canonical
    /// scalar followed by the nonce seed.
    #[inline]
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        let mut bytes: [u8; 64] = [0u8; 64];
        bytes[..32].copy_from_slice(&self.key.as_bytes()[..]);
        bytes[32..].copy_from_slice(&self.nonce[..]);
        bytes
    }

    /// Construct a `SecretKey` from a slice of bytes produced by `to_bytes`.
    ///
    /// Rejects a scalar not reduced mod l with `ScalarFormatError`.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<SecretKey> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name: "SecretKey",
                description: SecretKey::DESCRIPTION,
                length: SECRET_KEY_LENGTH
            });
        }
        let (key, nonce) = array_refs!(array_ref_64(bytes), SECRET_KEY_KEY_LENGTH, SECRET_KEY_NONCE_LENGTH);
        let key = scalars::check_scalar(*key)?;
        Ok(SecretKey { key, nonce: *nonce })
    }

    /// Construct a `SecretKey` from the 64 byte expanded secret key
    /// format other Ed25519 implementations use, the clamped but
    /// unreduced scalar followed by the nonce seed.
    #[inline]
    pub fn from_ed25519_bytes(bytes: &[u8]) -> SignatureResult<SecretKey> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name: "SecretKey",
                description: SecretKey::DESCRIPTION,
                length: SECRET_KEY_LENGTH
            });
        }
        let (key, nonce) = array_refs!(array_ref_64(bytes), SECRET_KEY_KEY_LENGTH, SECRET_KEY_NONCE_LENGTH);
        Ok(SecretKey { key: Scalar::from_bytes_mod_order(*key), nonce: *nonce })
    }

    /// Generate a `SecretKey` by expanding a fresh `MiniSecretKey`.
    pub fn generate_with<R>(csprng: R) -> SecretKey
    where R: CryptoRng + RngCore,
    {
        MiniSecretKey::generate_with(csprng).expand()
    }

    /// Derive the `PublicKey` corresponding to this `SecretKey`.
    pub fn to_public(&self) -> PublicKey {
        PublicKey::from_point(EdwardsPoint::mul_base(&self.key))
    }
}

serde_boilerplate!(SecretKey);

// Callers check the length first.
fn array_ref_64(bytes: &[u8]) -> &[u8; 64] {
    arrayref::array_ref!(bytes, 0, 64)
}


/// An Ed25519 public key.
///
/// We keep the compressed bytes exactly as given, since those get
/// hashed into challenges and key set hashes, alongside the point.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey(pub(crate) EdwardsBoth);

impl Debug for PublicKey {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "PublicKey( {:?} )", self.0.as_compressed())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        self.as_compressed().as_bytes()
    }
}

impl PublicKey {
    const DESCRIPTION: &'static str = "An Ed25519 public key as a 32-byte compressed point, as specified in RFC 8032.";

    /// Access the compressed Edwards form
    pub fn as_compressed(&self) -> &CompressedEdwardsY { self.0.as_compressed() }

    /// Extract the compressed Edwards form
    pub fn into_compressed(self) -> CompressedEdwardsY { self.0.into_compressed() }

    /// Access the point form
    pub fn as_point(&self) -> &EdwardsPoint { self.0.as_point() }

    /// Extract the point form
    pub fn into_point(self) -> EdwardsPoint { self.0.into_point() }

    /// Decompress into the `PublicKey` format that also retains the
    /// compressed form.
    pub fn from_compressed(compressed: CompressedEdwardsY) -> SignatureResult<PublicKey> {
        Ok(PublicKey(EdwardsBoth::from_compressed(compressed)?))
    }

    /// Compress into the `PublicKey` format that also retains the
    /// uncompressed form.
    pub fn from_point(point: EdwardsPoint) -> PublicKey {
        PublicKey(EdwardsBoth::from_point(point))
    }

    /// Convert this public key to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_bytes()
    }

    /// Construct a `PublicKey` from a slice of bytes.
    ///
    /// Fails with `PointDecompressionError` if the bytes do not encode
    /// a point on the curve.
    ///
    /// # Example
    ///
    /// ```
    /// use ed25519_cosi::{PublicKey, PUBLIC_KEY_LENGTH};
    ///
    /// let public_key_bytes: [u8; PUBLIC_KEY_LENGTH] = [
    ///    215,  90, 152,   1, 130, 177,  10, 183, 213,  75, 254, 211, 201, 100,   7,  58,
    ///     14, 225, 114, 243, 218, 166,  35,  37, 175,   2,  26, 104, 247,   7,   81, 26];
    ///
    /// let public_key = PublicKey::from_bytes(&public_key_bytes).unwrap();
    /// assert_eq!(public_key.to_bytes(), public_key_bytes);
    /// ```
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<PublicKey> {
        Ok(PublicKey(EdwardsBoth::from_bytes_ser("PublicKey", PublicKey::DESCRIPTION, bytes)?))
    }
}

impl From<SecretKey> for PublicKey {
    fn from(source: SecretKey) -> PublicKey {
        source.to_public()
    }
}

serde_boilerplate!(PublicKey);


/// An Ed25519 keypair.
#[derive(Clone, Debug)]
pub struct Keypair {
    /// The secret half of this keypair.
    pub secret: SecretKey,
    /// The public half of this keypair.
    pub public: PublicKey,
}

impl Zeroize for Keypair {
    fn zeroize(&mut self) {
        self.secret.zeroize();
    }
}

impl From<SecretKey> for Keypair {
    fn from(secret: SecretKey) -> Keypair {
        let public = secret.to_public();
        Keypair { secret, public }
    }
}

impl Keypair {
    const DESCRIPTION: &'static str = "An Ed25519 expanded secret key followed by its public key, 96 bytes in total.";

    /// Convert this keypair to bytes, the 64 byte `SecretKey` followed
    /// by the 32 byte `PublicKey`.
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        let mut bytes: [u8; KEYPAIR_LENGTH] = [0u8; KEYPAIR_LENGTH];
        bytes[..SECRET_KEY_LENGTH].copy_from_slice(&self.secret.to_bytes());
        bytes[SECRET_KEY_LENGTH..].copy_from_slice(self.public.as_compressed().as_bytes());
        bytes
    }

    /// Construct a `Keypair` from the bytes of a `SecretKey` and `PublicKey`.
    ///
    /// We do not check that the public key matches the secret key.
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<Keypair> {
        if bytes.len() != KEYPAIR_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name: "Keypair",
                description: Keypair::DESCRIPTION,
                length: KEYPAIR_LENGTH
            });
        }
        let secret = SecretKey::from_bytes(&bytes[..SECRET_KEY_LENGTH])?;
        let public = PublicKey::from_bytes(&bytes[SECRET_KEY_LENGTH..])?;

        Ok(Keypair { secret, public })
    }

    /// Generate an Ed25519 keypair from a `csprng`.
    ///
    /// # Example
    ///
    /// ```
    /// use ed25519_cosi::Keypair;
    ///
    /// let keypair: Keypair = Keypair::generate_with(rand::thread_rng());
    /// assert_eq!(keypair.public, keypair.secret.to_public());
    /// ```
    pub fn generate_with<R>(csprng: R) -> Keypair
    where R: CryptoRng + RngCore,
    {
        SecretKey::generate_with(csprng).into()
    }

    /// Generate an Ed25519 keypair from the operating system's randomness.
    #[cfg(feature = "getrandom")]
    pub fn generate() -> Keypair {
        Self::generate_with(super::getrandom_or_panic())
    }
}

serde_boilerplate!(Keypair);


#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;
    use rand_chacha::ChaChaRng;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn expand_matches_rfc8032() {
        let mini = MiniSecretKey::from_bytes(&hex!("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")).unwrap();
        assert_eq!(
            mini.expand_to_public().to_bytes(),
            hex!("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a")
        );

        let mut seed = [0u8; 32];
        seed[31] = 1;
        assert_eq!(
            MiniSecretKey::from_bytes(&seed).unwrap().expand_to_public().to_bytes(),
            hex!("4cb5abf6ad79fbf5abbccafcc269d85cd2651ed4b885b5869f241aedf0a5ba29")
        );
    }

    #[test]
    fn expand_matches_ed25519_dalek() {
        let mut csprng = ChaChaRng::from_seed([0u8; 32]);
        for _ in 0..16 {
            let mini = MiniSecretKey::generate_with(&mut csprng);
            let theirs = ed25519_dalek::SigningKey::from_bytes(mini.as_bytes());
            assert_eq!(mini.expand_to_public().to_bytes(), theirs.verifying_key().to_bytes());
        }
    }

    #[test]
    fn expanded_formats_agree() {
        let mini = MiniSecretKey::from_bytes(&[0x5a; 32]).unwrap();
        let secret = mini.expand();

        let mut ed25519_bytes = scalars::sha512(&[mini.as_bytes()]);
        ed25519_bytes[0] &= 248;
        ed25519_bytes[31] &= 127;
        ed25519_bytes[31] |= 64;
        assert_eq!(SecretKey::from_ed25519_bytes(&ed25519_bytes).unwrap(), secret);
        assert_eq!(SecretKey::from_bytes(&secret.to_bytes()).unwrap(), secret);

        // A clamped scalar has bit 254 set, so it always exceeds l.
        assert_eq!(SecretKey::from_bytes(&ed25519_bytes), Err(SignatureError::ScalarFormatError));
    }

    #[test]
    fn keypair_bytes() {
        let keypair = Keypair::generate_with(ChaChaRng::from_seed([1u8; 32]));
        let bytes = keypair.to_bytes();
        let again = Keypair::from_bytes(&bytes).unwrap();
        assert_eq!(again.public, keypair.public);
        assert_eq!(again.secret, keypair.secret);
        assert!(matches!(
            Keypair::from_bytes(&bytes[..95]),
            Err(SignatureError::BytesLengthError { name: "Keypair", length: 96, .. })
        ));
    }

    #[test]
    fn public_key_rejects_off_curve_bytes() {
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        assert_eq!(PublicKey::from_bytes(&bytes), Err(SignatureError::PointDecompressionError));
        assert!(matches!(
            PublicKey::from_bytes(&bytes[..31]),
            Err(SignatureError::BytesLengthError { name: "PublicKey", length: 32, .. })
        ));
    }

    #[test]
    fn secrets_stay_out_of_debug() {
        let mini = MiniSecretKey::from_bytes(&[0xab; 32]).unwrap();
        assert_eq!(std::format!("{:?}", mini), "MiniSecretKey( .. )");
        assert_eq!(std::format!("{:?}", mini.expand()), "SecretKey { key: .., nonce: .. }");
    }
}
