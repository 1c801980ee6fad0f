// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! ### Key sets, their hash, and delinearized public and secret keys.
//!
//! We weight each cosigner's key by `h_i = H(C || P_i)` where
//! `C = H(P_1 || .. || P_n)` hashes the whole ordered key set.  As every
//! weight depends upon every key, nobody can choose their key after
//! seeing the others so as to cancel them out of the aggregate.

use core::fmt::{Debug};

use alloc::collections::btree_set::BTreeSet;
use alloc::vec::Vec;

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{SignatureError, SignatureResult};
use crate::keys::{Keypair, PublicKey, SecretKey, PUBLIC_KEY_LENGTH};
use crate::scalars;


/// The length of a `KeySetHash`, in bytes.
pub const KEY_SET_HASH_LENGTH: usize = 64;

/// The hash `C = H(P_1 || .. || P_n)` of an ordered key set.
///
/// All cosigners must compute the same `C`, so they should compare it
/// before exchanging commitments.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySetHash(pub(crate) [u8; KEY_SET_HASH_LENGTH]);

impl Debug for KeySetHash {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "KeySetHash( {:?} )", &self.0[..])
    }
}

impl KeySetHash {
    const DESCRIPTION: &'static str = "A 64 byte SHA-512 hash of an ordered key set";

    /// Hash the compressed public keys in the order given.
    ///
    /// Reordering the keys changes the hash, and thus every delinearized
    /// key derived from it.
    pub fn from_public_keys<'a, I>(public_keys: I) -> KeySetHash
    where I: IntoIterator<Item = &'a PublicKey>
    {
        let mut h = Sha512::new();
        for public_key in public_keys {
            h.update(public_key.as_compressed().as_bytes());
        }
        let mut bytes = [0u8; KEY_SET_HASH_LENGTH];
        bytes.copy_from_slice(h.finalize().as_slice());
        KeySetHash(bytes)
    }

    /// View this key set hash as a byte array.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_SET_HASH_LENGTH] {
        &self.0
    }

    /// Convert this key set hash to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; KEY_SET_HASH_LENGTH] {
        self.0
    }

    /// Construct a `KeySetHash` from a slice of bytes.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<KeySetHash> {
        if bytes.len() != KEY_SET_HASH_LENGTH {
            return Err(SignatureError::BytesLengthError {
                name: "KeySetHash",
                description: KeySetHash::DESCRIPTION,
                length: KEY_SET_HASH_LENGTH
            });
        }
        let mut bytes64 = [0u8; KEY_SET_HASH_LENGTH];
        bytes64.copy_from_slice(bytes);
        Ok(KeySetHash(bytes64))
    }

    /// The delinearization factor `h_i = H(C || P_i) mod l`.
    pub fn delinearization_factor(&self, public_key: &PublicKey) -> Scalar {
        scalars::hash_to_scalar(&[&self.0, public_key.as_compressed().as_bytes()])
    }

    /// The delinearized public key `P'_i = h_i P_i`.
    pub fn delinearize_public_key(&self, public_key: &PublicKey) -> PublicKey {
        PublicKey::from_point(self.delinearization_factor(public_key) * public_key.as_point())
    }

    /// The aggregate public key `P_agg = sum P'_i` against which
    /// collective signatures verify.
    ///
    /// Any permutation of `public_keys` yields the same sum, but this
    /// `KeySetHash` must come from the agreed ordering.  An empty key set,
    /// which `KeySet::new` rejects, would yield the identity point.
    pub fn aggregate_delinearized_public_keys<'a, I>(&self, public_keys: I) -> PublicKey
    where I: IntoIterator<Item = &'a PublicKey>
    {
        let point: EdwardsPoint = public_keys.into_iter()
            .map(|public_key| self.delinearization_factor(public_key) * public_key.as_point())
            .sum();
        PublicKey::from_point(point)
    }

    /// The delinearized secret scalar `s'_i = h_i a_i`.
    ///
    /// `public_key` must be the public key of `secret_key`, as it was
    /// hashed into the key set.
    pub fn delinearize_secret_key(&self, public_key: &PublicKey, secret_key: &SecretKey) -> DelinearizedSecret {
        DelinearizedSecret(self.delinearization_factor(public_key) * secret_key.key)
    }
}

serde_boilerplate!(KeySetHash);


/// A cosigner's delinearized secret scalar `s'_i = h_i a_i`.
///
/// Only valid for the key set whose hash produced it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DelinearizedSecret(pub(crate) Scalar);

impl Debug for DelinearizedSecret {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "DelinearizedSecret( .. )")
    }
}

impl DelinearizedSecret {
    /// The public key `s'_i B` of this delinearized secret.
    pub fn to_public(&self) -> PublicKey {
        PublicKey::from_point(EdwardsPoint::mul_base(&self.0))
    }
}


/// An ordered set of cosigners' public keys.
///
/// Non-empty and free of duplicates.  We cache the key set hash, the
/// delinearized public keys, and the aggregate public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySet {
    public_keys: Vec<PublicKey>,
    delinearized: Vec<PublicKey>,
    hash: KeySetHash,
    aggregate: PublicKey,
}

impl KeySet {
    const DESCRIPTION: &'static str = "A sequence of 32 byte Ed25519 public keys";

    /// Create a key set from public keys in the agreed order.
    ///
    /// Fails with `EmptyKeySet` if there are no keys, and with
    /// `DuplicateCosigner` if any key appears twice.
    ///
    /// # Example
    ///
    /// ```
    /// use ed25519_cosi::{Keypair, cosi::KeySet};
    ///
    /// let alice = Keypair::generate_with(rand::thread_rng());
    /// let bob = Keypair::generate_with(rand::thread_rng());
    /// let ab = KeySet::new(vec![alice.public, bob.public]).unwrap();
    /// let ba = KeySet::new(vec![bob.public, alice.public]).unwrap();
    /// assert_ne!(ab.hash(), ba.hash());
    /// assert_ne!(ab.aggregate_public_key(), ba.aggregate_public_key());
    /// ```
    pub fn new(public_keys: Vec<PublicKey>) -> SignatureResult<KeySet> {
        if public_keys.is_empty() {
            return Err(SignatureError::EmptyKeySet);
        }
        let mut seen = BTreeSet::new();
        if !public_keys.iter().all(|public_key| seen.insert(public_key)) {
            return Err(SignatureError::DuplicateCosigner);
        }

        let hash = KeySetHash::from_public_keys(&public_keys);
        let delinearized: Vec<PublicKey> = public_keys.iter()
            .map(|public_key| hash.delinearize_public_key(public_key))
            .collect();
        let aggregate = PublicKey::from_point(
            delinearized.iter().map(|public_key| public_key.as_point()).sum()
        );

        tracing::debug!(cosigners = public_keys.len(), "hashed key set");
        Ok(KeySet { public_keys, delinearized, hash, aggregate })
    }

    /// Parse a key set from concatenated 32 byte public keys.
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<KeySet> {
        if bytes.len() % PUBLIC_KEY_LENGTH != 0 {
            return Err(SignatureError::BytesLengthError {
                name: "KeySet",
                description: KeySet::DESCRIPTION,
                length: PUBLIC_KEY_LENGTH
            });
        }
        let public_keys = bytes.chunks(PUBLIC_KEY_LENGTH)
            .map(PublicKey::from_bytes)
            .collect::<SignatureResult<Vec<PublicKey>>>()?;
        KeySet::new(public_keys)
    }

    /// Concatenate the public keys in order.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.public_keys.iter()
            .flat_map(|public_key| public_key.to_bytes())
            .collect()
    }

    /// Number of cosigners
    pub fn len(&self) -> usize { self.public_keys.len() }

    /// Always false, as key sets are non-empty.
    pub fn is_empty(&self) -> bool { self.public_keys.is_empty() }

    /// The public keys in order
    pub fn public_keys(&self) -> &[PublicKey] { &self.public_keys }

    /// Iterate over the public keys in order
    pub fn iter(&self) -> impl Iterator<Item = &PublicKey> { self.public_keys.iter() }

    /// Position of `public_key` in the key set, if present.
    pub fn position(&self, public_key: &PublicKey) -> Option<usize> {
        self.public_keys.iter().position(|pk| pk == public_key)
    }

    /// Whether `public_key` belongs to the key set.
    pub fn contains(&self, public_key: &PublicKey) -> bool {
        self.position(public_key).is_some()
    }

    /// The key set hash `C`
    pub fn hash(&self) -> &KeySetHash { &self.hash }

    /// The delinearized public key `P'_i` of the cosigner at `index`.
    pub fn delinearized_public_key(&self, index: usize) -> Option<&PublicKey> {
        self.delinearized.get(index)
    }

    /// The aggregate public key `P_agg`
    pub fn aggregate_public_key(&self) -> PublicKey { self.aggregate }

    /// Compare our key set hash with another cosigner's.
    ///
    /// A mismatch means the cosigners disagree upon the key set or its
    /// order, so the session must abort before using any secrets.
    pub fn check_hash(&self, theirs: &KeySetHash) -> SignatureResult<()> {
        if &self.hash == theirs {
            Ok(())
        } else {
            tracing::warn!("cosigners disagree upon the key set hash");
            Err(SignatureError::KeySetMismatch)
        }
    }

    /// Delinearize `keypair`'s secret key, failing with `UnknownCosigner`
    /// if its public key lies outside this key set.
    pub fn delinearize_secret_key(&self, keypair: &Keypair) -> SignatureResult<DelinearizedSecret> {
        if !self.contains(&keypair.public) {
            return Err(SignatureError::UnknownCosigner);
        }
        Ok(self.hash.delinearize_secret_key(&keypair.public, &keypair.secret))
    }
}

serde_boilerplate!(KeySet);


/// Sum public keys without delinearization.
///
/// Vulnerable to rogue key attacks if used as a collective public key,
/// so only for combining keys whose owners proved possession.
/// No keys yield the identity point.
pub fn aggregate_public_keys<'a, I>(public_keys: I) -> PublicKey
where I: IntoIterator<Item = &'a PublicKey>
{
    PublicKey::from_point(public_keys.into_iter().map(|public_key| public_key.as_point()).sum())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::MiniSecretKey;
    use hex_literal::hex;

    fn seed(last: u8) -> MiniSecretKey {
        let mut bytes = [0u8; 32];
        bytes[31] = last;
        MiniSecretKey::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn delinearization_matches_known_values() {
        let pk1 = seed(1).expand_to_public();
        let pk2 = seed(2).expand_to_public();

        let c = KeySetHash::from_public_keys(&[pk1, pk2]);
        assert_eq!(
            c.to_bytes()[..],
            hex!("30b689d642c6e910f9f36c67f2e920ddfdbc7b30aef6f7606ed7062fd4bec43229e594876ab993f3fdbf36ae636151d309204406204dd0694470050a1c51bef3")[..]
        );
        assert_eq!(
            c.delinearize_public_key(&pk1).to_bytes(),
            hex!("cdd271a7dcf2aa462ad2c03aedfb631079f762b1654fc6c4ebf92fc69f1eb420")
        );
        assert_eq!(
            c.delinearize_public_key(&pk2).to_bytes(),
            hex!("91e38fac6896a1c607e8fc27bd220f7c889dd64f0840d0e09a70038c3a1cd1f2")
        );
        let aggregate = hex!("85da5fd9f6b7b0bb15ef7960e92794caf1d504dffd9404b64c37ae5de81986a7");
        assert_eq!(c.aggregate_delinearized_public_keys(&[pk1, pk2]).to_bytes(), aggregate);
        assert_eq!(c.aggregate_delinearized_public_keys(&[pk2, pk1]).to_bytes(), aggregate);

        let key_set = KeySet::new(vec![pk1, pk2]).unwrap();
        assert_eq!(key_set.hash(), &c);
        assert_eq!(key_set.aggregate_public_key().to_bytes(), aggregate);
    }

    #[test]
    fn delinearized_secret_matches_public() {
        let keypairs: Vec<Keypair> = (1..4).map(|i| seed(i).expand_to_keypair()).collect();
        let key_set = KeySet::new(keypairs.iter().map(|k| k.public).collect()).unwrap();
        for (i, keypair) in keypairs.iter().enumerate() {
            let secret = key_set.delinearize_secret_key(keypair).unwrap();
            assert_eq!(Some(&secret.to_public()), key_set.delinearized_public_key(i));
        }

        let outsider = seed(9).expand_to_keypair();
        assert_eq!(
            key_set.delinearize_secret_key(&outsider).map(|_| ()),
            Err(SignatureError::UnknownCosigner)
        );
    }

    #[test]
    fn key_set_rejects_empty_and_duplicates() {
        let pk1 = seed(1).expand_to_public();
        let pk2 = seed(2).expand_to_public();
        assert_eq!(KeySet::new(vec![]), Err(SignatureError::EmptyKeySet));
        assert_eq!(KeySet::new(vec![pk1, pk2, pk1]), Err(SignatureError::DuplicateCosigner));
        assert_eq!(KeySet::from_bytes(&[]), Err(SignatureError::EmptyKeySet));
        assert!(matches!(
            KeySet::from_bytes(&[0u8; 33]),
            Err(SignatureError::BytesLengthError { name: "KeySet", .. })
        ));

        // The stateless hash accepts any sequence.
        assert_ne!(
            KeySetHash::from_public_keys(&[pk1, pk2, pk1]),
            KeySetHash::from_public_keys(&[pk1, pk2])
        );
    }

    #[test]
    fn key_set_bytes_keep_order() {
        let public_keys: Vec<PublicKey> = (1..6).map(|i| seed(i).expand_to_public()).collect();
        let key_set = KeySet::new(public_keys.clone()).unwrap();
        let again = KeySet::from_bytes(&key_set.to_bytes()).unwrap();
        assert_eq!(again, key_set);
        assert_eq!(again.public_keys(), &public_keys[..]);
        assert_eq!(again.position(&public_keys[3]), Some(3));
    }

    #[test]
    fn weights_bind_the_whole_set() {
        let pks: Vec<PublicKey> = (1..5).map(|i| seed(i).expand_to_public()).collect();
        let abc = KeySet::new(pks[..3].to_vec()).unwrap();
        let cba = KeySet::new(pks[..3].iter().rev().cloned().collect()).unwrap();
        let abd = KeySet::new(vec![pks[0], pks[1], pks[3]]).unwrap();

        assert_ne!(abc.hash(), cba.hash());
        assert_ne!(abc.hash(), abd.hash());
        assert_ne!(abc.aggregate_public_key(), cba.aggregate_public_key());
        assert_ne!(abc.aggregate_public_key(), abd.aggregate_public_key());

        // The same key receives a different weight in each set.
        assert_ne!(abc.delinearized_public_key(0), abd.delinearized_public_key(0));
        assert_ne!(abc.delinearized_public_key(0), cba.delinearized_public_key(2));

        assert_eq!(abc.check_hash(cba.hash()), Err(SignatureError::KeySetMismatch));
        assert_eq!(abc.check_hash(&KeySetHash::from_public_keys(&pks[..3])), Ok(()));
    }

    #[test]
    fn plain_aggregation_is_a_sum() {
        let pks: Vec<PublicKey> = (1..4).map(|i| seed(i).expand_to_public()).collect();
        assert_eq!(aggregate_public_keys(&pks[..1]), pks[0]);
        let identity = PublicKey::from_point(EdwardsPoint::default());
        assert_eq!(aggregate_public_keys(core::iter::empty()), identity);
        let c = KeySetHash::from_public_keys(&pks);
        assert_eq!(c.aggregate_delinearized_public_keys(core::iter::empty()), identity);
        let sum = pks[0].as_point() + pks[1].as_point() + pks[2].as_point();
        assert_eq!(aggregate_public_keys(&pks), PublicKey::from_point(sum));
        assert_eq!(aggregate_public_keys(pks.iter().rev()), PublicKey::from_point(sum));
    }
}
