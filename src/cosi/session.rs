// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! ### Collective signing sessions
//!
//! `CoSig` tracks one session through its stages as distinct types, so
//! the compiler rejects partial signing before all commitments arrive,
//! or reusing our commitment after partial signing.  We index cosigners
//! by their position in the agreed `KeySet`.
//!
//! A key set hash mismatch, a conflicting commitment or partial signature,
//! or an invalid partial signature aborts the session for good: we erase
//! our secret commitment, and every later call returns the first error.
//! Messages from keys outside the key set are merely rejected.

use core::borrow::{Borrow};

use alloc::vec::Vec;

use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};

use crate::errors::{MultiSignatureStage, SignatureError, SignatureResult};
use crate::keys::{Keypair, PublicKey};
use crate::sign::{challenge_scalar, Signature};

use super::*;


#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoR {
    Absent,
    Commit { R: Commitment },                         // R_i
    Cosigned { R: Commitment, s: PartialSignature },  // R_i and s_i
}

impl CoR {
    #[allow(non_snake_case)]
    fn get_R(&self) -> Option<&Commitment> {
        match self {
            CoR::Absent => None,
            CoR::Commit { R } => Some(R),
            CoR::Cosigned { R, .. } => Some(R),
        }
    }

    #[allow(non_snake_case)]
    fn set_committed(&mut self, R: Commitment) -> SignatureResult<()> {
        match self {
            CoR::Absent => {
                *self = CoR::Commit { R };
                Ok(())
            },
            CoR::Commit { R: R_old } | CoR::Cosigned { R: R_old, .. } =>
                if *R_old == R { Ok(()) } else {
                    let stage = MultiSignatureStage::Commitment;
                    Err(SignatureError::CosignerInconsistent { stage, duplicate: true, })
                },
        }
    }

    fn set_cosigned(&mut self, s: PartialSignature) -> SignatureResult<()> {
        match *self {
            CoR::Absent => {
                let stage = MultiSignatureStage::Commitment;
                Err(SignatureError::CosignerAbsent { stage, })
            },
            CoR::Commit { R } => {
                *self = CoR::Cosigned { R, s };
                Ok(())
            },
            CoR::Cosigned { s: s_old, .. } =>
                if s_old == s { Ok(()) } else {
                    let stage = MultiSignatureStage::Cosignature;
                    Err(SignatureError::CosignerInconsistent { stage, duplicate: true, })
                },
        }
    }
}


/// Collective signing session generic over its stage
#[allow(non_snake_case)]
pub struct CoSig<S> {
    key_set: KeySet,
    Rs: Vec<CoR>,
    /// Our secret commitment `r_i`, until partial signing or abort consumes it.
    secret: Option<SecretCommitment>,
    /// The error which aborted this session, if any.
    aborted: Option<SignatureError>,
    stage: S,
}

impl<S> CoSig<S> {
    /// The key set of this session
    pub fn key_set(&self) -> &KeySet { &self.key_set }

    /// Our key set hash `C`, for comparison with other cosigners'
    pub fn key_set_hash(&self) -> &KeySetHash { self.key_set.hash() }

    /// Compare another cosigner's key set hash with ours.
    ///
    /// A mismatch means we disagree upon the key set or its order, so
    /// it aborts the session with `KeySetMismatch` and erases our secret
    /// commitment before anyone uses it.
    pub fn check_key_set_hash(&mut self, theirs: &KeySetHash) -> SignatureResult<()> {
        self.check_aborted()?;
        self.key_set.check_hash(theirs).map_err(|e| self.abort(e))
    }

    /// Aggregate public key `P_agg` against which the signature verifies
    pub fn public_key(&self) -> PublicKey { self.key_set.aggregate_public_key() }

    /// Iterates over cosigners who have not yet sent a commitment.
    pub fn missing_commitments(&self) -> impl Iterator<Item = &PublicKey> {
        self.key_set.iter().zip(self.Rs.iter())
            .filter_map(|(pk, cor)| match cor {
                CoR::Absent => Some(pk),
                _ => None,
            })
    }

    /// The error which aborted this session, if any.
    pub fn aborted(&self) -> Option<SignatureError> { self.aborted }

    fn check_aborted(&self) -> SignatureResult<()> {
        match self.aborted {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Abort the session, erasing our secret commitment.  Returns `err`
    /// for convenience, while later calls see the first abort reason.
    fn abort(&mut self, err: SignatureError) -> SignatureError {
        self.secret = None;
        if self.aborted.is_none() {
            tracing::warn!(error = %err, "aborted collective signing session");
            self.aborted = Some(err);
        }
        err
    }

    fn position(&self, them: &PublicKey) -> SignatureResult<usize> {
        self.key_set.position(them).ok_or(SignatureError::UnknownCosigner)
    }

    /// Sums all commitments, failing if any remain absent.
    #[allow(non_snake_case)]
    fn compute_R(&self, stage: MultiSignatureStage) -> SignatureResult<Commitment> {
        let Rs = self.Rs.iter()
            .map(|cor| cor.get_R().ok_or(SignatureError::CosignerAbsent { stage }))
            .collect::<SignatureResult<Vec<&Commitment>>>()?;
        Ok(aggregate_commitments(Rs))
    }
}

impl Keypair {
    /// Initialize a collective signing session with fresh randomness
    /// from the operating system.
    ///
    /// We borrow the keypair here to discourage keeping too many copies
    /// of the secret key, but `CoSig::new` accepts an owned keypair,
    /// or an `Rc` or `Arc`.
    #[cfg(feature = "getrandom")]
    pub fn cosign(&self, key_set: KeySet) -> SignatureResult<CoSig<CommitStage<&Keypair>>> {
        CoSig::new(self, key_set)
    }
}

/// Commitment stage, in which cosigners exchange their `R_i`
pub struct CommitStage<K: Borrow<Keypair>> {
    keypair: K,
    position: usize,
    commitment: Commitment,
}

impl<K> CoSig<CommitStage<K>>
where K: Borrow<Keypair>
{
    /// Initialize a collective signing session with fresh randomness
    /// from the operating system.
    #[cfg(feature = "getrandom")]
    pub fn new(keypair: K, key_set: KeySet) -> SignatureResult<CoSig<CommitStage<K>>> {
        CoSig::new_with_commitment(keypair, key_set, CommitmentPair::generate())
    }

    /// Initialize a collective signing session with commitment
    /// randomness from `csprng`.
    pub fn new_with_rng<R>(keypair: K, key_set: KeySet, csprng: R) -> SignatureResult<CoSig<CommitStage<K>>>
    where R: CryptoRng + RngCore,
    {
        CoSig::new_with_commitment(keypair, key_set, CommitmentPair::generate_with(csprng))
    }

    /// Initialize a collective signing session using a commitment
    /// created by `CommitmentPair::from_randomness`.
    ///
    /// Fails with `UnknownCosigner` if our public key lies outside `key_set`.
    #[allow(non_snake_case)]
    pub fn new_with_commitment(keypair: K, key_set: KeySet, pair: CommitmentPair)
     -> SignatureResult<CoSig<CommitStage<K>>>
    {
        let position = key_set.position(&keypair.borrow().public)
            .ok_or(SignatureError::UnknownCosigner)?;
        let (secret, commitment) = pair.into_parts();

        let mut Rs = Vec::with_capacity(key_set.len());
        Rs.resize(key_set.len(), CoR::Absent);
        Rs[position] = CoR::Commit { R: commitment };

        tracing::debug!(cosigners = key_set.len(), position, "started collective signing session");
        let stage = CommitStage { keypair, position, commitment };
        Ok(CoSig { key_set, Rs, secret: Some(secret), aborted: None, stage })
    }

    /// Our commitment `R_i` to send to all other cosigners
    pub fn our_commitment(&self) -> Commitment {
        self.stage.commitment
    }

    /// Include another cosigner's commitment.
    ///
    /// Repeating a commitment is harmless, but a different commitment from
    /// the same cosigner aborts the session with `CosignerInconsistent`.
    pub fn add_their_commitment(&mut self, them: &PublicKey, theirs: Commitment)
     -> SignatureResult<()>
    {
        self.check_aborted()?;
        let position = self.position(them)?;
        if let Err(e) = self.Rs[position].set_committed(theirs) {
            tracing::warn!(position, "cosigner sent conflicting commitments");
            return Err(self.abort(e));
        }
        if self.missing_commitments().next().is_none() {
            tracing::debug!(cosigners = self.key_set.len(), "received all commitments");
        }
        Ok(())
    }

    /// Commitment to cosign stage transition, computing our partial
    /// signature on `message`.
    ///
    /// Fails with the abort reason if the session was aborted, and with
    /// `CosignerAbsent` if any commitment is missing.  Either way the
    /// session ends and our secret commitment is erased.
    #[allow(non_snake_case)]
    pub fn cosign_stage(mut self, message: &[u8]) -> SignatureResult<CoSig<CosignStage>> {
        self.check_aborted()?;
        let R = self.compute_R(MultiSignatureStage::Commitment)?;
        let c = challenge_scalar(R.as_compressed(), self.public_key().as_compressed(), message);
        let secret = self.secret.take()
            .ok_or(SignatureError::CosignerAbsent { stage: MultiSignatureStage::Commitment })?;

        let CoSig { key_set, mut Rs, stage: CommitStage { keypair, position, commitment }, .. } = self;
        let keypair: &Keypair = keypair.borrow();
        let delinearized = key_set.hash().delinearize_secret_key(&keypair.public, &keypair.secret);
        let s_me = partial_sign_with_challenge(&c, secret, &delinearized);
        Rs[position] = CoR::Cosigned { R: commitment, s: s_me };

        tracing::debug!(position, "computed collective challenge and partial signature");
        Ok(CoSig { key_set, Rs, secret: None, aborted: None, stage: CosignStage { R, c, s_me }, })
    }
}

/// Cosign stage, in which cosigners exchange their `s_i`
#[allow(non_snake_case)]
pub struct CosignStage {
    /// Aggregate commitment `R_agg`
    R: Commitment,
    /// Challenge `c = H(R_agg || P_agg || M)`
    c: Scalar,
    /// Our `s_i` contribution
    s_me: PartialSignature,
}

impl CoSig<CosignStage> {
    /// Our partial signature to send to all other cosigners
    pub fn our_partial_signature(&self) -> PartialSignature {
        self.stage.s_me
    }

    /// The aggregate commitment `R_agg` that begins the signature
    pub fn aggregate_commitment(&self) -> Commitment {
        self.stage.R
    }

    /// Include another cosigner's partial signature, after checking it
    /// against their commitment and delinearized public key.
    ///
    /// An invalid partial signature aborts the session with
    /// `InvalidPartialSignature`, and one differing from a partial
    /// signature they already sent aborts it with `CosignerInconsistent`.
    #[allow(non_snake_case)]
    pub fn add_their_partial_signature(&mut self, them: &PublicKey, theirs: PartialSignature)
     -> SignatureResult<()>
    {
        self.check_aborted()?;
        let position = self.position(them)?;
        if let CoR::Commit { R } = self.Rs[position] {
            let delinearized = self.key_set.delinearized_public_key(position)
                .ok_or(SignatureError::UnknownCosigner)?;
            if !check_partial_signature(&self.stage.c, &R, delinearized, &theirs) {
                tracing::warn!(position, "rejected invalid partial signature");
                return Err(self.abort(SignatureError::InvalidPartialSignature));
            }
        }
        if let Err(e) = self.Rs[position].set_cosigned(theirs) {
            tracing::warn!(position, "cosigner sent conflicting partial signatures");
            return Err(self.abort(e));
        }
        Ok(())
    }

    /// Iterates over the cosigners whose partial signatures we hold.
    pub fn cosigned(&self) -> impl Iterator<Item = &PublicKey> {
        self.key_set.iter().zip(self.Rs.iter())
            .filter_map(|(pk, cor)| match cor {
                CoR::Cosigned { .. } => Some(pk),
                _ => None,
            })
    }

    /// Iterates over the cosigners whose partial signatures remain missing.
    pub fn uncosigned(&self) -> impl Iterator<Item = &PublicKey> {
        self.key_set.iter().zip(self.Rs.iter())
            .filter_map(|(pk, cor)| match cor {
                CoR::Cosigned { .. } => None,
                _ => Some(pk),
            })
    }

    /// Actually computes the collective signature, failing with the
    /// abort reason if the session was aborted, or with `CosignerAbsent`
    /// if any partial signature remains missing.
    pub fn sign(&self) -> SignatureResult<Signature> {
        self.check_aborted()?;
        let stage = MultiSignatureStage::Cosignature;
        let partials = self.Rs.iter()
            .map(|cor| match cor {
                CoR::Cosigned { s, .. } => Ok(s),
                _ => Err(SignatureError::CosignerAbsent { stage }),
            })
            .collect::<SignatureResult<Vec<&PartialSignature>>>()?;

        tracing::debug!(cosigners = partials.len(), "assembled collective signature");
        Ok(Signature::from_partial_signatures(&self.stage.R, partials))
    }
}


/// Initialize a collector of partial signatures on `message` who does
/// not themselves cosign.
#[allow(non_snake_case)]
pub fn collect_partial_signatures(key_set: KeySet, message: &[u8]) -> CoSig<CollectStage> {
    let mut Rs = Vec::with_capacity(key_set.len());
    Rs.resize(key_set.len(), CoR::Absent);
    CoSig { key_set, Rs, secret: None, aborted: None, stage: CollectStage { message: message.to_vec() }, }
}

/// Stage for collectors of partial signatures who do not themselves cosign.
pub struct CollectStage {
    message: Vec<u8>,
}

impl CoSig<CollectStage> {
    /// Adds a cosigner's commitment and partial signature.
    ///
    /// We check partial signatures only in `signature`, since the
    /// challenge depends upon every commitment.  A contribution differing
    /// from one already added aborts collection with `CosignerInconsistent`.
    pub fn add(&mut self, them: &PublicKey, their_commitment: Commitment, their_partial: PartialSignature)
     -> SignatureResult<()>
    {
        self.check_aborted()?;
        let position = self.position(them)?;
        let cor = CoR::Cosigned { R: their_commitment, s: their_partial };
        match self.Rs[position] {
            CoR::Absent => {
                self.Rs[position] = cor;
                Ok(())
            },
            old => if old == cor { Ok(()) } else {
                tracing::warn!(position, "cosigner sent conflicting contributions");
                let stage = MultiSignatureStage::Cosignature;
                Err(self.abort(SignatureError::CosignerInconsistent { stage, duplicate: true, }))
            },
        }
    }

    /// Actually computes the collected signature.
    ///
    /// Fails with `CosignerAbsent` if any cosigner remains missing, and with
    /// `InvalidPartialSignature` if any partial signature fails its check.
    /// As contributions cannot be replaced, an invalid one fails every
    /// later call too.
    #[allow(non_snake_case)]
    pub fn signature(&self) -> SignatureResult<Signature> {
        self.check_aborted()?;
        let R = self.compute_R(MultiSignatureStage::Cosignature)?;
        let c = challenge_scalar(R.as_compressed(), self.public_key().as_compressed(), &self.stage.message);

        let mut partials = Vec::with_capacity(self.Rs.len());
        for (position, cor) in self.Rs.iter().enumerate() {
            let (R_i, s_i) = match cor {
                CoR::Cosigned { R, s } => (R, s),
                _ => return Err(SignatureError::CosignerAbsent { stage: MultiSignatureStage::Cosignature }),
            };
            let delinearized = self.key_set.delinearized_public_key(position)
                .ok_or(SignatureError::UnknownCosigner)?;
            if !check_partial_signature(&c, R_i, delinearized, s_i) {
                tracing::warn!(position, "rejected invalid partial signature");
                return Err(SignatureError::InvalidPartialSignature);
            }
            partials.push(s_i);
        }

        Ok(Signature::from_partial_signatures(&R, partials))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::MiniSecretKey;

    fn seeded_keypair(last: u8) -> Keypair {
        let mut seed = [0u8; 32];
        seed[31] = last;
        MiniSecretKey::from_bytes(&seed).unwrap().expand_to_keypair()
    }

    fn session(keypairs: &[Keypair]) -> CoSig<CommitStage<&Keypair>> {
        let key_set = KeySet::new(keypairs.iter().map(|k| k.public).collect()).unwrap();
        let pair = CommitmentPair::from_randomness(&[0x11; 32]).unwrap();
        CoSig::new_with_commitment(&keypairs[0], key_set, pair).unwrap()
    }

    #[test]
    fn abort_erases_our_secret_commitment() {
        let keypairs = [seeded_keypair(1), seeded_keypair(2)];
        let reversed = KeySet::new(vec![keypairs[1].public, keypairs[0].public]).unwrap();

        let mut mismatched = session(&keypairs);
        assert!(mismatched.secret.is_some());
        assert_eq!(mismatched.check_key_set_hash(reversed.hash()), Err(SignatureError::KeySetMismatch));
        assert!(mismatched.secret.is_none());
        assert_eq!(mismatched.aborted(), Some(SignatureError::KeySetMismatch));

        let mut equivocated = session(&keypairs);
        let a = CommitmentPair::from_randomness(&[0x22; 32]).unwrap();
        let b = CommitmentPair::from_randomness(&[0x33; 32]).unwrap();
        equivocated.add_their_commitment(&keypairs[1].public, *a.commitment()).unwrap();
        assert!(equivocated.add_their_commitment(&keypairs[1].public, *b.commitment()).is_err());
        assert!(equivocated.secret.is_none());

        // Strangers are rejected without harming the session.
        let mut intact = session(&keypairs);
        let stranger = seeded_keypair(3);
        assert_eq!(
            intact.add_their_commitment(&stranger.public, *a.commitment()),
            Err(SignatureError::UnknownCosigner)
        );
        assert!(intact.secret.is_some());
        assert_eq!(intact.aborted(), None);
    }
}
