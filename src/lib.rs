// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2017-2019 Isis Lovecruft and Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Isis Agora Lovecruft <isis@patternsinthevoid.net>
// - Jeff Burdges <jeff@web3.foundation>

//! Ed25519 signatures, and n-of-n collective Ed25519 signatures using
//! delinearized public keys.
//!
//! # Example
//!
//! Creating an Ed25519 signature on a message is simple.
//!
//! First, we need to generate a `Keypair`, which includes both public
//! and secret halves of an asymmetric key.  To do so, we need a
//! cryptographically secure pseudorandom number generator (CSPRNG).
//! For this example, we'll use the operating system's builtin PRNG:
//!
//! ```
//! use ed25519_cosi::{Keypair, Signature, PublicKey};
//!
//! let keypair: Keypair = Keypair::generate_with(rand::thread_rng());
//!
//! let message: &[u8] = b"This is a test of the tsunami alert system.";
//! let signature: Signature = keypair.sign(message);
//!
//! let public_key: PublicKey = keypair.public;
//! assert!(public_key.verify(message, &signature));
//! ```
//!
//! These signatures follow RFC 8032 exactly, so any Ed25519 library
//! verifies them, and we verify theirs.
//!
//! # Collective signatures
//!
//! Several cosigners may jointly sign one message, producing a single
//! Ed25519 signature which verifies against their aggregate public key.
//! See the `cosi` module for the protocol.
//!
//! ```
//! use ed25519_cosi::{Keypair, cosi::{CoSig, KeySet}};
//!
//! let mut csprng = rand::thread_rng();
//! let keypairs: Vec<Keypair> = (0..3).map(|_| Keypair::generate_with(&mut csprng)).collect();
//! let key_set = KeySet::new(keypairs.iter().map(|k| k.public).collect()).unwrap();
//! let message: &[u8] = b"We are legion!";
//!
//! let mut commits: Vec<_> = keypairs.iter()
//!     .map(|k| CoSig::new_with_rng(k, key_set.clone(), &mut csprng).unwrap())
//!     .collect();
//! let commitments: Vec<_> = commits.iter().map(|c| c.our_commitment()).collect();
//! for c in commits.iter_mut() {
//!     for (k, r) in keypairs.iter().zip(commitments.iter()) {
//!         c.add_their_commitment(&k.public, *r).unwrap();
//!     }
//! }
//!
//! let mut cosigns: Vec<_> = commits.into_iter()
//!     .map(|c| c.cosign_stage(message).unwrap())
//!     .collect();
//! let partials: Vec<_> = cosigns.iter().map(|c| c.our_partial_signature()).collect();
//! for c in cosigns.iter_mut() {
//!     for (k, s) in keypairs.iter().zip(partials.iter()) {
//!         c.add_their_partial_signature(&k.public, *s).unwrap();
//!     }
//! }
//!
//! let signature = cosigns[0].sign().unwrap();
//! assert!(key_set.aggregate_public_key().verify(message, &signature));
//! ```
//!
//! # Serialisation
//!
//! `PublicKey`s, `Signature`s, and the collective protocol's messages can
//! be serialised with any format supported by serde, if you enable the
//! `serde` feature.  We serialise everything as its byte encoding.

#![no_std]
#![warn(future_incompatible)]
#![warn(rust_2018_compatibility)]
#![warn(rust_2018_idioms)]
#![deny(missing_docs)] // refuse to compile if documentation is missing

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "getrandom")]
fn getrandom_or_panic() -> impl rand_core::RngCore + rand_core::CryptoRng {
    ::getrandom_or_panic::getrandom_or_panic()
}

#[macro_use]
mod serdey;

mod points;
mod scalars;
pub mod keys;
pub mod sign;
pub mod errors;

#[cfg(feature = "alloc")]
pub mod cosi;

pub use crate::keys::*; // {MiniSecretKey,SecretKey,PublicKey,Keypair}; + *_LENGTH
pub use crate::sign::{Signature, SIGNATURE_LENGTH};
pub use crate::errors::{SignatureError, SignatureResult};
