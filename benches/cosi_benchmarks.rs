// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

mod cosi_benches {
    use super::*;
    use ed25519_cosi::Keypair;
    use ed25519_cosi::cosi::{
        aggregate_commitments, partial_sign, CommitmentPair, KeySet, PartialSignature,
    };
    use rand::prelude::*; // ThreadRng,thread_rng

    static SIZES: [usize; 5] = [2, 4, 8, 16, 64];

    fn keypairs(size: usize) -> Vec<Keypair> {
        let mut csprng: ThreadRng = thread_rng();
        (0..size).map(|_| Keypair::generate_with(&mut csprng)).collect()
    }

    fn key_set(c: &mut Criterion) {
        let mut group = c.benchmark_group("CoSi key set hashing and delinearization");
        for size in SIZES.iter() {
            let public_keys: Vec<_> = keypairs(*size).iter().map(|k| k.public).collect();
            group.bench_with_input(BenchmarkId::from_parameter(size), &public_keys, |b, public_keys| {
                b.iter(|| KeySet::new(public_keys.clone()).unwrap())
            });
        }
        group.finish();
    }

    fn commitment(c: &mut Criterion) {
        let mut csprng: ThreadRng = thread_rng();

        c.bench_function("CoSi commitment generation", move |b| {
                         b.iter(| | CommitmentPair::generate_with(&mut csprng))
        });
    }

    fn partial_signing(c: &mut Criterion) {
        let signers = keypairs(16);
        let key_set = KeySet::new(signers.iter().map(|k| k.public).collect()).unwrap();
        let mut csprng: ThreadRng = thread_rng();
        let msg: &[u8] = b"We are legion!";

        c.bench_function("CoSi partial signing", move |b| {
            b.iter_batched(
                || {
                    let (secret, commitment) = CommitmentPair::generate_with(&mut csprng).into_parts();
                    (secret, aggregate_commitments(&[commitment]))
                },
                |(secret, aggregate)| partial_sign(msg, &aggregate, secret, &key_set, &signers[0]).unwrap(),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    fn collect(c: &mut Criterion) {
        let mut group = c.benchmark_group("CoSi signature assembly and verification");
        for size in SIZES.iter() {
            let signers = keypairs(*size);
            let key_set = KeySet::new(signers.iter().map(|k| k.public).collect()).unwrap();
            let msg: &[u8] = b"We are legion!";

            let pairs: Vec<_> = signers.iter().map(|_| CommitmentPair::generate_with(thread_rng())).collect();
            let commitments: Vec<_> = pairs.iter().map(|p| *p.commitment()).collect();
            let aggregate = aggregate_commitments(&commitments);
            let partials: Vec<PartialSignature> = pairs.into_iter().zip(signers.iter())
                .map(|(pair, k)| partial_sign(msg, &aggregate, pair.into_parts().0, &key_set, k).unwrap())
                .collect();

            group.bench_with_input(BenchmarkId::from_parameter(size), &partials, |b, partials| {
                b.iter(|| {
                    let signature = ed25519_cosi::Signature::from_partial_signatures(&aggregate, partials);
                    key_set.aggregate_public_key().verify(msg, &signature)
                })
            });
        }
        group.finish();
    }

    criterion_group!{
        name = cosi_benches;
        config = Criterion::default();
        targets =
            key_set,
            commitment,
            partial_signing,
            collect,
    }
}

criterion_main!(
    cosi_benches::cosi_benches,
);
