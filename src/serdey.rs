// -*- mode: rust; -*-
//
// This file is part of ed25519-cosi.
// Copyright (c) 2019 Web 3 Foundation
// See LICENSE for licensing information.
//
// Authors:
// - Jeff Burdges <jeff@web3.foundation>

//! ### Various and tooling for serde

#[cfg(feature = "serde")]
macro_rules! serde_boilerplate { ($t:ty) => {
impl ::serde_crate::Serialize for $t {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: ::serde_crate::Serializer {
        let bytes = &self.to_bytes()[..];
        ::serde_crate::Serialize::serialize(::serde_bytes::Bytes::new(bytes), serializer)
    }
}

impl<'d> ::serde_crate::Deserialize<'d> for $t {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: ::serde_crate::Deserializer<'d> {
        ::cfg_if::cfg_if!{
            if #[cfg(feature = "alloc")] {
                let bytes = <::serde_bytes::ByteBuf as ::serde_crate::Deserialize<'d>>::deserialize(deserializer)?;
            } else {
                let bytes = <&'d ::serde_bytes::Bytes as ::serde_crate::Deserialize<'d>>::deserialize(deserializer)?;
            }
        }

        Self::from_bytes(bytes.as_ref())
        .map_err(crate::errors::serde_error_from_signature_error)
    }
}
} } // macro_rules! serde_boilerplate

#[cfg(not(feature = "serde"))]
macro_rules! serde_boilerplate { ($t:ty) => { } }
