#![warn(missing_docs)]

//! This module defines the identifier of a position on the ring.
//!
//! A [Did] is an element of the finite ring R(P) where P = 2^160, represented as a wrapper
//! of H160 (\[u8; 20\]). Identifiers of peers are the SHA-1 digest of `host:port`, and any
//! other value is placed on the same ring through [Did::hash].
//!
//! Addition and negation wrap modulo 2^160, so `did + Did::pow2(k)` is exactly the start of
//! the k-th finger interval. Plain ordering of two dids is the numeric ordering of their
//! big-endian bytes; it says nothing about clockwise order, use
//! [Interval](super::interval::Interval) for that.

use std::ops::Add;
use std::ops::Deref;
use std::ops::Neg;
use std::ops::Sub;
use std::str::FromStr;

use ethereum_types::H160;
use num_bigint::BigUint;
use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use sha1::Digest;
use sha1::Sha1;

use crate::consts::ID_BITS;
use crate::error::Error;
use crate::error::Result;

/// Did is a finite Ring R(P) where P = 2^160, wrap H160.
#[derive(Copy, Clone, Eq, Ord, PartialEq, PartialOrd, Hash, Default)]
pub struct Did(H160);

impl Did {
    /// Place an arbitrary value on the ring with SHA-1.
    pub fn hash(value: &str) -> Self {
        let digest = Sha1::digest(value.as_bytes());
        Self(H160::from_slice(digest.as_slice()))
    }

    /// 2^exponent wrapped into the ring.
    pub fn pow2(exponent: u32) -> Self {
        Self::from(BigUint::from(2u16).pow(exponent))
    }

    fn modulus() -> BigUint {
        BigUint::from(2u16).pow(ID_BITS as u32)
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let inner = &self.0;
        write!(f, "{inner:x}")
    }
}

impl std::fmt::Debug for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Did({self})")
    }
}

impl Deref for Did {
    type Target = H160;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Did> for H160 {
    fn from(a: Did) -> Self {
        a.0
    }
}

impl From<H160> for Did {
    fn from(addr: H160) -> Self {
        Self(addr)
    }
}

impl From<Did> for BigUint {
    fn from(did: Did) -> BigUint {
        BigUint::from_bytes_be(did.as_bytes())
    }
}

impl From<BigUint> for Did {
    fn from(a: BigUint) -> Self {
        let ff = a % Did::modulus();
        let mut va: Vec<u8> = ff.to_bytes_be();
        let mut res = vec![0u8; 20 - va.len()];
        res.append(&mut va);
        Self(H160::from_slice(&res))
    }
}

impl From<u32> for Did {
    fn from(id: u32) -> Did {
        Self::from(BigUint::from(id))
    }
}

impl FromStr for Did {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        if trimmed.len() != ID_BITS / 4 {
            return Err(Error::InvalidDid(s.to_string()));
        }
        H160::from_str(trimmed)
            .map(Self)
            .map_err(|_| Error::InvalidDid(s.to_string()))
    }
}

impl Serialize for Did {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        Did::from_str(&s).map_err(de::Error::custom)
    }
}

// impl Finite Ring For Did
impl Neg for Did {
    type Output = Self;
    fn neg(self) -> Self {
        let ret = Did::modulus() - BigUint::from(self);
        ret.into()
    }
}

impl<'a> Neg for &'a Did {
    type Output = Did;

    fn neg(self) -> Self::Output {
        (*self).neg()
    }
}

impl Add for Did {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        (BigUint::from(self) + BigUint::from(rhs)).into()
    }
}

impl Sub for Did {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}
