// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Digest algorithms that may be named when signing or verifying a hash.

use std::{fmt, str::FromStr};

use rsa::Pkcs1v15Sign;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::CertificateServiceError;

/// Describes the digest algorithm that produced a precomputed hash.
///
/// The signing and verification services never hash the payload themselves;
/// they receive the digest together with the name (or OID) of the algorithm
/// that produced it. That name selects the `DigestInfo` prefix used by the
/// RSASSA-PKCS1-v1_5 encoding.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HashAlgorithm {
    /// SHA-1 (legacy; still used by older payment requests)
    Sha1,

    /// SHA-256
    Sha256,

    /// SHA-384
    Sha384,

    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Return the length in bytes of a digest produced by this algorithm.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Return the object identifier of this algorithm in dotted-decimal form.
    pub fn oid(&self) -> &'static str {
        match self {
            Self::Sha1 => SHA1_OID,
            Self::Sha256 => SHA256_OID,
            Self::Sha384 => SHA384_OID,
            Self::Sha512 => SHA512_OID,
        }
    }

    /// Given a byte slice, return the digest of that content.
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Return an error unless `hash` has the length of this algorithm's
    /// digest.
    pub(crate) fn check_hash_len(&self, hash: &[u8]) -> Result<(), CertificateServiceError> {
        if hash.len() == self.output_len() {
            Ok(())
        } else {
            Err(CertificateServiceError::InvalidHashLength {
                expected: self.output_len(),
                actual: hash.len(),
            })
        }
    }

    /// PKCS#1 v1.5 signature scheme carrying this algorithm's `DigestInfo`
    /// prefix.
    pub(crate) fn pkcs1v15(&self) -> Pkcs1v15Sign {
        match self {
            Self::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            Self::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            Self::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            Self::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = CertificateServiceError;

    /// Accepts the algorithm name in any case, with or without a hyphen
    /// (`"SHA256"`, `"sha-256"`), or its OID in dotted-decimal form.
    fn from_str(alg: &str) -> Result<Self, Self::Err> {
        let normalized = alg.trim().to_ascii_lowercase().replace('-', "");

        match normalized.as_str() {
            "sha1" | SHA1_OID => Ok(Self::Sha1),
            "sha256" | SHA256_OID => Ok(Self::Sha256),
            "sha384" | SHA384_OID => Ok(Self::Sha384),
            "sha512" | SHA512_OID => Ok(Self::Sha512),
            _ => Err(CertificateServiceError::UnknownHashAlgorithm(
                alg.to_owned(),
            )),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                Self::Sha1 => "SHA1",
                Self::Sha256 => "SHA256",
                Self::Sha384 => "SHA384",
                Self::Sha512 => "SHA512",
            }
        )
    }
}

const SHA1_OID: &str = "1.3.14.3.2.26";
const SHA256_OID: &str = "2.16.840.1.101.3.4.2.1";
const SHA384_OID: &str = "2.16.840.1.101.3.4.2.2";
const SHA512_OID: &str = "2.16.840.1.101.3.4.2.3";
