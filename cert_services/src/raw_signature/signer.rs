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

use crate::{
    certificate::{self, CertificateBlob},
    CertificateServiceError, HashAlgorithm,
};

/// Implementations of the `Signer` trait generate a signature over a
/// precomputed hash using the private key that travels with a certificate.
pub trait Signer: Send + Sync {
    /// Return a signature over `hash`.
    ///
    /// `certificate` must carry a private key (see [`crate::certificate`] for
    /// the accepted blob forms). `hash_alg` names the digest algorithm that
    /// produced `hash`.
    ///
    /// Fails with [`CertificateServiceError::MissingPrivateKey`] if the
    /// certificate carries no usable private key.
    fn sign(
        &self,
        certificate: &[u8],
        hash: &[u8],
        hash_alg: &str,
    ) -> Result<Vec<u8>, CertificateServiceError>;

    /// Return the certificate in DER format with all private key material
    /// removed.
    fn strip_private_key(&self, certificate: &[u8]) -> Result<Vec<u8>, CertificateServiceError>;
}

/// Implements [`Signer`] using the `rsa` crate's implementation of
/// RSASSA-PKCS1-v1_5.
#[derive(Clone, Copy, Debug, Default)]
pub struct RsaSigner {}

impl RsaSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self {}
    }
}

impl Signer for RsaSigner {
    fn sign(
        &self,
        certificate: &[u8],
        hash: &[u8],
        hash_alg: &str,
    ) -> Result<Vec<u8>, CertificateServiceError> {
        let blob = CertificateBlob::parse(certificate)?;
        let private_key = blob.rsa_private_key()?;

        let hash_alg: HashAlgorithm = hash_alg.parse()?;
        hash_alg.check_hash_len(hash)?;

        // The RNG is only used for blinding; PKCS#1 v1.5 output is
        // deterministic.
        let mut rng = rand::thread_rng();
        Ok(private_key.sign_with_rng(&mut rng, hash_alg.pkcs1v15(), hash)?)
    }

    fn strip_private_key(&self, certificate: &[u8]) -> Result<Vec<u8>, CertificateServiceError> {
        certificate::strip_private_key(certificate)
    }
}
