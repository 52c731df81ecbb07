// Copyright 2024 Adobe. All rights reserved.
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

use crate::{certificate::CertificateBlob, CertificateServiceError, HashAlgorithm};

/// A `SignatureChecker` implementation checks a signature over a precomputed
/// hash using the public key of an X.509 certificate.
pub trait SignatureChecker: Send + Sync {
    /// Return `Ok(true)` if `signature` is a valid signature of `hash` under
    /// the public key of `certificate`.
    ///
    /// `hash_alg` names the digest algorithm that produced `hash`, either by
    /// name (`"SHA256"`) or by OID. A signature that does not match is
    /// reported as `Ok(false)`; errors are reserved for input that cannot be
    /// verified at all.
    fn verify_signature(
        &self,
        certificate: &[u8],
        hash: &[u8],
        hash_alg: &str,
        signature: &[u8],
    ) -> Result<bool, CertificateServiceError>;
}

/// Verifies RSASSA-PKCS1-v1_5 signatures using the RSA key found in the
/// certificate's `SubjectPublicKeyInfo`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RsaSignatureChecker {}

impl RsaSignatureChecker {
    /// Create a new signature checker.
    pub fn new() -> Self {
        Self {}
    }
}

impl SignatureChecker for RsaSignatureChecker {
    fn verify_signature(
        &self,
        certificate: &[u8],
        hash: &[u8],
        hash_alg: &str,
        signature: &[u8],
    ) -> Result<bool, CertificateServiceError> {
        let hash_alg: HashAlgorithm = hash_alg.parse()?;
        hash_alg.check_hash_len(hash)?;

        let public_key = CertificateBlob::parse(certificate)?.rsa_public_key()?;

        Ok(public_key
            .verify(hash_alg.pkcs1v15(), hash, signature)
            .is_ok())
    }
}
