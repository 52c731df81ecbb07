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

//! Verification of the signature on a certificate under its issuer's key.
//!
//! Certificates in a chain may be signed with RSASSA-PKCS1-v1_5 or with ECDSA
//! over P-256 or P-384, independent of the key type of the target
//! certificate.

use ecdsa::signature::hazmat::PrehashVerifier;
use p256::pkcs8::DecodePublicKey;
use x509_parser::{certificate::X509Certificate, der_parser::oid, oid_registry::Oid};

use crate::{certificate, HashAlgorithm};

/// Return `true` if `cert`'s signature verifies under `issuer`'s public key.
///
/// Unsupported signature algorithms never verify.
pub(crate) fn signature_verifies(
    cert: &X509Certificate<'_>,
    issuer: &X509Certificate<'_>,
) -> bool {
    let alg = &cert.signature_algorithm.algorithm;
    let tbs: &[u8] = cert.tbs_certificate.as_ref();
    let signature: &[u8] = cert.signature_value.as_ref();

    if let Some(hash_alg) = rsa_signature_hash(alg) {
        let Ok(issuer_key) = certificate::rsa_public_key(issuer) else {
            return false;
        };

        return issuer_key
            .verify(hash_alg.pkcs1v15(), &hash_alg.hash(tbs), signature)
            .is_ok();
    }

    if let Some(hash_alg) = ecdsa_signature_hash(alg) {
        return ecdsa_verifies(issuer.public_key().raw, &hash_alg.hash(tbs), signature);
    }

    false
}

fn rsa_signature_hash(alg: &Oid<'_>) -> Option<HashAlgorithm> {
    if *alg == SHA1_WITH_RSA_ENCRYPTION_OID {
        Some(HashAlgorithm::Sha1)
    } else if *alg == SHA256_WITH_RSA_ENCRYPTION_OID {
        Some(HashAlgorithm::Sha256)
    } else if *alg == SHA384_WITH_RSA_ENCRYPTION_OID {
        Some(HashAlgorithm::Sha384)
    } else if *alg == SHA512_WITH_RSA_ENCRYPTION_OID {
        Some(HashAlgorithm::Sha512)
    } else {
        None
    }
}

fn ecdsa_signature_hash(alg: &Oid<'_>) -> Option<HashAlgorithm> {
    if *alg == ECDSA_WITH_SHA256_OID {
        Some(HashAlgorithm::Sha256)
    } else if *alg == ECDSA_WITH_SHA384_OID {
        Some(HashAlgorithm::Sha384)
    } else if *alg == ECDSA_WITH_SHA512_OID {
        Some(HashAlgorithm::Sha512)
    } else {
        None
    }
}

/// `spki` is the issuer's DER `SubjectPublicKeyInfo`; the curve is taken from
/// it. Certificate signatures are DER-encoded `Ecdsa-Sig-Value`s.
fn ecdsa_verifies(spki: &[u8], digest: &[u8], signature: &[u8]) -> bool {
    if let Ok(vk) = p256::ecdsa::VerifyingKey::from_public_key_der(spki) {
        let Ok(signature) = p256::ecdsa::Signature::from_der(signature) else {
            return false;
        };

        return vk.verify_prehash(digest, &signature).is_ok();
    }

    if let Ok(vk) = p384::ecdsa::VerifyingKey::from_public_key_der(spki) {
        let Ok(signature) = p384::ecdsa::Signature::from_der(signature) else {
            return false;
        };

        return vk.verify_prehash(digest, &signature).is_ok();
    }

    false
}

const SHA1_WITH_RSA_ENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .5);
const SHA256_WITH_RSA_ENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .11);
const SHA384_WITH_RSA_ENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .12);
const SHA512_WITH_RSA_ENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .13);

const ECDSA_WITH_SHA256_OID: Oid<'static> = oid!(1.2.840 .10045 .4 .3 .2);
const ECDSA_WITH_SHA384_OID: Oid<'static> = oid!(1.2.840 .10045 .4 .3 .3);
const ECDSA_WITH_SHA512_OID: Oid<'static> = oid!(1.2.840 .10045 .4 .3 .4);
