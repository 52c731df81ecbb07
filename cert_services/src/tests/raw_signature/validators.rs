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

use crate::{
    raw_signature::{RsaSignatureChecker, RsaSigner, SignatureChecker, Signer},
    tests::fixtures::{ed25519_self_signed, CertBuilder, TestCert},
    CertificateServiceError, HashAlgorithm,
};

const SAMPLE_DATA: &[u8] = b"some sample payment request to sign";

fn signed_sample(cert: &TestCert) -> (Vec<u8>, Vec<u8>) {
    let hash = HashAlgorithm::Sha256.hash(SAMPLE_DATA);
    let signature = RsaSigner::new()
        .sign(&cert.der_with_private_key(), &hash, "SHA256")
        .unwrap();

    (hash, signature)
}

#[test]
fn valid_signature() {
    let cert = CertBuilder::end_entity("Validator", 0).self_signed();
    let (hash, signature) = signed_sample(&cert);

    assert!(RsaSignatureChecker::new()
        .verify_signature(&cert.der, &hash, "SHA256", &signature)
        .unwrap());
}

#[test]
fn hash_alg_by_oid() {
    let cert = CertBuilder::end_entity("Validator OID", 0).self_signed();
    let (hash, signature) = signed_sample(&cert);

    assert!(RsaSignatureChecker::new()
        .verify_signature(&cert.der, &hash, HashAlgorithm::Sha256.oid(), &signature)
        .unwrap());
}

#[test]
fn certificate_with_private_key() {
    let cert = CertBuilder::end_entity("Validator key", 0).self_signed();
    let (hash, signature) = signed_sample(&cert);

    assert!(RsaSignatureChecker::new()
        .verify_signature(&cert.der_with_private_key(), &hash, "SHA256", &signature)
        .unwrap());
}

#[test]
fn bad_signature() {
    let cert = CertBuilder::end_entity("Validator", 0).self_signed();
    let (hash, signature) = signed_sample(&cert);
    let checker = RsaSignatureChecker::new();

    for index in 0..signature.len() {
        for bit in 0..8 {
            let mut tampered = signature.clone();
            tampered[index] ^= 1 << bit;

            assert!(!checker
                .verify_signature(&cert.der, &hash, "SHA256", &tampered)
                .unwrap());
        }
    }
}

#[test]
fn bad_hash() {
    let cert = CertBuilder::end_entity("Validator", 0).self_signed();
    let (mut hash, signature) = signed_sample(&cert);

    hash[0] ^= 0x80;

    assert!(!RsaSignatureChecker::new()
        .verify_signature(&cert.der, &hash, "SHA256", &signature)
        .unwrap());
}

#[test]
fn truncated_signature() {
    let cert = CertBuilder::end_entity("Validator", 0).self_signed();
    let (hash, signature) = signed_sample(&cert);

    assert!(!RsaSignatureChecker::new()
        .verify_signature(&cert.der, &hash, "SHA256", &signature[1..])
        .unwrap());
}

#[test]
fn wrong_certificate() {
    let signing_cert = CertBuilder::end_entity("Signer", 0).self_signed();
    let other_cert = CertBuilder::end_entity("Other", 1).self_signed();
    let (hash, signature) = signed_sample(&signing_cert);

    assert!(!RsaSignatureChecker::new()
        .verify_signature(&other_cert.der, &hash, "SHA256", &signature)
        .unwrap());
}

#[test]
fn wrong_hash_alg() {
    let cert = CertBuilder::end_entity("Validator", 0).self_signed();
    let (_, signature) = signed_sample(&cert);

    let hash = HashAlgorithm::Sha384.hash(SAMPLE_DATA);

    assert!(!RsaSignatureChecker::new()
        .verify_signature(&cert.der, &hash, "SHA384", &signature)
        .unwrap());
}

#[test]
fn invalid_hash_length() {
    let cert = CertBuilder::end_entity("Validator", 0).self_signed();
    let (hash, signature) = signed_sample(&cert);

    assert_eq!(
        RsaSignatureChecker::new()
            .verify_signature(&cert.der, &hash, "SHA512", &signature)
            .unwrap_err(),
        CertificateServiceError::InvalidHashLength {
            expected: 64,
            actual: 32
        }
    );
}

#[test]
fn unknown_hash_alg() {
    let cert = CertBuilder::end_entity("Validator", 0).self_signed();
    let (hash, signature) = signed_sample(&cert);

    assert!(matches!(
        RsaSignatureChecker::new()
            .verify_signature(&cert.der, &hash, "whirlpool", &signature)
            .unwrap_err(),
        CertificateServiceError::UnknownHashAlgorithm(_)
    ));
}

#[test]
fn non_rsa_certificate() {
    let cert = ed25519_self_signed();
    let hash = HashAlgorithm::Sha256.hash(SAMPLE_DATA);

    assert!(matches!(
        RsaSignatureChecker::new()
            .verify_signature(&cert.der, &hash, "SHA256", &[0u8; 64])
            .unwrap_err(),
        CertificateServiceError::UnsupportedKeyType(_)
    ));
}

#[test]
fn unparseable_certificate() {
    let hash = HashAlgorithm::Sha256.hash(SAMPLE_DATA);

    assert!(matches!(
        RsaSignatureChecker::new()
            .verify_signature(b"garbage", &hash, "SHA256", &[0u8; 128])
            .unwrap_err(),
        CertificateServiceError::ParseError(_)
    ));
}
