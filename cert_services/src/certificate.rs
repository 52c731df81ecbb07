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

//! Parsing of certificate blobs, which may carry a private key alongside the
//! X.509 certificate.
//!
//! A blob is accepted in one of these forms:
//!
//! * a DER-encoded X.509 certificate;
//! * a DER-encoded X.509 certificate immediately followed by a DER-encoded
//!   PKCS#8 `PrivateKeyInfo`;
//! * a PEM document with one `CERTIFICATE` block and at most one `PRIVATE KEY`
//!   (PKCS#8) or `RSA PRIVATE KEY` (PKCS#1) block. Text outside the blocks,
//!   such as the `Bag Attributes` lines written by `openssl pkcs12`, is
//!   ignored.
//!
//! Blobs are parsed on every call and never cached.

use std::fmt;

use asn1_rs::FromDer;
use const_oid::ObjectIdentifier;
use rsa::{
    pkcs1::DecodeRsaPrivateKey,
    pkcs8::{DecodePrivateKey, DecodePublicKey, PrivateKeyInfo},
    RsaPrivateKey, RsaPublicKey,
};
use x509_parser::{certificate::X509Certificate, der_parser::oid, oid_registry::Oid, pem::Pem};

use crate::CertificateServiceError;

/// A parsed certificate blob: the DER certificate plus any private key that
/// travelled with it.
pub struct CertificateBlob {
    cert_der: Vec<u8>,
    private_key: Option<PrivateKey>,
}

enum PrivateKey {
    Rsa(RsaPrivateKey),

    /// A well-formed private key for some other algorithm, identified by OID.
    Other(String),
}

impl CertificateBlob {
    /// Parse a certificate blob in any of the accepted forms.
    pub fn parse(blob: &[u8]) -> Result<Self, CertificateServiceError> {
        if is_pem(blob) {
            Self::parse_pem(blob)
        } else {
            Self::parse_der(blob)
        }
    }

    fn parse_der(blob: &[u8]) -> Result<Self, CertificateServiceError> {
        let (cert_der, rem) = split_certificate(blob)?;

        let private_key = if rem.is_empty() {
            None
        } else {
            Some(private_key_from_pkcs8(rem)?)
        };

        Ok(Self {
            cert_der: cert_der.to_vec(),
            private_key,
        })
    }

    fn parse_pem(blob: &[u8]) -> Result<Self, CertificateServiceError> {
        let mut cert_der: Option<Vec<u8>> = None;
        let mut private_key: Option<PrivateKey> = None;

        for maybe_pem in Pem::iter_from_buffer(blob) {
            let pem = maybe_pem.map_err(|e| CertificateServiceError::ParseError(e.to_string()))?;

            match pem.label.as_str() {
                "CERTIFICATE" => {
                    if cert_der.is_some() {
                        return Err(CertificateServiceError::ParseError(
                            "more than one certificate in blob".to_string(),
                        ));
                    }

                    let (der, rem) = split_certificate(&pem.contents)?;
                    if !rem.is_empty() {
                        return Err(CertificateServiceError::ParseError(
                            "trailing data after certificate".to_string(),
                        ));
                    }
                    cert_der = Some(der.to_vec());
                }

                "PRIVATE KEY" | "RSA PRIVATE KEY" => {
                    if private_key.is_some() {
                        return Err(CertificateServiceError::ParseError(
                            "more than one private key in blob".to_string(),
                        ));
                    }

                    private_key = Some(if pem.label == "PRIVATE KEY" {
                        private_key_from_pkcs8(&pem.contents)?
                    } else {
                        let key = RsaPrivateKey::from_pkcs1_der(&pem.contents)
                            .map_err(|e| CertificateServiceError::ParseError(e.to_string()))?;
                        PrivateKey::Rsa(key)
                    });
                }

                "ENCRYPTED PRIVATE KEY" => {
                    return Err(CertificateServiceError::ParseError(
                        "encrypted private keys are not supported".to_string(),
                    ));
                }

                _ => (),
            }
        }

        let Some(cert_der) = cert_der else {
            return Err(CertificateServiceError::ParseError(
                "no certificate found in PEM input".to_string(),
            ));
        };

        Ok(Self {
            cert_der,
            private_key,
        })
    }

    /// Return the certificate in DER format, without any private key.
    pub fn certificate_der(&self) -> &[u8] {
        &self.cert_der
    }

    /// Return `true` if a private key (of any algorithm) accompanied the
    /// certificate.
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Serialize only the public portion of this blob.
    pub fn export_public(&self) -> Vec<u8> {
        self.cert_der.clone()
    }

    /// Return the RSA public key from the certificate's
    /// `SubjectPublicKeyInfo`.
    pub fn rsa_public_key(&self) -> Result<RsaPublicKey, CertificateServiceError> {
        let (_rem, cert) = X509Certificate::from_der(&self.cert_der)
            .map_err(|e| CertificateServiceError::ParseError(e.to_string()))?;

        rsa_public_key(&cert)
    }

    /// Return the RSA private key that accompanies the certificate.
    ///
    /// Fails with [`CertificateServiceError::MissingPrivateKey`] if there is no
    /// key, if it is not an RSA key, or if it does not belong to the
    /// certificate.
    pub(crate) fn rsa_private_key(&self) -> Result<&RsaPrivateKey, CertificateServiceError> {
        let key = match &self.private_key {
            Some(PrivateKey::Rsa(key)) => key,
            Some(PrivateKey::Other(oid)) => {
                return Err(CertificateServiceError::MissingPrivateKey(format!(
                    "private key is not an RSA key ({oid})"
                )));
            }
            None => {
                return Err(CertificateServiceError::MissingPrivateKey(
                    "no private key".to_string(),
                ));
            }
        };

        let matches_certificate = match self.rsa_public_key() {
            Ok(public_key) => public_key == key.to_public_key(),
            Err(CertificateServiceError::UnsupportedKeyType(_)) => false,
            Err(err) => return Err(err),
        };

        if !matches_certificate {
            return Err(CertificateServiceError::MissingPrivateKey(
                "private key does not match the certificate".to_string(),
            ));
        }

        Ok(key)
    }
}

impl fmt::Debug for CertificateBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateBlob")
            .field("cert_der_len", &self.cert_der.len())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}

/// Return a copy of the certificate with all private key material removed.
///
/// The public portion is exported and then parsed again, so the result is
/// guaranteed to be a bare DER certificate. The operation is idempotent.
pub fn strip_private_key(blob: &[u8]) -> Result<Vec<u8>, CertificateServiceError> {
    let exported = CertificateBlob::parse(blob)?.export_public();
    let reimported = CertificateBlob::parse(&exported)?;

    Ok(reimported.cert_der)
}

/// Return the RSA public key of a parsed certificate.
///
/// Fails with [`CertificateServiceError::UnsupportedKeyType`] if the
/// certificate's key uses some other algorithm.
pub(crate) fn rsa_public_key(
    cert: &X509Certificate<'_>,
) -> Result<RsaPublicKey, CertificateServiceError> {
    let spki = cert.public_key();

    if spki.algorithm.algorithm != RSA_ENCRYPTION_OID {
        return Err(CertificateServiceError::UnsupportedKeyType(
            spki.algorithm.algorithm.to_id_string(),
        ));
    }

    RsaPublicKey::from_public_key_der(spki.raw)
        .map_err(|e| CertificateServiceError::ParseError(e.to_string()))
}

/// A DER blob starts with a SEQUENCE tag. Anything else containing a PEM
/// boundary is read as PEM, wherever the first block starts.
fn is_pem(blob: &[u8]) -> bool {
    blob.first() != Some(&0x30)
        && blob
            .windows(PEM_BEGIN.len())
            .any(|window| window == PEM_BEGIN)
}

/// Split a DER buffer into the leading certificate and whatever follows it.
fn split_certificate(der: &[u8]) -> Result<(&[u8], &[u8]), CertificateServiceError> {
    let (rem, _cert) = X509Certificate::from_der(der)
        .map_err(|e| CertificateServiceError::ParseError(e.to_string()))?;

    let cert_len = der.len() - rem.len();
    Ok((&der[..cert_len], rem))
}

fn private_key_from_pkcs8(der: &[u8]) -> Result<PrivateKey, CertificateServiceError> {
    let pki = PrivateKeyInfo::try_from(der)
        .map_err(|e| CertificateServiceError::ParseError(e.to_string()))?;

    if pki.algorithm.oid != RSA_PKCS8_OID {
        return Ok(PrivateKey::Other(pki.algorithm.oid.to_string()));
    }

    let key = RsaPrivateKey::from_pkcs8_der(der)
        .map_err(|e| CertificateServiceError::ParseError(e.to_string()))?;

    Ok(PrivateKey::Rsa(key))
}

const PEM_BEGIN: &[u8] = b"-----BEGIN";

// Can't share one constant between x509-parser and the pkcs8 crate because
// they use different OID types.
const RSA_ENCRYPTION_OID: Oid<'static> = oid!(1.2.840 .113549 .1 .1 .1);
const RSA_PKCS8_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
