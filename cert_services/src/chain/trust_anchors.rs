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

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use asn1_rs::FromDer;
use log::debug;
use x509_parser::{certificate::X509Certificate, pem::Pem};

use crate::CertificateServiceError;

/// The set of certificates that are trusted to terminate a chain.
///
/// Certificates are indexed by their raw subject name so that issuer lookup
/// during chain building does not need to parse every anchor.
#[derive(Clone, Default)]
pub struct TrustAnchors {
    anchor_ders: Vec<Vec<u8>>,

    /// Raw DER subject name to indices into `anchor_ders`.
    by_subject: HashMap<Vec<u8>, Vec<usize>>,
}

impl TrustAnchors {
    /// Create an empty trust store.
    ///
    /// With no anchors, no chain can validate unless
    /// [`VerificationFlags::ALLOW_UNKNOWN_CERTIFICATE_AUTHORITY`] is set.
    ///
    /// [`VerificationFlags::ALLOW_UNKNOWN_CERTIFICATE_AUTHORITY`]: crate::chain::VerificationFlags::ALLOW_UNKNOWN_CERTIFICATE_AUTHORITY
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the operating system's CA bundle.
    ///
    /// The bundle is located the same way OpenSSL does it: the
    /// `SSL_CERT_FILE` environment variable, then the file found by
    /// `openssl-probe`, then a list of well-known paths. If none of those
    /// yields any certificate, the `SSL_CERT_DIR` directory, the directory
    /// found by `openssl-probe`, and well-known directories are scanned.
    pub fn system() -> Result<Self, CertificateServiceError> {
        let mut anchors = Self::new();

        let probe = openssl_probe::probe();

        let bundle_candidates = std::env::var_os("SSL_CERT_FILE")
            .map(PathBuf::from)
            .into_iter()
            .chain(probe.cert_file)
            .chain(KNOWN_CA_BUNDLE_PATHS.iter().map(PathBuf::from));

        for path in bundle_candidates {
            let Ok(pem) = std::fs::read(&path) else {
                continue;
            };

            if anchors.add_pem_bundle_lenient(&pem) > 0 {
                debug!(
                    "loaded {} trust anchors from {}",
                    anchors.len(),
                    path.display()
                );
                return Ok(anchors);
            }
        }

        let dir_candidates = std::env::var_os("SSL_CERT_DIR")
            .map(PathBuf::from)
            .into_iter()
            .chain(probe.cert_dir)
            .chain(KNOWN_CA_DIR_PATHS.iter().map(PathBuf::from));

        for dir in dir_candidates {
            if let Ok(added) = anchors.add_pem_directory(&dir) {
                if added > 0 {
                    debug!("loaded {added} trust anchors from {}", dir.display());
                    return Ok(anchors);
                }
            }
        }

        Err(CertificateServiceError::TrustAnchorError(
            "no system trust store found".to_string(),
        ))
    }

    /// Create a trust store from a PEM bundle.
    pub fn from_pem(trust_anchor_pems: &[u8]) -> Result<Self, CertificateServiceError> {
        let mut anchors = Self::new();
        anchors.add_trust_anchors(trust_anchor_pems)?;
        Ok(anchors)
    }

    /// Add trust anchors (root X.509 certificates) from a PEM bundle.
    ///
    /// Blocks with labels other than `CERTIFICATE` and `TRUSTED CERTIFICATE`
    /// are ignored. Returns the number of certificates added.
    pub fn add_trust_anchors(
        &mut self,
        trust_anchor_pems: &[u8],
    ) -> Result<usize, CertificateServiceError> {
        let mut added = 0;

        for maybe_pem in Pem::iter_from_buffer(trust_anchor_pems) {
            // NOTE: `Pem::contents` holds the decoded block, which is expected
            // to be a DER certificate.
            let pem =
                maybe_pem.map_err(|e| CertificateServiceError::TrustAnchorError(e.to_string()))?;

            if pem.label != "CERTIFICATE" && pem.label != "TRUSTED CERTIFICATE" {
                continue;
            }

            if self.add_der(&pem.contents)? {
                added += 1;
            }
        }

        Ok(added)
    }

    /// Add a single DER-encoded trust anchor.
    ///
    /// Returns `false` if the certificate was already present.
    pub fn add_der(&mut self, anchor_der: &[u8]) -> Result<bool, CertificateServiceError> {
        let (_rem, cert) = X509Certificate::from_der(anchor_der)
            .map_err(|e| CertificateServiceError::TrustAnchorError(e.to_string()))?;

        let subject = cert.subject().as_raw().to_vec();
        if self.find_by_subject(&subject).any(|der| der == anchor_der) {
            return Ok(false);
        }

        self.by_subject
            .entry(subject)
            .or_default()
            .push(self.anchor_ders.len());
        self.anchor_ders.push(anchor_der.to_vec());

        Ok(true)
    }

    /// Add every certificate file found in a directory (OpenSSL `CApath`
    /// layout: `.pem`, `.crt`, `.cer`, and hash-linked `XXXXXXXX.N` files).
    ///
    /// Files that cannot be read or parsed are skipped. Returns the number of
    /// certificates added.
    pub fn add_pem_directory(&mut self, dir: &Path) -> Result<usize, CertificateServiceError> {
        let mut added = 0;

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !is_cert_file(&path) {
                continue;
            }

            if let Ok(pem) = std::fs::read(&path) {
                added += self.add_pem_bundle_lenient(&pem);
            }
        }

        Ok(added)
    }

    /// Return `true` if this exact certificate is a trust anchor.
    pub fn contains(&self, cert_der: &[u8]) -> bool {
        let Ok((_rem, cert)) = X509Certificate::from_der(cert_der) else {
            return false;
        };

        self.find_by_subject(cert.subject().as_raw())
            .any(|der| der == cert_der)
    }

    /// Return an iterator over the trust anchors, in DER format.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.anchor_ders.iter().map(Vec::as_slice)
    }

    /// Return the number of trust anchors.
    pub fn len(&self) -> usize {
        self.anchor_ders.len()
    }

    /// Return `true` if there are no trust anchors.
    pub fn is_empty(&self) -> bool {
        self.anchor_ders.is_empty()
    }

    /// Remove all trust anchors.
    pub fn clear(&mut self) {
        self.anchor_ders.clear();
        self.by_subject.clear();
    }

    /// Return the anchors whose raw subject name equals `subject_raw`.
    pub(crate) fn find_by_subject<'a>(
        &'a self,
        subject_raw: &[u8],
    ) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.by_subject
            .get(subject_raw)
            .into_iter()
            .flatten()
            .filter_map(move |&i| self.anchor_ders.get(i))
            .map(Vec::as_slice)
    }

    // System bundles sometimes carry entries x509-parser rejects; those are
    // skipped rather than failing the whole bundle.
    fn add_pem_bundle_lenient(&mut self, pem_bundle: &[u8]) -> usize {
        let mut added = 0;

        for pem in Pem::iter_from_buffer(pem_bundle).map_while(Result::ok) {
            if pem.label != "CERTIFICATE" && pem.label != "TRUSTED CERTIFICATE" {
                continue;
            }

            if let Ok(true) = self.add_der(&pem.contents) {
                added += 1;
            }
        }

        added
    }
}

impl fmt::Debug for TrustAnchors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchors")
            .field("len", &self.len())
            .finish()
    }
}

fn is_cert_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };

    matches!(ext, "pem" | "crt" | "cer") || (ext.len() == 1 && ext.as_bytes()[0].is_ascii_digit())
}

const KNOWN_CA_BUNDLE_PATHS: &[&str] = &[
    "/etc/ssl/certs/ca-certificates.crt", // Debian/Ubuntu
    "/etc/pki/tls/certs/ca-bundle.crt",   // RHEL/Fedora
    "/etc/ssl/ca-bundle.pem",             // openSUSE
    "/etc/ssl/cert.pem",                  // macOS, Alpine
];

const KNOWN_CA_DIR_PATHS: &[&str] = &["/etc/ssl/certs"];
