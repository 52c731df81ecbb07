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

use std::fs;

use crate::{
    chain::TrustAnchors,
    tests::fixtures::{three_tier_chain, CertBuilder},
    CertificateServiceError,
};

#[test]
fn from_pem_bundle() {
    let a = CertBuilder::ca("Root A", 0).self_signed();
    let b = CertBuilder::ca("Root B", 1).self_signed();
    let bundle = format!("{}\n{}", a.pem(), b.pem());

    let anchors = TrustAnchors::from_pem(bundle.as_bytes()).unwrap();
    assert_eq!(anchors.len(), 2);
    assert!(anchors.contains(&a.der));
    assert!(anchors.contains(&b.der));

    let ders: Vec<&[u8]> = anchors.iter().collect();
    assert_eq!(ders, vec![a.der.as_slice(), b.der.as_slice()]);
}

#[test]
fn duplicates_are_ignored() {
    let root = CertBuilder::ca("Root", 0).self_signed();

    let mut anchors = TrustAnchors::new();
    assert!(anchors.add_der(&root.der).unwrap());
    assert!(!anchors.add_der(&root.der).unwrap());

    assert_eq!(anchors.add_trust_anchors(root.pem().as_bytes()).unwrap(), 0);
    assert_eq!(anchors.len(), 1);
}

#[test]
fn same_subject_different_keys() {
    let a = CertBuilder::ca("Shared Name", 0).self_signed();
    let b = CertBuilder::ca("Shared Name", 1).self_signed();

    let mut anchors = TrustAnchors::new();
    anchors.add_der(&a.der).unwrap();
    anchors.add_der(&b.der).unwrap();

    assert_eq!(anchors.len(), 2);
    assert!(anchors.contains(&a.der));
    assert!(anchors.contains(&b.der));
}

#[test]
fn other_pem_labels_are_ignored() {
    let root = CertBuilder::ca("Root", 0).self_signed();
    let pem = String::from_utf8(root.pem_with_private_key()).unwrap();

    let anchors = TrustAnchors::from_pem(pem.as_bytes()).unwrap();
    assert_eq!(anchors.len(), 1);
}

#[test]
fn invalid_certificate() {
    let pem = "-----BEGIN CERTIFICATE-----\naGVsbG8gd29ybGQ=\n-----END CERTIFICATE-----\n";

    assert!(matches!(
        TrustAnchors::from_pem(pem.as_bytes()).unwrap_err(),
        CertificateServiceError::TrustAnchorError(_)
    ));

    assert!(matches!(
        TrustAnchors::new().add_der(b"hello world").unwrap_err(),
        CertificateServiceError::TrustAnchorError(_)
    ));
}

#[test]
fn empty_bundle() {
    let anchors = TrustAnchors::from_pem(b"").unwrap();
    assert!(anchors.is_empty());
}

#[test]
fn contains_requires_exact_certificate() {
    let chain = three_tier_chain();
    let anchors = TrustAnchors::from_pem(chain.root.pem().as_bytes()).unwrap();

    assert!(anchors.contains(&chain.root.der));
    assert!(!anchors.contains(&chain.intermediate.der));
    assert!(!anchors.contains(b"garbage"));
}

#[test]
fn clear() {
    let root = CertBuilder::ca("Root", 0).self_signed();

    let mut anchors = TrustAnchors::from_pem(root.pem().as_bytes()).unwrap();
    anchors.clear();

    assert!(anchors.is_empty());
    assert!(!anchors.contains(&root.der));
}

#[test]
fn pem_directory() {
    let a = CertBuilder::ca("Dir Root A", 0).self_signed();
    let b = CertBuilder::ca("Dir Root B", 1).self_signed();

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.pem"), a.pem()).unwrap();
    fs::write(dir.path().join("5d30f3c5.0"), b.pem()).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a certificate").unwrap();
    fs::write(dir.path().join("broken.crt"), "-----BEGIN CERTIFICATE-----\n").unwrap();

    let mut anchors = TrustAnchors::new();
    assert_eq!(anchors.add_pem_directory(dir.path()).unwrap(), 2);
    assert!(anchors.contains(&a.der));
    assert!(anchors.contains(&b.der));
}

#[test]
fn missing_directory() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        TrustAnchors::new()
            .add_pem_directory(&dir.path().join("missing"))
            .unwrap_err(),
        CertificateServiceError::TrustAnchorError(_)
    ));
}

#[test]
fn debug_shows_count() {
    let root = CertBuilder::ca("Root", 0).self_signed();
    let anchors = TrustAnchors::from_pem(root.pem().as_bytes()).unwrap();

    assert_eq!(format!("{anchors:?}"), "TrustAnchors { len: 1 }");
}
