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

use asn1_rs::FromDer;
use log::{debug, trace};
use x509_parser::{
    certificate::X509Certificate,
    extensions::{ExtendedKeyUsage, GeneralName, NameConstraints, ParsedExtension},
};

use crate::{
    certificate::CertificateBlob,
    chain::{signature::signature_verifies, ChainPolicy, ChainStatusFlags, TrustAnchors},
    CertificateServiceError, HashAlgorithm,
};

/// One certificate of a built chain together with its validation status.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainElement {
    certificate_der: Vec<u8>,
    subject: String,
    issuer: String,
    status: ChainStatusFlags,
}

impl ChainElement {
    /// The certificate in DER format.
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }

    /// The certificate's subject name in RFC 4514 form.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The certificate's issuer name in RFC 4514 form.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The SHA-1 thumbprint of the certificate as uppercase hex.
    pub fn thumbprint(&self) -> String {
        hex::encode_upper(HashAlgorithm::Sha1.hash(&self.certificate_der))
    }

    /// Problems found with this element. Not filtered by the verification
    /// flags.
    pub fn status(&self) -> ChainStatusFlags {
        self.status
    }
}

/// The result of building a certificate chain.
///
/// Elements are ordered from the target certificate (index 0) towards the
/// root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuiltChain {
    elements: Vec<ChainElement>,
    ignored: ChainStatusFlags,
}

impl BuiltChain {
    /// The certificates of the chain, target first.
    pub fn elements(&self) -> &[ChainElement] {
        &self.elements
    }

    /// The union of every element's status, before the verification flags
    /// are applied.
    pub fn status(&self) -> ChainStatusFlags {
        self.elements
            .iter()
            .fold(ChainStatusFlags::empty(), |acc, e| acc | e.status)
    }

    /// The status conditions that remain after the verification flags are
    /// applied.
    pub fn effective_status(&self) -> ChainStatusFlags {
        self.status() - self.ignored
    }

    /// Return `true` if no status condition remains after the verification
    /// flags are applied.
    pub fn is_valid(&self) -> bool {
        self.effective_status().is_empty()
    }

    /// The last element of the chain, which is a trust anchor when the chain
    /// is trusted.
    pub fn root(&self) -> Option<&ChainElement> {
        self.elements.last()
    }
}

/// Build and evaluate the chain for `target` under `policy`.
pub(crate) fn build_chain(
    policy: &ChainPolicy,
    anchors: &TrustAnchors,
    target: &[u8],
    additional_certificates: &[Vec<u8>],
) -> Result<BuiltChain, CertificateServiceError> {
    let target_der = CertificateBlob::parse(target)?.export_public();

    let extra_ders = additional_certificates
        .iter()
        .map(|blob| CertificateBlob::parse(blob).map(|b| b.export_public()))
        .collect::<Result<Vec<Vec<u8>>, CertificateServiceError>>()?;

    let mut path = vec![PathCert::parse(&target_der, anchors.contains(&target_der))?];

    let end = loop {
        let Some(current) = path.last() else {
            break PathEnd::Partial;
        };

        if current.trusted {
            break PathEnd::TrustAnchor;
        }

        if current.is_self_issued() {
            break PathEnd::UntrustedRoot;
        }

        if path.len() > policy.max_chain_depth {
            debug!("chain depth limit of {} reached", policy.max_chain_depth);
            break PathEnd::Partial;
        }

        match find_issuer(current, &path, anchors, &extra_ders) {
            Some(issuer) => path.push(issuer),
            None => {
                debug!("no issuer found for {}", current.cert.subject());
                break PathEnd::Partial;
            }
        }
    };

    let now = policy.effective_time().timestamp();
    let mut statuses = vec![ChainStatusFlags::empty(); path.len()];

    for (i, element) in path.iter().enumerate() {
        let issuer = path.get(i + 1);

        let mut status = check_time_validity(&element.cert, now);
        status |= check_critical_extensions(&element.cert);

        if let Some(issuer) = issuer {
            status |= check_time_nested(&element.cert, &issuer.cert);
            if !signature_verifies(&element.cert, &issuer.cert) {
                status |= ChainStatusFlags::NOT_SIGNATURE_VALID;
            }
        } else if element.is_self_issued() && !signature_verifies(&element.cert, &element.cert) {
            status |= ChainStatusFlags::NOT_SIGNATURE_VALID;
        }

        if i > 0 {
            status |= check_issuer_constraints(&element.cert, i);
        }

        status |= check_application_policy(&element.cert, &policy.application_policy);

        if let Some(s) = statuses.get_mut(i) {
            *s |= status;
        }
    }

    check_name_constraints(&path, &mut statuses);
    check_policy_constraints(&path, &mut statuses);

    if let Some(last) = statuses.last_mut() {
        match end {
            PathEnd::TrustAnchor => (),
            PathEnd::UntrustedRoot => *last |= ChainStatusFlags::UNTRUSTED_ROOT,
            PathEnd::Partial => *last |= ChainStatusFlags::PARTIAL_CHAIN,
        }
    }

    let elements: Vec<ChainElement> = path
        .iter()
        .zip(statuses)
        .map(|(element, status)| {
            debug!("chain element {}: {status:?}", element.cert.subject());
            ChainElement {
                certificate_der: element.der.to_vec(),
                subject: element.cert.subject().to_string(),
                issuer: element.cert.issuer().to_string(),
                status,
            }
        })
        .collect();

    Ok(BuiltChain {
        elements,
        ignored: policy.verification_flags.ignored_status(),
    })
}

struct PathCert<'a> {
    der: &'a [u8],
    cert: X509Certificate<'a>,
    trusted: bool,
}

impl<'a> PathCert<'a> {
    fn parse(der: &'a [u8], trusted: bool) -> Result<Self, CertificateServiceError> {
        let (_rem, cert) = X509Certificate::from_der(der)
            .map_err(|e| CertificateServiceError::ParseError(e.to_string()))?;

        Ok(Self { der, cert, trusted })
    }

    fn is_self_issued(&self) -> bool {
        self.cert.subject().as_raw() == self.cert.issuer().as_raw()
    }
}

enum PathEnd {
    TrustAnchor,
    UntrustedRoot,
    Partial,
}

/// Pick the best issuer for `current`.
///
/// A candidate whose key verifies `current`'s signature beats one whose key
/// does not; among equals, a trust anchor beats an additional certificate.
/// Certificates already on the path are never chosen again.
fn find_issuer<'a>(
    current: &PathCert<'_>,
    path: &[PathCert<'_>],
    anchors: &'a TrustAnchors,
    extra_ders: &'a [Vec<u8>],
) -> Option<PathCert<'a>> {
    let issuer_name = current.cert.issuer().as_raw();

    let anchor_candidates = anchors.find_by_subject(issuer_name).map(|der| (der, true));

    let extra_candidates = extra_ders
        .iter()
        .map(|der| (der.as_slice(), anchors.contains(der)));

    let mut best: Option<(PathCert<'a>, bool)> = None;

    for (der, trusted) in anchor_candidates.chain(extra_candidates) {
        if path.iter().any(|p| p.der == der) {
            continue;
        }

        let Ok(candidate) = PathCert::parse(der, trusted) else {
            continue;
        };

        if candidate.cert.subject().as_raw() != issuer_name {
            continue;
        }

        let verifies = signature_verifies(&current.cert, &candidate.cert);
        trace!(
            "issuer candidate {} (trusted: {trusted}, signature verifies: {verifies})",
            candidate.cert.subject()
        );

        let better = match &best {
            None => true,
            Some((b, b_verifies)) => (verifies, trusted) > (*b_verifies, b.trusted),
        };

        if better {
            best = Some((candidate, verifies));
        }
    }

    best.map(|(candidate, _)| candidate)
}

fn check_time_validity(cert: &X509Certificate<'_>, now: i64) -> ChainStatusFlags {
    let validity = cert.validity();

    if now < validity.not_before.timestamp() || now > validity.not_after.timestamp() {
        ChainStatusFlags::NOT_TIME_VALID
    } else {
        ChainStatusFlags::empty()
    }
}

fn check_time_nested(
    cert: &X509Certificate<'_>,
    issuer: &X509Certificate<'_>,
) -> ChainStatusFlags {
    let (validity, issuer_validity) = (cert.validity(), issuer.validity());

    if validity.not_before.timestamp() < issuer_validity.not_before.timestamp()
        || validity.not_after.timestamp() > issuer_validity.not_after.timestamp()
    {
        ChainStatusFlags::NOT_TIME_NESTED
    } else {
        ChainStatusFlags::empty()
    }
}

fn check_critical_extensions(cert: &X509Certificate<'_>) -> ChainStatusFlags {
    let unsupported = cert
        .extensions()
        .iter()
        .any(|ext| ext.critical && !KNOWN_EXTENSIONS.contains(&ext.oid.to_id_string().as_str()));

    if unsupported {
        ChainStatusFlags::HAS_NOT_SUPPORTED_CRITICAL_EXTENSION
    } else {
        ChainStatusFlags::empty()
    }
}

/// Checks that apply to a certificate used as an issuer. `depth` is the
/// element's index in the path; the `depth - 1` elements between it and the
/// target are the intermediates its path length constraint applies to.
fn check_issuer_constraints(cert: &X509Certificate<'_>, depth: usize) -> ChainStatusFlags {
    let mut status = ChainStatusFlags::empty();

    match cert.basic_constraints() {
        Ok(Some(bc)) => {
            if !bc.value.ca {
                status |= ChainStatusFlags::INVALID_BASIC_CONSTRAINTS;
            }

            if let Some(path_len) = bc.value.path_len_constraint {
                if depth.saturating_sub(1) > path_len as usize {
                    status |= ChainStatusFlags::INVALID_BASIC_CONSTRAINTS;
                }
            }
        }

        // Version 1 and 2 certificates predate extensions and are accepted as
        // issuers.
        Ok(None) => {
            if cert.version().0 >= 2 {
                status |= ChainStatusFlags::INVALID_BASIC_CONSTRAINTS;
            }
        }

        Err(_) => status |= ChainStatusFlags::INVALID_BASIC_CONSTRAINTS,
    }

    match cert.key_usage() {
        Ok(Some(ku)) if !ku.value.key_cert_sign() => {
            status |= ChainStatusFlags::NOT_VALID_FOR_USAGE;
        }
        Err(_) => status |= ChainStatusFlags::NOT_VALID_FOR_USAGE,
        _ => (),
    }

    status
}

/// An element that carries an extended key usage extension must allow one of
/// the application policy OIDs. Elements without the extension allow all
/// usages.
fn check_application_policy(
    cert: &X509Certificate<'_>,
    application_policy: &[String],
) -> ChainStatusFlags {
    if application_policy.is_empty() {
        return ChainStatusFlags::empty();
    }

    match cert.extended_key_usage() {
        Ok(Some(eku)) => {
            let allowed = eku_oids(eku.value);
            if eku.value.any || application_policy.iter().any(|oid| allowed.contains(oid)) {
                ChainStatusFlags::empty()
            } else {
                ChainStatusFlags::NOT_VALID_FOR_USAGE
            }
        }
        Ok(None) => ChainStatusFlags::empty(),
        Err(_) => ChainStatusFlags::NOT_VALID_FOR_USAGE,
    }
}

fn eku_oids(eku: &ExtendedKeyUsage<'_>) -> Vec<String> {
    let named = [
        (eku.server_auth, "1.3.6.1.5.5.7.3.1"),
        (eku.client_auth, "1.3.6.1.5.5.7.3.2"),
        (eku.code_signing, "1.3.6.1.5.5.7.3.3"),
        (eku.email_protection, "1.3.6.1.5.5.7.3.4"),
        (eku.time_stamping, "1.3.6.1.5.5.7.3.8"),
        (eku.ocsp_signing, "1.3.6.1.5.5.7.3.9"),
    ];

    named
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, oid)| (*oid).to_string())
        .chain(eku.other.iter().map(|oid| oid.to_id_string()))
        .collect()
}

/// Name constraints may only appear on CA certificates, and the target's DNS
/// and e-mail subject alternative names must satisfy the constraints of every
/// CA above it.
fn check_name_constraints(path: &[PathCert<'_>], statuses: &mut [ChainStatusFlags]) {
    let Some(target) = path.first() else {
        return;
    };

    let target_is_ca = matches!(target.cert.basic_constraints(), Ok(Some(bc)) if bc.value.ca);

    let mut violated = match target.cert.name_constraints() {
        Ok(Some(_)) => !target_is_ca,
        Ok(None) => false,
        Err(_) => true,
    };

    let names = subject_alt_names(&target.cert);

    for ca in path.iter().skip(1) {
        match ca.cert.name_constraints() {
            Ok(Some(nc)) => {
                if !names_permitted(nc.value, &names) {
                    debug!(
                        "{} violates name constraints of {}",
                        target.cert.subject(),
                        ca.cert.subject()
                    );
                    violated = true;
                }
            }
            Ok(None) => (),
            Err(_) => violated = true,
        }
    }

    if violated {
        if let Some(s) = statuses.first_mut() {
            *s |= ChainStatusFlags::INVALID_NAME_CONSTRAINTS;
        }
    }
}

enum AltName {
    Dns(String),
    Email(String),
}

fn subject_alt_names(cert: &X509Certificate<'_>) -> Vec<AltName> {
    let Ok(Some(san)) = cert.subject_alternative_name() else {
        return vec![];
    };

    san.value
        .general_names
        .iter()
        .filter_map(|name| match name {
            GeneralName::DNSName(dns) => Some(AltName::Dns(dns.to_ascii_lowercase())),
            GeneralName::RFC822Name(email) => Some(AltName::Email(email.to_ascii_lowercase())),
            _ => None,
        })
        .collect()
}

fn names_permitted(nc: &NameConstraints<'_>, names: &[AltName]) -> bool {
    let permitted = nc.permitted_subtrees.as_deref().unwrap_or_default();
    let excluded = nc.excluded_subtrees.as_deref().unwrap_or_default();

    let permitted_dns: Vec<String> = permitted
        .iter()
        .filter_map(|s| match &s.base {
            GeneralName::DNSName(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect();

    let permitted_email: Vec<String> = permitted
        .iter()
        .filter_map(|s| match &s.base {
            GeneralName::RFC822Name(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect();

    for name in names {
        match name {
            AltName::Dns(dns) => {
                if !permitted_dns.is_empty()
                    && !permitted_dns.iter().any(|c| dns_matches(dns, c))
                {
                    return false;
                }

                let is_excluded = excluded.iter().any(|s| {
                    matches!(&s.base, GeneralName::DNSName(c) if dns_matches(dns, &c.to_ascii_lowercase()))
                });
                if is_excluded {
                    return false;
                }
            }

            AltName::Email(email) => {
                if !permitted_email.is_empty()
                    && !permitted_email.iter().any(|c| email_matches(email, c))
                {
                    return false;
                }

                let is_excluded = excluded.iter().any(|s| {
                    matches!(&s.base, GeneralName::RFC822Name(c) if email_matches(email, &c.to_ascii_lowercase()))
                });
                if is_excluded {
                    return false;
                }
            }
        }
    }

    true
}

/// `example.com` matches itself and any subdomain; `.example.com` matches
/// subdomains only.
fn dns_matches(name: &str, constraint: &str) -> bool {
    if constraint.is_empty() {
        return true;
    }

    if let Some(suffix) = constraint.strip_prefix('.') {
        return name.len() > suffix.len() + 1 && name.ends_with(constraint);
    }

    name == constraint
        || (name.len() > constraint.len()
            && name.ends_with(constraint)
            && name.as_bytes()[name.len() - constraint.len() - 1] == b'.')
}

/// A constraint containing `@` names one mailbox; `.example.com` matches any
/// host below that domain; `example.com` matches mailboxes on that host.
fn email_matches(email: &str, constraint: &str) -> bool {
    if constraint.contains('@') {
        return email == constraint;
    }

    let Some((_, host)) = email.rsplit_once('@') else {
        return false;
    };

    if constraint.starts_with('.') {
        host.ends_with(constraint)
    } else {
        host == constraint
    }
}

/// A CA with `requireExplicitPolicy = n` requires every certificate more than
/// `n` positions below it to assert at least one certificate policy.
fn check_policy_constraints(path: &[PathCert<'_>], statuses: &mut [ChainStatusFlags]) {
    for (ca_index, ca) in path.iter().enumerate().skip(1) {
        let skip_certs = match ca.cert.policy_constraints() {
            Ok(Some(pc)) => match pc.value.require_explicit_policy {
                Some(skip_certs) => skip_certs as usize,
                None => continue,
            },
            Ok(None) => continue,
            Err(_) => {
                if let Some(s) = statuses.get_mut(ca_index) {
                    *s |= ChainStatusFlags::INVALID_POLICY_CONSTRAINTS;
                }
                continue;
            }
        };

        for (index, element) in path.iter().enumerate().take(ca_index) {
            if ca_index - index > skip_certs && !has_certificate_policy(&element.cert) {
                if let Some(s) = statuses.get_mut(index) {
                    *s |= ChainStatusFlags::INVALID_POLICY_CONSTRAINTS;
                }
            }
        }
    }
}

fn has_certificate_policy(cert: &X509Certificate<'_>) -> bool {
    cert.extensions().iter().any(|ext| {
        matches!(ext.parsed_extension(), ParsedExtension::CertificatePolicies(policies) if !policies.is_empty())
    })
}

const KNOWN_EXTENSIONS: &[&str] = &[
    "2.5.29.14", // subjectKeyIdentifier
    "2.5.29.15", // keyUsage
    "2.5.29.17", // subjectAltName
    "2.5.29.18", // issuerAltName
    "2.5.29.19", // basicConstraints
    "2.5.29.30", // nameConstraints
    "2.5.29.32", // certificatePolicies
    "2.5.29.33", // policyMappings
    "2.5.29.35", // authorityKeyIdentifier
    "2.5.29.36", // policyConstraints
    "2.5.29.37", // extKeyUsage
    "2.5.29.54", // inhibitAnyPolicy
];
