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

//! Building and validating X.509 certificate chains.
//!
//! A [`ChainChecker`] builds a path from a target certificate to a trust
//! anchor, using caller-supplied certificates as candidate intermediates, and
//! evaluates every element of that path under a [`ChainPolicy`].

mod builder;
pub use builder::{BuiltChain, ChainElement};

mod checker;
pub use checker::X509ChainChecker;

mod policy;
pub use policy::{ChainPolicy, DEFAULT_MAX_CHAIN_DEPTH};

mod signature;

mod status;
pub use status::ChainStatusFlags;

mod trust_anchors;
pub use trust_anchors::TrustAnchors;

mod verification_flags;
pub use verification_flags::VerificationFlags;

use crate::CertificateServiceError;

/// A `ChainChecker` implementation builds and validates a certificate chain
/// for a target certificate.
///
/// Implementations are configured once (trust anchors, verification flags)
/// and apply the same policy to every call.
pub trait ChainChecker: Send + Sync {
    /// Return `Ok(true)` if a valid chain can be built from `certificate` to a
    /// trust anchor under this checker's policy.
    ///
    /// `additional_certificates` are made available for path construction but
    /// are never trusted on their own account.
    ///
    /// A chain that fails validation is reported as `Ok(false)`; an error is
    /// only returned if one of the input certificates cannot be parsed.
    fn verify_chain(
        &self,
        certificate: &[u8],
        additional_certificates: &[Vec<u8>],
    ) -> Result<bool, CertificateServiceError> {
        Ok(self
            .build_chain(certificate, additional_certificates)?
            .is_valid())
    }

    /// Build the chain for `certificate` and return it along with the
    /// validation status of each element.
    fn build_chain(
        &self,
        certificate: &[u8],
        additional_certificates: &[Vec<u8>],
    ) -> Result<BuiltChain, CertificateServiceError>;
}
