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

use std::sync::Arc;

use crate::{
    chain::{builder, BuiltChain, ChainChecker, ChainPolicy, TrustAnchors, VerificationFlags},
    CertificateServiceError,
};

/// Builds and validates chains with a native X.509 path builder.
///
/// The policy and trust anchors are fixed at construction and applied
/// identically to every call. The anchors are shared read-only, so creating
/// many checkers over the same store is cheap.
#[derive(Clone, Debug)]
pub struct X509ChainChecker {
    policy: ChainPolicy,
    anchors: Arc<TrustAnchors>,
}

impl X509ChainChecker {
    /// Create a checker with the given relaxations and trust anchors.
    pub fn new(verification_flags: VerificationFlags, anchors: Arc<TrustAnchors>) -> Self {
        Self::with_policy(ChainPolicy::new(verification_flags), anchors)
    }

    /// Create a checker with a fully specified policy.
    pub fn with_policy(policy: ChainPolicy, anchors: Arc<TrustAnchors>) -> Self {
        Self { policy, anchors }
    }

    /// Return the policy applied by this checker.
    pub fn policy(&self) -> &ChainPolicy {
        &self.policy
    }

    /// Return the relaxations applied by this checker.
    pub fn verification_flags(&self) -> VerificationFlags {
        self.policy.verification_flags
    }

    /// Return the trust anchors used by this checker.
    pub fn trust_anchors(&self) -> &TrustAnchors {
        &self.anchors
    }
}

impl ChainChecker for X509ChainChecker {
    fn build_chain(
        &self,
        certificate: &[u8],
        additional_certificates: &[Vec<u8>],
    ) -> Result<BuiltChain, CertificateServiceError> {
        builder::build_chain(
            &self.policy,
            &self.anchors,
            certificate,
            additional_certificates,
        )
    }
}
