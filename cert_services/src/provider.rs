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

//! Composes the signature, signing, and chain services behind one factory.

use std::sync::Arc;

use log::warn;

use crate::{
    chain::{ChainChecker, ChainPolicy, TrustAnchors, VerificationFlags, X509ChainChecker},
    raw_signature::{RsaSignatureChecker, RsaSigner, SignatureChecker, Signer},
    settings::Settings,
    CertificateServiceError,
};

/// A `CertificateServiceProvider` hands out the three certificate services.
///
/// Every call returns a new, independent instance.
pub trait CertificateServiceProvider: Send + Sync {
    /// Return a chain checker configured with this provider's policy.
    fn chain_checker(&self) -> Box<dyn ChainChecker>;

    /// Return a signature checker.
    fn signature_checker(&self) -> Box<dyn SignatureChecker>;

    /// Return a signer.
    fn signer(&self) -> Box<dyn Signer>;
}

/// The built-in provider, backed by the pure-Rust RSA and X.509
/// implementations in this crate.
#[derive(Clone, Debug)]
pub struct NativeCertificateServiceProvider {
    policy: ChainPolicy,
    anchors: Arc<TrustAnchors>,
}

impl NativeCertificateServiceProvider {
    /// Create a provider whose chain checkers apply `verification_flags` and
    /// trust the operating system's CA bundle.
    ///
    /// If no system bundle can be found, the provider starts with an empty
    /// trusted store.
    pub fn new(verification_flags: VerificationFlags) -> Self {
        let anchors = TrustAnchors::system().unwrap_or_else(|err| {
            warn!("system trust anchors unavailable: {err}");
            TrustAnchors::new()
        });

        Self::with_trust_anchors(verification_flags, anchors)
    }

    /// Create a provider with an explicit trusted store.
    pub fn with_trust_anchors(verification_flags: VerificationFlags, anchors: TrustAnchors) -> Self {
        Self::with_policy(ChainPolicy::new(verification_flags), anchors)
    }

    /// Create a provider with a fully specified chain policy.
    pub fn with_policy(policy: ChainPolicy, anchors: TrustAnchors) -> Self {
        Self {
            policy,
            anchors: Arc::new(anchors),
        }
    }

    /// Create a provider from [`Settings`].
    pub fn from_settings(settings: &Settings) -> Result<Self, CertificateServiceError> {
        settings.validate()?;

        let policy = settings.verify.chain_policy()?;
        let anchors = settings.trust.load_trust_anchors()?;

        Ok(Self::with_policy(policy, anchors))
    }

    /// Return the relaxations applied by chain checkers from this provider.
    pub fn verification_flags(&self) -> VerificationFlags {
        self.policy.verification_flags
    }

    /// Return the chain policy applied by chain checkers from this provider.
    pub fn policy(&self) -> &ChainPolicy {
        &self.policy
    }
}

impl Default for NativeCertificateServiceProvider {
    fn default() -> Self {
        Self::new(VerificationFlags::empty())
    }
}

impl CertificateServiceProvider for NativeCertificateServiceProvider {
    fn chain_checker(&self) -> Box<dyn ChainChecker> {
        Box::new(X509ChainChecker::with_policy(
            self.policy.clone(),
            self.anchors.clone(),
        ))
    }

    fn signature_checker(&self) -> Box<dyn SignatureChecker> {
        Box::new(RsaSignatureChecker::new())
    }

    fn signer(&self) -> Box<dyn Signer> {
        Box::new(RsaSigner::new())
    }
}
