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

use chrono::{DateTime, Utc};

use crate::{chain::VerificationFlags, internal::time};

/// Maximum number of issuers searched above the target certificate unless
/// configured otherwise.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 32;

/// Describes how a certificate chain is built and evaluated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainPolicy {
    /// Relaxations of the default (strict) validation.
    pub verification_flags: VerificationFlags,

    /// Instant at which validity periods are evaluated. `None` means the
    /// current time at each call.
    pub verification_time: Option<DateTime<Utc>>,

    /// Maximum number of issuers above the target certificate.
    pub max_chain_depth: usize,

    /// Extended key usage OIDs (dotted-decimal) of which the end-entity
    /// certificate must allow at least one. Empty means any usage.
    pub application_policy: Vec<String>,
}

impl ChainPolicy {
    /// Create a policy with the given flags and default values for
    /// everything else.
    pub fn new(verification_flags: VerificationFlags) -> Self {
        Self {
            verification_flags,
            ..Default::default()
        }
    }

    /// Return the instant at which validity periods should be evaluated.
    pub(crate) fn effective_time(&self) -> DateTime<Utc> {
        self.verification_time.unwrap_or_else(time::utc_now)
    }
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self {
            verification_flags: VerificationFlags::empty(),
            verification_time: None,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            application_policy: vec![],
        }
    }
}
