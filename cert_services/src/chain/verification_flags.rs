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

use serde::{Deserialize, Serialize};

use crate::chain::ChainStatusFlags;

bitflags::bitflags! {
    /// Relaxations applied when validating a certificate chain.
    ///
    /// The empty set (the default) is the strictest policy. Each flag
    /// suppresses one class of [`ChainStatusFlags`]; see
    /// [`VerificationFlags::ignored_status`] for the exact mapping.
    ///
    /// Flags serialize in their human-readable form, for example
    /// `"IGNORE_NOT_TIME_VALID | IGNORE_WRONG_USAGE"`.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct VerificationFlags: u32 {
        /// Accept certificates outside their validity period.
        const IGNORE_NOT_TIME_VALID = 0x0001;

        /// Accepted for compatibility. Certificate trust lists are not
        /// supported, so this flag has no effect.
        const IGNORE_CTL_NOT_TIME_VALID = 0x0002;

        /// Accept certificates whose validity period is not nested within
        /// their issuer's.
        const IGNORE_NOT_TIME_NESTED = 0x0004;

        /// Accept issuers that are not marked as certificate authorities or
        /// whose path length constraint is exceeded.
        const IGNORE_INVALID_BASIC_CONSTRAINTS = 0x0008;

        /// Accept chains that end at an untrusted root or that could not be
        /// completed.
        const ALLOW_UNKNOWN_CERTIFICATE_AUTHORITY = 0x0010;

        /// Accept key usage and extended key usage mismatches.
        const IGNORE_WRONG_USAGE = 0x0020;

        /// Accept name constraint violations.
        const IGNORE_INVALID_NAME = 0x0040;

        /// Accept policy constraint violations.
        const IGNORE_INVALID_POLICY = 0x0080;

        /// Revocation is not checked; no effect.
        const IGNORE_END_REVOCATION_UNKNOWN = 0x0100;

        /// Revocation is not checked; no effect.
        const IGNORE_CTL_SIGNER_REVOCATION_UNKNOWN = 0x0200;

        /// Revocation is not checked; no effect.
        const IGNORE_CERTIFICATE_AUTHORITY_REVOCATION_UNKNOWN = 0x0400;

        /// Revocation is not checked; no effect.
        const IGNORE_ROOT_REVOCATION_UNKNOWN = 0x0800;

        /// Every relaxation.
        const ALL_FLAGS = 0x0FFF;
    }
}

impl VerificationFlags {
    /// Return the chain status conditions that these flags suppress.
    ///
    /// [`ChainStatusFlags::NOT_SIGNATURE_VALID`] and
    /// [`ChainStatusFlags::HAS_NOT_SUPPORTED_CRITICAL_EXTENSION`] are never
    /// suppressed.
    pub fn ignored_status(&self) -> ChainStatusFlags {
        let mut ignored = ChainStatusFlags::empty();

        if self.contains(Self::IGNORE_NOT_TIME_VALID) {
            ignored |= ChainStatusFlags::NOT_TIME_VALID;
        }

        if self.contains(Self::IGNORE_NOT_TIME_NESTED) {
            ignored |= ChainStatusFlags::NOT_TIME_NESTED;
        }

        if self.contains(Self::IGNORE_INVALID_BASIC_CONSTRAINTS) {
            ignored |= ChainStatusFlags::INVALID_BASIC_CONSTRAINTS;
        }

        if self.contains(Self::ALLOW_UNKNOWN_CERTIFICATE_AUTHORITY) {
            ignored |= ChainStatusFlags::UNTRUSTED_ROOT | ChainStatusFlags::PARTIAL_CHAIN;
        }

        if self.contains(Self::IGNORE_WRONG_USAGE) {
            ignored |= ChainStatusFlags::NOT_VALID_FOR_USAGE;
        }

        if self.contains(Self::IGNORE_INVALID_NAME) {
            ignored |= ChainStatusFlags::INVALID_NAME_CONSTRAINTS;
        }

        if self.contains(Self::IGNORE_INVALID_POLICY) {
            ignored |= ChainStatusFlags::INVALID_POLICY_CONSTRAINTS;
        }

        ignored
    }
}
