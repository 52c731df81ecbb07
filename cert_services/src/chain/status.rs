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

bitflags::bitflags! {
    /// Problems found while evaluating one element of a certificate chain.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ChainStatusFlags: u32 {
        /// The verification time is outside the certificate's validity
        /// period.
        const NOT_TIME_VALID = 0x0001;

        /// The certificate's validity period is not nested within its
        /// issuer's.
        const NOT_TIME_NESTED = 0x0002;

        /// The certificate's signature does not verify, or uses an
        /// unsupported algorithm.
        const NOT_SIGNATURE_VALID = 0x0008;

        /// The certificate is used as an issuer but is not a CA, or a path
        /// length constraint was exceeded.
        const INVALID_BASIC_CONSTRAINTS = 0x0010;

        /// Key usage or extended key usage does not allow this use.
        const NOT_VALID_FOR_USAGE = 0x0020;

        /// A name constraint was violated or misplaced.
        const INVALID_NAME_CONSTRAINTS = 0x0040;

        /// A policy constraint was violated.
        const INVALID_POLICY_CONSTRAINTS = 0x0080;

        /// The certificate carries a critical extension that is not
        /// understood.
        const HAS_NOT_SUPPORTED_CRITICAL_EXTENSION = 0x0100;

        /// The chain ends at a certificate that is not a trust anchor.
        const UNTRUSTED_ROOT = 0x0200;

        /// No issuer could be found for this certificate.
        const PARTIAL_CHAIN = 0x0400;
    }
}
