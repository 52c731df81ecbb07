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

use thiserror::Error;

/// Describes errors that can be reported by the certificate services.
///
/// A signature that does not match, or a chain that does not validate, is
/// _not_ an error. Those outcomes are reported as `Ok(false)` so that callers
/// can tell "verification failed" apart from "input could not be verified."
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum CertificateServiceError {
    /// The certificate (or key) blob could not be parsed.
    #[error("the certificate could not be parsed ({0})")]
    ParseError(String),

    /// Signing was requested but the certificate does not carry a usable RSA
    /// private key.
    #[error("private key not present in the certificate, impossible to sign ({0})")]
    MissingPrivateKey(String),

    /// The certificate's public key is not an RSA key.
    #[error("the certificate's public key is not an RSA key ({0})")]
    UnsupportedKeyType(String),

    /// The hash algorithm identifier was not recognized.
    #[error("unknown hash algorithm ({0})")]
    UnknownHashAlgorithm(String),

    /// The hash does not have the length of the named digest algorithm.
    #[error("hash has length {actual} but the algorithm produces {expected} bytes")]
    InvalidHashLength {
        /// Digest length of the named algorithm.
        expected: usize,

        /// Length of the hash that was provided.
        actual: usize,
    },

    /// An error was reported by the underlying cryptography implementation.
    ///
    /// NOTE: We do not directly capture the `rsa` error itself because it
    /// lacks an `Eq` implementation. Instead we capture the error description.
    #[error("an error was reported by the cryptography library: {0}")]
    CryptoLibraryError(String),

    /// A trust anchor bundle could not be read.
    #[error("unable to load trust anchors ({0})")]
    TrustAnchorError(String),

    /// The settings could not be parsed or failed validation.
    #[error("invalid settings ({0})")]
    InvalidSettings(String),
}

impl From<rsa::Error> for CertificateServiceError {
    fn from(err: rsa::Error) -> Self {
        Self::CryptoLibraryError(err.to_string())
    }
}

impl From<std::io::Error> for CertificateServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::TrustAnchorError(err.to_string())
    }
}

impl From<config::ConfigError> for CertificateServiceError {
    fn from(err: config::ConfigError) -> Self {
        Self::InvalidSettings(err.to_string())
    }
}
