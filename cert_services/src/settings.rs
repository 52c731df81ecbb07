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

//! Settings for configuring chain verification and trust anchors.
//!
//! Settings are read from TOML or JSON and overlaid on the defaults, so a
//! configuration only needs to name the values it changes:
//!
//! ```toml
//! [verify]
//! verification_flags = "IGNORE_NOT_TIME_VALID | IGNORE_WRONG_USAGE"
//!
//! [trust]
//! use_system_anchors = false
//! trust_anchors = """
//! -----BEGIN CERTIFICATE-----
//! ...
//! -----END CERTIFICATE-----
//! """
//! ```

use config::{Config, FileFormat};
use const_oid::ObjectIdentifier;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    chain::{ChainPolicy, TrustAnchors, VerificationFlags, DEFAULT_MAX_CHAIN_DEPTH},
    internal::time,
    CertificateServiceError,
};

const VERSION: u32 = 1;

// trait used to validate user input to make sure user supplied configurations are valid
pub(crate) trait SettingsValidate {
    // returns error if settings are invalid
    fn validate(&self) -> Result<(), CertificateServiceError> {
        Ok(())
    }
}

/// Settings to configure how certificate chains are evaluated.
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema), schemars(default))]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Verify {
    /// Relaxations of the default (strict) chain validation, in the form
    /// `"IGNORE_NOT_TIME_VALID | IGNORE_WRONG_USAGE"`.
    ///
    /// The default value is no relaxations.
    #[cfg_attr(feature = "json_schema", schemars(with = "String"))]
    pub verification_flags: VerificationFlags,

    /// Evaluate validity periods at this instant (Unix seconds) instead of
    /// the current time.
    pub verification_time: Option<i64>,

    /// Maximum number of issuers above the target certificate.
    ///
    /// The default value is 32.
    pub max_chain_depth: usize,

    /// Extended key usage OIDs, one of which the end-entity certificate must
    /// allow. Empty means any usage is accepted.
    pub application_policy: Vec<String>,
}

impl Verify {
    /// Convert these settings into a [`ChainPolicy`].
    pub fn chain_policy(&self) -> Result<ChainPolicy, CertificateServiceError> {
        let verification_time = match self.verification_time {
            Some(secs) => Some(time::from_unix_seconds(secs).ok_or_else(|| {
                CertificateServiceError::InvalidSettings(format!(
                    "verification_time {secs} is out of range"
                ))
            })?),
            None => None,
        };

        Ok(ChainPolicy {
            verification_flags: self.verification_flags,
            verification_time,
            max_chain_depth: self.max_chain_depth,
            application_policy: self.application_policy.clone(),
        })
    }
}

impl Default for Verify {
    fn default() -> Self {
        Self {
            verification_flags: VerificationFlags::empty(),
            verification_time: None,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            application_policy: vec![],
        }
    }
}

impl SettingsValidate for Verify {
    fn validate(&self) -> Result<(), CertificateServiceError> {
        if self.max_chain_depth == 0 {
            return Err(CertificateServiceError::InvalidSettings(
                "max_chain_depth must be greater than zero".to_string(),
            ));
        }

        for oid in &self.application_policy {
            if ObjectIdentifier::new(oid).is_err() {
                return Err(CertificateServiceError::InvalidSettings(format!(
                    "application_policy entry {oid} is not an OID"
                )));
            }
        }

        self.chain_policy().map(|_| ())
    }
}

/// Settings to configure the trusted store.
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema), schemars(default))]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Trust {
    /// Whether to load the operating system's CA bundle.
    ///
    /// The default value is true.
    pub use_system_anchors: bool,

    /// Additional trust anchor root certificates as a PEM bundle.
    pub trust_anchors: Option<String>,
}

impl Trust {
    /// Build the trusted store described by these settings.
    ///
    /// If the system bundle is requested but cannot be found, only the
    /// configured anchors are used.
    pub fn load_trust_anchors(&self) -> Result<TrustAnchors, CertificateServiceError> {
        let mut anchors = if self.use_system_anchors {
            TrustAnchors::system().unwrap_or_else(|err| {
                warn!("system trust anchors unavailable: {err}");
                TrustAnchors::new()
            })
        } else {
            TrustAnchors::new()
        };

        if let Some(pems) = &self.trust_anchors {
            anchors.add_trust_anchors(&unescape_pem(pems))?;
        }

        Ok(anchors)
    }
}

impl Default for Trust {
    fn default() -> Self {
        Self {
            use_system_anchors: true,
            trust_anchors: None,
        }
    }
}

impl SettingsValidate for Trust {
    fn validate(&self) -> Result<(), CertificateServiceError> {
        if let Some(pems) = &self.trust_anchors {
            TrustAnchors::from_pem(&unescape_pem(pems))
                .map_err(|e| CertificateServiceError::InvalidSettings(e.to_string()))?;
        }

        Ok(())
    }
}

/// Settings for configuring the certificate services.
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema), schemars(default))]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Version of the configuration.
    pub version: u32,

    /// Settings for configuring chain verification.
    pub verify: Verify,

    /// Settings for configuring the trusted store.
    pub trust: Trust,
}

impl Settings {
    /// Create the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a string. Format of configuration must be supplied
    /// (`json` or `toml`).
    ///
    /// The configuration is overlaid on the default settings and validated.
    pub fn from_string(settings_str: &str, format: &str) -> Result<Self, CertificateServiceError> {
        Self::default().with_string(settings_str, format)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml: &str) -> Result<Self, CertificateServiceError> {
        Self::from_string(toml, "toml")
    }

    /// Overlay a JSON configuration on these settings.
    pub fn with_json(self, json: &str) -> Result<Self, CertificateServiceError> {
        self.with_string(json, "json")
    }

    /// Overlay a TOML configuration on these settings.
    pub fn with_toml(self, toml: &str) -> Result<Self, CertificateServiceError> {
        self.with_string(toml, "toml")
    }

    /// Check that the settings are consistent and that any configured trust
    /// anchors parse.
    pub fn validate(&self) -> Result<(), CertificateServiceError> {
        SettingsValidate::validate(self)
    }

    fn with_string(self, settings_str: &str, format: &str) -> Result<Self, CertificateServiceError> {
        let f = match format.to_lowercase().as_str() {
            "json" => FileFormat::Json,
            "toml" => FileFormat::Toml,
            _ => {
                return Err(CertificateServiceError::InvalidSettings(format!(
                    "unsupported settings format {format}"
                )))
            }
        };

        let current_config = Config::try_from(&self)?;

        let updated_config = Config::builder()
            .add_source(current_config)
            .add_source(config::File::from_str(settings_str, f))
            .build()?;

        let settings = updated_config.try_deserialize::<Settings>()?;
        SettingsValidate::validate(&settings)?;

        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: VERSION,
            verify: Default::default(),
            trust: Default::default(),
        }
    }
}

impl SettingsValidate for Settings {
    fn validate(&self) -> Result<(), CertificateServiceError> {
        if self.version > VERSION {
            return Err(CertificateServiceError::InvalidSettings(
                "settings version too new".to_string(),
            ));
        }

        self.verify.validate()?;
        self.trust.validate()
    }
}

// allow for JSON-encoded PEMs with \n
fn unescape_pem(pems: &str) -> Vec<u8> {
    pems.replace("\\n", "\n").into_bytes()
}
