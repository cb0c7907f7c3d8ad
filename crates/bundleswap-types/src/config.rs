//! Configuration for an escrow desk.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Result, SwapError, constants};

/// Configuration for one escrow desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// The account that holds deposited bundles and operates every transfer.
    pub custodian: AccountId,
    /// Maximum number of entries in a single bundle.
    #[serde(default = "default_max_bundle_entries")]
    pub max_bundle_entries: usize,
    /// Maximum offer name length, in characters.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
}

fn default_max_bundle_entries() -> usize {
    constants::DEFAULT_MAX_BUNDLE_ENTRIES
}

fn default_max_name_len() -> usize {
    constants::DEFAULT_MAX_NAME_LEN
}

impl DeskConfig {
    /// Config with default limits for the given custodian.
    #[must_use]
    pub fn new(custodian: AccountId) -> Self {
        Self {
            custodian,
            max_bundle_entries: constants::DEFAULT_MAX_BUNDLE_ENTRIES,
            max_name_len: constants::DEFAULT_MAX_NAME_LEN,
        }
    }

    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, `Configuration` for bad values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `Configuration` if a limit is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_bundle_entries == 0 {
            return Err(SwapError::Configuration(
                "max_bundle_entries must be > 0".into(),
            ));
        }
        if self.max_name_len == 0 {
            return Err(SwapError::Configuration("max_name_len must be > 0".into()));
        }
        Ok(())
    }
}
