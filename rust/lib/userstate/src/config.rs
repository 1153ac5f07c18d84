//! User state configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! [collation]
//! numeric = false
//! case_first = "lower"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collate::{CollationConfig, Collator};
use crate::error::UserStateError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStateConfig {
    /// Ordering of the sorted workspace user list.
    pub collation: CollationConfig,
}

impl UserStateConfig {
    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, UserStateError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| UserStateError::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, UserStateError> {
        toml::from_str(content).map_err(|e| UserStateError::Config(e.to_string()))
    }

    pub fn collator(&self) -> Collator {
        Collator::new(self.collation)
    }
}
