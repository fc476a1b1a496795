/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Endpoints of a logged transaction. `Internal` is the bridge itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ghl,
    Clio,
    Internal,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ghl => "ghl",
            Platform::Clio => "clio",
            Platform::Internal => "internal",
        }
    }

    /// Human-facing name used in log and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Ghl => "GHL",
            Platform::Clio => "Clio",
            Platform::Internal => "internal",
        }
    }

    /// Parse an external service name. Only `ghl` and `clio` carry credentials.
    pub fn parse_service(value: &str) -> Option<Platform> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ghl" => Some(Platform::Ghl),
            "clio" => Some(Platform::Clio),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
