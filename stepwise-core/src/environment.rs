//! Deployment environment tag

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the deployment tag
pub const ENVIRONMENT_VAR: &str = "STEPWISEMATH_ENV";

/// Which CDN the widget assets are served from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Staging,
    #[default]
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }

    pub fn cdn_host(&self) -> &'static str {
        match self {
            Environment::Dev => "cdn.dev.stepwisemath.ai",
            Environment::Staging => "cdn.staging.stepwisemath.ai",
            Environment::Prod => "cdn.web.stepwisemath.ai",
        }
    }

    pub fn cdn_url(&self) -> String {
        format!("https://{}", self.cdn_host())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dev" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
