//! Networking environment - resolved once per session, read-only after

use serde::{Deserialize, Serialize};

use crate::api::AddressApi;
use crate::error::VendorError;

/// Platform token reported for classic networking.
pub const PLATFORM_CLASSIC: &str = "EC2";
/// Platform token reported for VPC networking.
pub const PLATFORM_VPC: &str = "VPC";

/// Which addressing schemes the account's networking environment supports.
///
/// Resolved once per provider session and injected into every binder; safe
/// for concurrent reads. Governs which query filter is used to look up a
/// binding's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub supports_classic: bool,
    pub supports_vpc: bool,
}

impl Environment {
    pub fn vpc_only() -> Self {
        Self {
            supports_classic: false,
            supports_vpc: true,
        }
    }

    pub fn classic_only() -> Self {
        Self {
            supports_classic: true,
            supports_vpc: false,
        }
    }

    /// Build from the vendor's supported-platforms account attribute values.
    pub fn from_platforms<I, S>(platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut env = Self {
            supports_classic: false,
            supports_vpc: false,
        };
        for platform in platforms {
            match platform.as_ref() {
                PLATFORM_CLASSIC => env.supports_classic = true,
                PLATFORM_VPC => env.supports_vpc = true,
                _ => {}
            }
        }
        env
    }

    /// Resolve the environment by querying the vendor once.
    pub async fn detect(api: &dyn AddressApi) -> Result<Self, VendorError> {
        let platforms = api.supported_platforms().await?;
        Ok(Self::from_platforms(platforms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_platforms_vpc_only() {
        let env = Environment::from_platforms(["VPC"]);
        assert!(env.supports_vpc);
        assert!(!env.supports_classic);
    }

    #[test]
    fn from_platforms_both() {
        let env = Environment::from_platforms(["EC2", "VPC"]);
        assert!(env.supports_vpc);
        assert!(env.supports_classic);
    }

    #[test]
    fn from_platforms_ignores_unknown_tokens() {
        let env = Environment::from_platforms(["Wavelength"]);
        assert!(!env.supports_vpc);
        assert!(!env.supports_classic);
    }
}
