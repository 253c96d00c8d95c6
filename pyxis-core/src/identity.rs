//! Format-driven identity resolution for import requests

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

use crate::binding::BindingId;
use crate::environment::Environment;
use crate::error::{BindError, BindResult};

/// Prefix of vendor-assigned association identifiers.
pub const ASSOCIATION_ID_PREFIX: &str = "eipassoc-";

static ASSOCIATION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^eipassoc-[0-9a-f]+$").unwrap());

/// Resolve a raw external identifier into a canonical binding identity.
///
/// Resolution is format-driven, not environment-driven first: the
/// association-id prefix is checked before the IPv4 literal because the
/// prefixed namespace can never collide with a dotted quad. An IPv4 literal
/// is the classic-mode convention and requires classic support in the
/// environment. Anything else is `AmbiguousIdentity`; this function is total
/// over string inputs and never calls the vendor.
pub fn resolve_identity(raw_id: &str, env: &Environment) -> BindResult<BindingId> {
    if ASSOCIATION_ID.is_match(raw_id) {
        return Ok(BindingId::Association(raw_id.to_string()));
    }

    if let Ok(public_ip) = raw_id.parse::<Ipv4Addr>() {
        if env.supports_classic {
            return Ok(BindingId::PublicIp(public_ip));
        }
        return Err(BindError::AmbiguousIdentity(raw_id.to_string()));
    }

    Err(BindError::AmbiguousIdentity(raw_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_env() -> Environment {
        Environment {
            supports_classic: true,
            supports_vpc: true,
        }
    }

    #[test]
    fn association_id_resolves_to_vpc_identity() {
        let id = resolve_identity("eipassoc-0abc123", &Environment::vpc_only()).unwrap();
        assert_eq!(id, BindingId::Association("eipassoc-0abc123".to_string()));
    }

    #[test]
    fn association_id_wins_even_with_classic_support() {
        // Prefix match must be checked first.
        let id = resolve_identity("eipassoc-1", &classic_env()).unwrap();
        assert!(!id.is_classic());
    }

    #[test]
    fn ip_resolves_to_classic_identity() {
        let id = resolve_identity("203.0.113.5", &classic_env()).unwrap();
        assert_eq!(id, BindingId::PublicIp("203.0.113.5".parse().unwrap()));
        assert!(id.is_classic());
    }

    #[test]
    fn ip_without_classic_support_is_ambiguous() {
        let err = resolve_identity("203.0.113.5", &Environment::vpc_only()).unwrap_err();
        assert!(matches!(err, BindError::AmbiguousIdentity(_)));
    }

    #[test]
    fn resolution_is_total_over_garbage() {
        for raw in ["", "eipassoc-", "eni-1", "999.0.113.5", "not an id", "eipassoc-XYZ"] {
            let err = resolve_identity(raw, &classic_env()).unwrap_err();
            assert!(matches!(err, BindError::AmbiguousIdentity(_)), "{raw:?}");
        }
    }
}
