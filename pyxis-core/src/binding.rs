//! Binding model - address selectors, targets and realized associations

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::{BindError, BindResult};

/// Selector for a reserved public address in an association request.
///
/// The two addressing schemes are mutually exclusive by construction. Use
/// [`AddressHandle::from_config`] when starting from an optional-field record
/// as supplied by an orchestration engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressHandle {
    /// VPC addressing: select the address by its allocation id.
    Allocation { allocation_id: String },
    /// Legacy addressing: select the address by its public IP.
    PublicIp { public_ip: Ipv4Addr },
}

impl AddressHandle {
    /// Build a handle from a desired-state record. Exactly one of the two
    /// selectors must be present.
    pub fn from_config(allocation_id: Option<&str>, public_ip: Option<&str>) -> BindResult<Self> {
        match (allocation_id, public_ip) {
            (Some(allocation_id), None) => Ok(Self::Allocation {
                allocation_id: allocation_id.to_string(),
            }),
            (None, Some(public_ip)) => {
                let public_ip = public_ip.parse().map_err(|_| {
                    BindError::InvalidCombination("public_ip is not a valid IPv4 address")
                })?;
                Ok(Self::PublicIp { public_ip })
            }
            (Some(_), Some(_)) => Err(BindError::InvalidCombination(
                "allocation_id and public_ip are mutually exclusive",
            )),
            (None, None) => Err(BindError::InvalidCombination(
                "one of allocation_id or public_ip is required",
            )),
        }
    }

    pub fn allocation_id(&self) -> Option<&str> {
        match self {
            Self::Allocation { allocation_id } => Some(allocation_id),
            Self::PublicIp { .. } => None,
        }
    }

    pub fn public_ip(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Allocation { .. } => None,
            Self::PublicIp { public_ip } => Some(*public_ip),
        }
    }
}

/// Compute target of a binding. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindTarget {
    Instance { instance_id: String },
    NetworkInterface { network_interface_id: String },
}

impl BindTarget {
    /// Build a target from a desired-state record. Exactly one of the two
    /// selectors must be present.
    pub fn from_config(
        instance_id: Option<&str>,
        network_interface_id: Option<&str>,
    ) -> BindResult<Self> {
        match (instance_id, network_interface_id) {
            (Some(instance_id), None) => Ok(Self::Instance {
                instance_id: instance_id.to_string(),
            }),
            (None, Some(network_interface_id)) => Ok(Self::NetworkInterface {
                network_interface_id: network_interface_id.to_string(),
            }),
            (Some(_), Some(_)) => Err(BindError::InvalidCombination(
                "instance_id and network_interface_id are mutually exclusive",
            )),
            (None, None) => Err(BindError::InvalidCombination(
                "one of instance_id or network_interface_id is required",
            )),
        }
    }
}

/// Canonical identity of a realized binding.
///
/// VPC-mode bindings carry a vendor-assigned association identifier. Classic
/// networking has no distinct association id; by convention the binding's
/// external identifier is the address's public IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingId {
    Association(String),
    PublicIp(Ipv4Addr),
}

impl BindingId {
    /// True when this identity follows the classic public-IP convention.
    pub fn is_classic(&self) -> bool {
        matches!(self, Self::PublicIp(_))
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Association(association_id) => write!(f, "{}", association_id),
            Self::PublicIp(public_ip) => write!(f, "{}", public_ip),
        }
    }
}

/// A realized association between a reserved address and a compute target.
///
/// Created by a bind operation, read back to confirm convergence, destroyed
/// by unbind. There is no update; rebinding requires destroy-then-create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub id: BindingId,
    pub address: AddressHandle,
    pub target: BindTarget,
}

impl Binding {
    pub fn is_classic(&self) -> bool {
        self.id.is_classic()
    }

    /// The identifier handed back to the orchestration engine, consumed
    /// later for import/read/destroy cycles.
    pub fn external_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_from_config_allocation() {
        let handle = AddressHandle::from_config(Some("eipalloc-1"), None).unwrap();
        assert_eq!(handle.allocation_id(), Some("eipalloc-1"));
        assert_eq!(handle.public_ip(), None);
    }

    #[test]
    fn address_from_config_public_ip() {
        let handle = AddressHandle::from_config(None, Some("203.0.113.5")).unwrap();
        assert_eq!(handle.public_ip(), Some("203.0.113.5".parse().unwrap()));
    }

    #[test]
    fn address_from_config_rejects_both() {
        let err = AddressHandle::from_config(Some("eipalloc-1"), Some("203.0.113.5")).unwrap_err();
        assert!(matches!(err, BindError::InvalidCombination(_)));
    }

    #[test]
    fn address_from_config_rejects_neither() {
        let err = AddressHandle::from_config(None, None).unwrap_err();
        assert!(matches!(err, BindError::InvalidCombination(_)));
    }

    #[test]
    fn address_from_config_rejects_malformed_ip() {
        let err = AddressHandle::from_config(None, Some("203.0.113")).unwrap_err();
        assert!(matches!(err, BindError::InvalidCombination(_)));
    }

    #[test]
    fn target_from_config_rejects_both() {
        let err = BindTarget::from_config(Some("i-1"), Some("eni-1")).unwrap_err();
        assert!(matches!(err, BindError::InvalidCombination(_)));
    }

    #[test]
    fn classic_binding_id_is_the_public_ip() {
        let binding = Binding {
            id: BindingId::PublicIp("203.0.113.5".parse().unwrap()),
            address: AddressHandle::PublicIp {
                public_ip: "203.0.113.5".parse().unwrap(),
            },
            target: BindTarget::Instance {
                instance_id: "i-1".to_string(),
            },
        };
        assert!(binding.is_classic());
        assert_eq!(binding.external_id(), "203.0.113.5");
    }

    #[test]
    fn binding_serialization() {
        let binding = Binding {
            id: BindingId::Association("eipassoc-1".to_string()),
            address: AddressHandle::Allocation {
                allocation_id: "eipalloc-1".to_string(),
            },
            target: BindTarget::Instance {
                instance_id: "i-1".to_string(),
            },
        };
        let json = serde_json::to_string(&binding).unwrap();
        let deserialized: Binding = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, binding);
    }
}
