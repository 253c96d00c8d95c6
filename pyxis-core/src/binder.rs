//! The dual-mode address binder
//!
//! Given a desired binding expressed in one of two addressing schemes, the
//! binder determines its canonical identity, performs the bind, verifies
//! existence post-bind and performs idempotent unbind. Bindings are
//! independent of each other; the only shared state is the read-only
//! [`Environment`], so any number of binders can run concurrently. The
//! binder performs no retries and imposes no deadlines; both belong to the
//! caller's orchestration layer.

use log::{debug, warn};

use crate::api::{AddressApi, AddressFilter, AddressRecord, AssociateRequest};
use crate::binding::{AddressHandle, BindTarget, Binding, BindingId};
use crate::environment::Environment;
use crate::error::{BindError, BindResult};
use crate::identity;

/// Binds reserved addresses to compute targets through an injected vendor
/// client.
pub struct AddressBinder<A> {
    api: A,
    env: Environment,
}

impl<A: AddressApi> AddressBinder<A> {
    pub fn new(api: A, env: Environment) -> Self {
        Self { api, env }
    }

    pub fn environment(&self) -> Environment {
        self.env
    }

    /// Resolve a raw external identifier (import request) into a canonical
    /// binding identity. Local validation only.
    pub fn resolve_identity(&self, raw_id: &str) -> BindResult<BindingId> {
        identity::resolve_identity(raw_id, &self.env)
    }

    /// Associate an address with a target and return the realized binding.
    ///
    /// Selector validation happens before any vendor call. The binding id is
    /// the vendor-returned association id when present; in classic
    /// networking, which has no association id, it echoes the public IP.
    pub async fn bind(&self, address: AddressHandle, target: BindTarget) -> BindResult<Binding> {
        self.check_combination(&address, &target)?;

        debug!("associating {:?} with {:?}", address, target);
        let response = self
            .api
            .associate(AssociateRequest {
                address: address.clone(),
                target: target.clone(),
            })
            .await?;

        let id = match response.association_id {
            Some(association_id) => BindingId::Association(association_id),
            None => match &address {
                AddressHandle::PublicIp { public_ip } if self.env.supports_classic => {
                    BindingId::PublicIp(*public_ip)
                }
                AddressHandle::PublicIp { public_ip } => {
                    return Err(BindError::InvariantViolation {
                        id: public_ip.to_string(),
                        detail: "associate returned no association id outside classic networking"
                            .to_string(),
                    });
                }
                AddressHandle::Allocation { allocation_id } => {
                    return Err(BindError::InvariantViolation {
                        id: allocation_id.clone(),
                        detail: "associate returned no association id for an allocation"
                            .to_string(),
                    });
                }
            },
        };

        Ok(Binding {
            id,
            address,
            target,
        })
    }

    /// Confirm convergence: the binding must match exactly one vendor record.
    pub async fn verify_exists(&self, binding: &Binding) -> BindResult<()> {
        self.describe_one(&binding.id).await.map(|_| ())
    }

    /// Tear down a binding. Already-absent counts as success, so calling
    /// this from the unbound state is a no-op; only records remaining after
    /// the disassociate call signal a failed teardown.
    pub async fn unbind(&self, binding: &Binding) -> BindResult<()> {
        let filter = AddressFilter::for_binding(&binding.id);

        let existing = self.api.describe(&filter).await?;
        if !existing.iter().any(|r| still_bound(r, &binding.id)) {
            debug!("binding {} already absent, nothing to unbind", binding.id);
            return Ok(());
        }

        debug!("disassociating binding {}", binding.id);
        self.api.disassociate(&binding.id).await?;

        let remaining = self.api.describe(&filter).await?;
        if remaining.iter().any(|r| still_bound(r, &binding.id)) {
            return Err(BindError::TeardownFailed(binding.id.to_string()));
        }
        Ok(())
    }

    /// Reconstruct a binding from a raw external identifier.
    pub async fn import(&self, raw_id: &str) -> BindResult<Binding> {
        let id = self.resolve_identity(raw_id)?;
        let record = self.describe_one(&id).await?;

        let address = if let Some(allocation_id) = record.allocation_id.clone() {
            AddressHandle::Allocation { allocation_id }
        } else if let Some(public_ip) = record.public_ip {
            AddressHandle::PublicIp { public_ip }
        } else {
            return Err(BindError::InvariantViolation {
                id: id.to_string(),
                detail: "address record carries neither allocation id nor public ip".to_string(),
            });
        };

        let target = if let Some(instance_id) = record.instance_id.clone() {
            BindTarget::Instance { instance_id }
        } else if let Some(network_interface_id) = record.network_interface_id.clone() {
            BindTarget::NetworkInterface {
                network_interface_id,
            }
        } else {
            // The address exists but is not associated with anything.
            return Err(BindError::NotFound(id.to_string()));
        };

        Ok(Binding {
            id,
            address,
            target,
        })
    }

    /// Look up a binding identity and require exactly one matching record.
    ///
    /// More than one match indicates vendor-side duplication and is always
    /// surfaced, never resolved by picking the first.
    async fn describe_one(&self, id: &BindingId) -> BindResult<AddressRecord> {
        let filter = AddressFilter::for_binding(id);
        let mut records = self.api.describe(&filter).await?;

        if records.len() > 1 {
            warn!(
                "{} records matched {}={}",
                records.len(),
                filter.name(),
                filter.value()
            );
            return Err(BindError::InvariantViolation {
                id: id.to_string(),
                detail: format!("{} records matched a single-identity filter", records.len()),
            });
        }
        let Some(record) = records.pop() else {
            return Err(BindError::NotFound(id.to_string()));
        };

        match id {
            BindingId::Association(expected) => {
                if record.association_id.as_deref() != Some(expected.as_str()) {
                    return Err(BindError::NotFound(id.to_string()));
                }
            }
            BindingId::PublicIp(expected) => {
                // The public-ip filter has been observed returning a record
                // for a different address; keep the equality guard.
                if record.public_ip != Some(*expected) {
                    return Err(BindError::NotFound(id.to_string()));
                }
                // Classic address records outlive their association.
                if !record.is_associated() {
                    return Err(BindError::NotFound(id.to_string()));
                }
            }
        }

        Ok(record)
    }

    fn check_combination(&self, address: &AddressHandle, target: &BindTarget) -> BindResult<()> {
        if matches!(address, AddressHandle::PublicIp { .. })
            && matches!(target, BindTarget::NetworkInterface { .. })
        {
            return Err(BindError::InvalidCombination(
                "a public IP selector cannot target a network interface",
            ));
        }
        if matches!(address, AddressHandle::Allocation { .. }) && !self.env.supports_vpc {
            return Err(BindError::InvalidCombination(
                "allocation-based addressing requires VPC networking support",
            ));
        }
        Ok(())
    }
}

/// Whether a described record still represents this binding.
///
/// An association-id filter only matches while the association exists, so
/// any record counts. A public-ip filter keeps matching the address after
/// disassociation; the record counts only while attached to a target.
fn still_bound(record: &AddressRecord, id: &BindingId) -> bool {
    match id {
        BindingId::Association(_) => true,
        BindingId::PublicIp(_) => record.is_associated(),
    }
}
