//! Vendor API boundary
//!
//! The binder issues three logical calls against the vendor: associate,
//! describe and disassociate, plus a one-time platform query used for
//! environment detection. Request and response schemas beyond the types here
//! belong to the vendor SDK.

use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::binding::{AddressHandle, BindTarget, BindingId};
use crate::error::VendorError;

/// Filter used when describing addresses.
///
/// The filter field names are part of the vendor contract: `association-id`
/// and `public-ip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressFilter {
    AssociationId(String),
    PublicIp(Ipv4Addr),
}

impl AddressFilter {
    /// The filter used to look up a binding by its canonical identity.
    pub fn for_binding(id: &BindingId) -> Self {
        match id {
            BindingId::Association(association_id) => {
                Self::AssociationId(association_id.clone())
            }
            BindingId::PublicIp(public_ip) => Self::PublicIp(*public_ip),
        }
    }

    /// Vendor filter field name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssociationId(_) => "association-id",
            Self::PublicIp(_) => "public-ip",
        }
    }

    /// Vendor filter value.
    pub fn value(&self) -> String {
        match self {
            Self::AssociationId(association_id) => association_id.clone(),
            Self::PublicIp(public_ip) => public_ip.to_string(),
        }
    }
}

/// One address record returned by a describe call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressRecord {
    pub association_id: Option<String>,
    pub allocation_id: Option<String>,
    pub public_ip: Option<Ipv4Addr>,
    pub instance_id: Option<String>,
    pub network_interface_id: Option<String>,
}

impl AddressRecord {
    /// True while the address is attached to a compute target.
    pub fn is_associated(&self) -> bool {
        self.association_id.is_some()
            || self.instance_id.is_some()
            || self.network_interface_id.is_some()
    }
}

/// An association request, already validated by the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociateRequest {
    pub address: AddressHandle,
    pub target: BindTarget,
}

/// Vendor response to an associate call.
///
/// `association_id` is absent in classic networking, which has no distinct
/// association identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociateResponse {
    pub association_id: Option<String>,
}

/// Vendor client the binder calls into.
///
/// Implementations perform synchronous (awaited) network calls with no
/// internal retries, backoff or deadlines; errors pass through verbatim so
/// the caller's orchestration layer can classify them.
#[async_trait]
pub trait AddressApi: Send + Sync {
    /// Issue the vendor association call.
    async fn associate(&self, request: AssociateRequest)
    -> Result<AssociateResponse, VendorError>;

    /// Describe addresses matching a single filter.
    async fn describe(&self, filter: &AddressFilter) -> Result<Vec<AddressRecord>, VendorError>;

    /// Issue the vendor disassociation call for a binding identity.
    async fn disassociate(&self, id: &BindingId) -> Result<(), VendorError>;

    /// Platform tokens supported by the account (e.g. "EC2", "VPC").
    async fn supported_platforms(&self) -> Result<Vec<String>, VendorError>;
}

/// Delegation for borrowed clients, so one client can serve many binders.
#[async_trait]
impl<A: AddressApi + ?Sized> AddressApi for &A {
    async fn associate(
        &self,
        request: AssociateRequest,
    ) -> Result<AssociateResponse, VendorError> {
        (**self).associate(request).await
    }

    async fn describe(&self, filter: &AddressFilter) -> Result<Vec<AddressRecord>, VendorError> {
        (**self).describe(filter).await
    }

    async fn disassociate(&self, id: &BindingId) -> Result<(), VendorError> {
        (**self).disassociate(id).await
    }

    async fn supported_platforms(&self) -> Result<Vec<String>, VendorError> {
        (**self).supported_platforms().await
    }
}

/// Delegation for boxed clients; enables dynamic dispatch.
#[async_trait]
impl<A: AddressApi + ?Sized> AddressApi for Box<A> {
    async fn associate(
        &self,
        request: AssociateRequest,
    ) -> Result<AssociateResponse, VendorError> {
        (**self).associate(request).await
    }

    async fn describe(&self, filter: &AddressFilter) -> Result<Vec<AddressRecord>, VendorError> {
        (**self).describe(filter).await
    }

    async fn disassociate(&self, id: &BindingId) -> Result<(), VendorError> {
        (**self).disassociate(id).await
    }

    async fn supported_platforms(&self) -> Result<Vec<String>, VendorError> {
        (**self).supported_platforms().await
    }
}
