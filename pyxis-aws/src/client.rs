//! EC2 address client
//!
//! Implements the binder's vendor boundary with the AWS EC2 API: associate,
//! describe (by `association-id` or `public-ip` filter), disassociate and
//! the supported-platforms account attribute. SDK errors are boxed and
//! passed through untouched.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_ec2::Client as Ec2Client;
use aws_sdk_ec2::types::{AccountAttributeName, Address, Filter};
use log::debug;
use pyxis_core::api::{
    AddressApi, AddressFilter, AddressRecord, AssociateRequest, AssociateResponse,
};
use pyxis_core::binding::{AddressHandle, BindTarget, BindingId};
use pyxis_core::error::VendorError;

/// EC2-backed vendor client
pub struct Ec2AddressClient {
    ec2_client: Ec2Client,
    region: String,
}

impl Ec2AddressClient {
    /// Create a new client for the specified region
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            ec2_client: Ec2Client::new(&config),
            region: region.to_string(),
        }
    }

    /// Create with a specific client (for testing)
    pub fn with_client(ec2_client: Ec2Client, region: String) -> Self {
        Self { ec2_client, region }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn ec2_client(&self) -> &Ec2Client {
        &self.ec2_client
    }
}

#[async_trait]
impl AddressApi for Ec2AddressClient {
    async fn associate(
        &self,
        request: AssociateRequest,
    ) -> Result<AssociateResponse, VendorError> {
        let mut req = self.ec2_client.associate_address();
        match &request.address {
            AddressHandle::Allocation { allocation_id } => {
                req = req.allocation_id(allocation_id);
            }
            AddressHandle::PublicIp { public_ip } => {
                req = req.public_ip(public_ip.to_string());
            }
        }
        match &request.target {
            BindTarget::Instance { instance_id } => {
                req = req.instance_id(instance_id);
            }
            BindTarget::NetworkInterface {
                network_interface_id,
            } => {
                req = req.network_interface_id(network_interface_id);
            }
        }

        debug!("associating address in {}", self.region);
        let output = req.send().await.map_err(boxed)?;

        Ok(AssociateResponse {
            association_id: output.association_id().map(String::from),
        })
    }

    async fn describe(&self, filter: &AddressFilter) -> Result<Vec<AddressRecord>, VendorError> {
        let aws_filter = Filter::builder()
            .name(filter.name())
            .values(filter.value())
            .build();

        debug!("describing addresses by {}={}", filter.name(), filter.value());
        let output = self
            .ec2_client
            .describe_addresses()
            .filters(aws_filter)
            .send()
            .await
            .map_err(boxed)?;

        Ok(output.addresses().iter().map(to_record).collect())
    }

    async fn disassociate(&self, id: &BindingId) -> Result<(), VendorError> {
        let mut req = self.ec2_client.disassociate_address();
        match id {
            BindingId::Association(association_id) => {
                req = req.association_id(association_id);
            }
            BindingId::PublicIp(public_ip) => {
                req = req.public_ip(public_ip.to_string());
            }
        }

        debug!("disassociating {}", id);
        req.send().await.map_err(boxed)?;
        Ok(())
    }

    async fn supported_platforms(&self) -> Result<Vec<String>, VendorError> {
        let output = self
            .ec2_client
            .describe_account_attributes()
            .attribute_names(AccountAttributeName::SupportedPlatforms)
            .send()
            .await
            .map_err(boxed)?;

        let platforms = output
            .account_attributes()
            .iter()
            .flat_map(|attribute| attribute.attribute_values())
            .filter_map(|value| value.attribute_value().map(String::from))
            .collect();
        Ok(platforms)
    }
}

fn boxed<E: std::error::Error + Send + Sync + 'static>(err: E) -> VendorError {
    Box::new(err)
}

fn to_record(address: &Address) -> AddressRecord {
    AddressRecord {
        association_id: address.association_id().map(String::from),
        allocation_id: address.allocation_id().map(String::from),
        public_ip: address.public_ip().and_then(|ip| ip.parse().ok()),
        instance_id: address.instance_id().map(String::from),
        network_interface_id: address.network_interface_id().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_record_maps_address_fields() {
        let address = Address::builder()
            .association_id("eipassoc-1")
            .allocation_id("eipalloc-1")
            .public_ip("203.0.113.5")
            .instance_id("i-1")
            .build();

        let record = to_record(&address);
        assert_eq!(record.association_id.as_deref(), Some("eipassoc-1"));
        assert_eq!(record.allocation_id.as_deref(), Some("eipalloc-1"));
        assert_eq!(record.public_ip, Some("203.0.113.5".parse().unwrap()));
        assert_eq!(record.instance_id.as_deref(), Some("i-1"));
        assert_eq!(record.network_interface_id, None);
    }

    #[test]
    fn to_record_drops_unparseable_public_ip() {
        let address = Address::builder().public_ip("not-an-ip").build();
        assert_eq!(to_record(&address).public_ip, None);
    }
}
