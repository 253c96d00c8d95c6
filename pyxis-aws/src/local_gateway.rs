//! Local gateway virtual interface group lookup
//!
//! Read-only lookup that resolves a query to exactly one local gateway
//! virtual interface group. Zero matches and multiple matches are both
//! errors; a query matching several groups needs additional constraints
//! rather than an arbitrary pick.

use std::collections::HashMap;

use aws_sdk_ec2::Client as Ec2Client;
use aws_sdk_ec2::types::{Filter, LocalGatewayVirtualInterfaceGroup};
use log::debug;
use thiserror::Error;

use pyxis_core::error::VendorError;

/// Errors from a virtual interface group lookup
#[derive(Debug, Error)]
pub enum LookupError {
    /// No group matched the query.
    #[error("no local gateway virtual interface group matched the query")]
    NoMatch,

    /// More than one group matched; the query needs narrowing.
    #[error(
        "{0} local gateway virtual interface groups matched the query, \
         use additional constraints to reduce matches to a single group"
    )]
    MultipleMatches(usize),

    /// Vendor transport error, surfaced verbatim.
    #[error("{0}")]
    Vendor(VendorError),
}

/// Query constraints for a single virtual interface group.
///
/// All populated constraints apply together, server-side.
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    /// Look up one group directly by its identifier.
    pub group_id: Option<String>,
    /// Constrain to groups of one local gateway.
    pub local_gateway_id: Option<String>,
    /// Constrain by resource tags.
    pub tags: HashMap<String, String>,
    /// Raw vendor filters, passed through as given.
    pub filters: Vec<(String, Vec<String>)>,
}

impl GroupQuery {
    pub fn by_group_id(group_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            ..Default::default()
        }
    }

    pub fn by_local_gateway_id(local_gateway_id: impl Into<String>) -> Self {
        Self {
            local_gateway_id: Some(local_gateway_id.into()),
            ..Default::default()
        }
    }

    /// Vendor filter tuples for every constraint except `group_id`, which
    /// travels as a direct identifier argument.
    pub fn to_filters(&self) -> Vec<(String, Vec<String>)> {
        let mut filters = Vec::new();
        if let Some(local_gateway_id) = &self.local_gateway_id {
            filters.push((
                "local-gateway-id".to_string(),
                vec![local_gateway_id.clone()],
            ));
        }
        let mut tag_keys: Vec<&String> = self.tags.keys().collect();
        tag_keys.sort();
        for key in tag_keys {
            filters.push((format!("tag:{}", key), vec![self.tags[key].clone()]));
        }
        filters.extend(self.filters.iter().cloned());
        filters
    }
}

/// One local gateway virtual interface group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualInterfaceGroup {
    pub id: String,
    pub local_gateway_id: Option<String>,
    pub virtual_interface_ids: Vec<String>,
    pub tags: HashMap<String, String>,
}

/// Fetch all groups matching the query and require exactly one.
pub async fn find_virtual_interface_group(
    client: &Ec2Client,
    query: &GroupQuery,
) -> Result<VirtualInterfaceGroup, LookupError> {
    let mut req = client.describe_local_gateway_virtual_interface_groups();
    if let Some(group_id) = &query.group_id {
        req = req.local_gateway_virtual_interface_group_ids(group_id);
    }
    for (name, values) in query.to_filters() {
        let mut filter = Filter::builder().name(name);
        for value in values {
            filter = filter.values(value);
        }
        req = req.filters(filter.build());
    }

    debug!("describing local gateway virtual interface groups");
    let mut pages = req.into_paginator().send();
    let mut groups = Vec::new();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| LookupError::Vendor(Box::new(err)))?;
        groups.extend(
            page.local_gateway_virtual_interface_groups()
                .iter()
                .filter_map(to_group),
        );
    }

    select_unique(groups)
}

/// Exactly-one-match rule, shared with the binder's convergence semantics.
fn select_unique(
    mut groups: Vec<VirtualInterfaceGroup>,
) -> Result<VirtualInterfaceGroup, LookupError> {
    if groups.len() > 1 {
        return Err(LookupError::MultipleMatches(groups.len()));
    }
    groups.pop().ok_or(LookupError::NoMatch)
}

fn to_group(group: &LocalGatewayVirtualInterfaceGroup) -> Option<VirtualInterfaceGroup> {
    let id = group.local_gateway_virtual_interface_group_id()?.to_string();
    let tags = group
        .tags()
        .iter()
        .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
        .collect();
    Some(VirtualInterfaceGroup {
        id,
        local_gateway_id: group.local_gateway_id().map(String::from),
        virtual_interface_ids: group.local_gateway_virtual_interface_ids().to_vec(),
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str) -> VirtualInterfaceGroup {
        VirtualInterfaceGroup {
            id: id.to_string(),
            local_gateway_id: Some("lgw-1".to_string()),
            virtual_interface_ids: vec!["lgw-vif-1".to_string(), "lgw-vif-2".to_string()],
            tags: HashMap::new(),
        }
    }

    #[test]
    fn select_unique_single_match() {
        let selected = select_unique(vec![group("lgw-vif-grp-1")]).unwrap();
        assert_eq!(selected.id, "lgw-vif-grp-1");
        assert_eq!(selected.virtual_interface_ids.len(), 2);
    }

    #[test]
    fn select_unique_no_match() {
        let err = select_unique(vec![]).unwrap_err();
        assert!(matches!(err, LookupError::NoMatch));
    }

    #[test]
    fn select_unique_multiple_matches() {
        let err = select_unique(vec![group("lgw-vif-grp-1"), group("lgw-vif-grp-2")]).unwrap_err();
        assert!(matches!(err, LookupError::MultipleMatches(2)));
    }

    #[test]
    fn query_filters_for_local_gateway_id() {
        let query = GroupQuery::by_local_gateway_id("lgw-1");
        assert_eq!(
            query.to_filters(),
            vec![("local-gateway-id".to_string(), vec!["lgw-1".to_string()])]
        );
    }

    #[test]
    fn query_filters_include_tags_and_raw_filters() {
        let mut query = GroupQuery::default();
        query.tags.insert("Name".to_string(), "edge".to_string());
        query.filters.push((
            "local-gateway-id".to_string(),
            vec!["lgw-1".to_string()],
        ));

        let filters = query.to_filters();
        assert!(filters.contains(&("tag:Name".to_string(), vec!["edge".to_string()])));
        assert!(filters.contains(&("local-gateway-id".to_string(), vec!["lgw-1".to_string()])));
    }

    #[test]
    fn group_id_travels_as_identifier_not_filter() {
        let query = GroupQuery::by_group_id("lgw-vif-grp-1");
        assert!(query.to_filters().is_empty());
    }
}
