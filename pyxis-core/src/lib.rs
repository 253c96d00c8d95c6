//! Pyxis Core
//!
//! Vendor-agnostic model and logic for binding reserved public addresses to
//! compute targets across two addressing schemes: allocation-based VPC
//! addressing and legacy public-IP-based (classic) addressing.
//!
//! ## Module Structure
//!
//! - `binding` - Address selectors, bind targets and realized bindings
//! - `environment` - Networking environment detection
//! - `identity` - Format-driven resolution of raw external identifiers
//! - `api` - Vendor API boundary (trait + wire records)
//! - `binder` - The dual-mode binder: bind, verify, unbind, import
//! - `error` - Error taxonomy for binding operations

pub mod api;
pub mod binder;
pub mod binding;
pub mod environment;
pub mod error;
pub mod identity;

// Re-export main types
pub use api::{AddressApi, AddressFilter, AddressRecord, AssociateRequest, AssociateResponse};
pub use binder::AddressBinder;
pub use binding::{AddressHandle, BindTarget, Binding, BindingId};
pub use environment::Environment;
pub use error::{BindError, BindResult, VendorError};
pub use identity::resolve_identity;
