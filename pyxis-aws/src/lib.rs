//! Pyxis AWS Client
//!
//! EC2-backed implementation of the Pyxis vendor boundary.
//!
//! ## Module Structure
//!
//! - `client` - `Ec2AddressClient`, the `AddressApi` implementation
//! - `local_gateway` - Local gateway virtual interface group lookup

pub mod client;
pub mod local_gateway;

// Re-export main types
pub use client::Ec2AddressClient;
pub use local_gateway::{GroupQuery, LookupError, VirtualInterfaceGroup};
