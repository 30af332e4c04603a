//! Client for delegating subnet allocation to the Mira IPAM service.
//!
//! [`IpamClient`] finds free subnets under a parent range and claims the first
//! one on behalf of a project. The [`resource`] module wraps it in the
//! create/read lifecycle an orchestration tool drives, and [`handlers`]
//! serves that lifecycle over HTTP.

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod resource;
pub mod state;
pub mod transport;

pub use address::is_valid_address;
pub use client::IpamClient;
pub use config::{AssignmentMode, ClientConfig, MaskSource};
pub use error::{ErrorKind, IpamError, ProtocolError, Result};
pub use models::{
    AllocationResult, AssignmentRequest, AssignmentWireRecord, AvailabilityResponse, RangeQuery,
    SubnetRecord, Template,
};
pub use transport::{HttpTransport, Transport};
