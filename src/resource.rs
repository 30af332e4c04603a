//! Orchestration-facing surface: the available-subnets data source and the
//! allocated-subnet resource.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::client::IpamClient;
use crate::error::{IpamError, Result};
use crate::models::{AssignmentRequest, RangeQuery};
use crate::transport::Transport;

/// Lifecycle operations the orchestration tool can ask for on an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Create,
    Read,
    Update,
    Delete,
}

impl Lifecycle {
    pub fn is_supported(&self) -> bool {
        matches!(self, Lifecycle::Create | Lifecycle::Read)
    }

    /// Fails with the fixed refusal for unsupported operations.
    pub fn ensure_supported(&self) -> Result<()> {
        if self.is_supported() {
            return Ok(());
        }
        let message = match self {
            Lifecycle::Create | Lifecycle::Read => return Ok(()),
            Lifecycle::Update => {
                "not implemented, you must contact the allocation owner to change an allocation"
            }
            Lifecycle::Delete => {
                "not implemented, you must contact the allocation owner to remove your allocation"
            }
        };
        Err(IpamError::UnsupportedOperation {
            operation: self.as_str(),
            message,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Create => "create",
            Lifecycle::Read => "read",
            Lifecycle::Update => "update",
            Lifecycle::Delete => "delete",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reading the available-subnets data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSubnets {
    /// Unix timestamp, so every read is treated as fresh.
    pub id: String,
    #[serde(rename = "requestrange")]
    pub range: String,
    #[serde(rename = "requestmask")]
    pub mask: String,
    pub message: String,
    pub payload: Vec<String>,
}

/// Tracked state of an allocated-subnet resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedSubnet {
    pub id: String,
    #[serde(rename = "miraassignedsubnet")]
    pub assigned_subnet: String,
    #[serde(rename = "miraassignedsubnetmask")]
    pub assigned_subnet_mask: String,
    /// Whether Mira acknowledged the write. Known only on the create that
    /// claimed the subnet; a read from the id alone leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

impl AllocatedSubnet {
    pub fn new(
        subnet: impl Into<String>,
        mask: impl Into<String>,
        confirmed: Option<bool>,
    ) -> Self {
        let assigned_subnet = subnet.into();
        let assigned_subnet_mask = mask.into();
        Self {
            id: resource_id(&assigned_subnet, &assigned_subnet_mask),
            assigned_subnet,
            assigned_subnet_mask,
            confirmed,
        }
    }
}

/// Composite resource key, `<subnet>-<mask>`.
pub fn resource_id(subnet: &str, mask: &str) -> String {
    format!("{}-{}", subnet, mask)
}

/// Splits a composite key back into subnet and mask.
pub fn parse_resource_id(id: &str) -> Result<(String, String)> {
    id.split_once('-')
        .filter(|(subnet, mask)| !subnet.is_empty() && !mask.is_empty())
        .map(|(subnet, mask)| (subnet.to_string(), mask.to_string()))
        .ok_or_else(|| {
            IpamError::Validation(format!("'{}' is not a <subnet>-<mask> resource id", id))
        })
}

/// Data source read: list the free subnets under a range.
pub async fn read_available_subnets<T: Transport>(
    client: &IpamClient<T>,
    query: &RangeQuery,
) -> Result<AvailableSubnets> {
    let response = client.list_available(query).await?;
    let id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string();

    Ok(AvailableSubnets {
        id,
        range: query.range.clone(),
        mask: query.mask.clone(),
        message: response.message,
        payload: response.payload,
    })
}

/// Resource create: claim a subnet and return the state to track.
pub async fn create_allocation<T: Transport>(
    client: &IpamClient<T>,
    request: &AssignmentRequest,
) -> Result<AllocatedSubnet> {
    Lifecycle::Create.ensure_supported()?;
    let result = client.assign(request).await?;
    Ok(AllocatedSubnet::new(
        result.subnet,
        result.mask,
        Some(result.write_confirmed),
    ))
}

/// Resource read: echoes the tracked subnet and mask without asking Mira.
pub fn read_allocation(tracked: &AllocatedSubnet) -> Result<AllocatedSubnet> {
    Lifecycle::Read.ensure_supported()?;
    Ok(AllocatedSubnet::new(
        tracked.assigned_subnet.clone(),
        tracked.assigned_subnet_mask.clone(),
        tracked.confirmed,
    ))
}

/// Resource update: always refused. Takes no client, so Mira is never contacted.
pub fn update_allocation(_id: &str) -> Result<()> {
    Lifecycle::Update.ensure_supported()
}

/// Resource delete: always refused.
pub fn delete_allocation(_id: &str) -> Result<()> {
    Lifecycle::Delete.ensure_supported()
}
