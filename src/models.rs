//! Data models for Mira requests, responses and allocation outcomes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Status token the Mira API returns on success.
pub const STATUS_OK: &str = "OK";

/// IP address schema version Mira requires on every assignment.
pub const IP_ADDRESS_SCHEMA: i64 = 2;

/// Subnet class code for GCP allocations.
pub const SUBNET_CLASS_GCP: i64 = 38;

/// Parent range from which free subnets are requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQuery {
    #[serde(rename = "requestrange")]
    pub range: String,
    #[serde(rename = "requestmask")]
    pub mask: String,
}

impl RangeQuery {
    pub fn new(range: impl Into<String>, mask: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            mask: mask.into(),
        }
    }
}

/// Body of the free-subnet search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub message: String,
    /// Absent or `null` when the range is full.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payload: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Everything needed to claim a subnet for a project.
///
/// Field names on the wire follow the resource attributes the orchestration
/// tool exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    #[serde(rename = "requestrange")]
    pub range: String,
    #[serde(rename = "requestmask")]
    pub mask: String,
    /// Site identifier for the physical location, e.g. "765431".
    #[serde(rename = "addressid")]
    pub address_id: String,
    pub comment: String,
    #[serde(rename = "subnetname")]
    pub subnet_name: String,
    /// Forwarded verbatim; see [`Template`] for the names Mira recognises.
    pub template: String,
}

impl AssignmentRequest {
    pub fn range_query(&self) -> RangeQuery {
        RangeQuery::new(self.range.clone(), self.mask.clone())
    }
}

/// Deployment-environment templates preconfigured in Mira.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Dev,
    Uat,
    Prd,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Dev, Template::Uat, Template::Prd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Dev => "U25_DEV_GCP",
            Template::Uat => "U25_UAT_GCP",
            Template::Prd => "U25_PRD_GCP",
        }
    }

    /// Looks up a template by its Mira name. Unknown names yield `None`;
    /// the assignment path still forwards them and lets Mira decide.
    pub fn from_name(name: &str) -> Option<Template> {
        Template::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body posted to Mira to create an assignment.
///
/// Address and mask travel as individual octets. The remaining constant
/// fields are required by the Mira schema but unused here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentWireRecord {
    #[serde(rename = "addressID")]
    pub address_id: String,
    #[serde(rename = "alsoQip")]
    pub also_qip: bool,
    pub building: String,
    pub comments: String,
    pub dhcp: bool,
    #[serde(rename = "dhcpServer")]
    pub dhcp_server: String,
    #[serde(rename = "dhcpTemplate")]
    pub dhcp_template: String,
    pub floor: String,
    pub ip1: String,
    pub ip2: String,
    pub ip3: String,
    pub ip4: String,
    #[serde(rename = "ipAddressSchema")]
    pub ip_address_schema: i64,
    pub netmask1: String,
    pub netmask2: String,
    pub netmask3: String,
    pub netmask4: String,
    pub range: String,
    #[serde(rename = "recordId")]
    pub record_id: String,
    pub room: String,
    #[serde(rename = "subnetClass")]
    pub subnet_class: i64,
    #[serde(rename = "subnetName")]
    pub subnet_name: String,
    #[serde(rename = "subnetNameChanged")]
    pub subnet_name_changed: bool,
    pub template: String,
    pub vlan: String,
}

impl AssignmentWireRecord {
    pub fn new(request: &AssignmentRequest, subnet: [String; 4], mask: [String; 4]) -> Self {
        let [ip1, ip2, ip3, ip4] = subnet;
        let [netmask1, netmask2, netmask3, netmask4] = mask;
        Self {
            address_id: request.address_id.clone(),
            also_qip: false,
            building: String::new(),
            comments: request.comment.clone(),
            dhcp: false,
            dhcp_server: String::new(),
            dhcp_template: String::new(),
            floor: String::new(),
            ip1,
            ip2,
            ip3,
            ip4,
            ip_address_schema: IP_ADDRESS_SCHEMA,
            netmask1,
            netmask2,
            netmask3,
            netmask4,
            range: request.range.clone(),
            record_id: String::new(),
            room: String::new(),
            subnet_class: SUBNET_CLASS_GCP,
            subnet_name: request.subnet_name.clone(),
            subnet_name_changed: false,
            template: request.template.clone(),
            vlan: String::new(),
        }
    }
}

/// Outcome of an assignment as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub subnet: String,
    pub mask: String,
    /// False only when the write to Mira failed and best-effort mode
    /// reported the chosen subnet anyway.
    pub write_confirmed: bool,
}

/// Mira record for the subnet containing a given address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubnetRecord {
    pub address: String,
    pub mask: String,
    pub country: String,
    pub description: String,
    pub legacy: String,
    pub layout: String,
    #[serde(rename = "recordId")]
    pub record_id: i64,
    #[serde(rename = "securityDomain")]
    pub security_domain: String,
    #[serde(rename = "securityZone")]
    pub security_zone: String,
    #[serde(rename = "subnetClass")]
    pub subnet_class: String,
    pub tenant: String,
    #[serde(rename = "qipInstance")]
    pub qip_instance: String,
}
