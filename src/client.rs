//! Mira IPAM client: free-subnet search, assignment and record lookup.

use reqwest::{Method, Url};
use tracing::{info, warn};

use crate::address::{ensure_range_query, is_valid_address, octets};
use crate::config::{AssignmentMode, ClientConfig};
use crate::error::{IpamError, ProtocolError, Result};
use crate::models::{
    AllocationResult, AssignmentRequest, AssignmentWireRecord, AvailabilityResponse, RangeQuery,
    SubnetRecord, Template, STATUS_OK,
};
use crate::transport::{HttpTransport, Transport};

const FREE_SUBNET_PATH: &str = "searchFreeSubnet";
const SEARCH_PATH: &str = "search";

/// Client for one Mira session.
///
/// Holds nothing but its configuration and transport, so a single instance
/// can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct IpamClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl IpamClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> IpamClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Asks Mira which subnets under `query` are free.
    ///
    /// The payload is returned exactly as Mira ordered it.
    ///
    /// # Errors
    ///
    /// - [`IpamError::Validation`] if range or mask is not an address; nothing is sent.
    /// - [`IpamError::Connection`] / [`IpamError::Status`] from the transport.
    /// - [`IpamError::Protocol`] if the body does not parse, the status is not
    ///   `"OK"`, or any candidate is not an address.
    pub async fn list_available(&self, query: &RangeQuery) -> Result<AvailabilityResponse> {
        ensure_range_query(query)?;

        let mut url = self.url(FREE_SUBNET_PATH)?;
        url.query_pairs_mut()
            .append_pair("range", &query.range)
            .append_pair("netmaskNew", &query.mask);

        let body = self.transport.execute(Method::GET, url, None).await?;
        let response: AvailabilityResponse = serde_json::from_slice(&body)?;

        if response.message != STATUS_OK {
            return Err(ProtocolError::NotOk(response.message).into());
        }
        if let Some((index, value)) = response
            .payload
            .iter()
            .enumerate()
            .find(|(_, candidate)| !is_valid_address(candidate))
        {
            return Err(ProtocolError::InvalidCandidate {
                index,
                value: value.clone(),
            }
            .into());
        }

        Ok(response)
    }

    /// Claims the first free subnet under the request's range.
    ///
    /// Performs one search and then one write. What happens when the write
    /// fails depends on [`AssignmentMode`]: strict mode returns the error,
    /// best-effort mode returns the chosen subnet with `write_confirmed`
    /// cleared.
    pub async fn assign(&self, request: &AssignmentRequest) -> Result<AllocationResult> {
        let query = request.range_query();
        ensure_range_query(&query)?;

        if Template::from_name(&request.template).is_none() {
            warn!(
                "template '{}' is not a known Mira template, forwarding it anyway",
                request.template
            );
        }

        let available = self.list_available(&query).await?;

        // Mira's ordering is authoritative: always take the head.
        let chosen = available
            .payload
            .into_iter()
            .next()
            .ok_or_else(|| IpamError::Exhaustion {
                range: query.range.clone(),
                mask: query.mask.clone(),
            })?;

        if !is_valid_address(&chosen) {
            return Err(IpamError::Validation(format!(
                "{} is not a subnet, but was about to be submitted to mira",
                chosen
            )));
        }

        let record = AssignmentWireRecord::new(request, octets(&chosen)?, octets(&request.mask)?);
        let body = serde_json::to_vec(&record)?;
        let mask = self.config.mask_source.resolve(&request.mask).to_string();

        match self
            .transport
            .execute(Method::POST, self.config.endpoint.clone(), Some(body))
            .await
        {
            Ok(_) => {
                info!(
                    "assigned {} from range {} to '{}'",
                    chosen, request.range, request.subnet_name
                );
                Ok(AllocationResult {
                    subnet: chosen,
                    mask,
                    write_confirmed: true,
                })
            }
            Err(e) => match self.config.assignment_mode {
                AssignmentMode::Strict => Err(e),
                AssignmentMode::BestEffort => {
                    warn!(
                        "assignment of {} for '{}' was not confirmed by mira, reporting it anyway: {}",
                        chosen, request.subnet_name, e
                    );
                    Ok(AllocationResult {
                        subnet: chosen,
                        mask,
                        write_confirmed: false,
                    })
                }
            },
        }
    }

    /// Fetches the Mira record of the subnet containing `ip`.
    ///
    /// The returned address is not compared with `ip`.
    pub async fn find_by_address(&self, ip: &str) -> Result<SubnetRecord> {
        if !is_valid_address(ip) {
            return Err(IpamError::Validation(format!(
                "{} is not in IP address format",
                ip
            )));
        }

        let mut url = self.url(SEARCH_PATH)?;
        url.query_pairs_mut().append_pair("containsIP", ip);

        let body = self.transport.execute(Method::GET, url, None).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.config
            .endpoint
            .join(path)
            .map_err(|e| IpamError::Config(format!("cannot build url for '{}': {}", path, e)))
    }
}
