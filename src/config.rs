//! Client configuration, loaded once per session.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::address::is_valid_address;
use crate::error::{IpamError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://10.156.0.3/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RESULT_MASK: &str = "255.255.255.224";

/// What to do when the assignment POST fails after a candidate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentMode {
    /// Propagate the write error to the caller.
    Strict,
    /// Log the failure and still report the chosen subnet, flagged as
    /// unconfirmed.
    #[default]
    BestEffort,
}

impl FromStr for AssignmentMode {
    type Err = IpamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(AssignmentMode::Strict),
            "best-effort" | "best_effort" => Ok(AssignmentMode::BestEffort),
            other => Err(IpamError::Config(format!(
                "unknown assignment mode '{}', expected 'strict' or 'best-effort'",
                other
            ))),
        }
    }
}

/// Where the mask reported with an allocation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskSource {
    /// Always report this mask.
    Fixed(String),
    /// Echo the mask of the assignment request.
    Request,
}

impl Default for MaskSource {
    fn default() -> Self {
        MaskSource::Fixed(DEFAULT_RESULT_MASK.to_string())
    }
}

impl MaskSource {
    pub fn resolve<'a>(&'a self, request_mask: &'a str) -> &'a str {
        match self {
            MaskSource::Fixed(mask) => mask,
            MaskSource::Request => request_mask,
        }
    }
}

impl FromStr for MaskSource {
    type Err = IpamError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("request") {
            Ok(MaskSource::Request)
        } else if is_valid_address(s) {
            Ok(MaskSource::Fixed(s.to_string()))
        } else {
            Err(IpamError::Config(format!(
                "result mask '{}' is neither 'request' nor an IP address",
                s
            )))
        }
    }
}

/// Connection settings and allocation policy for one [`crate::IpamClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub assignment_mode: AssignmentMode,
    pub mask_source: MaskSource,
}

impl ClientConfig {
    /// Builds a config with default endpoint, timeout and policies.
    ///
    /// Empty credentials or an empty user-agent are rejected here so that no
    /// operation can start with an incomplete session.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        let user_agent = user_agent.into();

        if username.is_empty() || password.is_empty() {
            return Err(IpamError::Config("no username or password supplied".into()));
        }
        if user_agent.is_empty() {
            return Err(IpamError::Config("no user-agent string supplied".into()));
        }

        Ok(Self {
            endpoint: parse_endpoint(DEFAULT_ENDPOINT)?,
            username,
            password,
            user_agent,
            timeout: DEFAULT_TIMEOUT,
            assignment_mode: AssignmentMode::default(),
            mask_source: MaskSource::default(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_assignment_mode(mut self, mode: AssignmentMode) -> Self {
        self.assignment_mode = mode;
        self
    }

    pub fn with_mask_source(mut self, source: MaskSource) -> Self {
        self.mask_source = source;
        self
    }

    /// Creates config from environment variables.
    ///
    /// `MIRA_USERNAME`, `MIRA_PASSWORD` and `TERRAFORM_USERAGENT_MIRA` are
    /// required. `MIRA_URL`, `MIRA_TIMEOUT_SECS`, `MIRA_ASSIGNMENT_MODE` and
    /// `MIRA_RESULT_MASK` fall back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let mut config = Self::new(
            var("MIRA_USERNAME"),
            var("MIRA_PASSWORD"),
            var("TERRAFORM_USERAGENT_MIRA"),
        )?;

        if let Some(url) = lookup("MIRA_URL").filter(|v| !v.is_empty()) {
            config = config.with_endpoint(&url)?;
        }
        if let Some(secs) = lookup("MIRA_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                IpamError::Config(format!("MIRA_TIMEOUT_SECS '{}' is not a number", secs))
            })?;
            if secs == 0 {
                return Err(IpamError::Config(
                    "MIRA_TIMEOUT_SECS must be greater than zero".into(),
                ));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(mode) = lookup("MIRA_ASSIGNMENT_MODE").filter(|v| !v.is_empty()) {
            config = config.with_assignment_mode(mode.parse()?);
        }
        if let Some(mask) = lookup("MIRA_RESULT_MASK").filter(|v| !v.is_empty()) {
            config = config.with_mask_source(mask.parse()?);
        }

        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("assignment_mode", &self.assignment_mode)
            .field("mask_source", &self.mask_source)
            .finish()
    }
}

/// Parses the base URL, making sure relative paths join beneath it.
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let mut endpoint = endpoint.trim().to_string();
    if !endpoint.ends_with('/') {
        endpoint.push('/');
    }
    Url::parse(&endpoint)
        .map_err(|e| IpamError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDS: [(&str, &str); 3] = [
        ("MIRA_USERNAME", "svc"),
        ("MIRA_PASSWORD", "secret"),
        ("TERRAFORM_USERAGENT_MIRA", "terraform-provider-mira"),
    ];

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&CREDS)).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.assignment_mode, AssignmentMode::BestEffort);
        assert_eq!(
            config.mask_source,
            MaskSource::Fixed("255.255.255.224".into())
        );
    }

    #[test]
    fn test_missing_credentials_fail_construction() {
        let err = ClientConfig::from_lookup(lookup(&CREDS[1..])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("username or password"));
    }

    #[test]
    fn test_missing_user_agent_fails_construction() {
        let err = ClientConfig::from_lookup(lookup(&CREDS[..2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("user-agent"));
    }

    #[test]
    fn test_overrides() {
        let mut vars = CREDS.to_vec();
        vars.extend([
            ("MIRA_URL", "https://mira.internal/api"),
            ("MIRA_TIMEOUT_SECS", "3"),
            ("MIRA_ASSIGNMENT_MODE", "strict"),
            ("MIRA_RESULT_MASK", "request"),
        ]);
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.endpoint.as_str(), "https://mira.internal/api/");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.assignment_mode, AssignmentMode::Strict);
        assert_eq!(config.mask_source, MaskSource::Request);
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut vars = CREDS.to_vec();
        vars.push(("MIRA_ASSIGNMENT_MODE", "yolo"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = CREDS.to_vec();
        vars.push(("MIRA_RESULT_MASK", "/27"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = CREDS.to_vec();
        vars.push(("MIRA_TIMEOUT_SECS", "ten"));
        assert!(ClientConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut vars = CREDS.to_vec();
        vars.push(("MIRA_TIMEOUT_SECS", "0"));
        let err = ClientConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ClientConfig::from_lookup(lookup(&CREDS)).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("svc"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_mask_source_resolution() {
        assert_eq!(MaskSource::Request.resolve("255.255.255.0"), "255.255.255.0");
        assert_eq!(
            MaskSource::default().resolve("255.255.255.0"),
            "255.255.255.224"
        );
    }
}
