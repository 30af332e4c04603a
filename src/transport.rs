//! HTTP transport to the Mira API.
//!
//! One request, one response, no retries. Higher layers own deserialization.

use std::fmt;
use std::future::Future;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{IpamError, Result};

/// Executes a single request against the IPAM service and returns the raw body.
///
/// Implementations classify a non-2xx answer as [`IpamError::Status`] and a
/// failure to get any answer as [`IpamError::Connection`].
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// `reqwest`-backed transport with basic auth and a JSON content type.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| IpamError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("client", &self.client)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            debug!("{} {} answered {}", method, url, status);
            return Err(IpamError::Status {
                code: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted transport that records every request it receives.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: Method,
        pub url: Url,
        pub body: Option<Vec<u8>>,
    }

    impl RecordedRequest {
        pub fn json(&self) -> serde_json::Value {
            serde_json::from_slice(self.body.as_deref().unwrap_or_default())
                .expect("request body is json")
        }
    }

    #[derive(Debug, Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<Result<Vec<u8>>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond_json(self, value: serde_json::Value) -> Self {
            self.respond(Ok(value.to_string().into_bytes()))
        }

        pub fn respond(self, response: Result<Vec<u8>>) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Transport for MockTransport {
        async fn execute(
            &self,
            method: Method,
            url: Url,
            body: Option<Vec<u8>>,
        ) -> Result<Vec<u8>> {
            self.requests
                .lock()
                .unwrap()
                .push(RecordedRequest { method, url, body });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock transport ran out of scripted responses")
        }
    }
}
