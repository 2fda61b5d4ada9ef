//! Executes plain-data requests against the network.
//!
//! # Design
//! A `Transport` returns every HTTP status as data; only a missing response
//! is an error. Status interpretation stays in `ApiClient::parse_*`. Each
//! call is attempted exactly once.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use ureq::Agent;

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a `ureq` agent.
    ///
    /// The agent is configured so 4xx/5xx responses come back as data rather
    /// than `Err`, letting the client do all status mapping.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let HttpRequest {
                method,
                path,
                headers,
                body,
            } = request;

            let result = match method {
                HttpMethod::Get => {
                    let mut builder = self.agent.get(&path);
                    for (key, value) in &headers {
                        builder = builder.header(key.as_str(), value.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Delete => {
                    let mut builder = self.agent.delete(&path);
                    for (key, value) in &headers {
                        builder = builder.header(key.as_str(), value.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Post => {
                    let mut builder = self.agent.post(&path);
                    for (key, value) in &headers {
                        builder = builder.header(key.as_str(), value.as_str());
                    }
                    match body {
                        Some(body) => builder.send(body.as_bytes()),
                        None => builder.send_empty(),
                    }
                }
                HttpMethod::Put => {
                    let mut builder = self.agent.put(&path);
                    for (key, value) in &headers {
                        builder = builder.header(key.as_str(), value.as_str());
                    }
                    match body {
                        Some(body) => builder.send(body.as_bytes()),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
