//! The only I/O boundary.
//!
//! [`Transport`] sends one request and returns the raw body. The client
//! decodes and classifies it; nothing here looks inside the XML.

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::request::Method;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("panos-xapi/", env!("CARGO_PKG_VERSION"));

/// Default timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid API endpoint for host '{host}': {source}")]
    InvalidEndpoint {
        host: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} from device: {body}")]
    Status { status: u16, body: String },
}

pub trait Transport {
    /// Send `query` to `endpoint`, as a query string for `GET` or a form
    /// body for `POST`, and return the response body.
    fn send(
        &self,
        method: Method,
        endpoint: &Url,
        query: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        method: Method,
        endpoint: &Url,
        query: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).send(method, endpoint, query)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        method: Method,
        endpoint: &Url,
        query: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).send(method, endpoint, query)
    }
}

/// `https://<host>/api/`. A scheme in `host` is kept, so plain HTTP lab
/// devices and non-default ports work.
pub fn api_endpoint(host: &str) -> Result<Url, TransportError> {
    let host = host.trim().trim_end_matches('/');
    let base = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    Url::parse(&format!("{base}/api/")).map_err(|source| TransportError::InvalidEndpoint {
        host: host.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOptions {
    pub timeout: Duration,
    /// Certificate verification. Turning this off is only for lab devices
    /// with self-signed certificates.
    pub verify_tls: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
        }
    }
}

/// Blocking HTTPS transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(options: HttpOptions) -> Result<Self, TransportError> {
        let client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: Method,
        endpoint: &Url,
        query: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError> {
        debug!(%method, endpoint = %endpoint, params = query.len(), "sending API request");
        let request = match method {
            Method::Get => self.client.get(endpoint.clone()).query(query),
            Method::Post => self.client.post(endpoint.clone()).form(query),
        };
        let request_error = |source| TransportError::Request {
            endpoint: endpoint.to_string(),
            source,
        };
        let response = request.send().map_err(request_error)?;
        let status = response.status();
        let body = response.bytes().map_err(request_error)?.to_vec();

        // Authentication failures arrive as HTTP 403 with a normal XML
        // envelope; hand those to the classifier.
        if status.is_success() || body.trim_ascii_start().starts_with(b"<") {
            return Ok(body);
        }
        Err(TransportError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_defaults_to_https() {
        assert_eq!(
            api_endpoint("fw.example.net").expect("url").as_str(),
            "https://fw.example.net/api/"
        );
        assert_eq!(
            api_endpoint("http://10.0.0.1:8080/").expect("url").as_str(),
            "http://10.0.0.1:8080/api/"
        );
    }

    #[test]
    fn bad_host_is_rejected() {
        assert!(matches!(
            api_endpoint("exa mple"),
            Err(TransportError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn tls_verification_is_on_by_default() {
        assert!(HttpOptions::default().verify_tls);
    }
}
