//! HTTP transport: performs exactly one request and reports either the raw
//! response or a connectivity failure. Status codes are not interpreted here.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::endpoint::ResponseMode;
use super::result::{Headers, TransportError, TransportErrorKind, insert_header};

// ============================================================================
// Request / Response
// ============================================================================

/// A fully resolved request, ready to hand to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<Vec<u8>>,
    /// `HeadersOnly` lets the transport skip reading a 2xx body.
    pub mode: ResponseMode,
}

/// Status, headers and body of a response, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the name of the transport, for logging.
    fn name(&self) -> &str;

    /// Performs one attempt. `Err` only when no complete response was obtained.
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportError>;
}

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings used to build the HTTP client. Passed in explicitly; there is
/// no process-wide client.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: format!("pokedex/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

// ============================================================================
// reqwest implementation
// ============================================================================

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| classify_reqwest_error(&e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        debug!("--> {} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            debug!("--> body: {}", String::from_utf8_lossy(body));
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            let err = classify_reqwest_error(&e);
            warn!("<-- {} {} failed: {}", request.method, request.url, err);
            err
        })?;

        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            insert_header(
                &mut headers,
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        // Error bodies are always read; headers-only only skips success bodies.
        let skip_body = request.mode == ResponseMode::HeadersOnly && response.status().is_success();
        let body = if skip_body {
            Vec::new()
        } else {
            response
                .bytes()
                .await
                .map_err(|e| classify_reqwest_error(&e))?
                .to_vec()
        };

        debug!("<-- {} {} ({} bytes)", status, request.url, body.len());
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Maps a reqwest error onto a [`TransportErrorKind`].
///
/// reqwest exposes timeouts and connect failures directly; DNS and TLS
/// failures only show up in the source chain of a connect error.
fn classify_reqwest_error(err: &reqwest::Error) -> TransportError {
    let chain = error_chain(err);
    // Sources only: the top-level message embeds the request URL.
    let lowered = err
        .source()
        .map(|source| error_chain(source))
        .unwrap_or_default()
        .to_ascii_lowercase();

    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if let Some(kind) = kind_from_sources(&lowered) {
        kind
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Interrupted
    } else {
        TransportErrorKind::Other
    };

    TransportError::new(kind, chain)
}

/// DNS and TLS failures, recognised from a lowercased source chain.
fn kind_from_sources(lowered: &str) -> Option<TransportErrorKind> {
    if lowered.contains("dns error") || lowered.contains("failed to lookup address") {
        Some(TransportErrorKind::Dns)
    } else if lowered.contains("certificate")
        || lowered.contains("tls")
        || lowered.contains("handshake")
    {
        Some(TransportErrorKind::Tls)
    } else {
        None
    }
}

/// Joins an error and all of its sources into one line.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("dns error", None))),
            ))),
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): dns error"
        );
    }

    #[test]
    fn test_raw_response_success_range() {
        let mut resp = RawResponse {
            status: 204,
            headers: Headers::new(),
            body: Vec::new(),
        };
        assert!(resp.is_success());
        resp.status = 304;
        assert!(!resp.is_success());
        resp.status = 199;
        assert!(!resp.is_success());
    }

    #[test]
    fn test_transport_config_defaults() {
        let config = TransportConfig::new(Url::parse("https://pokeapi.co/api/v2/").unwrap());
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.user_agent.starts_with("pokedex/"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_connect_error() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let transport = ReqwestTransport::new(&TransportConfig::new(url.clone())).unwrap();
        let request = HttpRequest {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
            mode: ResponseMode::Body,
        };

        let err = transport.execute(&request).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connect);
    }

    #[test]
    fn test_source_keywords_pick_dns_and_tls() {
        assert_eq!(
            kind_from_sources(
                "client error (connect): dns error: failed to lookup address information: name or service not known"
            ),
            Some(TransportErrorKind::Dns)
        );
        assert_eq!(
            kind_from_sources("client error (connect): invalid peer certificate: unknownissuer"),
            Some(TransportErrorKind::Tls)
        );
        assert_eq!(
            kind_from_sources("error:0a000086:ssl routines::certificate verify failed"),
            Some(TransportErrorKind::Tls)
        );
        assert_eq!(
            kind_from_sources("client error (connect): tcp connect error: connection refused (os error 111)"),
            None
        );
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_a_dns_error() {
        // `.invalid` is reserved and never resolves.
        let url = Url::parse("http://nonexistent.invalid/").unwrap();
        let transport = ReqwestTransport::new(&TransportConfig::new(url.clone())).unwrap();
        let request = HttpRequest {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
            mode: ResponseMode::Body,
        };

        let err = transport.execute(&request).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Dns, "{}", err.message);
    }

    #[tokio::test]
    async fn test_headers_only_still_reads_error_bodies() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let transport = ReqwestTransport::new(&TransportConfig::new(url.clone())).unwrap();
        let request = HttpRequest {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
            mode: ResponseMode::HeadersOnly,
        };

        let response = transport.execute(&request).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, b"missing");
    }
}
