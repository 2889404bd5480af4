//! # Result Taxonomy
//!
//! Every outbound call ends in exactly one [`NetworkResult`] variant.
//!
//! ```text
//!   transport ──► no response ───────────────► NetworkError
//!       │
//!       └──► response ─┬─ 2xx, body mode ────► Success / UnknownError(Decode)
//!                      ├─ 2xx, headers mode ─► SuccessHeadersOnly
//!                      └─ non-2xx ───────────► ApiError / UnknownError(Decode)
//! ```

use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Headers
// ============================================================================

/// A header value as returned by the server: one line, or several lines
/// sharing the same name (e.g. `set-cookie`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    One(String),
    Many(Vec<String>),
}

impl HeaderValue {
    /// First value for this header.
    pub fn first(&self) -> &str {
        match self {
            HeaderValue::One(v) => v,
            HeaderValue::Many(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Adds another line, promoting `One` to `Many`.
    pub fn push(&mut self, value: String) {
        match self {
            HeaderValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = HeaderValue::Many(vec![first, value]);
            }
            HeaderValue::Many(vs) => vs.push(value),
        }
    }
}

/// Response headers keyed by lower-cased name.
pub type Headers = BTreeMap<String, HeaderValue>;

/// Inserts a header line, lower-casing the name and merging repeats.
pub fn insert_header(headers: &mut Headers, name: &str, value: String) {
    let key = name.to_ascii_lowercase();
    match headers.get_mut(&key) {
        Some(existing) => existing.push(value),
        None => {
            headers.insert(key, HeaderValue::One(value));
        }
    }
}

// ============================================================================
// Causes
// ============================================================================

/// What went wrong when no response was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Dns,
    Tls,
    /// The connection broke while the body was being read.
    Interrupted,
    Other,
}

/// Connectivity failure surfaced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Dns => "DNS resolution failed",
            TransportErrorKind::Tls => "TLS handshake failed",
            TransportErrorKind::Interrupted => "connection interrupted",
            TransportErrorKind::Other => "transport error",
        };
        write!(f, "{label}: {}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// A response body that did not match the expected schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// HTTP status of the response whose body failed to decode.
    pub status: u16,
    /// Rust type the body was decoded into.
    pub target: &'static str,
    pub message: String,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to decode HTTP {} body as {}: {}",
            self.status, self.target, self.message
        )
    }
}

impl std::error::Error for DecodeError {}

/// Everything the adapter could not classify as success, API error or
/// transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownCause {
    Decode(DecodeError),
    /// The caller cancelled the call before it completed.
    Cancelled,
    /// The request could not be built (bad URL, unserializable body).
    InvalidRequest(String),
    /// The transport panicked while executing the call.
    Panicked(String),
}

impl fmt::Display for UnknownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownCause::Decode(e) => write!(f, "{e}"),
            UnknownCause::Cancelled => write!(f, "call cancelled"),
            UnknownCause::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            UnknownCause::Panicked(msg) => write!(f, "transport panicked: {msg}"),
        }
    }
}

impl std::error::Error for UnknownCause {}

// ============================================================================
// NetworkResult
// ============================================================================

/// Outcome of one adapted call. `B` is the success body, `E` the error body.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResult<B, E> {
    /// 2xx; `None` when the server sent an empty body.
    Success(Option<B>),
    /// 2xx for a call that only asked for headers.
    SuccessHeadersOnly(Headers),
    /// Non-2xx with a body matching the error schema.
    ApiError { body: E, code: u16 },
    /// No response was obtained.
    NetworkError(TransportError),
    /// Decode failures, cancellation and anything else unexpected.
    UnknownError(Option<UnknownCause>),
}

/// Returned by [`NetworkResult::require_body`] when a caller needs a body
/// and did not get one.
#[derive(Debug, Clone, PartialEq)]
pub enum MissingBody<E> {
    /// 2xx, but the body was empty.
    Empty,
    /// 2xx headers-only result; no body was ever requested.
    HeadersOnly,
    Api { body: E, code: u16 },
    Network(TransportError),
    Unknown(Option<UnknownCause>),
}

impl<E: fmt::Debug> fmt::Display for MissingBody<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingBody::Empty => write!(f, "success response had an empty body"),
            MissingBody::HeadersOnly => write!(f, "headers-only response has no body"),
            MissingBody::Api { body, code } => write!(f, "API error (HTTP {code}): {body:?}"),
            MissingBody::Network(e) => write!(f, "network error: {e}"),
            MissingBody::Unknown(Some(cause)) => write!(f, "unknown error: {cause}"),
            MissingBody::Unknown(None) => write!(f, "unknown error"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for MissingBody<E> {}

impl<B, E> NetworkResult<B, E> {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            NetworkResult::Success(_) | NetworkResult::SuccessHeadersOnly(_)
        )
    }

    /// Success body, if there is one.
    pub fn body(&self) -> Option<&B> {
        match self {
            NetworkResult::Success(body) => body.as_ref(),
            _ => None,
        }
    }

    pub fn headers(&self) -> Option<&Headers> {
        match self {
            NetworkResult::SuccessHeadersOnly(headers) => Some(headers),
            _ => None,
        }
    }

    /// HTTP status of an API error.
    pub fn error_code(&self) -> Option<u16> {
        match self {
            NetworkResult::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for outcomes where the request never reached the server.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NetworkResult::NetworkError(_))
    }

    /// Takes the success body, failing explicitly when it is absent.
    pub fn require_body(self) -> Result<B, MissingBody<E>> {
        match self {
            NetworkResult::Success(Some(body)) => Ok(body),
            NetworkResult::Success(None) => Err(MissingBody::Empty),
            NetworkResult::SuccessHeadersOnly(_) => Err(MissingBody::HeadersOnly),
            NetworkResult::ApiError { body, code } => Err(MissingBody::Api { body, code }),
            NetworkResult::NetworkError(e) => Err(MissingBody::Network(e)),
            NetworkResult::UnknownError(cause) => Err(MissingBody::Unknown(cause)),
        }
    }

    /// Maps the success body, leaving every other variant untouched.
    pub fn map<C>(self, f: impl FnOnce(B) -> C) -> NetworkResult<C, E> {
        match self {
            NetworkResult::Success(body) => NetworkResult::Success(body.map(f)),
            NetworkResult::SuccessHeadersOnly(h) => NetworkResult::SuccessHeadersOnly(h),
            NetworkResult::ApiError { body, code } => NetworkResult::ApiError { body, code },
            NetworkResult::NetworkError(e) => NetworkResult::NetworkError(e),
            NetworkResult::UnknownError(c) => NetworkResult::UnknownError(c),
        }
    }
}
