//! Endpoint declarations.
//!
//! An [`Endpoint`] describes one HTTP operation and the two body types its
//! result is decoded into. It is plain data; [`ApiClient::call`] turns it
//! into an executable [`Call`].
//!
//! [`ApiClient::call`]: super::client::ApiClient::call
//! [`Call`]: super::call::Call

use std::fmt;
use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use url::Url;

use super::transport::HttpRequest;

/// What the caller wants back from a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Decode the body into the success type.
    #[default]
    Body,
    /// Only the headers; the body is never read or decoded.
    HeadersOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// A `{placeholder}` in the path template has no value.
    MissingPathParam(String),
    /// A path segment mixes literal text and a placeholder, or a brace is unbalanced.
    InvalidTemplate(String),
    /// The base URL cannot carry a path (e.g. `mailto:`).
    CannotBeABase(String),
    /// The request body failed to serialize.
    Body(String),
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointError::MissingPathParam(name) => write!(f, "missing path parameter `{name}`"),
            EndpointError::InvalidTemplate(seg) => write!(f, "invalid path segment `{seg}`"),
            EndpointError::CannotBeABase(url) => write!(f, "base URL `{url}` cannot carry a path"),
            EndpointError::Body(msg) => write!(f, "failed to serialize request body: {msg}"),
        }
    }
}

impl std::error::Error for EndpointError {}

/// One declared HTTP operation returning `B` on success and `E` on API error.
pub struct Endpoint<B, E> {
    method: Method,
    path: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Result<Vec<u8>, String>>,
    mode: ResponseMode,
    _bodies: PhantomData<fn() -> (B, E)>,
}

impl<B, E> fmt::Debug for Endpoint<B, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("path_params", &self.path_params)
            .field("query", &self.query)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<B, E> Endpoint<B, E> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            mode: ResponseMode::Body,
            _bodies: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Fills the `{name}` placeholder. The value is percent-encoded as a
    /// single path segment.
    pub fn path_param(mut self, name: &str, value: impl ToString) -> Self {
        self.path_params.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Attaches a JSON body. Serialization errors surface when the call is
    /// resolved, not here.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_vec(body).map_err(|e| e.to_string()));
        self
    }

    /// Only the response headers are wanted.
    pub fn headers_only(mut self) -> Self {
        self.mode = ResponseMode::HeadersOnly;
        self
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Resolves the template against `base` into a concrete request.
    pub fn resolve(&self, base: &Url) -> Result<HttpRequest, EndpointError> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| EndpointError::CannotBeABase(base.to_string()))?;
            segments.pop_if_empty();
            for segment in self.path.split('/').filter(|s| !s.is_empty()) {
                segments.push(&self.expand_segment(segment)?);
            }
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }

        let body = match &self.body {
            Some(Ok(bytes)) => Some(bytes.clone()),
            Some(Err(msg)) => return Err(EndpointError::Body(msg.clone())),
            None => None,
        };

        Ok(HttpRequest {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
            body,
            mode: self.mode,
        })
    }

    fn expand_segment(&self, segment: &str) -> Result<String, EndpointError> {
        let placeholder = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'));

        match placeholder {
            Some(name) if !name.contains(['{', '}']) => self
                .path_params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| EndpointError::MissingPathParam(name.to_string())),
            Some(_) => Err(EndpointError::InvalidTemplate(segment.to_string())),
            None if segment.contains(['{', '}']) => {
                Err(EndpointError::InvalidTemplate(segment.to_string()))
            }
            None => Ok(segment.to_string()),
        }
    }
}
