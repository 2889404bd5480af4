//! # Network Core
//!
//! Typed HTTP calls whose outcome is always a [`NetworkResult`].
//!
//! ```text
//!   Endpoint<B, E> ──ApiClient::call──► Call<B, E> ──execute──► adapter ──► NetworkResult<B, E>
//!                                                                 │
//!                                                                 ▼
//!                                                          dyn Transport
//! ```
//!
//! ## Modules
//!
//! - [`result`]: the five-variant result taxonomy and its causes
//! - [`endpoint`]: endpoint declarations and URL resolution
//! - [`call`]: not-yet-executed typed calls, with cancellation
//! - [`adapter`]: execution and outcome classification
//! - [`transport`]: the transport seam and its reqwest implementation
//! - [`client`]: binds endpoints to a base URL and transport

pub mod adapter;
pub mod call;
pub mod client;
pub mod endpoint;
pub mod result;
pub mod transport;

pub use call::Call;
pub use client::ApiClient;
pub use endpoint::{Endpoint, EndpointError, ResponseMode};
pub use result::{
    DecodeError, HeaderValue, Headers, MissingBody, NetworkResult, TransportError,
    TransportErrorKind, UnknownCause,
};
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, Transport, TransportConfig};
