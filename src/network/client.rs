use std::sync::Arc;

use url::Url;

use super::call::Call;
use super::endpoint::Endpoint;
use super::result::TransportError;
use super::transport::{ReqwestTransport, Transport, TransportConfig};

/// Turns [`Endpoint`] declarations into executable [`Call`]s against one
/// base URL and transport. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Builds a client backed by [`ReqwestTransport`].
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(config.base_url.clone(), Arc::new(transport)))
    }

    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `endpoint` and returns the call without executing it.
    ///
    /// A template that fails to resolve still yields a call; executing it
    /// gives `UnknownError(InvalidRequest)`.
    pub fn call<B, E>(&self, endpoint: Endpoint<B, E>) -> Call<B, E> {
        let request = endpoint.resolve(&self.base_url);
        Call::new(Arc::clone(&self.transport), request)
    }
}
