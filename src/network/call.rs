use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use log::info;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::adapter;
use super::endpoint::EndpointError;
use super::result::{NetworkResult, UnknownCause};
use super::transport::{HttpRequest, Transport};

/// A typed request that has not been executed yet.
///
/// Built by [`ApiClient::call`](super::client::ApiClient::call). Executing
/// consumes the call, so each call yields at most one result.
pub struct Call<B, E> {
    id: Uuid,
    transport: Arc<dyn Transport>,
    request: Result<HttpRequest, EndpointError>,
    _bodies: PhantomData<fn() -> (B, E)>,
}

impl<B, E> fmt::Debug for Call<B, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("id", &self.id)
            .field("transport", &self.transport.name())
            .field("request", &self.request)
            .finish()
    }
}

impl<B, E> Call<B, E> {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        request: Result<HttpRequest, EndpointError>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport,
            request,
            _bodies: PhantomData,
        }
    }

    /// Correlation id used in log lines for this call.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The resolved request, or `None` if the endpoint failed to resolve.
    pub fn request(&self) -> Option<&HttpRequest> {
        self.request.as_ref().ok()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Uuid, Arc<dyn Transport>, Result<HttpRequest, EndpointError>) {
        (self.id, self.transport, self.request)
    }
}

impl<B, E> Call<B, E>
where
    B: DeserializeOwned,
    E: DeserializeOwned,
{
    /// Executes the call once and classifies the outcome.
    pub async fn execute(self) -> NetworkResult<B, E> {
        adapter::adapt(self).await
    }

    /// Like [`execute`](Self::execute), but gives up as soon as `token` is
    /// cancelled. A cancelled call yields `UnknownError(Cancelled)`.
    pub async fn execute_cancellable(self, token: &CancellationToken) -> NetworkResult<B, E> {
        let id = self.id;
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("[{id}] call cancelled before completion");
                NetworkResult::UnknownError(Some(UnknownCause::Cancelled))
            }
            result = self.execute() => result,
        }
    }
}
