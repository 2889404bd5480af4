//! # Call Adapter
//!
//! Runs a [`Call`] against its transport and folds every possible outcome
//! into a [`NetworkResult`]. Nothing escapes: transport failures, decode
//! failures, bad requests and transport panics all become variants.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::call::Call;
use super::endpoint::ResponseMode;
use super::result::{DecodeError, NetworkResult, TransportError, UnknownCause};
use super::transport::RawResponse;

/// Executes `call` exactly once and classifies the outcome.
pub async fn adapt<B, E>(call: Call<B, E>) -> NetworkResult<B, E>
where
    B: DeserializeOwned,
    E: DeserializeOwned,
{
    let (id, transport, request) = call.into_parts();

    let request = match request {
        Ok(request) => request,
        Err(e) => {
            warn!("[{id}] request could not be built: {e}");
            return NetworkResult::UnknownError(Some(UnknownCause::InvalidRequest(e.to_string())));
        }
    };

    debug!(
        "[{id}] {} {} via {}",
        request.method,
        request.url,
        transport.name()
    );

    let outcome = match AssertUnwindSafe(transport.execute(&request))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!("[{id}] transport panicked: {message}");
            return NetworkResult::UnknownError(Some(UnknownCause::Panicked(message)));
        }
    };

    let result = classify(outcome, request.mode);
    match &result {
        NetworkResult::Success(_) | NetworkResult::SuccessHeadersOnly(_) => {
            info!("[{id}] {} {} -> {}", request.method, request.url, label(&result));
        }
        NetworkResult::ApiError { code, .. } => {
            warn!("[{id}] {} {} -> API error {code}", request.method, request.url);
        }
        NetworkResult::NetworkError(e) => {
            warn!("[{id}] {} {} -> {e}", request.method, request.url);
        }
        NetworkResult::UnknownError(cause) => {
            warn!(
                "[{id}] {} {} -> unknown error: {}",
                request.method,
                request.url,
                cause.as_ref().map(ToString::to_string).unwrap_or_default()
            );
        }
    }
    result
}

/// Classifies one transport outcome.
///
/// Pure: the same outcome and mode always give an equal result.
pub fn classify<B, E>(
    outcome: Result<RawResponse, TransportError>,
    mode: ResponseMode,
) -> NetworkResult<B, E>
where
    B: DeserializeOwned,
    E: DeserializeOwned,
{
    let response = match outcome {
        Ok(response) => response,
        Err(e) => return NetworkResult::NetworkError(e),
    };

    if response.is_success() {
        match mode {
            ResponseMode::HeadersOnly => NetworkResult::SuccessHeadersOnly(response.headers),
            ResponseMode::Body if is_blank(&response.body) => NetworkResult::Success(None),
            ResponseMode::Body => match decode::<B>(response.status, &response.body) {
                Ok(body) => NetworkResult::Success(Some(body)),
                Err(e) => NetworkResult::UnknownError(Some(UnknownCause::Decode(e))),
            },
        }
    } else {
        match decode::<E>(response.status, &response.body) {
            Ok(body) => NetworkResult::ApiError {
                body,
                code: response.status,
            },
            Err(e) => NetworkResult::UnknownError(Some(UnknownCause::Decode(e))),
        }
    }
}

fn decode<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| DecodeError {
        status,
        target: std::any::type_name::<T>(),
        message: e.to_string(),
    })
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn label<B, E>(result: &NetworkResult<B, E>) -> &'static str {
    match result {
        NetworkResult::Success(Some(_)) => "success",
        NetworkResult::Success(None) => "success (empty body)",
        NetworkResult::SuccessHeadersOnly(_) => "success (headers only)",
        NetworkResult::ApiError { .. } => "API error",
        NetworkResult::NetworkError(_) => "network error",
        NetworkResult::UnknownError(_) => "unknown error",
    }
}
