//! Maps typed network results into what callers render: a value, or a coded
//! error message.

use async_trait::async_trait;
use log::debug;

use super::service::PokeApi;
use super::types::{ErrorResponse, PokemonListResponse, PokemonResponse};
use crate::network::NetworkResult;

/// Code for failures where the server was never reached.
pub const NETWORK_ERROR_CODE: i32 = 2000;
/// Code for empty bodies, decode failures and anything else unexpected.
pub const UNEXPECTED_ERROR_CODE: i32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Success(T),
    Error { code: i32, message: String },
}

impl<T> Resource<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    /// The error as the catalog's error shape, if this is an error.
    pub fn error(&self) -> Option<ErrorResponse> {
        match self {
            Resource::Success(_) => None,
            Resource::Error { code, message } => Some(ErrorResponse {
                id: *code,
                message: message.clone(),
            }),
        }
    }
}

#[async_trait]
pub trait PokemonRepository: Send + Sync {
    async fn pokemon_list(&self, limit: u32, offset: u32) -> Resource<PokemonListResponse>;

    async fn pokemon_details(&self, name: &str) -> Resource<PokemonResponse>;
}

/// Repository backed by the live catalog.
pub struct PokeApiRepository {
    api: PokeApi,
}

impl PokeApiRepository {
    pub fn new(api: PokeApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PokemonRepository for PokeApiRepository {
    async fn pokemon_list(&self, limit: u32, offset: u32) -> Resource<PokemonListResponse> {
        debug!("Fetching Pokémon list: limit={limit}, offset={offset}");
        let result = self.api.pokemon_list(limit, offset).execute().await;
        to_resource(result, "Pokémon list")
    }

    async fn pokemon_details(&self, name: &str) -> Resource<PokemonResponse> {
        debug!("Fetching Pokémon details for {name}");
        let result = self.api.pokemon_details(name).execute().await;
        to_resource(result, "Pokémon details")
    }
}

/// Collapses the result taxonomy into a [`Resource`]. An empty success body
/// is an error here; the caller always needs the value.
pub fn to_resource<T>(result: NetworkResult<T, ErrorResponse>, what: &str) -> Resource<T> {
    match result {
        NetworkResult::Success(Some(body)) => Resource::Success(body),
        NetworkResult::Success(None) => Resource::Error {
            code: UNEXPECTED_ERROR_CODE,
            message: format!("Empty response during {what} retrieval"),
        },
        NetworkResult::ApiError { body, code } => Resource::Error {
            code: i32::from(code),
            message: if body.message.trim().is_empty() {
                format!("Failed to fetch {what}")
            } else {
                body.message
            },
        },
        NetworkResult::NetworkError(_) => Resource::Error {
            code: NETWORK_ERROR_CODE,
            message: "Network error".to_string(),
        },
        NetworkResult::SuccessHeadersOnly(_) | NetworkResult::UnknownError(_) => Resource::Error {
            code: UNEXPECTED_ERROR_CODE,
            message: format!("Unexpected error during {what} retrieval"),
        },
    }
}
