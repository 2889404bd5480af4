use super::types::{ErrorResponse, PokemonListResponse, PokemonResponse};
use crate::network::{ApiClient, Call, Endpoint};

/// Endpoint declarations for the catalog.
#[derive(Clone)]
pub struct PokeApi {
    client: ApiClient,
}

impl PokeApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `GET pokemon?limit={limit}&offset={offset}`
    pub fn pokemon_list(
        &self,
        limit: u32,
        offset: u32,
    ) -> Call<PokemonListResponse, ErrorResponse> {
        self.client.call(
            Endpoint::get("pokemon")
                .query("limit", limit)
                .query("offset", offset),
        )
    }

    /// `GET pokemon/{name}`
    pub fn pokemon_details(&self, name: &str) -> Call<PokemonResponse, ErrorResponse> {
        self.client
            .call(Endpoint::get("pokemon/{name}").path_param("name", name))
    }

    /// `GET pokemon?limit={limit}` without reading the body, for callers
    /// that only need response metadata (caching and rate-limit headers).
    pub fn pokemon_list_headers(&self, limit: u32) -> Call<PokemonListResponse, ErrorResponse> {
        self.client
            .call(Endpoint::get("pokemon").query("limit", limit).headers_only())
    }
}
