//! # PokeAPI Catalog
//!
//! Endpoint declarations, schemas and the non-UI logic built on them.
//!
//! - [`types`]: response and error schemas
//! - [`service`]: `PokeApi`, one typed call per endpoint
//! - [`repository`]: results mapped to `Resource` with error codes
//! - [`pager`]: ordered page-by-page list loading
//! - [`entry`]: list rows, artwork URLs, stat ratio

pub mod entry;
pub mod pager;
pub mod repository;
pub mod service;
pub mod types;

pub use entry::{ListEntry, stat_ratio};
pub use pager::{PageOutcome, PokemonPager};
pub use repository::{PokeApiRepository, PokemonRepository, Resource};
pub use service::PokeApi;
pub use types::{ErrorResponse, NamedResource, PokemonListResponse, PokemonResponse};
