//! Pokedex library exports for testing

use clap::ValueEnum;

pub mod config;
pub mod network;
pub mod pokeapi;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
