//! Derived values shown by list and detail views.

use log::warn;
use serde::Serialize;

use super::types::{NamedResource, Stat};

/// Highest base value a single stat can have.
pub const MAX_BASE_STAT: u32 = 255;

/// One row of the catalog list.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub number: u32,
    pub name: String,
    pub image_url: String,
}

/// Extracts the Pokédex number from a resource URL such as
/// `https://pokeapi.co/api/v2/pokemon/21/`.
pub fn pokedex_number(url: &str) -> Option<u32> {
    let tail = url.trim_end_matches('/');
    let digits = tail.len() - tail.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    tail[tail.len() - digits..].parse().ok()
}

/// Dream-world artwork for a Pokédex number.
pub fn artwork_url(images_base: &str, number: u32) -> String {
    format!("{}/{number}.svg", images_base.trim_end_matches('/'))
}

/// Upper-cases the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds list rows from a page of results. Results whose URL carries no
/// number are skipped.
pub fn list_entries(results: &[NamedResource], images_base: &str) -> Vec<ListEntry> {
    results
        .iter()
        .filter_map(|resource| match pokedex_number(&resource.url) {
            Some(number) => Some(ListEntry {
                number,
                name: capitalize(&resource.name),
                image_url: artwork_url(images_base, number),
            }),
            None => {
                warn!("No Pokédex number in {}, skipping {}", resource.url, resource.name);
                None
            }
        })
        .collect()
}

/// Sum of base stats as a fraction of the maximum possible, in `0.0..=1.0`.
/// Zero when there are no stats.
pub fn stat_ratio(stats: &[Stat]) -> f32 {
    if stats.is_empty() {
        return 0.0;
    }
    let total: u32 = stats.iter().map(|s| s.base_stat).sum();
    let max = stats.len() as u32 * MAX_BASE_STAT;
    (f64::from(total) / f64::from(max)) as f32
}
