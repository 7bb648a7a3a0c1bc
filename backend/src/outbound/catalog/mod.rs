//! Outbound adapter for the external game catalog.

mod dto;
mod rawg_lookup;

pub use rawg_lookup::{RawgCatalogLookup, RawgConfig};
