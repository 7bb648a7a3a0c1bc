//! Wire DTOs for the RAWG search endpoint.

use serde::Deserialize;

use crate::domain::ports::CatalogEntry;

/// Top-level search response; only the result list is read.
#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto {
    #[serde(default)]
    pub results: Vec<GameDto>,
}

/// One search hit. RAWG returns many more fields; everything beyond the
/// title and artwork is ignored.
#[derive(Debug, Deserialize)]
pub(super) struct GameDto {
    pub name: String,
    pub background_image: Option<String>,
}

impl SearchResponseDto {
    /// Best match, taken as the first result in the catalog's own ranking.
    pub(super) fn into_best_match(self) -> Option<CatalogEntry> {
        self.results.into_iter().next().map(|game| CatalogEntry {
            title: game.name,
            cover_url: game.background_image,
        })
    }
}
