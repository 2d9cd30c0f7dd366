use serde::Deserialize;

use crate::FetchError;

/// The only upstream resource the page talks to.
pub const POKEMON_ENDPOINT: &str = "https://pokeapi.co/api/v2/pokemon?limit=5";

/// One entry of the upstream `results` array, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PokemonSummary {
    pub name: String,
    pub url: String,
}

/// The part of the upstream body we read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PokemonPage {
    /// Missing `results` is read as an empty page.
    #[serde(default)]
    pub results: Vec<PokemonSummary>,
}

/// Parses an upstream body into its `results`, in upstream order.
///
/// Names are not deduplicated. A page with repeated names renders rows with
/// repeated keys, which list rendering does not define.
pub fn parse_pokemon(body: &str) -> Result<Vec<PokemonSummary>, FetchError> {
    let page: PokemonPage = serde_json::from_str(body)?;
    Ok(page.results)
}
