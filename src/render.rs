use leptos::*;

use crate::PokemonSummary;

/// What a strategy shows for its current state.
///
/// Strategies compute this from plain data so the rendering rules can be
/// checked without a browser; the Leptos view is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// A fetch is in progress.
    Loading(&'static str),
    /// A human-readable failure message.
    Error(String),
    /// A titled list, one row per Pokemon keyed by name.
    List {
        title: &'static str,
        items: Vec<PokemonSummary>,
    },
    /// Nothing is rendered until the awaited value settles.
    Suspended,
}

impl Rendered {
    /// The row keys of a list, in render order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Rendered::List { items, .. } => items.iter().map(|p| p.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// The text shown for loading and error states.
    pub fn message(&self) -> Option<&str> {
        match self {
            Rendered::Loading(text) => Some(*text),
            Rendered::Error(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl IntoView for Rendered {
    fn into_view(self) -> View {
        match self {
            Rendered::Loading(text) => view! { <div>{text}</div> }.into_view(),
            Rendered::Error(text) => view! { <div>{text}</div> }.into_view(),
            Rendered::List { title, items } => view! {
                <div>
                    <div>{title}</div>
                    <div>
                        <For
                            each=move || items.clone()
                            key=|pokemon: &PokemonSummary| pokemon.name.clone()
                            children=|pokemon: PokemonSummary| view! { <div>{pokemon.name}</div> }
                        />
                    </div>
                </div>
            }
            .into_view(),
            Rendered::Suspended => ().into_view(),
        }
    }
}
