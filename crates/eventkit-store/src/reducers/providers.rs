use std::sync::Arc;

use eventkit_core::{Provider, ProviderSlug};

use super::{keep_if_equal, merge_entities, replace_ids};
use crate::action::Action;
use crate::state::ProvidersState;
use crate::status::{FetchStatus, MutationStatus};

pub(super) fn reduce(state: &Arc<ProvidersState>, action: &Action) -> Arc<ProvidersState> {
    let mut next = (**state).clone();

    match action {
        Action::FetchingProviders { cancel_source } => {
            next.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedProviders { providers } => {
            next.status = FetchStatus::received();
            next.providers = merge_entities(&next.providers, keyed(providers));
            next.ids = replace_ids(&next.ids, &slugs(providers));
        }
        Action::FetchProvidersError { error } => next.status = FetchStatus::failed(error.clone()),

        Action::FilteringProviders { cancel_source } => {
            next.filtered.status = FetchStatus::requesting(cancel_source.clone());
        }
        Action::ReceivedFilteredProviders { providers } => {
            next.filtered.status = FetchStatus::received();
            next.providers = merge_entities(&next.providers, keyed(providers));
            next.filtered.ids = replace_ids(&next.filtered.ids, &slugs(providers));
        }
        Action::FilterProvidersError { error } => {
            next.filtered.status = FetchStatus::failed(error.clone());
        }

        Action::UpdatingFavorite { .. } => next.favorite = MutationStatus::pending(),
        Action::UpdatedFavorite { slug, favorite } => {
            next.favorite = MutationStatus::done();
            if let Some(provider) = next.providers.get(slug) {
                let updated = Provider {
                    favorite: *favorite,
                    ..(**provider).clone()
                };
                next.providers = merge_entities(&next.providers, [(slug.clone(), updated)]);
            }
        }
        Action::UpdateFavoriteError { error } => {
            next.favorite = MutationStatus::failed(error.clone());
        }

        _ => return state.clone(),
    }

    keep_if_equal(state, next)
}

fn keyed(providers: &[Provider]) -> Vec<(ProviderSlug, Provider)> {
    providers
        .iter()
        .map(|p| (p.slug.clone(), p.clone()))
        .collect()
}

fn slugs(providers: &[Provider]) -> Vec<ProviderSlug> {
    providers.iter().map(|p| p.slug.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(slug: &str, favorite: bool) -> Provider {
        serde_json::from_value(json!({
            "slug": slug,
            "name": slug.to_uppercase(),
            "favorite": favorite,
            "service_description": "a provider",
        }))
        .unwrap()
    }

    #[test]
    fn test_received_providers() {
        let state = reduce(
            &Arc::default(),
            &Action::ReceivedProviders {
                providers: vec![provider("osm", false), provider("wms", true)],
            },
        );
        let listed = state.listed();
        let slugs: Vec<&str> = listed.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["osm", "wms"]);
        assert!(state.status.fetched);
    }

    #[test]
    fn test_filtered_providers_share_the_map() {
        let state = reduce(
            &Arc::default(),
            &Action::ReceivedProviders {
                providers: vec![provider("osm", false), provider("wms", true)],
            },
        );
        let next = reduce(
            &state,
            &Action::ReceivedFilteredProviders {
                providers: vec![provider("wms", true)],
            },
        );

        assert_eq!(*next.filtered.ids, vec![ProviderSlug::new("wms")]);
        assert!(Arc::ptr_eq(&state.providers, &next.providers));
    }

    #[test]
    fn test_favorite_toggle() {
        let state = reduce(
            &Arc::default(),
            &Action::ReceivedProviders {
                providers: vec![provider("osm", false)],
            },
        );
        let state = reduce(
            &state,
            &Action::UpdatingFavorite {
                slug: ProviderSlug::new("osm"),
            },
        );
        assert!(state.favorite.pending);

        let state = reduce(
            &state,
            &Action::UpdatedFavorite {
                slug: ProviderSlug::new("osm"),
                favorite: true,
            },
        );
        assert!(state.providers[&ProviderSlug::new("osm")].favorite);
        assert!(state.favorite.done);
    }
}
