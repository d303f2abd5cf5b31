use serde_json::Value;
use tokio::task::JoinHandle;

use eventkit_client::endpoints;
use eventkit_core::{Provider, ProviderSlug};

use super::Session;
use crate::action::Action;

impl Session {
    pub fn get_providers(&self) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "providers",
            false,
            |state| &state.providers.status,
            |cancel_source| Action::FetchingProviders { cancel_source },
        )?;

        Some(self.fetch(
            "providers",
            cancel,
            endpoints::providers(),
            |response| response.json::<Vec<Provider>>(),
            |outcome, providers| {
                outcome.dispatch(Action::ReceivedProviders { providers });
            },
            |error| Action::FetchProvidersError { error },
        ))
    }

    /// Providers able to serve the area described by `geojson`. A new call
    /// cancels the previous one, so only the latest area wins.
    pub fn filter_providers(&self, geojson: &Value) -> Option<JoinHandle<()>> {
        let cancel = self.begin_fetch(
            "filtered providers",
            false,
            |state| &state.providers.filtered.status,
            |cancel_source| Action::FilteringProviders { cancel_source },
        )?;

        Some(self.fetch(
            "filtered providers",
            cancel,
            endpoints::filter_providers(geojson),
            |response| response.json::<Vec<Provider>>(),
            |outcome, providers| {
                outcome.dispatch(Action::ReceivedFilteredProviders { providers });
            },
            |error| Action::FilterProvidersError { error },
        ))
    }

    pub fn toggle_favorite_provider(
        &self,
        slug: &ProviderSlug,
        favorite: bool,
    ) -> Option<JoinHandle<()>> {
        self.store
            .dispatch(Action::UpdatingFavorite { slug: slug.clone() });
        let updated = slug.clone();
        Some(self.mutate(
            "favorite provider",
            endpoints::set_provider_favorite(slug, favorite),
            move |_| Action::UpdatedFavorite {
                slug: updated,
                favorite,
            },
            |error| Action::UpdateFavoriteError { error },
        ))
    }
}
