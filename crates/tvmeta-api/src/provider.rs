//! `TvProvider` trait definition and lookup helpers shared by adapters.
#![allow(clippy::future_not_send)]

use chrono::Utc;
use tracing::instrument;

use crate::error::{NotFound, Result};
use crate::model::{Episode, Season, Show};
use crate::season;

/// Operations every metadata provider implements.
///
/// Abstracts provider clients for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TvProvider: Send)]
pub trait LocalTvProvider {
    /// Searches shows by free-text name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails. No match is an
    /// empty `Vec`, not an error.
    async fn find_show(&self, name: &str) -> Result<Vec<Show>>;

    /// Returns the best match for `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Show` when the search is empty, or any error of
    /// [`Self::find_show`].
    async fn get_show(&self, name: &str) -> Result<Show>;

    /// Re-fetches full show detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    async fn refresh_show(&self, show_id: u64) -> Result<Show>;

    /// Lists every episode of a show.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    async fn get_episodes(&self, show: &Show) -> Result<Vec<Episode>>;

    /// Returns the episode with this (season, number) pair.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Episode` when no episode matches.
    async fn get_episode(&self, show: &Show, season: u32, number: u32) -> Result<Episode>;

    /// Lists the seasons of a show.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    async fn get_seasons(&self, show: &Show) -> Result<Vec<Season>>;

    /// Returns the season with this number.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Season` when absent.
    async fn get_season(&self, show: &Show, number: u32) -> Result<Season>;

    /// Returns the next unaired episode; `None` when nothing is scheduled.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    async fn get_next_episode(&self, show: &Show) -> Result<Option<Episode>>;
}

/// First search result, or `NotFound::Show`.
///
/// # Errors
///
/// Returns `NotFound::Show` naming `query` when `shows` is empty.
pub fn first_match(shows: Vec<Show>, query: &str) -> Result<Show> {
    shows
        .into_iter()
        .next()
        .ok_or_else(|| NotFound::Show(String::from(query)).into())
}

/// Linear scan for a season number.
///
/// # Errors
///
/// Returns `NotFound::Season` when no season has `number`.
pub fn season_by_number(seasons: Vec<Season>, number: u32) -> Result<Season> {
    seasons
        .into_iter()
        .find(|season| season.number == number)
        .ok_or_else(|| NotFound::Season(number).into())
}

/// Linear scan for a (season, number) pair.
///
/// # Errors
///
/// Returns `NotFound::Episode` when no episode matches.
pub fn episode_by_number(episodes: Vec<Episode>, season: u32, number: u32) -> Result<Episode> {
    episodes
        .into_iter()
        .find(|episode| episode.season == season && episode.number == number)
        .ok_or_else(|| NotFound::Episode { season, number }.into())
}

/// Fetches a show's seasons through any provider and resolves the
/// current one.
///
/// # Errors
///
/// Returns any provider error, or `NotFound::CurrentSeason`.
#[instrument(skip_all, fields(show_id = show.id))]
pub async fn current_season_of(api: &(impl LocalTvProvider + Sync), show: &Show) -> Result<Season> {
    let seasons = api.get_seasons(show).await?;
    tracing::debug!(count = seasons.len(), "seasons fetched");
    season::current_season(&seasons, Utc::now()).cloned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::date::NullableDate;
    use crate::error::TvError;

    /// Mock provider backed by fixed data.
    struct MockProvider {
        shows: Vec<Show>,
        seasons: Vec<Season>,
        season_calls: AtomicU32,
    }

    impl MockProvider {
        fn new(shows: Vec<Show>, seasons: Vec<Season>) -> Self {
            Self {
                shows,
                seasons,
                season_calls: AtomicU32::new(0),
            }
        }
    }

    impl LocalTvProvider for MockProvider {
        async fn find_show(&self, name: &str) -> Result<Vec<Show>> {
            let needle = name.to_lowercase();
            Ok(self
                .shows
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }

        async fn get_show(&self, name: &str) -> Result<Show> {
            first_match(self.find_show(name).await?, name)
        }

        async fn refresh_show(&self, show_id: u64) -> Result<Show> {
            self.shows
                .iter()
                .find(|s| s.id == show_id)
                .cloned()
                .ok_or_else(|| NotFound::Show(show_id.to_string()).into())
        }

        async fn get_episodes(&self, _show: &Show) -> Result<Vec<Episode>> {
            Ok(Vec::new())
        }

        async fn get_episode(&self, show: &Show, season: u32, number: u32) -> Result<Episode> {
            episode_by_number(self.get_episodes(show).await?, season, number)
        }

        async fn get_seasons(&self, _show: &Show) -> Result<Vec<Season>> {
            self.season_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.seasons.clone())
        }

        async fn get_season(&self, show: &Show, number: u32) -> Result<Season> {
            season_by_number(self.get_seasons(show).await?, number)
        }

        async fn get_next_episode(&self, _show: &Show) -> Result<Option<Episode>> {
            Ok(None)
        }
    }

    fn show(id: u64, name: &str) -> Show {
        Show {
            id,
            name: String::from(name),
            ..Show::default()
        }
    }

    fn season(number: u32, premiere: Option<&str>) -> Season {
        Season {
            number,
            premiere: NullableDate::parse(premiere).unwrap(),
            ..Season::default()
        }
    }

    #[tokio::test]
    async fn test_get_show_on_empty_search_is_not_found() {
        // Arrange
        let api = MockProvider::new(vec![show(315, "Archer")], Vec::new());

        // Act
        let found = api.find_show("mindy").await.unwrap();
        let err = api.get_show("mindy").await.unwrap_err();

        // Assert
        assert!(found.is_empty());
        assert!(matches!(err, TvError::NotFound(NotFound::Show(ref q)) if q == "mindy"));
    }

    #[tokio::test]
    async fn test_get_show_returns_first_match() {
        // Arrange
        let api = MockProvider::new(
            vec![show(315, "Archer"), show(9000, "Archer Junior")],
            Vec::new(),
        );

        // Act
        let found = api.get_show("ARCHER").await.unwrap();

        // Assert
        assert_eq!(found.id, 315);
    }

    #[tokio::test]
    async fn test_get_season_scans_by_number() {
        // Arrange
        let api = MockProvider::new(
            Vec::new(),
            vec![season(1, Some("2009-09-17")), season(2, Some("2011-01-27"))],
        );
        let archer = show(315, "Archer");

        // Act
        let second = api.get_season(&archer, 2).await.unwrap();
        let missing = api.get_season(&archer, 9).await.unwrap_err();

        // Assert
        assert_eq!(second.number, 2);
        assert!(matches!(missing, TvError::NotFound(NotFound::Season(9))));
    }

    #[tokio::test]
    async fn test_get_episode_missing_pair_is_not_found() {
        // Arrange
        let api = MockProvider::new(Vec::new(), Vec::new());

        // Act
        let err = api
            .get_episode(&show(315, "Archer"), 1, 1)
            .await
            .unwrap_err();

        // Assert
        assert!(matches!(
            err,
            TvError::NotFound(NotFound::Episode {
                season: 1,
                number: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_current_season_of_uses_provider_seasons() {
        // Arrange
        let api = MockProvider::new(
            Vec::new(),
            vec![
                season(1, Some("2009-09-17")),
                season(2, Some("2011-01-27")),
                season(3, None),
            ],
        );

        // Act
        let current = current_season_of(&api, &show(315, "Archer")).await.unwrap();

        // Assert
        assert_eq!(current.number, 2);
        assert_eq!(api.season_calls.load(Ordering::SeqCst), 1);
    }
}
