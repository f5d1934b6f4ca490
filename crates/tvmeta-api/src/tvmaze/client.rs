//! `TvMazeClient` - TVMaze API client implementation.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::wire::{SearchHit, WireEpisode, WireSeason, WireShow};
use crate::error::{NotFound, Result, TvError};
use crate::http::{HttpFetcher, preview};
use crate::model::{Episode, Season, Show};
use crate::provider::{self, LocalTvProvider};

/// Default base URL for the TVMaze API.
const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com/";

/// TVMaze API client.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TvMazeClient {
    /// GET transport bound to the base URL.
    fetcher: HttpFetcher,
}

/// Builder for `TvMazeClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TvMazeClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl TvMazeClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets a per-request timeout (default: none).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TvMazeClient> {
        let user_agent = self
            .user_agent
            .ok_or_else(|| TvError::Config(String::from("user_agent is required")))?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| TvError::Config(format!("invalid default base URL: {e}")))?
        };

        Ok(TvMazeClient {
            fetcher: HttpFetcher::new(base_url, &user_agent, self.timeout)?,
        })
    }
}

impl TvMazeClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TvMazeClientBuilder {
        TvMazeClientBuilder::new()
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        self.fetcher.base_url()
    }

    /// Sends a GET request and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let (_, body) = self.fetcher.fetch(path, query).await?;
        serde_json::from_str(&body)
            .map_err(|e| TvError::decode(path, format!("{e}; body: {}", preview(&body))))
    }

    /// Fetches a single show and attaches its seasons. HTTP 404 becomes
    /// `NotFound::Show` naming `label`.
    async fn get_show_at(&self, path: &str, query: &[(&str, String)], label: &str) -> Result<Show> {
        let wire: WireShow = self.get_json(path, query).await.map_err(|e| {
            if e.status() == Some(404) {
                NotFound::Show(String::from(label)).into()
            } else {
                e
            }
        })?;
        Ok(self.attach_seasons(Show::from(wire)).await)
    }

    /// Fills `show.seasons`. A failure is logged and the show is returned
    /// without seasons.
    async fn attach_seasons(&self, mut show: Show) -> Show {
        if show.id == 0 {
            return show;
        }
        match self.get_seasons(&show).await {
            Ok(seasons) => show.seasons = seasons,
            Err(e) => {
                tracing::warn!(show_id = show.id, error = %e, "failed to fetch seasons for show");
            }
        }
        show
    }

    /// Looks a show up by its TVMaze id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Show` on HTTP 404, or any transport or decode error.
    #[instrument(skip_all, fields(show_id = show_id))]
    pub async fn show_by_id(&self, show_id: u64) -> Result<Show> {
        self.get_show_at(&format!("shows/{show_id}"), &[], &show_id.to_string())
            .await
    }

    /// Looks a show up by its TVRage id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Show` on HTTP 404, or any transport or decode error.
    #[instrument(skip_all, fields(tvrage_id = tvrage_id))]
    pub async fn show_by_tvrage_id(&self, tvrage_id: u64) -> Result<Show> {
        let label = format!("tvrage:{tvrage_id}");
        self.get_show_at("lookup/shows", &[("tvrage", tvrage_id.to_string())], &label)
            .await
    }

    /// Looks a show up by its TheTVDB id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::Show` on HTTP 404, or any transport or decode error.
    #[instrument(skip_all, fields(thetvdb_id = thetvdb_id))]
    pub async fn show_by_thetvdb_id(&self, thetvdb_id: u64) -> Result<Show> {
        let label = format!("thetvdb:{thetvdb_id}");
        self.get_show_at("lookup/shows", &[("thetvdb", thetvdb_id.to_string())], &label)
            .await
    }

    /// One page of the show index. Returns `None` once past the last page.
    ///
    /// # Errors
    ///
    /// Returns any transport error other than HTTP 404, or a decode error.
    #[instrument(skip_all, fields(page = page))]
    pub async fn shows_page(&self, page: u32) -> Result<Option<Vec<Show>>> {
        match self
            .get_json::<Vec<WireShow>>("shows", &[("page", page.to_string())])
            .await
        {
            Ok(shows) => Ok(Some(shows.into_iter().map(Show::from).collect())),
            Err(e) if e.status() == Some(404) => {
                tracing::debug!(page, "end of show index");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The search URL for `name`, without sending a request.
    ///
    /// # Errors
    ///
    /// Returns `TvError::Config` if the path cannot be joined.
    pub fn search_url(&self, name: &str) -> Result<Url> {
        let mut url = self.fetcher.url("search/shows")?;
        url.query_pairs_mut().append_pair("q", name);
        Ok(url)
    }
}

impl LocalTvProvider for TvMazeClient {
    #[instrument(skip_all)]
    async fn find_show(&self, name: &str) -> Result<Vec<Show>> {
        let hits: Vec<SearchHit> = self
            .get_json("search/shows", &[("q", String::from(name))])
            .await?;
        tracing::debug!(count = hits.len(), "search results");
        Ok(hits.into_iter().map(|hit| Show::from(hit.show)).collect())
    }

    #[instrument(skip_all)]
    async fn get_show(&self, name: &str) -> Result<Show> {
        self.get_show_at("singlesearch/shows", &[("q", String::from(name))], name)
            .await
    }

    #[instrument(skip_all)]
    async fn refresh_show(&self, show_id: u64) -> Result<Show> {
        self.show_by_id(show_id).await
    }

    #[instrument(skip_all)]
    async fn get_episodes(&self, show: &Show) -> Result<Vec<Episode>> {
        let episodes: Vec<WireEpisode> = self
            .get_json(&format!("shows/{}/episodes", show.id), &[])
            .await?;
        Ok(episodes.into_iter().map(Episode::from).collect())
    }

    #[instrument(skip_all)]
    async fn get_episode(&self, show: &Show, season: u32, number: u32) -> Result<Episode> {
        let query = [("season", season.to_string()), ("number", number.to_string())];
        match self
            .get_json::<WireEpisode>(&format!("shows/{}/episodebynumber", show.id), &query)
            .await
        {
            Ok(episode) => Ok(Episode::from(episode)),
            Err(e) if e.status() == Some(404) => Err(NotFound::Episode { season, number }.into()),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip_all)]
    async fn get_seasons(&self, show: &Show) -> Result<Vec<Season>> {
        let seasons: Vec<WireSeason> = self
            .get_json(&format!("shows/{}/seasons", show.id), &[])
            .await?;
        Ok(seasons.into_iter().map(Season::from).collect())
    }

    #[instrument(skip_all)]
    async fn get_season(&self, show: &Show, number: u32) -> Result<Season> {
        provider::season_by_number(self.get_seasons(show).await?, number)
    }

    #[instrument(skip_all)]
    async fn get_next_episode(&self, show: &Show) -> Result<Option<Episode>> {
        let wire: WireShow = self
            .get_json(
                &format!("shows/{}", show.id),
                &[("embed", String::from("nextepisode"))],
            )
            .await?;
        Ok(wire.next_episode())
    }
}
