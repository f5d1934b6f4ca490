//! `TheTvdbClient` - TheTVDB XML API client implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use tracing::instrument;
use url::Url;

use super::xml::{DataResponse, MirrorsResponse};
use crate::date::NullableDate;
use crate::error::{NotFound, Result, TvError};
use crate::http::{HttpFetcher, preview};
use crate::model::{Episode, Network, Season, Show};
use crate::provider::{self, LocalTvProvider};
use crate::season;

/// Default site URL; hosts the search endpoint and the mirror list.
const DEFAULT_SITE_URL: &str = "https://thetvdb.com/";

/// Language segment of series and episode paths.
const LANGUAGE: &str = "en";

/// TheTVDB API client.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TheTvdbClient {
    /// GET transport bound to the site URL.
    fetcher: HttpFetcher,
    /// XML mirror serving series and episode records.
    mirror: Url,
    /// API key.
    api_key: String,
}

/// Builder for `TheTvdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TheTvdbClientBuilder {
    api_key: Option<String>,
    user_agent: Option<String>,
    base_url: Option<Url>,
    site_url: Option<Url>,
    timeout: Option<Duration>,
}

impl TheTvdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            api_key: None,
            user_agent: None,
            base_url: None,
            site_url: None,
            timeout: None,
        }
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the XML mirror explicitly, skipping mirror resolution.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Overrides the site URL (for wiremock in tests).
    #[must_use]
    pub fn site_url(mut self, url: Url) -> Self {
        self.site_url = Some(url);
        self
    }

    /// Sets a per-request timeout (default: none).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client without contacting the server. Series requests go
    /// to `base_url`, or to the site URL when none is set.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or empty.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TheTvdbClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TvError::Config(String::from("api_key is required")))?;
        let user_agent = self
            .user_agent
            .ok_or_else(|| TvError::Config(String::from("user_agent is required")))?;

        let site_url = if let Some(url) = self.site_url {
            url
        } else {
            Url::parse(DEFAULT_SITE_URL)
                .map_err(|e| TvError::Config(format!("invalid default site URL: {e}")))?
        };
        let mirror = self.base_url.unwrap_or_else(|| site_url.clone());

        Ok(TheTvdbClient {
            fetcher: HttpFetcher::new(site_url, &user_agent, self.timeout)?,
            mirror: with_trailing_slash(mirror),
            api_key,
        })
    }

    /// Builds the client and, unless `base_url` was set, resolves the XML
    /// mirror from the server's mirror list.
    ///
    /// # Errors
    ///
    /// Everything [`Self::build`] reports, plus transport and decode errors
    /// from the mirror list, and `TvError::Config` when no mirror serves XML.
    #[instrument(skip_all)]
    pub async fn connect(self) -> Result<TheTvdbClient> {
        let explicit = self.base_url.is_some();
        let mut client = self.build()?;
        if !explicit {
            client.mirror = client.resolve_mirror().await?;
            tracing::debug!(mirror = %client.mirror, "resolved TheTVDB mirror");
        }
        Ok(client)
    }
}

/// Appends `/` so relative joins extend the path instead of replacing
/// its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Groups episodes by season number, ascending. Premiere and end are the
/// earliest and latest valid air dates of the season's episodes.
fn derive_seasons(episodes: &[Episode], network: &str) -> Vec<Season> {
    let mut by_number: BTreeMap<u32, Season> = BTreeMap::new();
    for episode in episodes {
        let season = by_number.entry(episode.season).or_insert_with(|| Season {
            number: episode.season,
            episode_order: Some(0),
            network: Network {
                name: String::from(network),
                ..Network::default()
            },
            ..Season::default()
        });
        season.episode_order = season.episode_order.map(|n| n.saturating_add(1));

        if let Some(aired) = episode.air_date.date() {
            if season.premiere.date().is_none_or(|p| aired < p) {
                season.premiere = NullableDate::from_date(aired);
            }
            if season.end.date().is_none_or(|e| aired > e) {
                season.end = NullableDate::from_date(aired);
            }
        }
    }
    by_number.into_values().collect()
}

impl TheTvdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TheTvdbClientBuilder {
        TheTvdbClientBuilder::new()
    }

    /// XML mirror in use.
    #[must_use]
    pub const fn mirror(&self) -> &Url {
        &self.mirror
    }

    /// Fetches `mirrors.xml` and returns the first XML mirror.
    async fn resolve_mirror(&self) -> Result<Url> {
        let path = format!("api/{}/mirrors.xml", self.api_key);
        let (_, body) = self.fetcher.fetch(&path, &[]).await?;
        let mirrors: MirrorsResponse = quick_xml::de::from_str(&body)
            .map_err(|e| TvError::decode("mirrors.xml", format!("{e}; body: {}", preview(&body))))?;
        let prefix = mirrors.xml_mirror().ok_or_else(|| {
            TvError::Config(String::from("could not determine a TheTVDB mirror serving XML"))
        })?;
        Url::parse(prefix)
            .map(with_trailing_slash)
            .map_err(|e| TvError::Config(format!("invalid mirror path {prefix:?}: {e}")))
    }

    /// Fetches and decodes a `<Data>` document.
    async fn get_data(&self, url: Url, query: &[(&str, String)], context: &str) -> Result<DataResponse> {
        let (_, body) = self.fetcher.fetch_url(url, query).await?;
        quick_xml::de::from_str(&body)
            .map_err(|e| TvError::decode(context, format!("{e}; body: {}", preview(&body))))
    }

    /// `api/{key}/series/{id}/{tail}` on the mirror.
    fn series_url(&self, show_id: u64, tail: &str) -> Result<Url> {
        let path = format!("api/{}/series/{show_id}/{tail}", self.api_key);
        self.mirror
            .join(&path)
            .map_err(|e| TvError::Config(format!("failed to join URL path for series {show_id}: {e}")))
    }
}

impl LocalTvProvider for TheTvdbClient {
    #[instrument(skip_all)]
    async fn find_show(&self, name: &str) -> Result<Vec<Show>> {
        let url = self.fetcher.url("api/GetSeries.php")?;
        let data = self
            .get_data(url, &[("seriesname", String::from(name))], "GetSeries")
            .await?;
        tracing::debug!(count = data.series.len(), "search results");
        Ok(data
            .series
            .into_iter()
            .map(|s| s.into_show(self.mirror.as_str()))
            .collect())
    }

    #[instrument(skip_all)]
    async fn get_show(&self, name: &str) -> Result<Show> {
        provider::first_match(self.find_show(name).await?, name)
    }

    #[instrument(skip_all)]
    async fn refresh_show(&self, show_id: u64) -> Result<Show> {
        let url = self.series_url(show_id, &format!("{LANGUAGE}.xml"))?;
        let data = self.get_data(url, &[], "series").await.map_err(|e| {
            if e.status() == Some(404) {
                NotFound::Show(show_id.to_string()).into()
            } else {
                e
            }
        })?;
        data.series
            .into_iter()
            .next()
            .map(|s| s.into_show(self.mirror.as_str()))
            .ok_or_else(|| NotFound::Show(show_id.to_string()).into())
    }

    #[instrument(skip_all)]
    async fn get_episodes(&self, show: &Show) -> Result<Vec<Episode>> {
        let url = self.series_url(show.id, &format!("all/{LANGUAGE}.xml"))?;
        let data = self.get_data(url, &[], "series episodes").await?;
        Ok(data.episodes.into_iter().map(Episode::from).collect())
    }

    #[instrument(skip_all)]
    async fn get_episode(&self, show: &Show, season: u32, number: u32) -> Result<Episode> {
        let url = self.series_url(show.id, &format!("default/{season}/{number}/{LANGUAGE}.xml"))?;
        let not_found = || TvError::from(NotFound::Episode { season, number });
        let data = match self.get_data(url, &[], "episode").await {
            Ok(data) => data,
            Err(e) if e.status() == Some(404) => return Err(not_found()),
            Err(e) => return Err(e),
        };
        data.episodes
            .into_iter()
            .next()
            .map(Episode::from)
            .ok_or_else(not_found)
    }

    #[instrument(skip_all)]
    async fn get_seasons(&self, show: &Show) -> Result<Vec<Season>> {
        let episodes = self.get_episodes(show).await?;
        Ok(derive_seasons(&episodes, &show.network))
    }

    #[instrument(skip_all)]
    async fn get_season(&self, show: &Show, number: u32) -> Result<Season> {
        provider::season_by_number(self.get_seasons(show).await?, number)
    }

    #[instrument(skip_all)]
    async fn get_next_episode(&self, show: &Show) -> Result<Option<Episode>> {
        let episodes = self.get_episodes(show).await?;
        Ok(season::next_episode(&episodes, Utc::now()).cloned())
    }
}
