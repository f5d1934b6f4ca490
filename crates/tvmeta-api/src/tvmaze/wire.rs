//! TVMaze JSON response types and their conversion into the domain model.

use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

use crate::date::{NullableDate, deserialize_blank_date};
use crate::model::{Episode, Image, Network, Season, Show};
use crate::remote_id::RemoteIds;

/// Parses an RFC 3339 `airstamp`; `null` and `""` are absent.
fn deserialize_airstamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(v) => DateTime::parse_from_rfc3339(v)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| D::Error::custom(format!("invalid airstamp {v:?}: {e}"))),
    }
}

/// One `search/shows` hit.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    /// Matched show.
    pub show: WireShow,
}

/// Country of a network or web channel.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireCountry {
    pub name: Option<String>,
}

/// Broadcast network or web channel.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireNetwork {
    pub id: u64,
    pub name: Option<String>,
    pub country: Option<WireCountry>,
}

impl From<WireNetwork> for Network {
    fn from(wire: WireNetwork) -> Self {
        Self {
            name: wire.name.unwrap_or_default(),
            country: wire.country.and_then(|c| c.name).unwrap_or_default(),
        }
    }
}

/// Poster URLs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireImage {
    pub medium: Option<String>,
    pub original: Option<String>,
}

impl From<WireImage> for Image {
    fn from(wire: WireImage) -> Self {
        Self {
            medium: wire.medium.unwrap_or_default(),
            original: wire.original.unwrap_or_default(),
        }
    }
}

/// `_embedded` block requested with `?embed=nextepisode`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireEmbedded {
    pub nextepisode: Option<WireEpisode>,
}

/// A show resource.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireShow {
    pub id: u64,
    pub url: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub language: Option<String>,
    pub genres: Option<Vec<String>>,
    pub status: Option<String>,
    pub runtime: Option<u32>,
    pub premiered: NullableDate,
    pub ended: NullableDate,
    pub summary: Option<String>,
    pub network: Option<WireNetwork>,
    pub web_channel: Option<WireNetwork>,
    pub updated: Option<i64>,
    pub externals: RemoteIds,
    pub image: Option<WireImage>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<WireEmbedded>,
}

impl From<WireShow> for Show {
    fn from(wire: WireShow) -> Self {
        let web_only = wire.web_channel.as_ref().is_some_and(|w| w.id != 0);
        let network = Network::resolve(
            wire.web_channel.map(Network::from),
            wire.network.map(Network::from),
        );
        Self {
            id: wire.id,
            url: wire.url.unwrap_or_default(),
            locale: wire.language.unwrap_or_default(),
            name: wire.name.unwrap_or_default(),
            description: wire.summary.unwrap_or_default(),
            kind: wire.kind.unwrap_or_default(),
            genres: wire.genres.unwrap_or_default(),
            status: wire.status.unwrap_or_default(),
            runtime: wire.runtime,
            network: network.name,
            country: network.country,
            web_only,
            premiered: wire.premiered,
            ended: wire.ended,
            updated: wire.updated,
            image: wire.image.map(Image::from).unwrap_or_default(),
            seasons: Vec::new(),
            remote_ids: wire.externals,
        }
    }
}

/// A season resource.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireSeason {
    pub id: u64,
    pub url: Option<String>,
    pub number: u32,
    pub name: Option<String>,
    pub episode_order: Option<u32>,
    #[serde(deserialize_with = "deserialize_blank_date")]
    pub premiere_date: NullableDate,
    #[serde(deserialize_with = "deserialize_blank_date")]
    pub end_date: NullableDate,
    pub network: Option<WireNetwork>,
    pub web_channel: Option<WireNetwork>,
    pub summary: Option<String>,
}

impl From<WireSeason> for Season {
    fn from(wire: WireSeason) -> Self {
        Self {
            id: wire.id,
            url: wire.url.unwrap_or_default(),
            number: wire.number,
            name: wire.name.unwrap_or_default(),
            episode_order: wire.episode_order,
            premiere: wire.premiere_date,
            end: wire.end_date,
            network: Network::resolve(
                wire.web_channel.map(Network::from),
                wire.network.map(Network::from),
            ),
            summary: wire.summary.unwrap_or_default(),
        }
    }
}

/// An episode resource. Specials carry a `null` number.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WireEpisode {
    pub id: u64,
    pub name: Option<String>,
    pub season: u32,
    pub number: Option<u32>,
    #[serde(deserialize_with = "deserialize_blank_date")]
    pub airdate: NullableDate,
    #[serde(deserialize_with = "deserialize_airstamp")]
    pub airstamp: Option<DateTime<Utc>>,
    pub runtime: Option<u32>,
    pub summary: Option<String>,
}

impl From<WireEpisode> for Episode {
    fn from(wire: WireEpisode) -> Self {
        Self {
            id: wire.id,
            season: wire.season,
            number: wire.number.unwrap_or_default(),
            name: wire.name.unwrap_or_default(),
            description: wire.summary.unwrap_or_default(),
            air_date: wire.airdate,
            air_stamp: wire.airstamp,
            runtime: wire.runtime,
        }
    }
}

impl WireShow {
    /// The embedded next episode, if any. A zero id means none is
    /// scheduled.
    pub fn next_episode(self) -> Option<Episode> {
        self.embedded
            .and_then(|e| e.nextepisode)
            .filter(|ep| ep.id != 0)
            .map(Episode::from)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::remote_id;

    #[test]
    fn test_show_prefers_web_channel_network() {
        // Arrange
        let json = r#"{
            "id": 2993, "name": "Stranger Things", "type": "Scripted",
            "language": "English", "genres": ["Drama", "Horror"],
            "premiered": "2016-07-15", "ended": null,
            "network": null,
            "webChannel": {"id": 1, "name": "Netflix", "country": null},
            "externals": {"tvrage": 48493, "thetvdb": 305288, "imdb": "tt4574334"}
        }"#;

        // Act
        let show = Show::from(serde_json::from_str::<WireShow>(json).unwrap());

        // Assert
        assert_eq!(show.network, "Netflix");
        assert_eq!(show.country, "");
        assert!(show.web_only);
        assert!(!show.ended.is_valid());
        assert_eq!(show.genres, vec!["Drama", "Horror"]);
        assert_eq!(show.remote_ids.int(remote_id::THETVDB), 305_288);
    }

    #[test]
    fn test_show_with_broadcast_network_only() {
        // Arrange
        let json = r#"{
            "id": 315, "name": "Archer",
            "network": {"id": 49, "name": "FXX", "country": {"name": "United States", "code": "US"}},
            "webChannel": null, "summary": null, "image": null, "externals": null
        }"#;

        // Act
        let show = Show::from(serde_json::from_str::<WireShow>(json).unwrap());

        // Assert
        assert_eq!(show.network, "FXX");
        assert_eq!(show.country, "United States");
        assert!(!show.web_only);
        assert!(show.description.is_empty());
        assert!(show.remote_ids.is_empty());
    }

    #[test]
    fn test_season_blank_dates_are_invalid() {
        // Arrange
        let json = r#"{"id": 1, "number": 12, "premiereDate": "", "endDate": null}"#;

        // Act
        let season = Season::from(serde_json::from_str::<WireSeason>(json).unwrap());

        // Assert
        assert_eq!(season.number, 12);
        assert!(!season.premiere.is_valid());
        assert!(!season.end.is_valid());
    }

    #[test]
    fn test_episode_airstamp_and_special_number() {
        // Arrange
        let json = r#"{
            "id": 1, "season": 1, "number": null, "airdate": "2009-09-17",
            "airstamp": "2009-09-18T02:00:00+00:00", "runtime": 30
        }"#;

        // Act
        let episode = Episode::from(serde_json::from_str::<WireEpisode>(json).unwrap());

        // Assert
        assert_eq!(episode.number, 0);
        assert_eq!(
            episode.air_stamp.unwrap().to_rfc3339(),
            "2009-09-18T02:00:00+00:00"
        );
        assert_eq!(episode.air_date.to_string(), "2009-09-17");
    }

    #[test]
    fn test_episode_malformed_airstamp_fails() {
        // Arrange
        let json = r#"{"id": 1, "airstamp": "yesterday"}"#;

        // Act
        let result = serde_json::from_str::<WireEpisode>(json);

        // Assert
        assert!(result.unwrap_err().to_string().contains("yesterday"));
    }

    #[test]
    fn test_next_episode_zero_id_is_none() {
        // Arrange
        let scheduled: WireShow =
            serde_json::from_str(r#"{"id": 1, "_embedded": {"nextepisode": {"id": 7, "season": 2, "number": 3}}}"#)
                .unwrap();
        let zero: WireShow =
            serde_json::from_str(r#"{"id": 1, "_embedded": {"nextepisode": {"id": 0}}}"#).unwrap();
        let absent: WireShow = serde_json::from_str(r#"{"id": 1}"#).unwrap();

        // Act & Assert
        assert_eq!(scheduled.next_episode().unwrap().number, 3);
        assert!(zero.next_episode().is_none());
        assert!(absent.next_episode().is_none());
    }
}
