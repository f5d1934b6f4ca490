//! Provider-neutral domain model.
//!
//! Adapters own the wire structs; everything here is built once from a
//! provider response and not mutated afterward. A refresh yields a new
//! `Show` rather than patching fields in place.

use chrono::{DateTime, Utc};

use crate::date::NullableDate;
use crate::remote_id::{self, RemoteIds};

/// Broadcast network or web channel, reduced to name and country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    /// Network or channel name.
    pub name: String,
    /// Country name.
    pub country: String,
}

impl Network {
    /// Merges a web channel and a broadcast network.
    ///
    /// Each field takes the web channel's value when it is non-empty and
    /// falls back to the broadcast network otherwise.
    #[must_use]
    pub fn resolve(web_channel: Option<Self>, network: Option<Self>) -> Self {
        let web = web_channel.unwrap_or_default();
        let broadcast = network.unwrap_or_default();
        Self {
            name: if web.name.is_empty() {
                broadcast.name
            } else {
                web.name
            },
            country: if web.country.is_empty() {
                broadcast.country
            } else {
                web.country
            },
        }
    }
}

/// Poster URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    /// Medium-sized poster URL.
    pub medium: String,
    /// Original-sized poster URL.
    pub original: String,
}

/// A TV show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Show {
    /// Identifier, unique within one provider.
    pub id: u64,
    /// Provider page URL.
    pub url: String,
    /// Language or locale as reported by the provider.
    pub locale: String,
    /// Title.
    pub name: String,
    /// Summary text (may contain provider HTML).
    pub description: String,
    /// Show type (e.g. "Scripted", "Animation").
    pub kind: String,
    /// Genres.
    pub genres: Vec<String>,
    /// Production status (e.g. "Running", "Ended", "Continuing").
    pub status: String,
    /// Nominal episode runtime in minutes.
    pub runtime: Option<u32>,
    /// Network or web channel name.
    pub network: String,
    /// Country of the network or web channel.
    pub country: String,
    /// Whether the show is distributed by a web channel.
    pub web_only: bool,
    /// First air date.
    pub premiered: NullableDate,
    /// Last air date.
    pub ended: NullableDate,
    /// Provider update timestamp (seconds since epoch).
    pub updated: Option<i64>,
    /// Poster URLs.
    pub image: Image,
    /// Seasons, ascending by number as delivered by the provider.
    pub seasons: Vec<Season>,
    /// Identifiers in other providers' namespaces.
    pub remote_ids: RemoteIds,
}

impl Show {
    /// First air instant, if known.
    #[must_use]
    pub const fn first_aired(&self) -> Option<DateTime<Utc>> {
        self.premiered.instant()
    }

    /// TVRage identifier, or `0` when unknown.
    #[must_use]
    pub fn tvrage_id(&self) -> u64 {
        self.remote_ids.int(remote_id::TVRAGE)
    }

    /// TheTVDB identifier, or `0` when unknown.
    #[must_use]
    pub fn thetvdb_id(&self) -> u64 {
        self.remote_ids.int(remote_id::THETVDB)
    }

    /// IMDb identifier, or `""` when unknown.
    #[must_use]
    pub fn imdb_id(&self) -> String {
        self.remote_ids.string(remote_id::IMDB)
    }

    /// Medium-sized poster URL.
    #[must_use]
    pub fn medium_poster(&self) -> &str {
        &self.image.medium
    }

    /// Original-sized poster URL.
    #[must_use]
    pub fn original_poster(&self) -> &str {
        &self.image.original
    }
}

/// A season of a show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Season {
    /// Identifier (`0` when the provider has no season resource).
    pub id: u64,
    /// Provider page URL.
    pub url: String,
    /// Season number, unique within the show.
    pub number: u32,
    /// Season name (often empty).
    pub name: String,
    /// Announced episode count.
    pub episode_order: Option<u32>,
    /// First air date.
    pub premiere: NullableDate,
    /// Last air date.
    pub end: NullableDate,
    /// Network or web channel carrying this season.
    pub network: Network,
    /// Summary text.
    pub summary: String,
}

/// An episode of a show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Episode {
    /// Identifier; `0` never denotes a real episode.
    pub id: u64,
    /// Number of the season this episode belongs to.
    pub season: u32,
    /// Episode number within the season.
    pub number: u32,
    /// Title.
    pub name: String,
    /// Summary text.
    pub description: String,
    /// Air date.
    pub air_date: NullableDate,
    /// Exact air instant, when the provider has one.
    pub air_stamp: Option<DateTime<Utc>>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
}
