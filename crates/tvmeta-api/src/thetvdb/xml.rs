//! XML response wrapper types and custom deserializers.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

use crate::date::{NullableDate, deserialize_xml_date};
use crate::model::{Episode, Image, Show};
use crate::remote_id::{self, RemoteId, RemoteIds};

/// Mirror type mask bit for XML data.
pub const MIRROR_XML: u64 = 1;

/// Deserializes empty strings as `None` (for `String` fields).
pub fn deserialize_empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| String::from(s.trim())).filter(|s| !s.is_empty()))
}

/// Deserializes empty strings as `None` (for unsigned numeric fields).
pub fn deserialize_empty_string_as_none_u64<'de, D>(
    deserializer: D,
) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<u64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("failed to parse u64 from {v:?}: {e}"))),
    }
}

/// Deserializes empty strings as `None` (for signed numeric fields).
pub fn deserialize_empty_string_as_none_i64<'de, D>(
    deserializer: D,
) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("failed to parse i64 from {v:?}: {e}"))),
    }
}

/// `mirrors.xml` response.
#[derive(Debug, Deserialize)]
#[serde(rename = "Mirrors")]
pub struct MirrorsResponse {
    #[serde(rename = "Mirror", default)]
    pub mirrors: Vec<Mirror>,
}

/// One mirror entry.
#[derive(Debug, Deserialize)]
pub struct Mirror {
    /// Base URL of the mirror.
    #[serde(
        rename = "mirrorpath",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub path: Option<String>,
    /// Bit set of `MIRROR_XML` (1), banners (2) and zips (4).
    #[serde(
        rename = "typemask",
        deserialize_with = "deserialize_empty_string_as_none_u64",
        default
    )]
    pub typemask: Option<u64>,
}

impl MirrorsResponse {
    /// Path of the first mirror serving XML.
    pub fn xml_mirror(&self) -> Option<&str> {
        self.mirrors
            .iter()
            .find(|m| m.typemask.is_some_and(|mask| mask & MIRROR_XML != 0))
            .and_then(|m| m.path.as_deref())
    }
}

/// `<Data>` envelope shared by search, series and episode responses.
#[derive(Debug, Deserialize)]
#[serde(rename = "Data")]
pub struct DataResponse {
    #[serde(rename = "Series", default)]
    pub series: Vec<XmlSeries>,
    #[serde(rename = "Episode", default)]
    pub episodes: Vec<XmlEpisode>,
}

/// `<Series>` element. Search results carry `seriesid` and `language`;
/// full records carry `id` and `Language`.
#[derive(Debug, Deserialize)]
pub struct XmlSeries {
    #[serde(
        rename = "id",
        deserialize_with = "deserialize_empty_string_as_none_u64",
        default
    )]
    pub id: Option<u64>,
    #[serde(
        rename = "seriesid",
        deserialize_with = "deserialize_empty_string_as_none_u64",
        default
    )]
    pub series_id: Option<u64>,
    #[serde(
        rename = "SeriesName",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub name: Option<String>,
    #[serde(
        rename = "language",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub language: Option<String>,
    #[serde(
        rename = "Language",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub language_full: Option<String>,
    #[serde(
        rename = "Overview",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub overview: Option<String>,
    #[serde(
        rename = "Network",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub network: Option<String>,
    #[serde(
        rename = "Status",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub status: Option<String>,
    /// Pipe-delimited, e.g. `|Action|Comedy|`.
    #[serde(
        rename = "Genre",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub genre: Option<String>,
    #[serde(
        rename = "Runtime",
        deserialize_with = "deserialize_empty_string_as_none_u64",
        default
    )]
    pub runtime: Option<u64>,
    #[serde(rename = "FirstAired", deserialize_with = "deserialize_xml_date", default)]
    pub first_aired: NullableDate,
    #[serde(
        rename = "IMDB_ID",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub imdb_id: Option<String>,
    #[serde(
        rename = "zap2it_id",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub zap2it_id: Option<String>,
    #[serde(
        rename = "lastupdated",
        deserialize_with = "deserialize_empty_string_as_none_i64",
        default
    )]
    pub last_updated: Option<i64>,
    /// Poster path relative to the banner root.
    #[serde(
        rename = "poster",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub poster: Option<String>,
}

impl XmlSeries {
    /// Converts into a `Show`. `banner_root` prefixes relative poster paths.
    pub fn into_show(self, banner_root: &str) -> Show {
        let id = self.id.or(self.series_id).unwrap_or_default();

        let mut remote_ids = RemoteIds::new();
        if id != 0 {
            remote_ids.insert(
                remote_id::THETVDB,
                RemoteId::Int(i64::try_from(id).unwrap_or_default()),
            );
        }
        if let Some(imdb) = self.imdb_id {
            remote_ids.insert(remote_id::IMDB, RemoteId::Str(imdb));
        }
        if let Some(zap2it) = self.zap2it_id {
            remote_ids.insert(remote_id::ZAP2IT, RemoteId::Str(zap2it));
        }

        let poster = self
            .poster
            .map(|p| format!("{banner_root}banners/{p}"))
            .unwrap_or_default();

        Show {
            id,
            locale: self.language.or(self.language_full).unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.overview.unwrap_or_default(),
            genres: self
                .genre
                .as_deref()
                .map(|g| {
                    g.split('|')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            runtime: self.runtime.and_then(|r| u32::try_from(r).ok()),
            network: self.network.unwrap_or_default(),
            premiered: self.first_aired,
            updated: self.last_updated,
            image: Image {
                medium: poster.clone(),
                original: poster,
            },
            remote_ids,
            ..Show::default()
        }
    }
}

/// `<Episode>` element.
#[derive(Debug, Deserialize)]
pub struct XmlEpisode {
    #[serde(
        rename = "id",
        deserialize_with = "deserialize_empty_string_as_none_u64",
        default
    )]
    pub id: Option<u64>,
    #[serde(
        rename = "EpisodeName",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub name: Option<String>,
    #[serde(
        rename = "EpisodeNumber",
        deserialize_with = "deserialize_empty_string_as_none_u64",
        default
    )]
    pub number: Option<u64>,
    #[serde(
        rename = "SeasonNumber",
        deserialize_with = "deserialize_empty_string_as_none_u64",
        default
    )]
    pub season: Option<u64>,
    #[serde(
        rename = "Overview",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub overview: Option<String>,
    #[serde(rename = "FirstAired", deserialize_with = "deserialize_xml_date", default)]
    pub first_aired: NullableDate,
}

impl From<XmlEpisode> for Episode {
    fn from(xml: XmlEpisode) -> Self {
        Self {
            id: xml.id.unwrap_or_default(),
            season: xml
                .season
                .and_then(|s| u32::try_from(s).ok())
                .unwrap_or_default(),
            number: xml
                .number
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or_default(),
            name: xml.name.unwrap_or_default(),
            description: xml.overview.unwrap_or_default(),
            air_date: xml.first_aired,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_deserialize_empty_string_as_none() {
        // Arrange
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_empty_string_as_none", default)]
            value: Option<String>,
        }

        // Act
        let empty: Wrapper = quick_xml::de::from_str("<W><value></value></W>").unwrap();
        let blank: Wrapper = quick_xml::de::from_str("<W><value>  </value></W>").unwrap();
        let absent: Wrapper = quick_xml::de::from_str("<W></W>").unwrap();
        let present: Wrapper = quick_xml::de::from_str("<W><value>FXX</value></W>").unwrap();

        // Assert
        assert!(empty.value.is_none());
        assert!(blank.value.is_none());
        assert!(absent.value.is_none());
        assert_eq!(present.value.as_deref(), Some("FXX"));
    }

    #[test]
    fn test_deserialize_empty_string_as_none_u64_rejects_garbage() {
        // Arrange
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_empty_string_as_none_u64", default)]
            #[allow(dead_code)]
            value: Option<u64>,
        }

        // Act
        let result = quick_xml::de::from_str::<Wrapper>("<W><value>abc</value></W>");

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_xml_mirror_selects_xml_bit() {
        // Arrange
        let xml = r"<Mirrors>
            <Mirror><id>1</id><mirrorpath>http://banners.example</mirrorpath><typemask>2</typemask></Mirror>
            <Mirror><id>2</id><mirrorpath>http://xml.example</mirrorpath><typemask>7</typemask></Mirror>
        </Mirrors>";

        // Act
        let mirrors: MirrorsResponse = quick_xml::de::from_str(xml).unwrap();

        // Assert
        assert_eq!(mirrors.mirrors.len(), 2);
        assert_eq!(mirrors.xml_mirror(), Some("http://xml.example"));
    }

    #[test]
    fn test_xml_mirror_none_without_xml_bit() {
        // Arrange
        let xml = r"<Mirrors>
            <Mirror><id>1</id><mirrorpath>http://zips.example</mirrorpath><typemask>4</typemask></Mirror>
        </Mirrors>";

        // Act
        let mirrors: MirrorsResponse = quick_xml::de::from_str(xml).unwrap();

        // Assert
        assert!(mirrors.xml_mirror().is_none());
    }

    #[test]
    fn test_series_id_falls_back_to_seriesid() {
        // Arrange
        let xml = r"<Data><Series>
            <seriesid>110381</seriesid><language>en</language>
            <SeriesName>Archer (2009)</SeriesName><FirstAired></FirstAired>
            <Network/><IMDB_ID>tt1486217</IMDB_ID>
        </Series></Data>";

        // Act
        let data: DataResponse = quick_xml::de::from_str(xml).unwrap();
        let show = data.series.into_iter().next().unwrap().into_show("http://x/");

        // Assert
        assert_eq!(show.id, 110_381);
        assert_eq!(show.thetvdb_id(), 110_381);
        assert_eq!(show.locale, "en");
        assert!(show.network.is_empty());
        assert!(!show.premiered.is_valid());
        assert_eq!(show.imdb_id(), "tt1486217");
        assert!(show.image.original.is_empty());
    }

    #[test]
    fn test_series_genres_split_on_pipes() {
        // Arrange
        let xml = r"<Data><Series>
            <id>110381</id><Genre>|Action|Animation|Comedy|</Genre>
            <Runtime>30</Runtime><poster>posters/110381-1.jpg</poster>
        </Series></Data>";

        // Act
        let data: DataResponse = quick_xml::de::from_str(xml).unwrap();
        let show = data.series.into_iter().next().unwrap().into_show("http://x/");

        // Assert
        assert_eq!(show.genres, vec!["Action", "Animation", "Comedy"]);
        assert_eq!(show.runtime, Some(30));
        assert_eq!(show.image.original, "http://x/banners/posters/110381-1.jpg");
    }

    #[test]
    fn test_episode_conversion() {
        // Arrange
        let xml = r"<Data><Episode>
            <id>1085881</id><EpisodeName>Mole Hunt</EpisodeName>
            <EpisodeNumber>1</EpisodeNumber><SeasonNumber>1</SeasonNumber>
            <FirstAired>2009-09-17</FirstAired><Overview>Audit.</Overview>
        </Episode></Data>";

        // Act
        let data: DataResponse = quick_xml::de::from_str(xml).unwrap();
        let episode = Episode::from(data.episodes.into_iter().next().unwrap());

        // Assert
        assert_eq!(episode.id, 1_085_881);
        assert_eq!((episode.season, episode.number), (1, 1));
        assert_eq!(episode.air_date.to_string(), "2009-09-17");
        assert!(episode.air_stamp.is_none());
    }

    #[test]
    fn test_empty_data_has_no_series() {
        // Arrange & Act
        let data: DataResponse = quick_xml::de::from_str("<Data></Data>").unwrap();

        // Assert
        assert!(data.series.is_empty());
        assert!(data.episodes.is_empty());
    }
}
