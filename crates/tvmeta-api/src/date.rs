//! `NullableDate` - a date-only wire value that may be explicitly null.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TvError};

/// Wire format for dates on every provider.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Strict `YYYY-MM-DD` shape. chrono alone accepts single-digit fields.
#[allow(clippy::expect_used)]
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("failed to compile date regex")
});

/// A date without time of day, or an explicit absence.
///
/// Valid dates are anchored at UTC midnight. An invalid date is distinct
/// from any real instant and compares as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NullableDate(Option<DateTime<Utc>>);

impl NullableDate {
    /// The absent date.
    #[must_use]
    pub const fn null() -> Self {
        Self(None)
    }

    /// A valid date at UTC midnight.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(Some(date.and_time(chrono::NaiveTime::MIN).and_utc()))
    }

    /// Decodes a raw wire value.
    ///
    /// `None` yields an invalid date without error.
    ///
    /// # Errors
    ///
    /// Returns `TvError::Decode` naming the value when it is not a
    /// `YYYY-MM-DD` calendar date.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        raw.map_or_else(|| Ok(Self::null()), str::parse::<Self>)
    }

    /// Whether a date is present.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// The instant at UTC midnight, if present.
    #[must_use]
    pub const fn instant(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    /// The calendar date, if present.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.0.map(|t| t.date_naive())
    }
}

impl FromStr for NullableDate {
    type Err = TvError;

    fn from_str(s: &str) -> Result<Self> {
        if !DATE_RE.is_match(s) {
            return Err(TvError::decode(
                "date",
                format!("{s:?} is not a YYYY-MM-DD date"),
            ));
        }
        let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|e| TvError::decode("date", format!("{s:?}: {e}")))?;
        Ok(Self::from_date(date))
    }
}

impl From<NaiveDate> for NullableDate {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for NullableDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => write!(f, "{}", t.format(DATE_FORMAT)),
            None => Ok(()),
        }
    }
}

impl Serialize for NullableDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Some(t) => serializer.collect_str(&t.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for NullableDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_option(NullableDateVisitor)
    }
}

struct NullableDateVisitor;

impl<'de> Visitor<'de> for NullableDateVisitor {
    type Value = NullableDate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YYYY-MM-DD date string or null")
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(NullableDate::null())
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(NullableDate::null())
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_str(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

/// Deserializes an XML date element.
///
/// An absent element (with `#[serde(default)]`) or an empty element is an
/// invalid date. Whitespace around the element text is dropped, like the
/// other TheTVDB text fields; what remains must be a strict `YYYY-MM-DD`
/// date.
///
/// # Errors
///
/// Returns a deserializer error naming the offending text.
pub fn deserialize_xml_date<'de, D>(deserializer: D) -> std::result::Result<NullableDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let trimmed = raw.as_deref().map(str::trim).filter(|s| !s.is_empty());
    NullableDate::parse(trimmed).map_err(de::Error::custom)
}

/// Deserializes a JSON date where providers send `""` for "unknown".
///
/// # Errors
///
/// Returns a deserializer error for non-string, non-null values or
/// malformed dates.
pub fn deserialize_blank_date<'de, D>(deserializer: D) -> std::result::Result<NullableDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    NullableDate::parse(raw.as_deref().filter(|s| !s.is_empty())).map_err(de::Error::custom)
}
