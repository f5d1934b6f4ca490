//! Cross-provider identifiers with soft, zero-value lookups.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// TVRage key.
pub const TVRAGE: &str = "tvrage";
/// TheTVDB key.
pub const THETVDB: &str = "thetvdb";
/// IMDb key.
pub const IMDB: &str = "imdb";
/// Zap2it key.
pub const ZAP2IT: &str = "zap2it";

/// A remote identifier as the provider sent it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RemoteId {
    /// Numeric identifier (floats with an integral value included).
    Int(i64),
    /// Textual identifier.
    Str(String),
    /// `null`, or a shape no accessor can use.
    #[default]
    Absent,
}

impl From<&Value> for RemoteId {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral_f64))
                .map_or(Self::Absent, Self::Int),
            Value::String(s) => Self::Str(s.clone()),
            _ => Self::Absent,
        }
    }
}

/// Whole-number floats only; `81189.0` is an id, `1.5` is not.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn integral_f64(f: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; 2^63 bounds the range.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then(|| f as i64)
}

/// Remote-system name to identifier.
///
/// Populated once when a provider response is decoded and read-only
/// afterward. Accessors never fail: a missing key or a mismatched shape
/// resolves to `0` or `""`, which callers treat as "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteIds(HashMap<String, RemoteId>);

impl RemoteIds {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an identifier.
    pub fn insert(&mut self, key: impl Into<String>, id: RemoteId) {
        self.0.insert(key.into(), id);
    }

    /// Raw identifier under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RemoteId> {
        self.0.get(key)
    }

    /// Number of keys present (including `Absent` values).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric identifier under `key`, or `0`.
    #[must_use]
    pub fn int(&self, key: &str) -> u64 {
        match self.0.get(key) {
            Some(RemoteId::Int(n)) => u64::try_from(*n).unwrap_or_else(|_| {
                tracing::debug!(key, value = *n, "negative remote id, resolving to 0");
                0
            }),
            Some(RemoteId::Str(s)) => {
                tracing::debug!(key, value = %s, "remote id is not numeric, resolving to 0");
                0
            }
            Some(RemoteId::Absent) | None => 0,
        }
    }

    /// Textual identifier under `key`, or `""`.
    #[must_use]
    pub fn string(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(RemoteId::Str(s)) => s.clone(),
            Some(RemoteId::Int(n)) => {
                tracing::debug!(key, value = *n, "remote id is not a string, resolving to empty");
                String::new()
            }
            Some(RemoteId::Absent) | None => String::new(),
        }
    }
}

impl FromIterator<(String, RemoteId)> for RemoteIds {
    fn from_iter<I: IntoIterator<Item = (String, RemoteId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for RemoteIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let id = RemoteId::from(&value);
                (key, id)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;

    fn ids(json: &str) -> RemoteIds {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_int_resolves_numeric_value() {
        // Arrange
        let map = ids(r#"{"tvrage": 23354, "thetvdb": 110381, "imdb": "tt1486217"}"#);

        // Act & Assert
        assert_eq!(map.int(TVRAGE), 23354);
        assert_eq!(map.int(THETVDB), 110_381);
    }

    #[test]
    fn test_int_accepts_integral_float() {
        // Arrange
        let map = ids(r#"{"tvrage": 23354.0}"#);

        // Act & Assert
        assert_eq!(map.get(TVRAGE), Some(&RemoteId::Int(23354)));
        assert_eq!(map.int(TVRAGE), 23354);
    }

    #[test]
    fn test_int_is_zero_for_absent_string_or_malformed() {
        // Arrange
        let missing = ids(r#"{"imdb": "tt1486217"}"#);
        let null = ids(r#"{"tvrage": null}"#);
        let string = ids(r#"{"tvrage": "23354"}"#);
        let fraction = ids(r#"{"tvrage": 1.5}"#);
        let object = ids(r#"{"tvrage": {"id": 1}}"#);
        let negative = ids(r#"{"tvrage": -4}"#);

        // Act & Assert
        for map in [missing, null, string, fraction, object, negative] {
            assert_eq!(map.int(TVRAGE), 0);
        }
    }

    #[test]
    fn test_string_resolves_text_and_zeroes_mismatch() {
        // Arrange
        let map = ids(r#"{"imdb": "tt1486217", "tvrage": 23354, "thetvdb": null}"#);

        // Act & Assert
        assert_eq!(map.string(IMDB), "tt1486217");
        assert_eq!(map.string(TVRAGE), "");
        assert_eq!(map.string(THETVDB), "");
        assert_eq!(map.string("zap2it"), "");
    }

    #[test]
    fn test_null_map_is_empty() {
        // Arrange & Act
        let map = ids("null");

        // Assert
        assert!(map.is_empty());
        assert_eq!(map.int(TVRAGE), 0);
    }

    #[test]
    fn test_collects_from_pairs() {
        // Arrange
        let pairs = vec![
            (String::from(IMDB), RemoteId::Str(String::from("tt0411008"))),
            (String::from(ZAP2IT), RemoteId::Absent),
        ];

        // Act
        let map: RemoteIds = pairs.into_iter().collect();

        // Assert
        assert_eq!(map.len(), 2);
        assert_eq!(map.string(IMDB), "tt0411008");
    }

    #[test]
    fn test_type_mismatch_is_logged_not_raised() {
        // Arrange
        let map = ids(r#"{"tvrage": "not-a-number"}"#);
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::DEBUG))
            .only()
            .run_with_handle();

        // Act
        let value = with_default(subscriber, || map.int(TVRAGE));

        // Assert
        assert_eq!(value, 0);
        handle.assert_finished();
    }
}
