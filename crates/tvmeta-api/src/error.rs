//! Error types returned by the library.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TvError>;

/// Errors surfaced to callers.
///
/// Transport and decode failures are kept apart from logical absence so
/// callers can tell "no data" from "malformed data".
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum TvError {
    /// Connection failure, or the provider answered with HTTP status >= 400.
    #[error("{}", transport_message(.status, .message))]
    Transport {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Provider message or connection error description.
        message: String,
    },

    /// The payload did not match the expected shape.
    #[error("failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded (endpoint or field).
        context: String,
        /// Underlying decoder message.
        message: String,
    },

    /// The requested entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// The client could not be constructed.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Logical absence of a requested entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    /// A show search returned no results.
    #[error("no show matches {0:?}")]
    Show(String),
    /// The show has no season with this number.
    #[error("season {0} not found")]
    Season(u32),
    /// The show has no episode with this (season, number) pair.
    #[error("episode S{season:02}E{number:02} not found")]
    Episode {
        /// Season number.
        season: u32,
        /// Episode number within the season.
        number: u32,
    },
    /// No season's premiere/end window contains the probe date.
    #[error("no active season")]
    ActiveSeason,
    /// Every season is future-dated, or the show has none.
    #[error("no current season")]
    CurrentSeason,
}

#[allow(clippy::ref_option)]
fn transport_message(status: &Option<u16>, message: &str) -> String {
    status.map_or_else(
        || format!("request failed: {message}"),
        |code| format!("received error status code ({code}): {message}"),
    )
}

impl TvError {
    /// HTTP status code carried by a transport error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this error is a logical "not found".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_with_status() {
        // Arrange
        let err = TvError::Transport {
            status: Some(404),
            message: String::from("Not Found"),
        };

        // Act & Assert
        assert_eq!(
            err.to_string(),
            "received error status code (404): Not Found"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_transport_display_without_status() {
        // Arrange
        let err = TvError::Transport {
            status: None,
            message: String::from("connection refused"),
        };

        // Act & Assert
        assert_eq!(err.to_string(), "request failed: connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_not_found_converts_and_displays() {
        // Arrange
        let err: TvError = NotFound::Episode {
            season: 3,
            number: 7,
        }
        .into();

        // Act & Assert
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "episode S03E07 not found");
    }
}
