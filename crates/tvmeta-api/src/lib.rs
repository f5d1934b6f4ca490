//! Provider-neutral TV metadata library.
//!
//! Normalizes show, season and episode data from TVMaze (JSON) and
//! TheTVDB (XML) into one domain model, and resolves the active, current
//! and next season or episode of a show from its dates.

/// Date-only values that may be explicitly null.
pub mod date;
/// Error types.
pub mod error;
/// HTTP transport shared by the provider clients.
pub mod http;
/// Provider-neutral domain model.
pub mod model;
/// Provider capability trait and shared lookup helpers.
pub mod provider;
/// Loosely typed cross-provider identifiers.
pub mod remote_id;
/// Season and episode resolution over show dates.
pub mod season;
/// TheTVDB XML API client.
pub mod thetvdb;
/// TVMaze JSON API client.
pub mod tvmaze;

pub use date::NullableDate;
pub use error::{NotFound, Result, TvError};
pub use model::{Episode, Image, Network, Season, Show};
pub use provider::{LocalTvProvider, TvProvider};
pub use remote_id::{RemoteId, RemoteIds};
pub use season::SeasonState;
