//! TVMaze API client module.
//!
//! Talks to the public TVMaze JSON API. Shows, seasons and episodes are
//! decoded into wire types and converted into the provider-neutral model.

mod client;
mod wire;

#[allow(clippy::module_name_repetitions)]
pub use client::{TvMazeClient, TvMazeClientBuilder};
