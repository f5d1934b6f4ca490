//! TheTVDB API client module.
//!
//! Talks to the legacy TheTVDB XML API. The XML mirror is resolved from
//! the server's mirror list unless set explicitly. TheTVDB has no season
//! resource, so seasons are derived from the episode list.

mod client;
pub(crate) mod xml;

#[allow(clippy::module_name_repetitions)]
pub use client::{TheTvdbClient, TheTvdbClientBuilder};
