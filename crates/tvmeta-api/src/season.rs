//! Season and episode resolution.
//!
//! Season state is never stored; it is recomputed from the premiere and
//! end dates against the probe time on every call.
//!
//! Seasons are expected in ascending number order, as providers deliver
//! them. Nothing here sorts: with an unordered list the "current" season
//! is whichever non-future season appears last.

use chrono::{DateTime, Utc};

use crate::error::{NotFound, Result};
use crate::model::{Episode, Season, Show};

/// Where a season sits relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonState {
    /// Premiere is unknown or after the probe time.
    Future,
    /// The probe time lies strictly inside the premiere/end window.
    Active,
    /// Premiered, and not inside a known window.
    Ended,
}

/// Whether a season has not premiered by `now`.
///
/// A season without a premiere date counts as future: providers list
/// ordered but unscheduled seasons without dates.
#[must_use]
pub fn is_future(season: &Season, now: DateTime<Utc>) -> bool {
    season.premiere.instant().is_none_or(|premiere| premiere > now)
}

/// Whether `date` falls strictly between premiere and end.
///
/// Both dates must be present. A season whose premiere equals its end
/// (single-day specials) never matches.
#[must_use]
pub fn is_active(season: &Season, date: DateTime<Utc>) -> bool {
    match (season.premiere.instant(), season.end.instant()) {
        (Some(premiere), Some(end)) => premiere < date && date < end,
        _ => false,
    }
}

/// Classifies a season at `now`.
#[must_use]
pub fn season_state(season: &Season, now: DateTime<Utc>) -> SeasonState {
    if is_future(season, now) {
        SeasonState::Future
    } else if is_active(season, now) {
        SeasonState::Active
    } else {
        SeasonState::Ended
    }
}

/// First season, in list order, whose window contains `date`.
///
/// # Errors
///
/// Returns `NotFound::ActiveSeason` when no window contains `date`.
pub fn active_season(seasons: &[Season], date: DateTime<Utc>) -> Result<&Season> {
    seasons
        .iter()
        .find(|season| is_active(season, date))
        .ok_or_else(|| NotFound::ActiveSeason.into())
}

/// Last season in list order that is not future at `now`.
///
/// # Errors
///
/// Returns `NotFound::CurrentSeason` when the list is empty or every
/// season is future.
pub fn current_season(seasons: &[Season], now: DateTime<Utc>) -> Result<&Season> {
    seasons
        .iter()
        .rev()
        .find(|season| !is_future(season, now))
        .ok_or_else(|| NotFound::CurrentSeason.into())
}

/// Earliest episode airing strictly after `now`.
///
/// Episodes without an air date are skipped. Ties on the air date are
/// broken by season, then episode number.
#[must_use]
pub fn next_episode(episodes: &[Episode], now: DateTime<Utc>) -> Option<&Episode> {
    episodes
        .iter()
        .filter(|episode| {
            episode
                .air_stamp
                .or_else(|| episode.air_date.instant())
                .is_some_and(|aired| aired > now)
        })
        .min_by_key(|episode| {
            (
                episode.air_stamp.or_else(|| episode.air_date.instant()),
                episode.season,
                episode.number,
            )
        })
}

impl Season {
    /// See [`is_future`].
    #[must_use]
    pub fn is_future(&self, now: DateTime<Utc>) -> bool {
        is_future(self, now)
    }

    /// See [`season_state`].
    #[must_use]
    pub fn state(&self, now: DateTime<Utc>) -> SeasonState {
        season_state(self, now)
    }
}

impl Show {
    /// The season whose window contains `date`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::ActiveSeason` when no season matches.
    pub fn active_season(&self, date: DateTime<Utc>) -> Result<&Season> {
        active_season(&self.seasons, date)
    }

    /// The most recent season that has premiered, as of now.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::CurrentSeason` when no season has premiered.
    pub fn current_season(&self) -> Result<&Season> {
        current_season(&self.seasons, Utc::now())
    }

    /// The most recent season that has premiered by `now`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound::CurrentSeason` when no season has premiered.
    pub fn current_season_at(&self, now: DateTime<Utc>) -> Result<&Season> {
        current_season(&self.seasons, now)
    }
}
