//! Content operations layered over the affirmation/track stores.

use crate::{ports::TrackStore, Result};

/// Outcome of deleting a track by user-supplied id text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteTrackOutcome {
    BadFormat,
    NotFound,
    Deleted,
}

/// Parse `raw_id` and delete the matching track.
///
/// The store is not touched at all when the id is not a number.
pub async fn delete_track(store: &dyn TrackStore, raw_id: &str) -> Result<DeleteTrackOutcome> {
    let Ok(id) = raw_id.trim().parse::<i64>() else {
        return Ok(DeleteTrackOutcome::BadFormat);
    };

    if !store.exists(id).await? {
        return Ok(DeleteTrackOutcome::NotFound);
    }

    store.delete(id).await?;
    Ok(DeleteTrackOutcome::Deleted)
}

/// Metadata fallback for audio without performer/title tags.
pub const UNKNOWN_TAG: &str = "Unknown";
