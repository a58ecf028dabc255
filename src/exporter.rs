use super::error::StoreError;
use super::journey::StoredJourney;
use super::store::Store;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExportOptions {
    /// Keep only journeys that fall in the commute window.
    pub commute_only: bool,
    /// Only the chronologically last journey.
    pub tail: bool,
}

/// Selects journeys latest first. With `tail` the latest journey is picked before the
/// commute filter runs, so `tail` + `commute_only` can come back empty.
pub fn select_journeys(
    store: &Store,
    options: ExportOptions,
) -> Result<Vec<StoredJourney>, StoreError> {
    let limit = options.tail.then_some(1);
    let mut journeys = store.journeys(limit)?;
    if options.commute_only {
        journeys.retain(|stored| stored.journey.is_commute());
    }
    Ok(journeys)
}
