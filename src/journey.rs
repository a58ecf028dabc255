use serde::Serialize;

use super::commute;

/// One trip or top-up line from an Oyster card statement.
/// `date` is always held in the canonical `YYYY-MM-DD` form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Journey {
    pub date: String,
    pub start_time: String,
    /// Empty when the card was never touched out.
    pub end_time: String,
    pub journey_action: String,
    pub charge: f64,
    pub credit: f64,
    pub balance: f64,
    pub note: String,
}

impl Journey {
    pub fn is_commute(&self) -> bool {
        commute::is_commute(&self.date, &self.start_time, &self.end_time)
    }
}

/// A journey as read back from the store, keyed by its row id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredJourney {
    pub id: i64,
    #[serde(flatten)]
    pub journey: Journey,
}
