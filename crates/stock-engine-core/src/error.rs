use chrono::NaiveDate;
use thiserror::Error;

/// A malformed price series. These should never occur when the upstream
/// provider is well-behaved, but they are checked explicitly so a bad feed
/// fails loudly instead of producing a misleading snapshot.
#[derive(Debug, Error)]
pub enum DataQualityError {
    #[error("{symbol}: bar dates not strictly increasing at {date}")]
    OutOfOrderDates { symbol: String, date: NaiveDate },

    #[error("{symbol}: non-positive close on {date}")]
    NonPositiveClose { symbol: String, date: NaiveDate },

    #[error("{symbol}: low above high on {date}")]
    InvertedRange { symbol: String, date: NaiveDate },
}
