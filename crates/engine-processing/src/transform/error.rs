use model::{geo::LocatorError, records::enriched::EnrichedRecord};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Station {
    Receiver,
    Sender,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Station::Receiver => f.write_str("receiver"),
            Station::Sender => f.write_str("sender"),
        }
    }
}

/// A report that could not be fully converted.
///
/// Only [`ConvertError::Locator`] carries a usable record: every field except
/// the geometry involving the bad locator was filled in.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("flow start {0} is outside the storable time range")]
    Timestamp(i64),

    #[error("frequency {0} Hz does not fit the frequency column")]
    Frequency(i64),

    #[error("invalid {side} locator '{locator}': {source}")]
    Locator {
        side: Station,
        locator: String,
        #[source]
        source: LocatorError,
        partial: Box<EnrichedRecord>,
    },
}

impl ConvertError {
    /// The partially converted record, when there is one.
    pub fn into_partial(self) -> Option<EnrichedRecord> {
        match self {
            ConvertError::Locator { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}
