//! Human-readable order numbers: `YYMMDD` followed by a 3-digit per-day
//! sequence, e.g. `240615007` for the 7th order placed on 2024-06-15.

use chrono::{DateTime, NaiveDate, Utc};
use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};

use super::OrderError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn for_day(date: NaiveDate, sequence: u32) -> Self {
        Self(format!("{}{:03}", date.format("%y%m%d"), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stream id of the sequence for `date`.
pub fn sequence_id(date: NaiveDate) -> AggregateId {
    AggregateId::derived("order-number", &date.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SequenceEvent {
    NumberAllocated {
        sequence_id: AggregateId,
        date: NaiveDate,
        sequence: u32,
        order_id: AggregateId,
        at: DateTime<Utc>,
    },
}

impl DomainEvent for SequenceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SequenceEvent::NumberAllocated { .. } => "OrderNumberAllocated",
        }
    }
}

/// Per-day counter of placed orders. Allocation goes through the stream's
/// expected version, so two orders can never receive the same number.
#[derive(Debug, Clone, Default)]
pub struct DailyOrderSequence {
    id: Option<AggregateId>,
    version: Version,
    date: Option<NaiveDate>,
    last: u32,
}

impl Aggregate for DailyOrderSequence {
    type Event = SequenceEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "OrderNumberSequence"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            SequenceEvent::NumberAllocated {
                sequence_id,
                date,
                sequence,
                ..
            } => {
                self.id = Some(sequence_id);
                self.date = Some(date);
                self.last = sequence;
            }
        }
    }
}

impl DailyOrderSequence {
    /// The most recently allocated number, if any.
    pub fn last_number(&self) -> Option<OrderNumber> {
        self.date.map(|date| OrderNumber::for_day(date, self.last))
    }

    pub fn allocate(
        &self,
        date: NaiveDate,
        order_id: AggregateId,
        at: DateTime<Utc>,
    ) -> Result<Vec<SequenceEvent>, OrderError> {
        Ok(vec![SequenceEvent::NumberAllocated {
            sequence_id: sequence_id(date),
            date,
            sequence: self.last + 1,
            order_id,
            at,
        }])
    }
}
