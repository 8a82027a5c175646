//! Append-only event store.
//!
//! Every aggregate (cart, order, product, order-number sequence) is a stream of
//! events addressed by its [`AggregateId`]. Streams are written with an expected
//! version so concurrent writers get a [`EventStoreError::ConcurrencyConflict`]
//! instead of silently overwriting each other. Every stored event also gets a
//! store-wide position, which the reaction processor uses as its checkpoint.

pub mod error;
pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventId, Position, Version};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use store::{AppendOptions, EventStore, EventStoreExt};
