//! Projection processor for feeding events to projections.

use std::sync::Arc;
use std::time::Duration;

use event_store::{EventEnvelope, EventStore};
use tokio::sync::{Mutex, watch};

use crate::Result;
use crate::projection::Projection;

const DEFAULT_BATCH_SIZE: usize = 500;

/// Reads the global event log and delivers each event to the registered
/// projections that have not seen it yet.
///
/// A projection whose handler fails is skipped for the rest of the pass and
/// picks up from the failed event on the next one. Other projections keep
/// going. Passes never overlap, so the background loop and on-demand
/// catch-ups can share one processor.
pub struct ProjectionProcessor<S: EventStore> {
    store: S,
    projections: Vec<Arc<dyn Projection>>,
    batch_size: usize,
    pass: Mutex<()>,
}

impl<S: EventStore> ProjectionProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            projections: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            pass: Mutex::new(()),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn register(&mut self, projection: Arc<dyn Projection>) {
        self.projections.push(projection);
    }

    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Delivers every event after each projection's position. Returns the
    /// number of deliveries.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<u64> {
        let _pass = self.pass.lock().await;
        let mut after = match self.lowest_position().await {
            Some(position) => position,
            None => return Ok(0),
        };
        let mut stalled = vec![false; self.projections.len()];
        let mut delivered = 0;

        loop {
            let batch = self.store.read_all(after, self.batch_size).await?;
            for event in &batch {
                delivered += self.deliver(event, &mut stalled).await;
                after = event.position;
            }
            if batch.len() < self.batch_size {
                break;
            }
        }

        if delivered > 0 {
            tracing::debug!(delivered, checkpoint = %after, "catch-up complete");
        }
        Ok(delivered)
    }

    /// Delivers a single event to all registered projections.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn process_event(&self, event: &EventEnvelope) -> u64 {
        let _pass = self.pass.lock().await;
        let mut stalled = vec![false; self.projections.len()];
        self.deliver(event, &mut stalled).await
    }

    /// Polls the log every `interval` until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        tracing::info!(
            projections = self.projections.len(),
            interval_ms = interval.as_millis() as u64,
            "event reactions started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.run_catch_up().await {
                        tracing::error!(error = %err, "event reaction pass failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("event reactions stopped");
    }

    async fn lowest_position(&self) -> Option<event_store::Position> {
        let mut lowest = None;
        for projection in &self.projections {
            let position = projection.position().await;
            lowest = Some(lowest.map_or(position, |l: event_store::Position| l.min(position)));
        }
        lowest
    }

    async fn deliver(&self, event: &EventEnvelope, stalled: &mut [bool]) -> u64 {
        let mut delivered = 0;
        for (projection, stalled) in self.projections.iter().zip(stalled.iter_mut()) {
            if *stalled || projection.position().await >= event.position {
                continue;
            }
            match projection.handle(event).await {
                Ok(()) => {
                    delivered += 1;
                    metrics::counter!("projections_events_processed", "projection" => projection.name())
                        .increment(1);
                }
                Err(err) => {
                    *stalled = true;
                    metrics::counter!("projection_failures_total", "projection" => projection.name())
                        .increment(1);
                    tracing::warn!(
                        projection = projection.name(),
                        position = %event.position,
                        event_type = %event.event_type,
                        error = %err,
                        "projection failed; will retry from this event"
                    );
                }
            }
        }
        delivered
    }
}
