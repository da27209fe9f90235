//! Caller-supplied progress reporting for training and index builds
//!
//! Training and bulk builds never write to shared log buffers. Callers pass
//! a [`BuildReporter`] and decide what to do with each [`BuildEvent`].

use tracing::{info, warn};

/// Event emitted during training or index construction
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    TrainingStarted { documents: usize },
    VocabularyFixed { kept: usize, discarded: usize },
    EntryFailed { key: String, reason: String },
    IndexBuilt { indexed: usize, skipped: usize },
}

/// Receives build/training events
pub trait BuildReporter {
    fn report(&mut self, event: &BuildEvent);
}

impl<F: FnMut(&BuildEvent)> BuildReporter for F {
    fn report(&mut self, event: &BuildEvent) {
        self(event)
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl BuildReporter for NoopReporter {
    fn report(&mut self, _event: &BuildEvent) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl BuildReporter for TracingReporter {
    fn report(&mut self, event: &BuildEvent) {
        match event {
            BuildEvent::TrainingStarted { documents } => {
                info!(documents, "Training encoder vocabulary")
            }
            BuildEvent::VocabularyFixed { kept, discarded } => {
                info!(kept, discarded, "Encoder vocabulary fixed")
            }
            BuildEvent::EntryFailed { key, reason } => {
                warn!(key = %key, reason = %reason, "Index entry failed to encode")
            }
            BuildEvent::IndexBuilt { indexed, skipped } => {
                info!(indexed, skipped, "Vector index built")
            }
        }
    }
}

/// Keeps every event, in order
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub events: Vec<BuildEvent>,
}

impl BuildReporter for CollectingReporter {
    fn report(&mut self, event: &BuildEvent) {
        self.events.push(event.clone());
    }
}
