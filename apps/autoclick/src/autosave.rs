//! # Auto-save Debouncer
//!
//! Decides when an edited drawing should be pushed: only after the document
//! has stopped changing for a quiet period, and only if it differs from what
//! was last saved. Comparison is on the parsed document, so reformatting a
//! file does not trigger a save.
//!
//! Time is passed in by the caller.

use autoclick_core::GraphDocument;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    observed: Option<GraphDocument>,
    saved: Option<GraphDocument>,
    changed_at: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            observed: None,
            saved: None,
            changed_at: None,
        }
    }

    /// Record the current document. Returns true when it changed.
    pub fn observe(&mut self, document: GraphDocument, now: Instant) -> bool {
        if self.observed.as_ref() == Some(&document) {
            return false;
        }
        self.observed = Some(document);
        self.changed_at = Some(now);
        true
    }

    /// True once the document has been stable for the quiet period and
    /// differs from the last saved one.
    #[must_use]
    pub fn due(&self, now: Instant) -> bool {
        let (Some(observed), Some(changed_at)) = (&self.observed, self.changed_at) else {
            return false;
        };
        self.saved.as_ref() != Some(observed)
            && now.saturating_duration_since(changed_at) >= self.quiet_period
    }

    /// The document a save should send.
    #[must_use]
    pub fn pending(&self) -> Option<&GraphDocument> {
        self.observed.as_ref()
    }

    /// The observed document is now what the backend holds.
    pub fn mark_saved(&mut self) {
        self.saved.clone_from(&self.observed);
    }
}
