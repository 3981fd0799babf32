//! Typed diagnostic channel between the decision engine and the transport.
//!
//! The engine reports model-load failures, similarity scores and per-call
//! faults as `Diagnostic` values; the server forwards them onto the wire
//! and tests capture them in memory. A closed enum rather than topic
//! strings, so the engine and the transport cannot drift apart.

use std::sync::{Arc, Mutex};

/// Diagnostic events surfaced by the decision engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Semantic backend failed to load (sticky, emitted once per process).
    ModelLoadFailed { message: String },
    /// Similarity scores for one semantic evaluation, for threshold tuning.
    SemanticScores {
        sim_complete: f32,
        sim_incomplete: f32,
        text: String,
        /// Timestamp in milliseconds since epoch.
        ts_ms: i64,
    },
    /// A single classification fell back after an inference fault.
    ClassifyError { message: String },
}

impl Diagnostic {
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::ModelLoadFailed { .. })
    }

    pub fn is_scores(&self) -> bool {
        matches!(self, Self::SemanticScores { .. })
    }

    pub fn is_classify_error(&self) -> bool {
        matches!(self, Self::ClassifyError { .. })
    }
}

/// Receives diagnostics from the decision engine.
///
/// The engine never writes to the transport directly; this seam lets the
/// server map diagnostics onto wire records and lets tests observe them
/// without any transport at all.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Type alias for a shared diagnostic sink reference.
pub type DiagnosticSinkRef = Arc<dyn DiagnosticSink>;

/// In-memory sink for testing.
///
/// Captures every diagnostic for later inspection.
#[derive(Default)]
pub struct InMemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured diagnostics.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().unwrap().clone()
    }

    /// Captured score diagnostics, in emission order.
    pub fn scores(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.is_scores())
            .cloned()
            .collect()
    }

    /// Number of captured load-failure diagnostics.
    pub fn load_failures(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.is_load_failure())
            .count()
    }

    /// Number of captured per-call fault diagnostics.
    pub fn classify_errors(&self) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.is_classify_error())
            .count()
    }

    /// Clear all captured diagnostics.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl DiagnosticSink for InMemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.events.lock().unwrap().push(diagnostic);
    }
}

/// Sink that discards all diagnostics.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: Diagnostic) {
        // Intentionally empty
    }
}
