//! Two-tier turn decision engine.
//!
//! Tries the semantic similarity path first and falls back to the lexical
//! rules on low confidence or any fault. The semantic backend is loaded
//! lazily, at most once per process: a failed load is sticky and every
//! later request takes the lexical path without retrying.

mod config;

pub use config::DecisionConfig;

use palaver_corpus::{build_reference_sets, ReferenceSet};
use palaver_embed::{Embedder, EmbedderLoader};
use palaver_events::{Diagnostic, DiagnosticSinkRef};
use palaver_lexical::LexicalClassifier;
use palaver_turn::{word_count, TurnStatus};

/// Readiness of the semantic backend.
///
/// `Failed` is terminal for the process lifetime: a failed load is never
/// retried, so one broken environment cannot stall every request on
/// repeated expensive initialization attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelReadiness {
    NotLoaded,
    Ready,
    Failed,
}

/// Loaded semantic state: the embedder plus both reference sets.
///
/// Built once on the first successful `ensure_loaded`; read-only afterwards.
struct SemanticContext {
    embedder: Box<dyn Embedder>,
    complete: ReferenceSet,
    incomplete: ReferenceSet,
}

enum SemanticState {
    NotLoaded,
    Ready(SemanticContext),
    Failed,
}

/// The decision engine. `classify` never fails and always returns one of
/// the three turn states.
pub struct TurnEngine {
    lexical: LexicalClassifier,
    loader: Box<dyn EmbedderLoader>,
    semantic: SemanticState,
    config: DecisionConfig,
    diagnostics: DiagnosticSinkRef,
}

impl TurnEngine {
    pub fn new(
        loader: Box<dyn EmbedderLoader>,
        config: DecisionConfig,
        diagnostics: DiagnosticSinkRef,
    ) -> Self {
        Self {
            lexical: LexicalClassifier::default(),
            loader,
            semantic: SemanticState::NotLoaded,
            config,
            diagnostics,
        }
    }

    pub fn readiness(&self) -> ModelReadiness {
        match self.semantic {
            SemanticState::NotLoaded => ModelReadiness::NotLoaded,
            SemanticState::Ready(_) => ModelReadiness::Ready,
            SemanticState::Failed => ModelReadiness::Failed,
        }
    }

    /// Idempotent lazy load of the semantic backend.
    ///
    /// Returns whether the backend is ready. The load is attempted at most
    /// once per process; on failure a single `info` diagnostic is emitted
    /// and the state sticks at `Failed`.
    pub fn ensure_loaded(&mut self) -> bool {
        match self.semantic {
            SemanticState::Ready(_) => true,
            SemanticState::Failed => false,
            SemanticState::NotLoaded => match self.load_semantic() {
                Ok(ctx) => {
                    self.semantic = SemanticState::Ready(ctx);
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "semantic backend unavailable, lexical rules only");
                    self.diagnostics.emit(Diagnostic::ModelLoadFailed {
                        message: format!("failed to load embedding model: {e}"),
                    });
                    self.semantic = SemanticState::Failed;
                    false
                }
            },
        }
    }

    fn load_semantic(&self) -> palaver_embed::Result<SemanticContext> {
        let embedder = self.loader.load()?;
        let (complete, incomplete) = build_reference_sets(embedder.as_ref())?;
        tracing::info!(
            model = embedder.name(),
            complete = complete.len(),
            incomplete = incomplete.len(),
            "semantic backend ready"
        );
        Ok(SemanticContext {
            embedder,
            complete,
            incomplete,
        })
    }

    /// Classify one fragment.
    ///
    /// Semantic path when the backend is ready, lexical path otherwise.
    /// Any embedding fault degrades to the lexical result for this one
    /// fragment; the backend stays ready for the next call.
    pub fn classify(&mut self, text: &str) -> TurnStatus {
        if !self.ensure_loaded() {
            return self.lexical.classify(text);
        }

        let ctx = match &self.semantic {
            SemanticState::Ready(ctx) => ctx,
            // ensure_loaded returned true, so the state is Ready.
            _ => return self.lexical.classify(text),
        };

        let vector = match ctx.embedder.embed(text) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, falling back to lexical rules");
                self.diagnostics.emit(Diagnostic::ClassifyError {
                    message: format!("semantic classification failed: {e}"),
                });
                return self.lexical.classify(text);
            }
        };

        let sim_complete = ctx.complete.max_similarity(&vector);
        let sim_incomplete = ctx.incomplete.max_similarity(&vector);

        self.diagnostics.emit(Diagnostic::SemanticScores {
            sim_complete,
            sim_incomplete,
            text: text.to_string(),
            ts_ms: chrono::Utc::now().timestamp_millis(),
        });
        tracing::debug!(sim_complete, sim_incomplete, "semantic scores");

        let cfg = &self.config;
        if sim_complete > cfg.sim_threshold && sim_complete > sim_incomplete + cfg.sim_margin {
            TurnStatus::Complete
        } else if sim_incomplete > sim_complete || word_count(text) < cfg.min_words {
            TurnStatus::Continue
        } else {
            // Ambiguous middle zone: neither class dominates clearly.
            self.lexical.classify(text)
        }
    }
}
