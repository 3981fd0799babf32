//! Curated reference utterances and their precomputed embeddings.
//!
//! Two fixed exemplar sets anchor the semantic path: phrases that read as
//! finished turns and phrases that trail off mid-clause. Embeddings are
//! computed once per model load and never per request.

use palaver_embed::{Embedder, Result};

/// Exemplars of finished turns: short questions and statements.
pub const COMPLETE_EXAMPLES: &[&str] = &[
    "What time is it?",
    "I agree.",
    "Let's move on.",
    "That's fine.",
    "I need your help.",
    "Tell me more about that.",
    "Could you explain it?",
    "How are you doing?",
    "And if you were a human, what then do you prefer?",
    "Are you there?",
    "Hello?",
    "Can you help me understand?",
];

/// Exemplars of unfinished turns: dangling clauses.
pub const INCOMPLETE_EXAMPLES: &[&str] = &[
    "So what I was thinking is",
    "When you try to",
    "The reason I said that is",
    "If we could just",
    "And then I would",
    "Because the problem is",
    "And give me",
    "But I need to",
    "So if you could",
    "And tell me about",
    "Could you please give me",
    "I want you to explain",
    "When you consider the",
    "As I was saying about the",
];

/// Exemplar phrases of one class, paired with their embeddings.
///
/// Immutable after construction. Non-empty whenever the semantic backend
/// reports ready.
pub struct ReferenceSet {
    label: &'static str,
    phrases: Vec<&'static str>,
    embeddings: Vec<Vec<f32>>,
}

impl ReferenceSet {
    /// Embed every phrase exactly once. Fails if the embedder fails on any
    /// phrase; a partially embedded set is never returned.
    pub fn build(
        label: &'static str,
        phrases: &[&'static str],
        embedder: &dyn Embedder,
    ) -> Result<Self> {
        let mut embeddings = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            embeddings.push(embedder.embed(phrase)?);
        }
        Ok(Self {
            label,
            phrases: phrases.to_vec(),
            embeddings,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Max cosine similarity between `vector` and the set.
    ///
    /// Embeddings are unit-length by construction, so the dot product is
    /// the cosine similarity.
    pub fn max_similarity(&self, vector: &[f32]) -> f32 {
        self.embeddings
            .iter()
            .map(|e| dot(e, vector))
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Build both reference sets from the curated exemplar lists.
pub fn build_reference_sets(embedder: &dyn Embedder) -> Result<(ReferenceSet, ReferenceSet)> {
    let complete = ReferenceSet::build("complete", COMPLETE_EXAMPLES, embedder)?;
    let incomplete = ReferenceSet::build("incomplete", INCOMPLETE_EXAMPLES, embedder)?;
    Ok((complete, incomplete))
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_embed::{EmbedError, Embedder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder double that counts invocations.
    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Embedder for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }

        fn dim(&self) -> usize {
            3
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Unit vector along an axis picked by text length.
            let mut v = vec![0.0f32; 3];
            v[text.len() % 3] = 1.0;
            Ok(v)
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn name(&self) -> &str {
            "failing"
        }

        fn dim(&self) -> usize {
            3
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(EmbedError::Inference("boom".to_string()))
        }
    }

    #[test]
    fn test_build_embeds_each_phrase_once() {
        let embedder = CountingEmbedder::new();
        let (complete, incomplete) = build_reference_sets(&embedder).unwrap();

        assert_eq!(complete.len(), COMPLETE_EXAMPLES.len());
        assert_eq!(incomplete.len(), INCOMPLETE_EXAMPLES.len());
        assert_eq!(
            embedder.calls.load(Ordering::SeqCst),
            COMPLETE_EXAMPLES.len() + INCOMPLETE_EXAMPLES.len()
        );
    }

    #[test]
    fn test_build_fails_without_partial_set() {
        let result = ReferenceSet::build("complete", COMPLETE_EXAMPLES, &FailingEmbedder);
        assert!(result.is_err());
    }

    #[test]
    fn test_max_similarity_picks_best_match() {
        let embedder = CountingEmbedder::new();
        let set = ReferenceSet::build("complete", &["a", "ab", "abc"], &embedder).unwrap();

        // "a" embeds to axis 1, "ab" to axis 2, "abc" to axis 0.
        let probe = vec![0.0, 1.0, 0.0];
        assert!((set.max_similarity(&probe) - 1.0).abs() < 1e-6);

        let orthogonal_ish = vec![0.2, 0.5, 0.3];
        assert!((set.max_similarity(&orthogonal_ish) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_exemplar_sets_non_empty() {
        assert!(!COMPLETE_EXAMPLES.is_empty());
        assert!(!INCOMPLETE_EXAMPLES.is_empty());
    }
}
