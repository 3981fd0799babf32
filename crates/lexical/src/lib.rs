//! Rule-based turn classification.
//!
//! Pure heuristics over the normalized fragment text: no model, no state,
//! no failure mode. This is the fallback path when the semantic backend is
//! unavailable, and the tie-breaker when it is unsure.

use palaver_turn::{TurnClassifier, TurnStatus};

/// Trigger substrings that always signal an interruption, matched
/// case-insensitively against the normalized fragment.
pub const INTERRUPT_WORDS: &[&str] = &[
    "stop",
    "wait",
    "pause",
    "hold on",
    "silence",
    "enough",
    "stop talking",
];

/// Conjunctions that open a dangling clause when the fragment is short.
const CLAUSE_STARTERS: &[&str] = &[
    "and", "but", "so", "or", "if", "when", "because", "while", "as",
];

/// Prepositions that rarely end a finished sentence.
const TRAILING_PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "to", "with", "for", "about", "from", "by", "of",
];

#[derive(Debug, Clone, Copy)]
pub struct LexicalConfig {
    /// Fragments with fewer words than this are treated as unfinished.
    pub min_words: usize,
    /// Word-count ceiling for the clause-starter rule.
    pub starter_max_words: usize,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            min_words: 4,
            starter_max_words: 6,
        }
    }
}

/// Deterministic rule-based classifier.
///
/// Rules apply in strict priority order; the ordering is load-bearing.
/// Interrupt detection must dominate punctuation, and punctuation must
/// dominate the length heuristics, so that a short "Stop." still reads as
/// an interruption rather than a completed sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalClassifier {
    config: LexicalConfig,
}

impl LexicalClassifier {
    pub fn new(config: LexicalConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, text: &str) -> TurnStatus {
        let normalized = text.trim().to_lowercase();

        if INTERRUPT_WORDS.iter().any(|w| normalized.contains(w)) {
            return TurnStatus::Interrupt;
        }

        if normalized.ends_with(['.', '!', '?']) {
            return TurnStatus::Complete;
        }

        let words: Vec<&str> = normalized.split_whitespace().collect();

        if words.len() < self.config.min_words {
            return TurnStatus::Continue;
        }

        if let Some(first) = words.first() {
            if CLAUSE_STARTERS.contains(first) && words.len() < self.config.starter_max_words {
                return TurnStatus::Continue;
            }
        }

        if let Some(last) = words.last() {
            if TRAILING_PREPOSITIONS.contains(last) {
                return TurnStatus::Continue;
            }
        }

        TurnStatus::Complete
    }
}

impl TurnClassifier for LexicalClassifier {
    fn name(&self) -> &'static str {
        "lexical-rules"
    }

    fn classify(&self, text: &str) -> TurnStatus {
        LexicalClassifier::classify(self, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> TurnStatus {
        LexicalClassifier::default().classify(text)
    }

    #[test]
    fn test_interrupt_words() {
        assert_eq!(classify("please stop now"), TurnStatus::Interrupt);
        assert_eq!(classify("WAIT"), TurnStatus::Interrupt);
        assert_eq!(classify("okay hold on a second"), TurnStatus::Interrupt);
        assert_eq!(classify("that's enough"), TurnStatus::Interrupt);
    }

    #[test]
    fn test_interrupt_dominates_punctuation() {
        // "Stop." must not fall through to the terminal-punctuation rule.
        assert_eq!(classify("Stop."), TurnStatus::Interrupt);
        assert_eq!(classify("Wait!"), TurnStatus::Interrupt);
    }

    #[test]
    fn test_terminal_punctuation() {
        assert_eq!(classify("Could you explain it?"), TurnStatus::Complete);
        assert_eq!(classify("I agree."), TurnStatus::Complete);
        assert_eq!(classify("That's great!"), TurnStatus::Complete);
    }

    #[test]
    fn test_punctuation_dominates_length() {
        // Two words, but terminal punctuation wins over the short-fragment rule.
        assert_eq!(classify("Sounds good."), TurnStatus::Complete);
    }

    #[test]
    fn test_short_fragment_continues() {
        assert_eq!(classify("So what I"), TurnStatus::Continue);
        assert_eq!(classify("the thing"), TurnStatus::Continue);
        assert_eq!(classify(""), TurnStatus::Continue);
        assert_eq!(classify("   "), TurnStatus::Continue);
    }

    #[test]
    fn test_clause_starter_continues() {
        // Four words clears the short-fragment rule but starts with a conjunction.
        assert_eq!(classify("because the main thing"), TurnStatus::Continue);
        assert_eq!(classify("and then we could"), TurnStatus::Continue);
    }

    #[test]
    fn test_clause_starter_bounded() {
        // Long enough that the starter rule no longer applies.
        assert_eq!(
            classify("because the main thing here is already decided"),
            TurnStatus::Complete
        );
    }

    #[test]
    fn test_trailing_preposition_continues() {
        assert_eq!(classify("we should talk about"), TurnStatus::Continue);
        assert_eq!(
            classify("I was hoping you could tell me about"),
            TurnStatus::Continue
        );
    }

    #[test]
    fn test_default_complete() {
        assert_eq!(
            classify("I think that is a great idea"),
            TurnStatus::Complete
        );
    }

    #[test]
    fn test_pure_function() {
        let input = "tell me more please";
        let first = classify(input);
        for _ in 0..10 {
            assert_eq!(classify(input), first);
        }
    }
}
