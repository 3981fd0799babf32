use serde::{Deserialize, Serialize};

/// Turn state of a transcribed utterance fragment.
///
/// This is a closed enumeration: every classification resolves to exactly
/// one of these three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnStatus {
    /// The speaker finished their turn; it is safe to respond.
    Complete,
    /// The speaker is likely to keep talking.
    Continue,
    /// The speaker wants the assistant to stop or yield immediately.
    Interrupt,
}

impl TurnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "COMPLETE",
            Self::Continue => "CONTINUE",
            Self::Interrupt => "INTERRUPT",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("model not loaded")]
    ModelNotLoaded,
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TurnError>;

/// Infallible classification of a text fragment into a turn state.
pub trait TurnClassifier: Send + Sync {
    fn name(&self) -> &'static str;
    fn classify(&self, text: &str) -> TurnStatus;
}

/// Whitespace-split word count, shared by the lexical rules and the
/// decision policy's length gate.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
