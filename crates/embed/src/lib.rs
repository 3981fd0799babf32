//! Text embedding backends for the semantic turn path.
//!
//! The `Embedder` trait is the opaque `embed(text) -> vector` capability the
//! decision engine builds on; `OnnxEmbedder` is the production backend.

mod onnx;

pub use onnx::OnnxEmbedder;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    #[error("tokenization failed: {0}")]
    Tokenize(String),
    #[error("inference failed: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, EmbedError>;

/// Text-to-vector capability.
///
/// Implementations must be deterministic for identical input and return
/// unit-length vectors of a fixed dimensionality, so callers can use a
/// plain dot product as cosine similarity.
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Factory for constructing an embedder.
///
/// The decision engine depends on this abstraction rather than a concrete
/// backend, which keeps construction lazy and lets tests inject failing or
/// counting doubles.
pub trait EmbedderLoader: Send + Sync {
    fn name(&self) -> &str;
    fn load(&self) -> Result<Box<dyn Embedder>>;
}

/// Resolve the embedding model directory.
///
/// `PALAVER_MODEL_DIR` overrides; otherwise a fixed location under the user
/// data dir. The directory must contain `model.onnx` and `tokenizer.json`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PALAVER_MODEL_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("palaver")
        .join("models")
        .join("paraphrase-minilm-l12-v2")
}

/// Loader for the ONNX sentence-embedding backend.
pub struct OnnxEmbedderLoader {
    model_dir: PathBuf,
}

impl OnnxEmbedderLoader {
    pub fn new(model_dir: PathBuf) -> Self {
        Self { model_dir }
    }
}

impl EmbedderLoader for OnnxEmbedderLoader {
    fn name(&self) -> &str {
        "onnx-minilm"
    }

    fn load(&self) -> Result<Box<dyn Embedder>> {
        let embedder = OnnxEmbedder::load(&self.model_dir)?;
        Ok(Box::new(embedder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_dir_env_override() {
        std::env::set_var("PALAVER_MODEL_DIR", "/tmp/palaver-test-model");
        assert_eq!(
            default_model_dir(),
            PathBuf::from("/tmp/palaver-test-model")
        );
        std::env::remove_var("PALAVER_MODEL_DIR");
    }
}
