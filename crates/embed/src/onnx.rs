//! ONNX sentence-embedding backend.
//!
//! Runs a MiniLM-class sentence-transformer exported to ONNX: tokenize,
//! forward pass, attention-masked mean pooling over the last hidden state,
//! then L2 normalization so similarity reduces to a dot product.

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::Tokenizer;

use crate::{EmbedError, Embedder, Result};

/// Hidden size of the MiniLM-L12 family.
const EMBEDDING_DIM: usize = 384;

pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    output_name: String,
    wants_token_types: bool,
}

impl OnnxEmbedder {
    /// Load the model from a directory containing `model.onnx` and
    /// `tokenizer.json`.
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self> {
        // Keep ONNX Runtime strictly single-threaded: classification is
        // sequential and OpenMP worker pools only add contention.
        if std::env::var("OMP_NUM_THREADS").is_err() {
            std::env::set_var("OMP_NUM_THREADS", "1");
        }
        if std::env::var("OMP_WAIT_POLICY").is_err() {
            std::env::set_var("OMP_WAIT_POLICY", "PASSIVE");
        }

        let dir = model_dir.as_ref();

        let tokenizer = Tokenizer::from_file(dir.join("tokenizer.json"))
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?;

        let session = Session::builder()
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?
            .with_parallel_execution(false)
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?
            .with_inter_threads(1)
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?
            .commit_from_file(dir.join("model.onnx"))
            .map_err(|e| EmbedError::ModelLoad(e.to_string()))?;

        let wants_token_types = session.inputs().iter().any(|i| i.name() == "token_type_ids");

        let output_name = session
            .outputs()
            .iter()
            .find(|o| o.name() == "last_hidden_state")
            .map(|o| o.name().to_string())
            .or_else(|| session.outputs().first().map(|o| o.name().to_string()))
            .ok_or_else(|| EmbedError::ModelLoad("model has no outputs".to_string()))?;

        tracing::info!(dir = %dir.display(), "embedding model loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            output_name,
            wants_token_types,
        })
    }
}

impl Embedder for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-minilm"
    }

    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbedError::Tokenize(e.to_string()))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let seq_len = ids.len();
        if seq_len == 0 {
            return Err(EmbedError::Tokenize("empty encoding".to_string()));
        }

        let shape = [1i64, seq_len as i64];
        let input_ids =
            Tensor::from_array((shape, ids)).map_err(|e| EmbedError::Inference(e.to_string()))?;
        let attention_mask = Tensor::from_array((shape, mask.clone()))
            .map_err(|e| EmbedError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbedError::Inference("lock poisoned".to_string()))?;

        let outputs = if self.wants_token_types {
            let token_type_ids = Tensor::from_array((shape, vec![0i64; seq_len]))
                .map_err(|e| EmbedError::Inference(e.to_string()))?;
            session
                .run(ort::inputs![
                    "input_ids" => input_ids,
                    "attention_mask" => attention_mask,
                    "token_type_ids" => token_type_ids
                ])
                .map_err(|e| EmbedError::Inference(e.to_string()))?
        } else {
            session
                .run(ort::inputs![
                    "input_ids" => input_ids,
                    "attention_mask" => attention_mask
                ])
                .map_err(|e| EmbedError::Inference(e.to_string()))?
        };

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| EmbedError::Inference("missing model output".to_string()))?;

        let (_shape, hidden) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbedError::Inference(e.to_string()))?;

        if hidden.len() < seq_len * EMBEDDING_DIM {
            return Err(EmbedError::Inference(format!(
                "unexpected output size {} for {} tokens",
                hidden.len(),
                seq_len
            )));
        }

        let mut pooled = mean_pool(hidden, &mask, seq_len, EMBEDDING_DIM);
        l2_normalize(&mut pooled);
        Ok(pooled)
    }
}

/// Attention-masked mean pooling over the token axis.
fn mean_pool(hidden: &[f32], mask: &[i64], seq_len: usize, dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dim];
    let mut count = 0usize;
    for (token, &m) in mask.iter().enumerate().take(seq_len) {
        if m == 0 {
            continue;
        }
        count += 1;
        let row = &hidden[token * dim..(token + 1) * dim];
        for (p, &v) in pooled.iter_mut().zip(row) {
            *p += v;
        }
    }
    if count > 0 {
        let inv = 1.0 / count as f32;
        for p in &mut pooled {
            *p *= inv;
        }
    }
    pooled
}

fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
