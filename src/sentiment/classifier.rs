// ONNX sentiment classifier
//
// Tokenize with a HuggingFace tokenizer, run the text-classification model
// through onnxruntime, softmax the logits and return the top-k labels. The
// session lives behind a mutex because onnxruntime inference needs exclusive
// access.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use log::{debug, info};
use ndarray::Array2;
use ort::session::Session;
use tokenizers::Tokenizer;

use super::{Classify, Sentiment};
use crate::error::{PipelineError, PipelineResult};

pub struct SentimentClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    top_k: usize,
}

impl SentimentClassifier {
    pub fn new(
        model_path: &Path,
        tokenizer_path: &Path,
        labels: Vec<String>,
        top_k: usize,
    ) -> PipelineResult<Self> {
        Self::try_new(model_path, tokenizer_path, labels, top_k)
            .map_err(|e| PipelineError::ModelLoad(e.to_string()))
    }

    fn try_new(
        model_path: &Path,
        tokenizer_path: &Path,
        labels: Vec<String>,
        top_k: usize,
    ) -> Result<Self> {
        info!("Loading sentiment model from {:?}", model_path);

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("failed to load tokenizer: {}", e))?;

        if labels.is_empty() {
            return Err(anyhow!("sentiment label set is empty"));
        }
        let top_k = top_k.clamp(1, labels.len());

        info!("Sentiment model ready ({} labels)", labels.len());
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
            top_k,
        })
    }

    fn infer(&self, text: &str) -> PipelineResult<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::Classification(format!("tokenization failed: {}", e)))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let seq_len = ids.len();
        debug!("Classifying {} tokens", seq_len);

        let input_ids = Array2::from_shape_vec((1, seq_len), ids)
            .map_err(|e| PipelineError::Classification(format!("bad input shape: {}", e)))?;
        let attention_mask = Array2::from_shape_vec((1, seq_len), mask)
            .map_err(|e| PipelineError::Classification(format!("bad input shape: {}", e)))?;

        let ids_value = ort::value::Value::from_array(input_ids)
            .map_err(|e| PipelineError::Classification(format!("input tensor failed: {}", e)))?;
        let mask_value = ort::value::Value::from_array(attention_mask)
            .map_err(|e| PipelineError::Classification(format!("input tensor failed: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PipelineError::Classification("classifier lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs!(
                "input_ids" => ids_value,
                "attention_mask" => mask_value
            ))
            .map_err(|e| PipelineError::Classification(format!("inference failed: {}", e)))?;

        let (_, logits) = outputs["logits"]
            .try_extract_tensor::<f32>()
            .map_err(|e| PipelineError::Classification(format!("failed to extract logits: {}", e)))?;

        // batch size is 1, the first `labels.len()` values are the class logits
        let n = self.labels.len().min(logits.len());
        if n == 0 {
            return Err(PipelineError::Classification(
                "model returned no logits".to_string(),
            ));
        }
        Ok(logits[..n].to_vec())
    }
}

impl Classify for SentimentClassifier {
    fn classify(&self, text: &str) -> PipelineResult<Vec<Sentiment>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::Classification(
                "cannot classify empty text".to_string(),
            ));
        }

        let logits = self.infer(text)?;
        let probs = softmax(&logits);
        Ok(rank_labels(&probs, &self.labels, self.top_k))
    }
}

/// Numerically stable softmax.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

/// Pair probabilities with labels and keep the top-k, best first.
pub(crate) fn rank_labels(probs: &[f32], labels: &[String], top_k: usize) -> Vec<Sentiment> {
    let mut ranked: Vec<Sentiment> = labels
        .iter()
        .zip(probs.iter())
        .map(|(label, &score)| Sentiment {
            label: label.clone(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_k.max(1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn test_rank_labels_orders_and_truncates() {
        let labels = vec!["NEGATIVE".to_string(), "POSITIVE".to_string()];
        let ranked = rank_labels(&[0.2, 0.8], &labels, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "POSITIVE");
        assert!((ranked[0].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_rank_labels_top_k_at_least_one() {
        let labels = vec!["NEGATIVE".to_string(), "POSITIVE".to_string()];
        let ranked = rank_labels(&[0.6, 0.4], &labels, 0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "NEGATIVE");
    }
}
