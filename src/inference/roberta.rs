use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::api::tokio::{Api, ApiRepo};
use serde::Deserialize;
use std::{collections::HashMap, fs, path::PathBuf};
use tokenizers::{
    models::bpe::BPE,
    pre_tokenizers::{byte_level::ByteLevel, PreTokenizerWrapper},
    Tokenizer,
};

use super::{Classification, TextClassifier};

/// Fields the candle `BertConfig` does not carry but the classification head
/// needs. Read from the same `config.json`.
#[derive(Debug, Deserialize)]
struct HeadConfig {
    #[serde(default)]
    id2label: Option<HashMap<String, String>>,
}

/// RoBERTa sequence-classification checkpoint, loaded once and reused for
/// every call. Encoder plus the `classifier.dense` / `classifier.out_proj`
/// head that HF sequence-classification exports carry.
pub struct SentimentClassifier {
    model: BertModel,
    head_dense_w: Tensor,
    head_dense_b: Tensor,
    head_out_w: Tensor,
    head_out_b: Tensor,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
    labels: Vec<String>,
}

impl SentimentClassifier {
    /// Resolve the checkpoint through the Hugging Face hub cache and load it
    /// onto `device`.
    pub async fn load(model_id: &str, device: Device) -> Result<Self> {
        let api = Api::new().context("failed to initialize Hugging Face hub client")?;
        let repo = api.model(model_id.to_string());

        println!("📁 Resolving checkpoint {model_id}");
        let config_path = repo
            .get("config.json")
            .await
            .with_context(|| format!("config.json missing for {model_id}"))?;
        let weights = repo
            .get("model.safetensors")
            .await
            .with_context(|| format!("model.safetensors missing for {model_id}"))?;
        let tokenizer = load_tokenizer(&repo).await?;
        tracing::debug!(
            config = %config_path.display(),
            weights = %weights.display(),
            "checkpoint files resolved"
        );

        Self::from_files(config_path, weights, tokenizer, device)
    }

    fn from_files(
        config_path: PathBuf,
        weights: PathBuf,
        mut tokenizer: Tokenizer,
        device: Device,
    ) -> Result<Self> {
        let raw_config = fs::read(&config_path)?;
        let mut config: BertConfig = serde_json::from_slice(&raw_config)?;
        // RoBERTa checkpoints under candle's BERT implementation
        config.type_vocab_size = 1;
        config.layer_norm_eps = 1e-5;

        let head: HeadConfig = serde_json::from_slice(&raw_config)?;
        let labels = label_table(head.id2label);
        let num_labels = labels.len();

        let max_len = config.max_position_embeddings.saturating_sub(2).max(16);

        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow!("Tokenizer truncation config failed: {e}"))?;
        tokenizer.with_padding(None);

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, &device)? };
        let model = BertModel::load(vb.pp("roberta"), &config)?;

        let head_dense_w = vb
            .pp("classifier.dense")
            .get((config.hidden_size, config.hidden_size), "weight")?;
        let head_dense_b = vb.pp("classifier.dense").get(config.hidden_size, "bias")?;
        let head_out_w = vb
            .pp("classifier.out_proj")
            .get((num_labels, config.hidden_size), "weight")?;
        let head_out_b = vb.pp("classifier.out_proj").get(num_labels, "bias")?;

        println!("🚀 Loaded {num_labels}-label classification head");

        Ok(Self {
            model,
            head_dense_w,
            head_dense_b,
            head_out_w,
            head_out_b,
            tokenizer,
            device,
            max_len,
            labels,
        })
    }

    fn forward(&self, text: &str) -> Result<(usize, f32)> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenizer encode error: {e}"))?;
        let mut ids = enc.get_ids().to_vec();
        if ids.len() > self.max_len {
            ids.truncate(self.max_len);
        }
        let seq_len = ids.len();

        let input = Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let mask = Tensor::ones(&[1, seq_len], DType::I64, &self.device)?;
        let token_type_ids = Tensor::zeros(input.dims(), DType::I64, &self.device)?;
        let hidden = self.model.forward(&input, &token_type_ids, Some(&mask))?;
        let cls = hidden.i((0, 0))?;

        let x = cls
            .unsqueeze(0)?
            .matmul(&self.head_dense_w.t()?)?
            .broadcast_add(&self.head_dense_b)?
            .tanh()?;
        let logits = x
            .matmul(&self.head_out_w.t()?)?
            .broadcast_add(&self.head_out_b)?
            .squeeze(0)?;

        let last_dim = logits.dims().len().saturating_sub(1);
        let probs = candle_nn::ops::softmax(&logits, last_dim)?;

        let values = probs.to_vec1::<f32>()?;
        let (idx, conf) = values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| anyhow!("empty logits"))?;

        Ok((idx, *conf))
    }
}

impl TextClassifier for SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        let (idx, score) = self.forward(text)?;
        let label = self
            .labels
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{idx}"));
        Ok(Classification { label, score })
    }
}

/// Ordered raw-label vocabulary from the checkpoint's `id2label`, falling
/// back to the 3-class `LABEL_{i}` scheme when the config omits it.
fn label_table(id2label: Option<HashMap<String, String>>) -> Vec<String> {
    let table = match id2label {
        Some(table) if !table.is_empty() => table,
        _ => return (0..3).map(|i| format!("LABEL_{i}")).collect(),
    };
    let n = table.len();
    (0..n)
        .map(|i| {
            table
                .get(&i.to_string())
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{i}"))
        })
        .collect()
}

/// RoBERTa checkpoints frequently ship no consolidated `tokenizer.json`;
/// rebuild the byte-level BPE tokenizer from `vocab.json` + `merges.txt`.
async fn load_tokenizer(repo: &ApiRepo) -> Result<Tokenizer> {
    if let Ok(path) = repo.get("tokenizer.json").await {
        return Tokenizer::from_file(&path)
            .map_err(|e| anyhow!("Tokenizer load failed ({}): {e}", path.display()));
    }

    let vocab = repo
        .get("vocab.json")
        .await
        .context("neither tokenizer.json nor vocab.json available")?;
    let merges = repo.get("merges.txt").await.context("merges.txt missing")?;

    let bpe = BPE::from_file(
        vocab.to_str().ok_or_else(|| anyhow!("Invalid vocab path"))?,
        merges
            .to_str()
            .ok_or_else(|| anyhow!("Invalid merges path"))?,
    )
    .unk_token("<unk>".to_string())
    .build()
    .map_err(|e| anyhow!("BPE tokenizer build error: {e}"))?;

    let mut tokenizer = Tokenizer::new(bpe);
    tokenizer.with_pre_tokenizer(Some(PreTokenizerWrapper::ByteLevel(ByteLevel::default())));
    Ok(tokenizer)
}
