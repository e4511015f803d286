pub mod roberta;

use anyhow::Result;
use candle_core::Device;

pub use roberta::SentimentClassifier;

/// Single best-label prediction from the backing model.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Raw checkpoint label, e.g. `LABEL_2` or `5 stars`.
    pub label: String,
    /// Softmax confidence in [0, 1].
    pub score: f32,
}

/// Seam between the batch workflow and the model so the workflow is testable
/// without weights on disk.
pub trait TextClassifier {
    fn classify(&self, text: &str) -> Result<Classification>;
}

/// CPU unless a CUDA ordinal was requested.
pub fn device(cuda_id: Option<usize>) -> Result<Device> {
    match cuda_id {
        Some(id) => {
            let device = Device::new_cuda(id)?;
            println!("🟦 Sentiment classifier → CUDA:{id}");
            Ok(device)
        }
        None => Ok(Device::Cpu),
    }
}
