use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::inference::SentimentClassifier;
use crate::labels::LabelMap;

pub mod handlers;
pub mod templates;

use handlers::{analyze, download, index, pick_column};

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<SentimentClassifier>,
    pub labels: Arc<LabelMap>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/columns", post(pick_column))
        .route("/analyze", post(analyze))
        .route("/download", post(download))
}
