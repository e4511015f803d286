use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Form,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SentimentError;
use crate::scoring::score_all;
use crate::tabular::{default_output_path, Table};
use crate::web::{templates, AppState};

type HandlerError = (StatusCode, String);

fn page(name: &str, ctx: &impl Serialize) -> Result<Html<String>, HandlerError> {
    templates::render(name, ctx)
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn index() -> Result<Html<String>, HandlerError> {
    page("index.html", &())
}

#[derive(Serialize)]
struct ColumnsContext {
    filename: String,
    row_count: usize,
    columns: Vec<String>,
    csv_b64: String,
}

/// Multipart CSV upload: parse the header and offer a column picker. The file
/// bytes are carried forward base64-encoded so the flow stays stateless.
pub async fn pick_column(mut multipart: Multipart) -> Result<Html<String>, HandlerError> {
    let mut uploaded: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid multipart payload: {e}"),
        )
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read uploaded file: {e}"),
            )
        })?;
        if !bytes.is_empty() {
            uploaded = Some((filename, bytes.to_vec()));
        }
    }

    let (filename, bytes) = uploaded.ok_or((
        StatusCode::BAD_REQUEST,
        "Please upload a csv file for sentiment analysis".to_string(),
    ))?;

    let table = Table::from_reader(bytes.as_slice())
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    page(
        "columns.html",
        &ColumnsContext {
            filename,
            row_count: table.len(),
            columns: table.headers().to_vec(),
            csv_b64: STANDARD.encode(&bytes),
        },
    )
}

#[derive(Deserialize)]
pub struct AnalyzeForm {
    csv_b64: String,
    filename: String,
    column: String,
}

#[derive(Serialize)]
struct PreviewRow {
    text: String,
    sentiment: String,
}

#[derive(Serialize)]
struct PreviewContext {
    filename: String,
    column: String,
    rows: Vec<PreviewRow>,
    result_b64: String,
    download_name: String,
}

/// Run the batch workflow over the chosen column and render the two-column
/// preview plus a download form for the augmented table.
pub async fn analyze(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> Result<Html<String>, HandlerError> {
    let bytes = STANDARD
        .decode(&form.csv_b64)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid file payload: {e}")))?;
    let mut table = Table::from_reader(bytes.as_slice())
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let texts = table.column(&form.column).map_err(|e| match e {
        err @ SentimentError::ColumnNotFound { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        err => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    })?;

    tracing::info!(rows = texts.len(), column = %form.column, "analyzing upload");
    let scored = score_all(state.classifier.as_ref(), &state.labels, &texts)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;

    let rows = scored
        .iter()
        .map(|s| PreviewRow {
            text: s.text.clone(),
            sentiment: s.sentiment.to_string(),
        })
        .collect();
    table.append_column(
        "Sentiment",
        scored.iter().map(|s| s.sentiment.to_string()).collect(),
    );

    let result = table
        .to_csv_bytes()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let download_name = default_output_path(Path::new(&form.filename))
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sentiment.csv".to_string());

    page(
        "preview.html",
        &PreviewContext {
            filename: form.filename,
            column: form.column,
            rows,
            result_b64: STANDARD.encode(&result),
            download_name,
        },
    )
}

#[derive(Deserialize)]
pub struct DownloadForm {
    csv_b64: String,
    filename: String,
}

pub async fn download(Form(form): Form<DownloadForm>) -> Result<impl IntoResponse, HandlerError> {
    let bytes = STANDARD
        .decode(&form.csv_b64)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid file payload: {e}")))?;
    let disposition = format!("attachment; filename=\"{}\"", form.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
