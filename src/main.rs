use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgGroup, Parser, ValueEnum};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod inference;
mod labels;
mod scoring;
mod tabular;
mod web;

use inference::SentimentClassifier;
use labels::LabelMap;
use scoring::score_all;
use tabular::{default_output_path, Table};
use web::AppState;

const DEFAULT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LabelScheme {
    /// LABEL_0/1/2 checkpoints (cardiffnlp and friends)
    ThreeClass,
    /// 1..5 star rating checkpoints
    FiveStar,
}

impl LabelScheme {
    fn map(self) -> LabelMap {
        match self {
            LabelScheme::ThreeClass => LabelMap::three_class(),
            LabelScheme::FiveStar => LabelMap::five_star(),
        }
    }
}

/// Classify text as Positive/Neutral/Negative with a pretrained model.
#[derive(Parser, Debug)]
#[command(name = "sentiscope")]
#[command(about = "Sentiment analysis for single texts and CSV columns")]
#[command(version)]
#[command(group(ArgGroup::new("mode").required(true).args(["text", "file", "serve"])))]
struct Args {
    /// Analyze sentiment of a single text
    #[arg(long)]
    text: Option<String>,

    /// Analyze sentiment for a CSV file (requires --column)
    #[arg(long, requires = "column")]
    file: Option<PathBuf>,

    /// Column name containing the text to analyze
    #[arg(long)]
    column: Option<String>,

    /// Output path for the augmented CSV (defaults to <input>_sentiment.csv)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Serve the interactive web form
    #[arg(long)]
    serve: bool,

    /// Port for --serve
    #[arg(long, default_value = "5730", env = "SENTISCOPE_PORT")]
    port: u16,

    /// Backing model identifier on the Hugging Face hub
    #[arg(long, default_value = DEFAULT_MODEL, env = "SENTISCOPE_MODEL")]
    model: String,

    /// Label vocabulary of the backing model
    #[arg(long, value_enum, default_value = "three-class")]
    labels: LabelScheme,

    /// CUDA device ordinal (CPU when omitted)
    #[arg(long)]
    cuda: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let labels = args.labels.map();

    if let Some(text) = &args.text {
        run_text(&args, labels, text).await
    } else if let Some(path) = &args.file {
        run_file(&args, labels, path).await
    } else {
        run_serve(&args, labels).await
    }
}

async fn load_classifier(args: &Args) -> Result<SentimentClassifier> {
    let device = inference::device(args.cuda)?;
    SentimentClassifier::load(&args.model, device).await
}

async fn run_text(args: &Args, labels: LabelMap, text: &str) -> Result<()> {
    let classifier = load_classifier(args).await?;

    println!("📝 Analyzing: {text}\n");
    let items = vec![text.to_string()];
    let scored = score_all(&classifier, &labels, &items)?;
    let result = &scored[0];

    println!("Sentiment: {}", result.sentiment);
    println!("Confidence: {:.2}%", result.score * 100.0);
    Ok(())
}

async fn run_file(args: &Args, labels: LabelMap, path: &PathBuf) -> Result<()> {
    // Validate the file and column before touching the model so bad input
    // fails without a single classification call.
    println!("📂 Loading CSV from {}...", path.display());
    let mut table = Table::open(path)?;
    let column = args.column.as_deref().unwrap_or_default();
    let texts = table.column(column)?;

    let classifier = load_classifier(args).await?;

    println!("🔄 Analyzing sentiment for {} rows...", table.len());
    let scored = score_all(&classifier, &labels, &texts)?;
    table.append_column(
        "Sentiment",
        scored.iter().map(|s| s.sentiment.to_string()).collect(),
    );

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(path));
    table.write_to(&output)?;
    println!("✅ Results saved to {}", output.display());
    Ok(())
}

async fn run_serve(args: &Args, labels: LabelMap) -> Result<()> {
    let classifier = Arc::new(load_classifier(args).await?);
    let state = AppState {
        classifier,
        labels: Arc::new(labels),
    };

    let app = web::router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    println!("🌐 Listening on http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
