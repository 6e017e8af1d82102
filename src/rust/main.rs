use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use silentaid::emotion::parse_alias;
use silentaid::{
    router, serve, AppState, BuiltinModel, EmotionAnalyzer, EmotionCategory, EmotionMappingTable,
    EmotionModel, EmotionReducer, ModelManager, RuntimeConfig, ScoreClassifier, ScoreFunction,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "SILENTAID_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "SILENTAID_PORT", default_value_t = 5000)]
    port: u16,

    /// Directory with model.onnx, tokenizer.json and config.json; the
    /// built-in model is used when omitted
    #[arg(long, env = "SILENTAID_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Token limit for a custom model
    #[arg(long, env = "SILENTAID_MAX_SEQUENCE_LENGTH")]
    max_sequence_length: Option<usize>,

    /// Deadline for one classifier call, in milliseconds
    #[arg(long, env = "SILENTAID_CLASSIFY_TIMEOUT_MS", default_value_t = 5000)]
    classify_timeout_ms: u64,

    /// How logits become scores: softmax or sigmoid
    #[arg(long, env = "SILENTAID_SCORE_FUNCTION", default_value = "softmax")]
    score_function: ScoreFunction,

    /// ONNX Runtime intra-op threads (0 lets the runtime decide)
    #[arg(long, env = "SILENTAID_INTRA_THREADS", default_value_t = 0)]
    intra_threads: usize,

    /// Extra label mapping, e.g. --label-alias love=Happy (repeatable)
    #[arg(long = "label-alias", value_parser = parse_alias)]
    label_aliases: Vec<(String, EmotionCategory)>,

    /// Force a fresh download of the built-in model files
    #[arg(short, long)]
    fresh: bool,

    /// Never download; run without a model if it is not already cached
    #[arg(long, env = "SILENTAID_OFFLINE")]
    offline: bool,
}

async fn ensure_model_downloaded(manager: &ModelManager, model: BuiltinModel, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        info!("Fresh download requested - removing any existing model files...");
        manager.remove_download(model)?;
    }
    manager.ensure_model_downloaded(model).await?;
    Ok(())
}

async fn load_classifier(args: &Args) -> anyhow::Result<EmotionModel> {
    let runtime_config = RuntimeConfig {
        intra_threads: args.intra_threads,
        ..RuntimeConfig::default()
    };
    let builder = EmotionModel::builder()
        .with_runtime_config(runtime_config)
        .with_score_function(args.score_function);

    let builder = match &args.model_dir {
        Some(dir) => {
            info!("Loading custom model from {}", dir.display());
            let dir = dir.clone();
            let max_len = args.max_sequence_length;
            tokio::task::spawn_blocking(move || builder.with_custom_model(dir, max_len)).await??
        }
        None => {
            let manager = ModelManager::new_default().context("creating model cache")?;
            let model = BuiltinModel::EmotionDistilRoberta;
            if !args.offline {
                ensure_model_downloaded(&manager, model, args.fresh).await?;
            }
            tokio::task::spawn_blocking(move || builder.with_managed_model(&manager, model)).await??
        }
    };

    Ok(builder.build()?)
}

fn mapping_table(aliases: &[(String, EmotionCategory)]) -> EmotionMappingTable {
    aliases.iter().fold(EmotionMappingTable::default(), |table, (label, category)| {
        info!("Mapping label '{}' to {}", label, category);
        table.with_alias(label, *category)
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    silentaid::init_logger();
    let args = Args::parse();

    info!("=== Starting SilentAid Backend ===");

    let classifier: Option<Arc<dyn ScoreClassifier>> = match load_classifier(&args).await {
        Ok(model) => {
            info!("Emotion model loaded successfully ({} labels)", model.labels.len());
            Some(Arc::new(model))
        }
        Err(e) => {
            warn!("Error loading emotion model: {:#}", e);
            warn!("Serving without a model; every request gets the neutral fallback");
            None
        }
    };

    let reducer = EmotionReducer::new(Arc::new(mapping_table(&args.label_aliases)));
    let analyzer = EmotionAnalyzer::new(classifier, reducer)
        .with_timeout(Duration::from_millis(args.classify_timeout_ms));
    let app = router(Arc::new(AppState::new(analyzer)));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Emotion analysis ready!");

    serve(listener, app, shutdown_signal()).await?;
    Ok(())
}
