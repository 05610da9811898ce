use flowernx::{config, labels, model, observability, server};
use std::sync::Arc;
use tokio::net::TcpListener;

const CONFIG_ENV: &str = "FLOWERNX_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Init
    observability::init_tracing();
    let metrics_handle = observability::init_metrics()?;
    model::loader::init_ort()?;

    // 2. Load Config
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.yaml".to_string());
    let config = config::AppConfig::load(&config_path)?;

    // 3. Load the model and the label table, then cross-check them
    let classifier =
        model::OnnxClassifier::from_file(&config.model.path, config.model.intra_threads)?;
    tracing::info!(input = classifier.input_name(), "classifier ready");

    let provider = labels::provider::from_config(&config.labels)?;
    let state = server::types::AppState::initialize(
        Arc::new(classifier),
        provider.as_ref(),
        config.labels.expected_count,
        config.preprocessing,
    )
    .await?;

    // 4. Create Router
    let app =
        server::routes::create_router(state, metrics_handle, config.server.max_upload_bytes);

    // 5. Bind & Serve
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
