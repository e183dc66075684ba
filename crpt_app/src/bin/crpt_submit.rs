use std::sync::Arc;

use crpt_app::cli::SubmitArgs;
use crpt_app::config_loader;
use crpt_app::documents;
use crpt_app::shutdown_handler;
use crpt_app::tracing_setup;
use crpt_http::Document;
use crpt_http::DocumentClient;
use crpt_ratelimit::CancellationToken;
use tokio::task::JoinSet;
use tracing::error;
use tracing::info;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = SubmitArgs::from_env();
    let (config, config_err) = config_loader::load_app_config_or_default(&args.config_path);

    let _guard = tracing_setup::init("crpt_submit", &config.logging);

    match config_err {
        None => info!("Loaded config from {}", args.config_path),
        Some(err) => warn!("Failed to load config from {}: {}. Using defaults.", args.config_path, err),
    }

    let cancel = CancellationToken::new();
    shutdown_handler::setup(cancel.clone())?;

    let documents = match &args.documents_path {
        Some(path) => documents::load_documents(path)?,
        None => vec![Document::default()],
    };
    let total = documents.len();

    let client = Arc::new(DocumentClient::new(config.client)?);
    let signature: Arc<str> = Arc::from(args.signature);

    info!(total, "submitting documents");

    let mut tasks = JoinSet::new();
    for (index, document) in documents.into_iter().enumerate() {
        let client = Arc::clone(&client);
        let signature = Arc::clone(&signature);
        let cancel = cancel.clone();
        tasks.spawn(async move { (index, client.submit_with_cancel(&document, &signature, &cancel).await) });
    }

    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        match result {
            Ok(response) => info!(index, status = response.status, body = %response.body, "submission finished"),
            Err(err) if err.is_cancelled() => {
                warn!(index, "submission cancelled before admission");
                failed += 1;
            }
            Err(err) => {
                error!(index, error = %err, "submission failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} submissions did not complete");
    }

    Ok(())
}
