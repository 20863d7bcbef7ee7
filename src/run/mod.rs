//! Command-line run: submit one document several times through a shared client.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{info, warn};

use crate::api::CrptClient;
use crate::config::Config;
use crate::document::{load_document, sample_document, Document};
use crate::error_handling::OutcomeKind;

/// Results of a submission run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Submissions issued
    pub total: usize,
    /// Submissions accepted by the remote service
    pub succeeded: usize,
    /// Submissions that ended in any other outcome
    pub failed: usize,
    /// Identifiers returned for accepted submissions, in completion order
    pub document_ids: Vec<String>,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Submits the configured document `config.requests` times concurrently.
///
/// All submissions share one client, so they are dispatched no faster than
/// `request_limit` per `window_seconds`. Individual failures are logged as
/// warnings and counted; they do not fail the run.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the document cannot be
/// loaded, or the client cannot be initialized.
pub async fn run_submissions(config: Config) -> Result<RunReport> {
    config.validate().context("Invalid configuration")?;

    let document = match &config.document {
        Some(path) => load_document(path).await?,
        None => {
            info!("No document file given, submitting a sample document");
            sample_document()
        }
    };
    let document: Arc<Document> = Arc::new(document);

    let client = CrptClient::from_config(&config).context("Failed to initialize API client")?;
    let signature: Arc<str> = Arc::from(config.signature.as_str());

    info!(
        "Submitting {} {} document(s) to {} ({} per {}s)",
        config.requests,
        document.doc_type(),
        client.base_url(),
        config.request_limit,
        config.window_seconds
    );

    let start_time = std::time::Instant::now();
    let mut tasks = FuturesUnordered::new();
    for _ in 0..config.requests {
        let client = client.clone();
        let document = Arc::clone(&document);
        let signature = Arc::clone(&signature);
        tasks.push(tokio::spawn(async move {
            client.create_document(&document, &signature).await
        }));
    }

    let mut document_ids = Vec::new();
    let mut failed = 0usize;
    while let Some(task_result) = tasks.next().await {
        match task_result {
            Ok(Ok(response)) => document_ids.push(response.id),
            Ok(Err(e)) => {
                failed += 1;
                warn!("Failed to create document: {e}");
            }
            Err(join_error) => {
                failed += 1;
                warn!("Task panicked: {:?}", join_error);
            }
        }
    }

    let stats = client.dispatcher().stats();
    stats.log_summary();

    Ok(RunReport {
        total: config.requests,
        succeeded: stats.get_count(OutcomeKind::Succeeded),
        failed,
        document_ids,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}
