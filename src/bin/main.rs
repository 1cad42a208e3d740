use ledger_reconciler::{
    config::ReconcilerConfig,
    oracle::{GroqClient, OracleRequestBuilder},
    pipeline::Reconciler,
    summary::SummaryReporter,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ReconcilerConfig::from_env()?;

    info!(
        input = %config.input_path,
        model = %config.oracle.model,
        "Ledger reconciler starting"
    );

    let dump = std::fs::read_to_string(&config.input_path)?;

    // Create components
    let oracle = Arc::new(GroqClient::new(config.api_key.clone(), config.base_url.clone())?);
    let requests = OracleRequestBuilder::new(oracle, config.oracle.clone());
    let reconciler = Reconciler::new(requests);

    let report = reconciler.run(&dump).await;

    println!("\n=== RECONCILIATION RESULT ===");
    println!("Run ID: {} (started {})", report.run_id, report.started_at.to_rfc3339());
    println!(
        "Reconciled: {} / {} (rejected lines: {})",
        report.reconciled_count(),
        report.transactions.len(),
        report.rejected_lines
    );
    for tx in &report.transactions {
        match tx.balance {
            Some(balance) => println!("  {} {} {:.2} -> {:.2}", tx.id, tx.transaction_code, tx.amount, balance),
            None => println!("  {} {} {:.2} -> unreconciled", tx.id, tx.transaction_code, tx.amount),
        }
    }
    print!("\n{}", SummaryReporter::render(&report.summary));

    Ok(())
}
