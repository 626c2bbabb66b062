use anyhow::Context;
use clap::Parser;
use leadflow::utils::{export, logger, validation::Validate};
use leadflow::{
    records_from_json, BatchReport, CliConfig, Command, Record, ResolvedConfig, TracingProgress,
    WebhookClient, WorkflowSession,
};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting leadflow CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = cli.resolve().context("failed to resolve configuration")?;
    config
        .validate()
        .context("configuration validation failed")?;

    match run(cli.command, config).await {
        Ok(None) => {}
        Ok(Some(report)) => {
            if report.is_complete() {
                tracing::info!("✅ Batch complete, all {} records succeeded", report.succeeded);
            } else {
                eprintln!(
                    "⚠️ Batch finished with {} successes and {} failures:",
                    report.succeeded,
                    report.failed()
                );
                for failure in &report.failures {
                    eprintln!("  {}: {}", failure.label, failure.reason);
                }
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run(command: Command, config: ResolvedConfig) -> leadflow::Result<Option<BatchReport>> {
    let client = WebhookClient::new(config);

    match command {
        Command::Search { query, json, csv } => {
            let records = client.search(&query).await?;
            println!("Total records found: {}", records.len());
            write_outputs(&records, &export::ROW_COLUMNS, json, csv)?;
            Ok(None)
        }
        Command::Update { input } => {
            let rows = load_table(&input)?;
            let mut session = WorkflowSession::new(client, rows);
            let report = session.submit_updates(&TracingProgress).await?;
            Ok(Some(report))
        }
        Command::Draft {
            subject,
            body,
            json,
            csv,
        } => {
            let drafts = client.generate_drafts(&subject, &body).await?;
            println!("Email previews generated: {}", drafts.len());
            write_outputs(&drafts, &export::EMAIL_COLUMNS, json, csv)?;
            Ok(None)
        }
        Command::Send { input } => {
            let drafts = load_table(&input)?;
            let mut session = WorkflowSession::resume_composer(client, drafts);
            let report = session.send_emails(&TracingProgress).await?;
            Ok(Some(report))
        }
        Command::Export { input, json, csv } => {
            let records = load_table(&input)?;
            println!("Loaded {} records", records.len());
            write_outputs(&records, &export::ROW_COLUMNS, json, csv)?;
            Ok(None)
        }
    }
}

fn load_table(path: &Path) -> leadflow::Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)?;
    records_from_json(&content)
}

/// Writes the requested export files; with neither flag the table goes to
/// stdout as indented JSON.
fn write_outputs(
    records: &[Record],
    columns: &[&str],
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> leadflow::Result<()> {
    if json.is_none() && csv.is_none() {
        println!("{}", export::to_json_pretty(records)?);
        return Ok(());
    }

    if let Some(path) = json {
        std::fs::write(&path, export::to_json_pretty(records)?)?;
        tracing::info!("JSON written to {}", path.display());
    }
    if let Some(path) = csv {
        std::fs::write(&path, export::to_csv(records, columns)?)?;
        tracing::info!("CSV written to {}", path.display());
    }
    Ok(())
}
