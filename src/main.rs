use anyhow::Context;
use camp_export::domain::ports::ConfigProvider;
use camp_export::utils::{logger, validation::Validate};
use camp_export::{CampPipeline, CliConfig, EtlEngine, EtlError, LocalStorage};
use clap::Parser;

fn report_error(e: &EtlError) {
    tracing::error!(
        "❌ Camp export failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    if let Some(body) = e.body_preview() {
        eprintln!("   Response: {}", body);
    }
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            std::process::exit(e.exit_code());
        }
    };
    tracing::debug!("Resolved config: {:?}", config);

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = CampPipeline::new(storage, config).context("building HTTP client")?;
    let engine = EtlEngine::new(pipeline);

    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => {
            report_error(&e);
            std::process::exit(e.exit_code());
        }
    };

    if summary.records_fetched == 0 {
        println!("❌ No camps retrieved. Check the API key and year.");
    } else {
        println!(
            "✅ Done! Exported {} camps from {} pages",
            summary.load.camp_count, summary.pages_fetched
        );
        for file in summary.load.written_files() {
            println!("📁 {}", file);
        }
        if summary.load.emails_file.is_some() {
            println!("✅ Also exported {} email addresses", summary.load.email_count);
        }
    }

    if let Some(e) = summary.fetch_error() {
        report_error(e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}
