use clap::Parser;
use set_analysis::domain::UnionAnalysisRequest;
use set_analysis::search::HttpSearch;
use set_analysis::store::{MemoryAnalysisStore, MemoryEntitySetStore};
use set_analysis::utils::{logger, validation::Validate};
use set_analysis::{CliArgs, EntityKind, UnionAnalyzer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting set-analysis CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let settings = match args.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Could not load settings: {}", e);
            eprintln!("Could not load settings: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = settings.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let kind: EntityKind = match args.entity_type.parse() {
        Ok(kind) => kind,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let search = Arc::new(HttpSearch::new(
        &settings.search.base_url,
        settings.request_timeout(),
    )?);
    let analyses = Arc::new(MemoryAnalysisStore::new());
    let entity_sets = Arc::new(MemoryEntitySetStore::new());
    let analyzer = UnionAnalyzer::new(search, analyses, entity_sets, &settings);

    analyzer.registry().ensure_index().await?;

    let request = UnionAnalysisRequest::new(args.lists.clone(), kind);
    let job = match analyzer.submit(&request).await {
        Ok(job) => job,
        Err(e) => {
            tracing::error!("Submission rejected: {}", e);
            eprintln!("Submission rejected: {}", e);
            std::process::exit(2);
        }
    };

    analyzer.calculate(job.id, &request).await;

    match analyzer.analysis(job.id).await? {
        Some(finished) => {
            println!("{}", serde_json::to_string_pretty(&finished)?);
            if finished.state == set_analysis::JobState::Error {
                tracing::error!("Analysis {} ended in ERROR", finished.id);
                std::process::exit(3);
            }
            tracing::info!("Analysis {} completed", finished.id);
        }
        None => {
            eprintln!("Analysis {} disappeared from the store", job.id);
            std::process::exit(3);
        }
    }

    Ok(())
}
