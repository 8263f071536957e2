// ==============================================================================
// main.rs - Proteomics Processor CLI
// ==============================================================================
// Description: Offline inspection of the supplementary workbook: validation,
//              volcano summaries and single-gene lookups
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proteomics_processor::classifier::{classify, PointLabel};
use proteomics_processor::dataset::WorkbookLoader;
use proteomics_processor::extractor::extract_samples;
use proteomics_processor::literature::{LiteratureSource, MyGeneClient, DEFAULT_API_BASE};
use proteomics_processor::models::{DisclosureState, ThresholdState};
use proteomics_processor::presenter::{present, PAGE_SIZE};
use proteomics_processor::validator::WorkbookValidator;

const DEFAULT_WORKBOOK: &str = "NIHMS1635539-supplement-1635539_Sup_tab_4.xlsx";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Supplementary workbook (limma results + per-sample values)
    #[arg(short, long, env = "WORKBOOK_PATH", default_value = DEFAULT_WORKBOOK, global = true)]
    workbook: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and fingerprint the workbook
    Validate,

    /// Classify every gene and print counts and guide lines
    Summary {
        #[arg(long, default_value_t = ThresholdState::default().fold_change_limit)]
        fold_change_limit: f64,

        #[arg(long, default_value_t = ThresholdState::default().p_value_limit)]
        p_value_limit: f64,
    },

    /// Extract cohort samples for one gene
    Lookup {
        /// Entrez gene symbol (exact, case-sensitive)
        #[arg(short, long)]
        gene: String,

        /// Also fetch GeneRIF literature for the gene
        #[arg(long)]
        literature: bool,

        /// Gene annotation API base URL
        #[arg(long, env = "LITERATURE_API_BASE", default_value = DEFAULT_API_BASE)]
        api_base: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proteomics_processor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Validate => {
            let validated = WorkbookValidator::new().validate(&args.workbook)?;
            println!("{}", serde_json::to_string_pretty(&validated)?);
        }

        Command::Summary {
            fold_change_limit,
            p_value_limit,
        } => {
            let dataset = WorkbookLoader::new()
                .load(&args.workbook)
                .context("Failed to load workbook")?;

            let thresholds = ThresholdState {
                fold_change_limit,
                p_value_limit,
            };
            let classification = classify(&dataset.results, &thresholds);

            println!("genes:      {}", classification.points.len());
            println!("notable:    {}", classification.count(PointLabel::Notable));
            println!("background: {}", classification.count(PointLabel::Background));
            println!("zero adj.P: {}", classification.missing_count());
            for guide in &classification.guides {
                println!(
                    "guide {:?}: ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                    guide.orientation, guide.x0, guide.y0, guide.x1, guide.y1
                );
            }
        }

        Command::Lookup {
            gene,
            literature,
            api_base,
        } => {
            let dataset = WorkbookLoader::new()
                .load(&args.workbook)
                .context("Failed to load workbook")?;

            let samples = extract_samples(&dataset.samples, &gene)?;
            info!("Match: {:?}", samples.match_reason);
            println!("{}", serde_json::to_string_pretty(&samples)?);

            if literature {
                let client = MyGeneClient::new(api_base).context("Failed to build HTTP client")?;
                let records = client.lookup(&samples.gene_id).await.into_records();
                let panel = present(&records, DisclosureState { toggle_count: 1 }, PAGE_SIZE);
                println!("{}", serde_json::to_string_pretty(&panel)?);
            }
        }
    }

    Ok(())
}
