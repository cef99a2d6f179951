use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;

use lca_pipeline::summary::{SummaryReport, soc_title};
use lca_pipeline::utils::logging::console::{
    print_dataset_info, print_employer_ranking, print_job_titles, print_key_metrics,
    print_pipeline_report, print_size_distribution, print_state_breakdown,
};
use lca_pipeline::utils::write_parquet;
use lca_pipeline::{
    DataSource, DatasetValidator, DisplayFilters, LcaRecord, Pipeline, PipelineConfig,
    ValidationMode, read_raw_file,
};

#[derive(Parser, Debug)]
#[command(name = "lca-pipeline")]
#[command(about = "Download, clean and summarize DOL LCA disclosure data", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file, applied on top of LCA_* environment variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the processed record set and print headline metrics
    Load,
    /// Rebuild the processed store from the raw extract
    Refresh,
    /// Run the pipeline over a local raw extract (.xlsx or .csv)
    Process {
        /// Raw extract to process
        input: PathBuf,

        /// Where to write the Parquet result (defaults to the processed store)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print summary tables, optionally narrowed by display filters
    Summary {
        /// Keep one SOC code
        #[arg(long)]
        soc: Option<String>,

        /// Keep one worksite state
        #[arg(long)]
        state: Option<String>,

        /// Lowest annual wage to keep
        #[arg(long)]
        min_wage: Option<f64>,

        /// Highest annual wage to keep
        #[arg(long)]
        max_wage: Option<f64>,

        /// Rows in the ranked tables
        #[arg(long, default_value = "15")]
        top: usize,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let configured;
    let source = match &cli.config {
        Some(path) => {
            let config = PipelineConfig::from_toml_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?;
            configured = DataSource::new(config);
            &configured
        }
        None => DataSource::global(),
    };

    match cli.command {
        Commands::Load => {
            let dataset = source.load().context("resolving LCA data")?;
            print_dataset_info(&dataset);
            print_key_metrics(&lca_pipeline::summary::KeyMetrics::from_records(
                &dataset.records()?,
            ));
        }
        Commands::Refresh => {
            let dataset = source.refresh().context("refreshing LCA data")?;
            print_dataset_info(&dataset);
        }
        Commands::Process { input, output } => {
            let config = source.config();
            let raw = read_raw_file(&input)
                .with_context(|| format!("reading raw extract {}", input.display()))?;

            let validator = DatasetValidator::from_config(config);
            let raw_report = validator.report(&raw, ValidationMode::Raw);
            if !raw_report.is_valid() {
                bail!(raw_report.summary());
            }

            let pipeline = Pipeline::from_config(config);
            let result = pipeline.transform(&raw, &validator)?;
            print_pipeline_report(&result.report);
            if !result.valid {
                bail!(
                    validator
                        .report(&result.batch, ValidationMode::Processed)
                        .summary()
                );
            }

            let output = output.unwrap_or_else(|| config.processed_path());
            write_parquet(&output, &result.batch)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("Wrote {} records to {}", result.batch.num_rows(), output.display());
        }
        Commands::Summary {
            soc,
            state,
            min_wage,
            max_wage,
            top,
            json,
        } => {
            let mut filters = DisplayFilters::default();
            if let Some(code) = &soc {
                filters = filters.with_soc_code(lca_pipeline::canonical_soc_code(code));
            }
            if let Some(state) = state {
                filters = filters.with_state(state);
            }
            if min_wage.is_some() || max_wage.is_some() {
                filters = filters.with_wage_range(
                    min_wage.unwrap_or(f64::MIN),
                    max_wage.unwrap_or(f64::MAX),
                );
            }

            let dataset = source.load().context("resolving LCA data")?;
            let all_records = dataset.records()?;
            let records = LcaRecord::from_batch(dataset.filtered(&filters)?.batch())?;
            let report = SummaryReport::build(&records, top);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            if let Some(code) = &soc {
                let title = soc_title(&all_records, code);
                if !title.is_empty() {
                    println!("{code}: {title}");
                }
            }
            print_key_metrics(&report.metrics);
            println!();
            print_employer_ranking(&report.employers);
            println!();
            print_state_breakdown(&report.states);
            println!();
            print_job_titles(&report.job_titles);
            println!();
            print_size_distribution(&report.employer_sizes);
        }
    }

    Ok(())
}
