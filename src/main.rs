use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_harvester::cli::{Cli, Commands};
use transcript_harvester::config::Config;
use transcript_harvester::dataset::Dataset;
use transcript_harvester::page::WebDriverPage;
use transcript_harvester::{output, utils, BatchOptions, BatchRunner, TranscriptPipeline};

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "transcript_harvester=debug"
    } else {
        "transcript_harvester=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Harvest {
            input,
            url_column,
            transcript_column,
            webdriver,
            headed,
            force,
            limit,
            format,
        } => {
            if let Some(column) = url_column {
                config.dataset.url_column = column;
            }
            if let Some(column) = transcript_column {
                config.dataset.transcript_column = column;
            }
            if let Some(url) = webdriver {
                config.webdriver.url = url;
            }
            if headed {
                config.webdriver.headless = false;
            }
            config.validate()?;

            // Open the dataset before any browser work so a bad input changes nothing
            let mut dataset = Dataset::open(&input, &config.dataset)?;
            tracing::info!(
                "Dataset {} selected, {} rows to check",
                input.display(),
                dataset.len()
            );

            utils::check_webdriver(&config.webdriver.url).await?;
            let mut page = WebDriverPage::connect(&config.webdriver).await?;

            let pipeline = TranscriptPipeline::new(config.search_plan(), config.timings.clone());
            let runner = BatchRunner::new(
                &pipeline,
                BatchOptions {
                    force,
                    limit,
                    row_delay: Duration::from_millis(config.timings.row_delay),
                    show_progress: !cli.quiet,
                },
            );

            let result = runner.run(&mut dataset, &mut page).await;

            if let Err(e) = page.close().await {
                tracing::warn!("{}", e);
            }

            let summary = result?;
            output::print_summary(&summary, format)?;
            println!("Results saved to: {}", dataset.path().display());
        }
        Commands::Selectors { format } => {
            println!("{}", output::format_plan(&config.search_plan(), format)?);
        }
        Commands::Config { show, init } => {
            if init {
                let path = Config::default_path()?;
                if path.exists() {
                    anyhow::bail!("Config file already exists: {}", path.display());
                }
                Config::default().save(&path)?;
                println!("Default configuration written to: {}", path.display());
            } else if show {
                config.display();
            } else {
                println!("Edit the config file to change settings:");
                println!("  {}", Config::default_path()?.display());
            }
        }
    }

    Ok(())
}
