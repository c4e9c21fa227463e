mod output;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bookscout_core::sample::{DEFAULT_SAMPLE_FILE, load_sample, save_sample};
use bookscout_core::{
    AppConfig, CatalogSource, CoreError, Pipeline, enrich_all, tally,
};
use bookscout_sources::{GoogleBooksSource, OpenLibrarySource};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bookscout",
    about = "Find books that share categories with a title you already like",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    /// Also enabled by setting BOOKSCOUT_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr (overridden by BOOKSCOUT_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend books sharing categories with a title/author.
    Recommend {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        /// Maximum number of recommendations.
        #[arg(long)]
        max: Option<usize>,
        /// Only search the N most frequent categories.
        #[arg(long)]
        top_categories: Option<usize>,
    },

    /// Search the catalog by title and author.
    Search {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Fetch and enrich books for a title/author and save them as a JSON sample file.
    Sample {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "5")]
        max: usize,
        #[arg(long, default_value = DEFAULT_SAMPLE_FILE)]
        output: PathBuf,
    },

    /// Tally the categories of a saved sample file.
    Categories {
        #[arg(long, default_value = DEFAULT_SAMPLE_FILE)]
        input: PathBuf,
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show the config file path and effective configuration.
    Config,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let json_output = cli.json || std::env::var("BOOKSCOUT_JSON").as_deref() == Ok("1");
    let config = AppConfig::load()?;
    tracing::debug!(path = %AppConfig::config_path().display(), "config loaded");

    match run(cli.command, &config, json_output).await {
        Err(e) if is_precondition_failure(&e) => {
            if json_output {
                print_json(&serde_json::json!({"status": "error", "error": e.to_string()}))?;
            } else {
                eprintln!("{e}");
            }
            std::process::exit(2);
        }
        other => other,
    }
}

async fn run(command: Commands, config: &AppConfig, json_output: bool) -> Result<()> {
    let start = Instant::now();

    match command {
        Commands::Recommend {
            title,
            author,
            max,
            top_categories,
        } => {
            let catalog = GoogleBooksSource::from_config(config)?;
            let enricher = open_library(config)?;

            let mut pipeline = Pipeline::from_config(&catalog, config)
                .with_top_categories(top_categories.or(config.recommend.top_categories));
            if let Some(max) = max {
                pipeline = pipeline.with_max_recommendations(max);
            }
            if let Some(enricher) = &enricher {
                pipeline = pipeline.with_enricher(enricher);
            }

            let report = pipeline.run(&title, &author).await?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "categories": report.categories,
                        "recommendations": report.recommendations,
                        "matched_books": report.books.len(),
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("{}", output::banner("Book Categories Found"));
                print!("{}", output::tally_lines(&report.categories));
                println!(
                    "{}",
                    output::banner(&format!("Recommended Books for '{title}' by {author}"))
                );
                output::print_recommendations(&report.recommendations);
            }
        }

        Commands::Search {
            title,
            author,
            limit,
        } => {
            let catalog = GoogleBooksSource::from_config(config)?;
            let books = catalog.fetch_by_title_author(&title, &author, limit).await;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": books, "total": books.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                // Empty results are logged by the catalog.
                for book in &books {
                    print!("{}", output::volume_info(book));
                }
            }
        }

        Commands::Sample {
            title,
            author,
            max,
            output: path,
        } => {
            let catalog = GoogleBooksSource::from_config(config)?;
            let mut books = catalog.fetch_by_title_author(&title, &author, max).await;
            if let Some(enricher) = open_library(config)? {
                books = enrich_all(books, &enricher).await;
            }
            let saved = save_sample(&path, &books)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "path": saved, "total": books.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Saved {} items to {}", books.len(), saved.display());
            }
        }

        Commands::Categories { input, top } => {
            let books = load_sample(&input)?;
            let counted = tally(&books, top)?;

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "categories": counted, "books": books.len() },
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                println!("{}", output::banner("Book Categories Found"));
                print!("{}", output::tally_lines(&counted));
                println!("{}", output::banner("Books"));
                output::print_books(&books);
            }
        }

        Commands::Config => {
            let path = AppConfig::config_path();
            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "path": path, "exists": path.exists(), "config": config }
                }))?;
            } else {
                let state = if path.exists() { "" } else { " (not found, using defaults)" };
                println!("# {}{state}", path.display());
                print!("{}", config.to_toml()?);
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("BOOKSCOUT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Empty-input errors from the core, which exit with status 2.
fn is_precondition_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CoreError>()
        .is_some_and(CoreError::is_precondition)
}

fn open_library(config: &AppConfig) -> Result<Option<OpenLibrarySource>> {
    if !config.enrichment.enabled {
        return Ok(None);
    }
    Ok(Some(OpenLibrarySource::from_config(config)?))
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
