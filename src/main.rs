//! Jury-Corpus main entry point
//!
//! This is the command-line interface for the Jury-Corpus site crawler.

use anyhow::Context;
use clap::Parser;
use jury_corpus::config::{load_config_with_hash, Config};
use jury_corpus::crawler::{crawl, ShutdownHandle};
use jury_corpus::{ConfigError, CorpusError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Jury-Corpus: a scoped site crawler for building text corpora
///
/// Jury-Corpus crawls one section of a website from a seed URL, extracts the
/// text of every page and linked document in scope, and records which pages
/// link to which.
#[derive(Parser, Debug)]
#[command(name = "jury-corpus")]
#[command(version = "1.0.0")]
#[command(about = "A scoped site crawler that builds a text corpus", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and export directory, then exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary from existing data and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let code = e
                .downcast_ref::<CorpusError>()
                .map(CorpusError::exit_code)
                .unwrap_or(3);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .map_err(CorpusError::from)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.export_summary {
        handle_export_summary(&config)
    } else {
        handle_crawl(config, config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jury_corpus=info,warn"),
            1 => EnvFilter::new("jury_corpus=debug,info"),
            2 => EnvFilter::new("jury_corpus=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Jury-Corpus Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Domain: {}", config.crawler.domain);
    println!("  Traversal: {:?}", config.crawler.traversal);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Content selector: {}", config.crawler.content_selector);
    println!(
        "  Page extensions: {}",
        config.crawler.page_extensions.join(", ")
    );
    println!("  Extract file text: {}", config.crawler.extract_file_text);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );

    println!(
        "\nExcluded Prefixes ({}):",
        config.crawler.excluded_prefixes.len()
    );
    for prefix in &config.crawler.excluded_prefixes {
        println!("  - {}", prefix);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header);

    println!("\nOutput:");
    println!("  Corpus: {}", config.output.corpus_path);
    if let Some(db) = &config.output.database_path {
        println!("  Database: {}", db);
    }
    if let Some(dir) = &config.output.export_dir {
        println!("  Export directory: {} (source '{}')", dir, config.output.source);
    }
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", config.crawler.seed_url);
}

fn database_path(config: &Config) -> anyhow::Result<&str> {
    config.output.database_path.as_deref().ok_or_else(|| {
        CorpusError::from(ConfigError::Validation(
            "output.database-path must be set to read recorded runs".to_string(),
        ))
        .into()
    })
}

/// Handles the --stats mode: shows statistics from the database and the export directory
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use jury_corpus::output::{
        load_statistics, print_export_metadata, print_statistics, read_export_metadata,
    };
    use jury_corpus::storage::SqliteStorage;

    let db_path = config.output.database_path.as_deref();
    let export_dir = config.output.export_dir.as_deref();
    if db_path.is_none() && export_dir.is_none() {
        return Err(CorpusError::from(ConfigError::Validation(
            "output.database-path or output.export-dir must be set to show statistics"
                .to_string(),
        ))
        .into());
    }

    if let Some(db_path) = db_path {
        println!("Database: {}\n", db_path);

        // Open the database
        let storage = SqliteStorage::new(Path::new(db_path))
            .map_err(CorpusError::from)
            .with_context(|| format!("opening {}", db_path))?;

        let stats = load_statistics(&storage)?;
        print_statistics(&stats);
    }

    if let Some(dir) = export_dir {
        if db_path.is_some() {
            println!();
        }
        let records = read_export_metadata(Path::new(dir))
            .map_err(CorpusError::from)
            .with_context(|| format!("reading {}", dir))?;
        print_export_metadata(Path::new(dir), &records);
    }

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    use jury_corpus::output::{generate_markdown_summary, generate_summary};
    use jury_corpus::storage::SqliteStorage;

    let db_path = database_path(config)?;
    let summary_path = config
        .output
        .summary_path
        .as_deref()
        .unwrap_or("./summary.md");

    println!("=== Exporting Crawl Summary ===\n");
    println!("Database: {}", db_path);
    println!("Output: {}", summary_path);
    println!();

    // Open the database
    let storage = SqliteStorage::new(Path::new(db_path))
        .map_err(CorpusError::from)
        .with_context(|| format!("opening {}", db_path))?;

    // Generate summary from storage
    tracing::info!("Loading crawl data from database...");
    let summary = generate_summary(&storage)?;

    // Write markdown summary to file
    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(summary_path))
        .map_err(CorpusError::from)
        .with_context(|| format!("writing {}", summary_path))?;

    println!("✓ Summary exported to: {}", summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} within {} ({} excluded prefixes, {} workers)",
        config.crawler.seed_url,
        config.crawler.domain,
        config.crawler.excluded_prefixes.len(),
        config.crawler.workers
    );

    // Ctrl-C stops dequeuing; pages in flight finish and outputs are still written
    let shutdown = ShutdownHandle::new();
    let signal_handle = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Shutdown requested, finishing pages in flight");
            signal_handle.request();
        }
    });

    let output = crawl(&config, &config_hash, shutdown).await?;

    if output.report.interrupted {
        tracing::warn!(
            "Crawl interrupted with {} pages recorded ({} left in the frontier)",
            output.corpus.len(),
            output.report.pending
        );
    } else {
        tracing::info!("Crawl completed successfully");
    }

    Ok(())
}
