//! Catalog Crawler main entry point
//!
//! Command-line interface for crawling a catalog, inspecting the resulting
//! dataset, precomputing embeddings and searching over them.

use anyhow::{bail, Context};
use catalog_crawler::config::{load_config_with_hash, Config};
use catalog_crawler::crawler::crawl;
use catalog_crawler::dataset::{print_statistics, Dataset, DatasetStatistics};
use catalog_crawler::embedding::{precompute_embeddings, Embedder, EmbeddingMatrix, OpenAiEmbedder};
use catalog_crawler::search::{semantic_search, SearchFilters, ALL_CATEGORIES};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Catalog Crawler: paginated catalog scraper with semantic search
///
/// Walks every listing page of a catalog, resolves each item's category from
/// its detail page and writes the records as CSV. The dataset can then be
/// embedded and searched.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version)]
#[command(about = "Paginated catalog scraper with semantic search", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "embed", "search"])]
    dry_run: bool,

    /// Show statistics for the written dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "embed", "search"])]
    stats: bool,

    /// Compute embeddings for the written dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "search"])]
    embed: bool,

    /// Search the dataset; an empty query lists filtered rows in order
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Only return items in this category ("All" disables the filter)
    #[arg(long, requires = "search")]
    category: Option<String>,

    /// Minimum price, inclusive
    #[arg(long, requires = "search")]
    min_price: Option<f64>,

    /// Maximum price, inclusive
    #[arg(long, requires = "search")]
    max_price: Option<f64>,

    /// Minimum rating (0-5)
    #[arg(long, requires = "search", value_parser = clap::value_parser!(u8).range(0..=5))]
    min_rating: Option<u8>,

    /// Number of results to show
    #[arg(short = 'k', long, default_value_t = 20)]
    top_k: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.embed {
        handle_embed(&config).await?;
    } else if let Some(query) = cli.search.as_deref() {
        let filters = SearchFilters {
            category: cli.category.clone(),
            price_min: cli.min_price,
            price_max: cli.max_price,
            min_rating: cli.min_rating,
        };
        handle_search(&config, query, &filters, cli.top_k).await?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
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

fn request_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.crawler.request_timeout_secs)
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Catalog Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!(
        "  Max concurrent detail fetches: {}",
        config.crawler.max_concurrent_detail_fetches
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSelectors:");
    println!("  Card: {}", config.selectors.card);
    println!("  Title link: {}", config.selectors.title_link);
    println!("  Price: {}", config.selectors.price);
    println!("  Rating: {}", config.selectors.rating);
    println!("  Next page: {}", config.selectors.next_page);
    println!("  Category: {}", config.selectors.breadcrumb_category);

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.dataset_path);
    println!("  Vectors: {}", config.output.vectors_path);
    println!("  Size threshold: {}", config.output.size_threshold);

    match &config.embedding {
        Some(embedding) => {
            println!("\nEmbedding:");
            println!("  Endpoint: {}", embedding.endpoint);
            println!("  Model: {}", embedding.model);
            println!("  Batch size: {}", embedding.batch_size);
        }
        None => println!("\nEmbedding: not configured"),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", config.crawler.base_url);
}

/// Handles the --stats mode: summarizes the written dataset
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = Path::new(&config.output.dataset_path);
    println!("Dataset: {}\n", path.display());

    let dataset = Dataset::read(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let stats = DatasetStatistics::from_dataset(&dataset);
    print_statistics(&stats);

    Ok(())
}

fn build_embedder(config: &Config) -> anyhow::Result<OpenAiEmbedder> {
    let Some(embedding) = &config.embedding else {
        bail!("no [embedding] section in configuration");
    };
    Ok(OpenAiEmbedder::from_config(embedding, request_timeout(config))?)
}

/// Handles the --embed mode: precomputes and saves dataset embeddings
async fn handle_embed(config: &Config) -> anyhow::Result<()> {
    let embedder = build_embedder(config)?;
    let dataset_path = Path::new(&config.output.dataset_path);
    let vectors_path = Path::new(&config.output.vectors_path);

    let dataset = Dataset::read(dataset_path)
        .with_context(|| format!("failed to read dataset {}", dataset_path.display()))?;
    tracing::info!("Embedding {} records", dataset.len());

    let matrix = precompute_embeddings(&dataset, &embedder, embedder.batch_size()).await?;
    matrix
        .save(vectors_path)
        .with_context(|| format!("failed to write vectors {}", vectors_path.display()))?;

    println!(
        "✓ Wrote {} embeddings ({} dimensions) to {}",
        matrix.len(),
        matrix.dimensions(),
        vectors_path.display()
    );
    Ok(())
}

/// Handles the --search mode: filtered similarity search over the dataset
async fn handle_search(
    config: &Config,
    query: &str,
    filters: &SearchFilters,
    top_k: usize,
) -> anyhow::Result<()> {
    let dataset_path = Path::new(&config.output.dataset_path);
    let vectors_path = Path::new(&config.output.vectors_path);

    let dataset = Dataset::read(dataset_path)
        .with_context(|| format!("failed to read dataset {}", dataset_path.display()))?;
    let matrix = EmbeddingMatrix::load(vectors_path).with_context(|| {
        format!(
            "failed to read vectors {}; run with --embed first",
            vectors_path.display()
        )
    })?;

    let query = query.trim();
    let query_vector = if query.is_empty() {
        None
    } else {
        let embedder = build_embedder(config)?;
        let mut vectors = embedder.embed_batch(&[query.to_string()]).await?;
        vectors.pop()
    };

    let hits = semantic_search(&dataset, &matrix, query_vector.as_deref(), filters, top_k)?;

    if hits.is_empty() {
        println!("No items match the selected filters.");
        let categories = dataset.categories();
        if let Some(category) = filters.category.as_deref() {
            if category != ALL_CATEGORIES && !categories.iter().any(|c| c == category) {
                println!("Known categories: {}", categories.join(", "));
            }
        }
        return Ok(());
    }

    for hit in &hits {
        let score = hit
            .similarity
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {}  {}  [{}]  £{:.2}  {}/5  {}",
            hit.index,
            score,
            hit.record.title,
            hit.record.category,
            hit.record.price,
            hit.record.rating,
            hit.record.product_page_url
        );
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting crawl at {}", config.crawler.base_url);
    let dataset_path = config.output.dataset_path.clone();

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed in {}s: {} pages, {} records ({} with unknown category)",
                report.duration_seconds(),
                report.pages_visited,
                report.records,
                report.unknown_categories
            );
            println!("Scraped {} items ({})", report.records, report.size_class);
            println!("Saved dataset to {}", dataset_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
