//! Dragnet main entry point
//!
//! Command-line interface for the discovery engine: `crawl`, `probe`,
//! `pages`, and `feed` subcommands over one shared configuration.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dragnet::classify::PlatformRegistry;
use dragnet::config::{load_config, validate, Config};
use dragnet::crawl::{CollectOptions, Collector};
use dragnet::download::Downloader;
use dragnet::extract::MediaExtractor;
use dragnet::feed::{extract_feed_items, to_resource_records, FeedClient, FeedEndpoints};
use dragnet::fetch::{politeness_pause, CancelFlag, Fetcher, RetryPolicy};
use dragnet::pages::{find_max_page, page_exists, scan_linear, scrape_pages};
use dragnet::probe::{load_wordlist, run_probe, ProbeOptions};
use dragnet::report::{DownloadSummary, FeedMetadata, MediaManifest, PagesReport, ProbeReport};
use dragnet::url::normalize_url;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Dragnet: a concurrent web-resource discovery engine
#[derive(Parser, Debug)]
#[command(name = "dragnet")]
#[command(version = "0.1.0")]
#[command(about = "Discover, classify, and retrieve web resources", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults apply without one)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site for media assets
    Crawl(CrawlArgs),
    /// Probe platforms for a username
    Probe(ProbeArgs),
    /// Discover which page indices exist under a base URL
    Pages(PagesArgs),
    /// Download all media from an authenticated feed
    Feed(FeedArgs),
}

#[derive(clap::Args, Debug)]
struct CrawlArgs {
    /// Seed URL to start from
    #[arg(short, long)]
    url: String,

    /// Number of link-hops to follow (same host only)
    #[arg(short, long, default_value_t = 0)]
    depth: u32,

    /// Follow internal links up to --depth
    #[arg(long)]
    follow_links: bool,

    /// Maximum number of pages to visit
    #[arg(long)]
    limit_pages: Option<usize>,

    /// Download the discovered media files
    #[arg(long)]
    download: bool,

    /// Directory for downloads
    #[arg(short, long, default_value = "media_archive")]
    output_dir: PathBuf,

    /// File to store the media manifest
    #[arg(short, long, default_value = "media_manifest.json")]
    manifest: PathBuf,

    /// Worker-pool size (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct ProbeTarget {
    /// Username to search for
    #[arg(short, long)]
    username: Option<String>,

    /// File with one username per line (# comments ignored)
    #[arg(long)]
    wordlist: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    target: ProbeTarget,

    /// Directory for result files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Worker-pool size (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScanMode {
    /// Binary search for the highest existing index
    Binary,
    /// Stepped linear scan with skip-ahead
    Linear,
}

#[derive(clap::Args, Debug)]
struct PagesArgs {
    /// Paginated base URL (pages live at base/0, base/1, ...)
    #[arg(short, long)]
    base_url: String,

    /// Scanning method
    #[arg(long, value_enum, default_value = "binary")]
    mode: ScanMode,

    /// Highest index considered in binary mode (overrides config)
    #[arg(long)]
    upper_bound: Option<u64>,

    /// First index probed in linear mode
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Skip-ahead step in linear mode (overrides config)
    #[arg(long)]
    step: Option<u64>,

    /// Wall-clock bound for the linear scan, seconds (overrides config)
    #[arg(long)]
    scan_timeout: Option<u64>,

    /// Also fetch and dump the content of each found page
    #[arg(long)]
    scrape: bool,

    /// Directory for result files
    #[arg(short, long, default_value = "scraped_results")]
    output_dir: PathBuf,
}

#[derive(clap::Args, Debug)]
struct FeedArgs {
    /// Feed account name to download from
    #[arg(short, long)]
    user: String,

    /// Maximum number of submissions to list
    #[arg(short, long)]
    limit: Option<usize>,

    /// Directory for downloads (default: downloads/<user>)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Worker-pool size (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).context("failed to load configuration")?
        }
        None => {
            let config = Config::default();
            validate(&config).context("invalid default configuration")?;
            config
        }
    };

    // Ctrl+C stops pools from claiming new work; in-flight requests finish
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing in-flight work");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Command::Crawl(args) => handle_crawl(&config, args, cancel).await,
        Command::Probe(args) => handle_probe(&config, args, cancel).await,
        Command::Pages(args) => handle_pages(&config, args, cancel).await,
        Command::Feed(args) => handle_feed(&config, args, cancel).await,
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dragnet=info,warn"),
            1 => EnvFilter::new("dragnet=debug,info"),
            2 => EnvFilter::new("dragnet=trace,debug"),
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

/// Handles the crawl subcommand
async fn handle_crawl(config: &Config, args: CrawlArgs, cancel: CancelFlag) -> anyhow::Result<()> {
    let seed = normalize_url(&args.url).context("invalid seed URL")?;

    let fetcher = Fetcher::new(&config.client.to_client_config())?;
    let collector = Collector::new(fetcher.clone(), MediaExtractor::new());

    let options = CollectOptions {
        max_depth: args.depth,
        follow_links: args.follow_links,
        limit_pages: args.limit_pages,
        workers: args.workers.unwrap_or(config.crawl.workers),
        politeness_delay: Duration::from_millis(config.crawl.politeness_delay_ms),
        cancel: cancel.clone(),
    };

    let records = collector.collect(&seed, &options).await;

    let manifest = MediaManifest::new(seed.as_str(), records);
    manifest.write(&args.manifest)?;

    if args.download && !manifest.media.is_empty() {
        let downloader = Downloader::new(
            fetcher,
            args.workers.unwrap_or(config.download.workers),
            RetryPolicy::none(),
        )
        .with_cancel(cancel);

        let outcomes = downloader
            .download_all(&manifest.media, &args.output_dir)
            .await
            .context("output directory is not usable")?;

        let summary = DownloadSummary::from_outcomes(outcomes);
        summary.write(&args.output_dir.join("download_summary.json"))?;

        println!(
            "Downloaded {} files ({} skipped, {} failed) into {}",
            summary.downloaded(),
            summary.skipped(),
            summary.failed(),
            args.output_dir.display()
        );
    }

    println!(
        "\nCollected {} media items from {}",
        manifest.total_media, seed
    );

    Ok(())
}

/// Handles the probe subcommand
async fn handle_probe(config: &Config, args: ProbeArgs, cancel: CancelFlag) -> anyhow::Result<()> {
    let identifiers = match (&args.target.username, &args.target.wordlist) {
        (Some(username), None) => vec![username.clone()],
        (None, Some(path)) => {
            let words = load_wordlist(path).context("failed to read wordlist")?;
            anyhow::ensure!(!words.is_empty(), "wordlist contains no usernames");
            println!("Loaded {} usernames from {}", words.len(), path.display());
            words
        }
        _ => unreachable!("clap enforces exactly one target"),
    };

    std::fs::create_dir_all(&args.output_dir).context("output directory is not usable")?;

    let fetcher = Fetcher::new(&config.client.to_client_config())?;
    let registry = PlatformRegistry::builtin();
    let options = ProbeOptions {
        workers: args.workers.unwrap_or(config.probe.workers),
        rate_limit_pause: Duration::from_millis(config.probe.rate_limit_pause_ms),
        cancel: cancel.clone(),
    };

    let total = identifiers.len();
    for (i, identifier) in identifiers.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        if total > 1 {
            println!("\n[{}/{}] Searching: {}", i + 1, total, identifier);
        }

        let records = run_probe(identifier, &registry, &fetcher, &options).await;

        for record in &records {
            let extra = record
                .display_name
                .as_deref()
                .map(|name| format!(" ({})", name))
                .unwrap_or_default();
            println!(
                "  [{}] {}: {}{}",
                record.status.label(),
                record.platform,
                record.url,
                extra
            );
        }

        let report = ProbeReport::new(identifier, records);
        println!(
            "Found on {} of {} platforms",
            report.total_found, report.total_checked
        );

        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let json_path = args
            .output_dir
            .join(format!("probe_results_{}_{}.json", identifier, stamp));
        let csv_path = args
            .output_dir
            .join(format!("probe_results_{}_{}.csv", identifier, stamp));
        report.write_json(&json_path)?;
        report.write_csv(&csv_path)?;
        println!("Results saved to {}", json_path.display());

        // Keep a gap between identifiers so hosts see a slow trickle
        if i + 1 < total {
            politeness_pause(
                Duration::from_millis(config.probe.wordlist_delay_ms),
                false,
            )
            .await;
        }
    }

    Ok(())
}

/// Handles the pages subcommand
async fn handle_pages(config: &Config, args: PagesArgs, cancel: CancelFlag) -> anyhow::Result<()> {
    let base = normalize_url(&args.base_url).context("invalid base URL")?;
    let fetcher = Fetcher::new(&config.client.to_client_config())?;

    let probe_fetcher = fetcher.clone();
    let probe_base = base.clone();
    let probe = move |index: u64| {
        let fetcher = probe_fetcher.clone();
        let base = probe_base.clone();
        async move { page_exists(&fetcher, &base, index).await }
    };

    let pages = match args.mode {
        ScanMode::Binary => {
            let upper = args.upper_bound.unwrap_or(config.pages.upper_bound);
            let delay = Duration::from_millis(config.pages.probe_delay_ms);
            println!("Binary search up to page {}...", upper);
            match find_max_page(probe, upper, delay).await {
                Some(max) => (0..=max).collect(),
                None => Vec::new(),
            }
        }
        ScanMode::Linear => {
            let timeout =
                Duration::from_secs(args.scan_timeout.unwrap_or(config.pages.scan_timeout));
            let delay = Duration::from_millis(config.pages.linear_delay_ms);
            let step = args.step.unwrap_or(config.pages.step);
            println!("Linear scan from page {} (step {})...", args.start, step);
            scan_linear(probe, args.start, step, timeout, delay).await
        }
    };

    if pages.is_empty() {
        println!("No pages found under {}", base);
        return Ok(());
    }

    std::fs::create_dir_all(&args.output_dir).context("output directory is not usable")?;

    let report = PagesReport::new(base.as_str(), pages.clone());
    report.write_urls(&args.output_dir.join("urls.txt"))?;
    report.write_json(&args.output_dir.join("summary.json"))?;

    if args.scrape {
        let dumps = scrape_pages(
            &fetcher,
            &base,
            &pages,
            config.pages.scrape_workers,
            &cancel,
        )
        .await;
        PagesReport::write_page_dumps(&args.output_dir, &dumps)?;
        println!("Scraped {} pages", dumps.len());
    }

    println!(
        "Found {} pages under {} (results in {})",
        report.total_pages,
        base,
        args.output_dir.display()
    );

    Ok(())
}

/// Handles the feed subcommand
async fn handle_feed(config: &Config, args: FeedArgs, cancel: CancelFlag) -> anyhow::Result<()> {
    let credentials = config.credentials.as_ref().context(
        "feed access requires a [credentials] section in the configuration file",
    )?;

    let client = FeedClient::connect(credentials, &FeedEndpoints::default()).await?;
    let submissions = client.list_submissions(&args.user, args.limit).await?;

    if submissions.is_empty() {
        println!("No submissions found for {}", args.user);
        return Ok(());
    }

    let mut items = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for submission in &submissions {
        for item in extract_feed_items(submission) {
            if seen.insert(item.url.clone()) {
                items.push(item);
            }
        }
    }

    println!(
        "Found {} media items across {} submissions",
        items.len(),
        submissions.len()
    );

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| Path::new("downloads").join(&args.user));
    std::fs::create_dir_all(&output_dir).context("output directory is not usable")?;

    FeedMetadata::new(&args.user, submissions.len(), &items)
        .write(&output_dir.join("metadata.json"))?;

    let records = to_resource_records(&items, &client.source_page());
    let fetcher = Fetcher::new(&config.client.to_client_config())?;
    let downloader = Downloader::new(
        fetcher,
        args.workers.unwrap_or(config.download.workers),
        RetryPolicy::with_max_attempts(config.download.max_attempts),
    )
    .with_cancel(cancel);

    let outcomes = downloader.download_all(&records, &output_dir).await?;
    let summary = DownloadSummary::from_outcomes(outcomes);
    summary.write(&output_dir.join("download_summary.json"))?;

    println!(
        "Downloaded {} files ({} skipped, {} failed) into {}",
        summary.downloaded(),
        summary.skipped(),
        summary.failed(),
        output_dir.display()
    );

    Ok(())
}
