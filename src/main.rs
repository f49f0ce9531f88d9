//! slugmap is a CLI tool that crawls a website's sitemap.xml and asks an AI
//! provider to propose SEO-friendly, geo-targeted slugs for every page.
//!
//! The tool has five commands:
//! 1. `crawl` - Lists the page URLs of a sitemap
//! 2. `validate` - Checks the API key of a provider
//! 3. `optimize` - Crawls a sitemap and stores proposed slugs in a local database
//! 4. `edit` - Changes one proposed slug in the database
//! 5. `report` - Writes the stored results to a file for review

use std::fs;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info};

use slugmap::{
    KeyProbe, OptimizeJob, Provider, ProviderConfig, ReportFormat, SitemapCrawler, SlugClient,
    constants::{DEFAULT_RELAY, MODEL_API_KEY_ENV_NAME, URL_BATCH_SIZE},
    optimize::optimize_sitemap,
    report::report,
    storage::Storage,
};

/// A CLI tool to propose SEO-friendly slugs for every page of a sitemap.xml
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl a sitemap (and nested sitemap indexes) and print the page URLs
    Crawl {
        /// The sitemap URL to crawl
        url: String,
        /// Fetch through a CORS relay prefix (default relay if no value is given)
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_RELAY)]
        relay: Option<String>,
    },
    /// Check whether the API key in SLUGMAP_API_KEY is accepted by the provider
    Validate {
        /// AI provider: "gemini", "openai", "claude" or "openrouter"
        #[arg(long, short, default_value = "gemini")]
        provider: Provider,
        /// Send Claude requests through a CORS relay prefix
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_RELAY)]
        relay: Option<String>,
    },
    /// Crawl a sitemap, propose slugs for every page and store them in a database
    Optimize {
        /// The sitemap URL to crawl
        url: String,
        /// Locality to work into slugs where it fits, e.g. "San Francisco"
        geo_target: String,
        /// Path to database file to store results in (previous results are replaced)
        db: String,
        /// AI provider: "gemini", "openai", "claude" or "openrouter"
        #[arg(long, short, default_value = "gemini")]
        provider: Provider,
        /// Model name (defaults to the provider's first model, required for openrouter)
        #[arg(long, short)]
        model: Option<String>,
        /// Fetch sitemaps and Claude requests through a CORS relay prefix
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_RELAY)]
        relay: Option<String>,
        /// Number of URLs sent to the provider per request
        #[arg(long, short, default_value_t = URL_BATCH_SIZE)]
        batch_size: usize,
        /// Rate limit: requests per minute (default: no limit)
        #[arg(long, short = 'r')]
        rpm: Option<u32>,
        /// Path to the file with a prompt template ({geo_target} and {urls} are substituted)
        #[arg(long)]
        prompt_file: Option<String>,
    },
    /// Replace the proposed slug of one stored result
    Edit {
        /// Path to database file holding the results
        db: String,
        /// Id of the result to change
        id: i64,
        /// New proposed slug
        slug: String,
    },
    /// Write the stored results to a file
    Report {
        /// Path to database file holding the results
        db: String,
        /// Path to output file to write the results to
        output_file: String,
        /// Output format: "json" (default) or "tsv"
        #[arg(long, short, default_value = "json")]
        format: ReportFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Crawl { url, relay } => handle_crawl_command(url, relay).await,
        Command::Validate { provider, relay } => {
            if check_api_key(provider, &api_key(), relay.as_deref()).await {
                Ok(())
            } else {
                bail!("{provider} API key is invalid.")
            }
        }
        Command::Optimize {
            url,
            geo_target,
            db,
            provider,
            model,
            relay,
            batch_size,
            rpm,
            prompt_file,
        } => {
            let job = OptimizeJob {
                sitemap_url: &url,
                geo_target: &geo_target,
                db_path: &db,
                batch_size,
                rpm,
            };
            handle_optimize_command(job, provider, model, relay, prompt_file).await
        }
        Command::Edit { db, id, slug } => handle_edit_command(&db, id, &slug),
        Command::Report {
            db,
            output_file,
            format,
        } => report(&db, &output_file, format),
    }
}

async fn handle_crawl_command(url: String, relay: Option<String>) -> Result<()> {
    let crawler = match relay {
        Some(relay) => SitemapCrawler::new().with_relay(relay),
        None => SitemapCrawler::new(),
    };

    for url in crawler.crawl(&url).await? {
        println!("{url}");
    }

    Ok(())
}

async fn handle_optimize_command(
    job: OptimizeJob<'_>,
    provider: Provider,
    model: Option<String>,
    relay: Option<String>,
    prompt_file: Option<String>,
) -> Result<()> {
    if job.geo_target.trim().is_empty() {
        bail!("Geo-target must not be empty.");
    }

    let api_key = api_key();
    if !check_api_key(provider, &api_key, relay.as_deref()).await {
        bail!("{provider} API key is invalid, set a valid key in {MODEL_API_KEY_ENV_NAME}.");
    }

    let mut client = SlugClient::new(ProviderConfig::new(provider, api_key, model)?);
    let mut crawler = SitemapCrawler::new();
    if let Some(relay) = relay {
        client = client.with_relay(relay.clone());
        crawler = crawler.with_relay(relay);
    }
    if let Some(file) = prompt_file {
        let template =
            fs::read_to_string(&file).context(format!("Failed to read prompt file: {file}"))?;
        client = client.with_prompt_template(template);
    }

    info!(
        "Optimizing slugs with {provider} ({})",
        client.config().model()
    );
    optimize_sitemap(&crawler, &client, &job).await?;

    Ok(())
}

fn handle_edit_command(db: &str, id: i64, slug: &str) -> Result<()> {
    let storage = Storage::new(db)?;
    if !storage.update_proposed_slug(id, slug)? {
        bail!("No result with id {id} in {db}");
    }

    info!("Proposed slug of {id} is now {slug}");
    Ok(())
}

async fn check_api_key(provider: Provider, api_key: &str, relay: Option<&str>) -> bool {
    let probe = match relay {
        Some(relay) => KeyProbe::new(provider).with_relay(relay),
        None => KeyProbe::new(provider),
    };

    let valid = probe.validate(api_key).await;
    if valid {
        info!("{provider} API key is valid!");
    }
    valid
}

fn api_key() -> String {
    match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(api_key) => api_key,
        Err(err) => {
            info!("{err} while reading {MODEL_API_KEY_ENV_NAME}");
            String::new()
        }
    }
}
