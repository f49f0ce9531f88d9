//! The optimize module crawls a sitemap and feeds its URLs to an AI provider in
//! sequential batches, storing the proposed slugs as each batch completes.

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use rate_guard::{RateLimit, StdTokenBucket, TokenBucketBuilder};
use std::time::Duration;

use crate::client::SlugOptimizer;
use crate::sitemap::SitemapCrawler;
use crate::slug::SlugResult;
use crate::storage::Storage;

/// Configuration containing shared data for optimization batches
pub struct OptimizeContext<'a> {
    /// Provider client that proposes the slugs
    pub optimizer: &'a dyn SlugOptimizer,
    /// Locality the provider should weave into slugs where it fits
    pub geo_target: &'a str,
    /// Number of URLs sent per request
    pub batch_size: usize,
    /// Rate limiter for controlling request frequency
    pub rate_limiter: Option<&'a StdTokenBucket>,
}

/// Outcome of [`optimize_urls`].
///
/// `results` holds everything produced before the run stopped, `failure` the
/// error that stopped it, if any.
#[derive(Debug)]
pub struct OptimizeReport {
    pub results: Vec<SlugResult>,
    pub failure: Option<anyhow::Error>,
}

/// Settings of a whole sitemap optimization run.
pub struct OptimizeJob<'a> {
    pub sitemap_url: &'a str,
    pub geo_target: &'a str,
    pub db_path: &'a str,
    pub batch_size: usize,
    pub rpm: Option<u32>,
}

/// Builds a token bucket that lets through `rpm` requests per minute.
pub fn build_rate_limiter(rpm: Option<u32>) -> Option<StdTokenBucket> {
    rpm.and_then(|rpm| {
        let capacity = rpm.max(1) as u64;
        let refill_interval = Duration::from_secs_f64(60.0 / capacity as f64);

        TokenBucketBuilder::builder()
            .capacity(capacity)
            .refill_amount(1_u64)
            .refill_every(refill_interval)
            .with_time(rate_guard::StdTimeSource::new())
            .with_precision::<rate_guard::Nanos>()
            .build()
            .ok()
    })
}

/// Crawls a sitemap, proposes slugs for every page and stores them in the database.
///
/// Previously stored results are removed first. Batches run one after another;
/// each successful batch is stored before the next one starts, so a failure
/// leaves the earlier batches in the database.
///
/// # Arguments
///
/// * `crawler` - Crawler used to resolve the sitemap
/// * `optimizer` - Provider client that proposes the slugs
/// * `job` - Sitemap, geo-target, database and batching settings
///
/// # Returns
///
/// Returns the number of stored results
///
/// # Errors
///
/// Returns an error if:
/// * Database operations fail
/// * The sitemap cannot be crawled
/// * A batch fails, after the earlier batches were stored
pub async fn optimize_sitemap(
    crawler: &SitemapCrawler,
    optimizer: &dyn SlugOptimizer,
    job: &OptimizeJob<'_>,
) -> Result<usize> {
    let storage = Storage::new(job.db_path)?;
    let removed = storage.clear()?;
    if removed > 0 {
        debug!("Removed {removed} results of the previous run from {}", job.db_path);
    }

    let urls = crawler
        .crawl(job.sitemap_url)
        .await
        .context("Sitemap crawling failed")?;

    if urls.is_empty() {
        warn!("No URLs found in the provided sitemap.");
        return Ok(0);
    }
    info!("Found {} URLs. Starting optimization...", urls.len());

    let rate_limiter = build_rate_limiter(job.rpm);
    let ctx = OptimizeContext {
        optimizer,
        geo_target: job.geo_target,
        batch_size: job.batch_size,
        rate_limiter: rate_limiter.as_ref(),
    };

    let report = optimize_urls(&ctx, &urls, |batch| storage.insert_results(batch)).await;

    match report.failure {
        Some(failure) => Err(failure.context(format!(
            "Optimization stopped, {} of {} results were stored in {}",
            report.results.len(),
            urls.len(),
            job.db_path
        ))),
        None => {
            info!(
                "Optimization complete! Stored {} results in {}",
                report.results.len(),
                job.db_path
            );
            Ok(report.results.len())
        }
    }
}

/// Proposes slugs for `urls` in sequential batches.
///
/// A batch starts only after the previous one resolved. Every successful
/// batch is handed to `on_batch` before it is added to the report. The first
/// failing batch, or a failing `on_batch`, stops the run; results of earlier
/// batches are kept. Result ids strictly increase across batches.
pub async fn optimize_urls<F>(
    ctx: &OptimizeContext<'_>,
    urls: &[String],
    mut on_batch: F,
) -> OptimizeReport
where
    F: FnMut(&[SlugResult]) -> Result<()>,
{
    let total = urls.len();
    let mut results = Vec::with_capacity(total);
    let mut next_id = i64::MIN;

    for (index, batch) in urls.chunks(ctx.batch_size.max(1)).enumerate() {
        let start = index * ctx.batch_size.max(1) + 1;
        let end = start + batch.len() - 1;
        info!("Analyzing URLs {start}-{end} of {total}...");

        if let Some(limiter) = ctx.rate_limiter {
            wait_for_token(limiter).await;
        }

        let id_base = chrono::Utc::now().timestamp_millis().max(next_id);
        let batch_results = match ctx.optimizer.optimize_batch(batch, ctx.geo_target, id_base).await {
            Ok(batch_results) if batch_results.len() == batch.len() => batch_results,
            Ok(batch_results) => {
                return OptimizeReport {
                    results,
                    failure: Some(anyhow!(
                        "Optimizer returned {} results for {} URLs",
                        batch_results.len(),
                        batch.len()
                    )),
                };
            }
            Err(err) => {
                return OptimizeReport {
                    results,
                    failure: Some(err.into()),
                };
            }
        };

        if let Err(err) = on_batch(&batch_results) {
            return OptimizeReport {
                results,
                failure: Some(err),
            };
        }

        next_id = batch_results
            .iter()
            .map(SlugResult::id)
            .max()
            .map_or(id_base, |id| id + 1);
        results.extend(batch_results);
    }

    OptimizeReport {
        results,
        failure: None,
    }
}

async fn wait_for_token(limiter: &StdTokenBucket) {
    loop {
        match limiter.try_acquire(1) {
            Ok(()) => break,
            Err(_) => {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
