/*!
 * Bounded fan-out for independent tool jobs.
 *
 * Jobs run with at most `max_workers` in flight. The pool waits for every
 * job to finish before returning, then reports the first failure (in
 * completion order) if any job failed. Sibling jobs are never cancelled.
 */

use anyhow::Result;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use std::future::Future;

/// Progress bar for `total` jobs, styled like the rest of the CLI
pub fn job_progress_bar(total: usize, label: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ({percent}%) {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar.set_message(label.to_string());
    progress_bar
}

/// Run `job_fn` over `jobs` with bounded concurrency and a barrier at the end
pub async fn run_jobs<J, T, F, Fut>(label: &str, jobs: Vec<J>, max_workers: usize, job_fn: F) -> Result<Vec<T>>
where
    F: Fn(J) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let total = jobs.len();
    let progress_bar = job_progress_bar(total, label);

    let results = stream::iter(jobs)
        .map(|job| {
            let pb = progress_bar.clone();
            let job_future = job_fn(job);
            async move {
                let result = job_future.await;
                pb.inc(1);
                result
            }
        })
        .buffer_unordered(max_workers.max(1))
        .collect::<Vec<_>>()
        .await;

    progress_bar.finish_and_clear();

    let mut outputs = Vec::with_capacity(total);
    let mut first_error = None;
    let mut failures = 0usize;

    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(e) => {
                failures += 1;
                error!("{} job failed: {:#}", label, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e.context(format!("{} of {} {} jobs failed", failures, total, label))),
        None => Ok(outputs),
    }
}
