use std::io::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use indicatif::ProgressBar;
use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::Url;

mod page;
mod retry;
mod scrape;

use self::page::{TaskPageBuilder, TasksPageBuilder};
use self::retry::with_backoff;
use crate::console::{Console, Reporter};
use crate::model::{ContestRef, Problem, ScrapeOutcome, TaskOutcome};
use crate::{storage, AbsPathBuf, Result};

/// Upper bound on task fetches in flight at any instant.
static TASK_CONCURRENCY: usize = 3;
/// Idle gap between fetch waves, to rate-limit the remote host.
static WAVE_PAUSE: Duration = Duration::from_millis(500);
static RETRY_ATTEMPTS: usize = 3;
static TASK_RETRY_DELAY: Duration = Duration::from_millis(1000);
static LISTING_RETRY_DELAY: Duration = Duration::from_millis(2000);
static CLIENT_TIMEOUT: Duration = Duration::from_secs(30);
static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn scrape_contest(
    contest_url: &str,
    base_dir: &AbsPathBuf,
    cnsl: &mut Console,
) -> Result<ScrapeOutcome> {
    let contest = ContestRef::from_url(contest_url)?;
    let contest_dir = storage::contest_dir(base_dir, &contest);

    writeln!(cnsl, "Contest : {}", contest.full_name())?;
    writeln!(cnsl, "Type    : {}", contest.kind().to_uppercase())?;
    writeln!(cnsl, "Number  : {}", contest.number())?;
    writeln!(cnsl, "Url     : {}", contest_url)?;
    writeln!(cnsl, "Save to : {}", contest_dir.strip_prefix_if(Some(base_dir)).display())?;
    writeln!(cnsl, "Concurrency : {}", TASK_CONCURRENCY)?;
    writeln!(cnsl)?;

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Some(CLIENT_TIMEOUT))
        .build()?;

    let reporter = Reporter::new(cnsl);

    reporter.info("Fetching task listing ...");
    let task_urls = with_backoff(
        RETRY_ATTEMPTS,
        LISTING_RETRY_DELAY,
        |attempt, err| {
            reporter.warn(&format!(
                "Retrying task listing ({}/{}) : {}",
                attempt, RETRY_ATTEMPTS, err
            ))
        },
        || {
            TasksPageBuilder::new(&contest)
                .build(&client)?
                .extract_task_urls()
        },
    )
    .context("Could not fetch task listing")?;
    reporter.info(&format!("Found {} tasks", task_urls.len()));

    let completed = AtomicUsize::new(0);
    let total = task_urls.len();
    let pb = reporter
        .with_console(|cnsl| Ok(cnsl.build_pb_count(total as u64)))
        .unwrap_or_else(|_| ProgressBar::hidden());

    let outcomes = run_in_waves(&task_urls, TASK_CONCURRENCY, WAVE_PAUSE, |url| {
        let outcome = scrape_task(&client, &contest, &contest_dir, base_dir, url, &reporter);
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        pb.inc(1);
        if outcome.is_success() {
            reporter.progress(done, total, &format!("{} completed", outcome.derived_id()));
        }
        outcome
    });
    pb.finish_and_clear();

    let outcome = ScrapeOutcome::from_outcomes(contest.clone(), &outcomes);
    reporter.with_console(|cnsl| write_summary(&outcome, cnsl))?;

    let problems: Vec<&Problem> = outcomes.iter().filter_map(TaskOutcome::problem).collect();
    reporter.with_console(|cnsl| {
        storage::save_contest_index(&contest, &contest_dir, base_dir, &problems, contest_url, cnsl)
    })
    .context("Could not save contest index")?;

    Ok(outcome)
}

/// Runs `op` over fixed-size waves of items.
///
/// All fetches in a wave are issued together and awaited together; the next
/// wave starts only after the whole wave settled and the pause elapsed.
/// Results keep item order.
fn run_in_waves<I: Sync, T: Send>(
    items: &[I],
    concurrency: usize,
    pause: Duration,
    op: impl Fn(&I) -> T + Sync,
) -> Vec<T> {
    let mut results = Vec::with_capacity(items.len());
    for (i, wave) in items.chunks(concurrency).enumerate() {
        if i > 0 {
            thread::sleep(pause);
        }
        let wave_results: Vec<T> = wave.par_iter().map(|item| op(item)).collect();
        results.extend(wave_results);
    }
    results
}

/// Fetches, extracts and saves one problem; never propagates a failure.
fn scrape_task(
    client: &Client,
    contest: &ContestRef,
    contest_dir: &AbsPathBuf,
    base_dir: &AbsPathBuf,
    url: &Url,
    reporter: &Reporter,
) -> TaskOutcome {
    let derived_id = url
        .path_segments()
        .and_then(|segs| segs.last())
        .unwrap_or("unknown")
        .to_owned();

    let result = with_backoff(
        RETRY_ATTEMPTS,
        TASK_RETRY_DELAY,
        |attempt, err| {
            reporter.warn(&format!(
                "Retry {}/{} for {} : {}",
                attempt, RETRY_ATTEMPTS, derived_id, err
            ))
        },
        || {
            let page = TaskPageBuilder::new(url).build(client)?;
            Ok(page.extract_problem(url))
        },
    )
    .and_then(|problem| {
        warn_if_degenerate(&problem, &derived_id, reporter);
        reporter.with_console(|cnsl| {
            storage::save_problem(contest, contest_dir, base_dir, &problem, cnsl)
        })?;
        Ok(problem)
    });

    if let Err(err) = &result {
        reporter.warn(&format!(
            "Failed {} after {} attempts : {}",
            derived_id, RETRY_ATTEMPTS, err
        ));
    }
    TaskOutcome::new(url.as_str(), derived_id, result)
}

fn warn_if_degenerate(problem: &Problem, derived_id: &str, reporter: &Reporter) {
    if problem.id().is_empty() || problem.statement().is_empty() || problem.test_cases().is_empty()
    {
        reporter.warn(&format!(
            "Extracted problem {} looks incomplete (id: {:?}, statement: {} chars, samples: {})",
            derived_id,
            problem.id(),
            problem.statement().len(),
            problem.n_test_cases()
        ));
    }
}

fn write_summary(outcome: &ScrapeOutcome, cnsl: &mut Console) -> Result<()> {
    writeln!(cnsl)?;
    writeln!(cnsl, "Scraping Summary")?;
    writeln!(cnsl, "  Total        : {}", outcome.total())?;
    writeln!(cnsl, "  Successful   : {}", outcome.succeeded())?;
    writeln!(cnsl, "  Failed       : {}", outcome.n_failed())?;
    writeln!(cnsl, "  Success Rate : {:.1}%", outcome.success_rate())?;
    if !outcome.failed_ids().is_empty() {
        writeln!(cnsl, "Failed problems:")?;
        for failed_id in outcome.failed_ids() {
            writeln!(cnsl, "  - {}", failed_id)?;
        }
    }
    writeln!(cnsl)?;
    Ok(())
}
