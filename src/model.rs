use std::fmt;

use anyhow::anyhow;
use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::macros::regex;
use crate::{Error, Result};

/// Normalized identifier of a contest, derived once from a contest url.
///
/// Regular contests (`abc100`, `arc180`, ...) split into a kind and a
/// zero-padded sequence number. Irregular slugs (`typical90`, `dp`, ...)
/// fall back to kind `other` with the slug itself as the number.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct ContestRef {
    kind: String,
    number: String,
    full_name: String,
}

impl ContestRef {
    pub fn from_url(contest_url: &str) -> Result<Self> {
        let caps = regex!(r"contests/([^/]+)")
            .captures(contest_url)
            .ok_or_else(|| anyhow!("Invalid contest url : {}", contest_url))?;
        let full_name = caps[1].to_owned();
        match regex!(r"^([a-z]+)(\d+)$").captures(&full_name) {
            Some(caps) => Ok(Self {
                kind: caps[1].to_owned(),
                number: format!("{:0>3}", &caps[2]),
                full_name,
            }),
            None => Ok(Self {
                kind: "other".to_owned(),
                number: full_name.clone(),
                full_name,
            }),
        }
    }
}

impl fmt::Display for ContestRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// A paired sample input and output, stored verbatim.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct TestCase {
    input: String,
    output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// A single problem as extracted from its page.
///
/// All fields are kept as raw strings; a malformed page yields empty fields
/// rather than an error. `id` keeps the casing shown on the page and is
/// lower-cased only when building storage paths.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Problem {
    id: String,
    title: String,
    url: String,
    time_limit: String,
    memory_limit: String,
    statement: String,
    test_cases: Vec<TestCase>,
}

impl Problem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        time_limit: impl Into<String>,
        memory_limit: impl Into<String>,
        statement: impl Into<String>,
        test_cases: Vec<TestCase>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            time_limit: time_limit.into(),
            memory_limit: memory_limit.into(),
            statement: statement.into(),
            test_cases,
        }
    }

    pub fn n_test_cases(&self) -> usize {
        self.test_cases.len()
    }
}

/// Terminal result of one task url's fetch chain.
///
/// Constructed exactly once, after the retrier has given up or succeeded.
#[derive(Debug)]
pub struct TaskOutcome {
    url: String,
    derived_id: String,
    result: Result<Problem>,
}

impl TaskOutcome {
    pub fn new(
        url: impl Into<String>,
        derived_id: impl Into<String>,
        result: Result<Problem>,
    ) -> Self {
        Self {
            url: url.into(),
            derived_id: derived_id.into(),
            result,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn derived_id(&self) -> &str {
        &self.derived_id
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.result.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&Error> {
        self.result.as_ref().err()
    }
}

/// Aggregate report over all task urls of a contest scrape.
#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct ScrapeOutcome {
    contest: ContestRef,
    total: usize,
    succeeded: usize,
    failed_ids: Vec<String>,
}

impl ScrapeOutcome {
    pub fn from_outcomes(contest: ContestRef, outcomes: &[TaskOutcome]) -> Self {
        Self {
            contest,
            total: outcomes.len(),
            succeeded: outcomes.iter().filter(|o| o.is_success()).count(),
            failed_ids: outcomes
                .iter()
                .filter(|o| !o.is_success())
                .map(|o| o.derived_id().to_owned())
                .collect(),
        }
    }

    pub fn n_failed(&self) -> usize {
        self.failed_ids.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.succeeded as f64 / self.total as f64 * 100.0
        }
    }
}

impl fmt::Display for ScrapeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Scraped {}/{} problems from {} ({:.1}%)",
            self.succeeded,
            self.total,
            self.contest,
            self.success_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(id: &str) -> Problem {
        Problem::new(id, "name", "url", "2 sec", "1024 MB", "", Vec::new())
    }

    #[test]
    fn contest_ref_pads_number() -> Result<()> {
        let contest = ContestRef::from_url("https://atcoder.jp/contests/abc1")?;
        assert_eq!(contest.kind(), "abc");
        assert_eq!(contest.number(), "001");
        assert_eq!(contest.full_name(), "abc1");

        let contest = ContestRef::from_url("https://atcoder.jp/contests/arc180")?;
        assert_eq!(contest.kind(), "arc");
        assert_eq!(contest.number(), "180");
        Ok(())
    }

    #[test]
    fn contest_ref_irregular_slug() -> Result<()> {
        let contest = ContestRef::from_url("https://atcoder.jp/contests/typical90/")?;
        assert_eq!(contest.kind(), "other");
        assert_eq!(contest.number(), "typical90");
        assert_eq!(contest.full_name(), "typical90");
        Ok(())
    }

    #[test]
    fn contest_ref_rejects_non_contest_url() {
        assert!(ContestRef::from_url("https://atcoder.jp/ranking").is_err());
    }

    #[test]
    fn scrape_outcome_counts() -> Result<()> {
        let contest = ContestRef::from_url("https://atcoder.jp/contests/abc100")?;
        let outcomes = vec![
            TaskOutcome::new("https://atcoder.jp/contests/abc100/tasks/a", "a", Ok(problem("A"))),
            TaskOutcome::new("https://atcoder.jp/contests/abc100/tasks/b", "b", Err(anyhow!("boom"))),
            TaskOutcome::new("https://atcoder.jp/contests/abc100/tasks/c", "c", Ok(problem("C"))),
        ];
        let outcome = ScrapeOutcome::from_outcomes(contest, &outcomes);
        assert_eq!(*outcome.total(), 3);
        assert_eq!(*outcome.succeeded(), 2);
        assert_eq!(outcome.failed_ids(), &vec!["b".to_owned()]);
        assert!((outcome.success_rate() - 200.0 / 3.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn scrape_outcome_empty_contest() -> Result<()> {
        let contest = ContestRef::from_url("https://atcoder.jp/contests/abc100")?;
        let outcome = ScrapeOutcome::from_outcomes(contest, &[]);
        assert_eq!(outcome.success_rate(), 100.0);
        Ok(())
    }
}
