use anyhow::Context as _;
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::macros::select;
use crate::model::ContestRef;
use crate::service::page::BASE_URL;
use crate::service::scrape::{Fetch, Scrape};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasksPageBuilder<'a> {
    contest: &'a ContestRef,
}

impl<'a> TasksPageBuilder<'a> {
    pub fn new(contest: &'a ContestRef) -> Self {
        Self { contest }
    }

    pub fn build(self, client: &Client) -> Result<TasksPage> {
        self.fetch(client).map(TasksPage::new)
    }
}

impl Fetch for TasksPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        let path = format!("/contests/{}/tasks", self.contest.full_name());
        BASE_URL
            .join(&path)
            .context(format!("Could not parse url path : {}", path))
    }
}

#[derive(Debug, Clone)]
pub struct TasksPage {
    content: Html,
}

impl TasksPage {
    fn new(content: Html) -> Self {
        Self { content }
    }

    /// Collects task urls from the first table on the listing page.
    ///
    /// Row order is preserved and duplicate links are kept; rows without a
    /// link are skipped.
    pub fn extract_task_urls(&self) -> Result<Vec<Url>> {
        let table = self
            .find_first(select!("table"))
            .context("Could not find task listing table")?;
        let mut task_urls = Vec::new();
        for row in table.select(select!("tbody tr")) {
            let href = row
                .select(select!("td:first-child a"))
                .next()
                .and_then(|link| link.value().attr("href"));
            if let Some(href) = href {
                let url = BASE_URL
                    .join(href)
                    .with_context(|| format!("Could not parse task url : {}", href))?;
                task_urls.push(url);
            }
        }
        Ok(task_urls)
    }
}

impl Scrape for TasksPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TASK_LIST: &str = r#"
        <table class="table">
            <tbody>
                <tr><td><a href="/contests/abc100/tasks/abc100_a">A</a></td><td>Happy Birthday!</td></tr>
                <tr><td><a href="/contests/abc100/tasks/abc100_b">B</a></td><td>Ringo's Favorite Numbers</td></tr>
                <tr><td>no link here</td></tr>
                <tr><td><a href="/contests/abc100/tasks/abc100_a">A again</a></td><td>duplicate</td></tr>
            </tbody>
        </table>
        <table class="other">
            <tbody>
                <tr><td><a href="/contests/xyz999/tasks/xyz999_z">Z</a></td></tr>
            </tbody>
        </table>
    "#;

    #[test]
    fn extract_task_urls_in_row_order() -> Result<()> {
        let page = TasksPage::new(Html::parse_document(TASK_LIST));
        let urls = page.extract_task_urls()?;
        let urls: Vec<&str> = urls.iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://atcoder.jp/contests/abc100/tasks/abc100_a",
                "https://atcoder.jp/contests/abc100/tasks/abc100_b",
                "https://atcoder.jp/contests/abc100/tasks/abc100_a",
            ]
        );
        Ok(())
    }

    #[test]
    fn extract_task_urls_requires_table() {
        let page = TasksPage::new(Html::parse_document("<p>not a listing</p>"));
        assert!(page.extract_task_urls().is_err());
    }

    #[test]
    fn builder_url_appends_tasks_path() -> Result<()> {
        let contest = ContestRef::from_url("https://atcoder.jp/contests/abc100")?;
        let url = TasksPageBuilder::new(&contest).url()?;
        assert_eq!(url.as_str(), "https://atcoder.jp/contests/abc100/tasks");
        Ok(())
    }
}
