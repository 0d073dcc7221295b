#![warn(clippy::all)]

use structopt::StructOpt;

mod abs_path;
mod console;
mod macros;
mod model;
mod service;
mod storage;

pub use abs_path::AbsPathBuf;
pub use console::Console;
pub use model::ScrapeOutcome;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct Opt {
    /// Url of the contest page (e.g. https://atcoder.jp/contests/abc100)
    #[structopt(name = "url")]
    contest_url: String,
}

impl Opt {
    pub fn run(&self, cnsl: &mut Console) -> Result<ScrapeOutcome> {
        let base_dir = AbsPathBuf::cwd()?;
        service::scrape_contest(&self.contest_url, &base_dir, cnsl)
    }
}
