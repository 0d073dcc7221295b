use lazy_static::lazy_static;
use reqwest::Url;

mod task;
mod tasks;

pub use task::{TaskPage, TaskPageBuilder};
pub use tasks::{TasksPage, TasksPageBuilder};

lazy_static! {
    pub static ref BASE_URL: Url = Url::parse("https://atcoder.jp").unwrap();
}
