use anyhow::anyhow;
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::Result;

pub trait Fetch {
    fn url(&self) -> Result<Url>;

    fn fetch(&self, client: &Client) -> Result<Html> {
        let res = client.get(self.url()?).send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("Received response with status : {}", status));
        }
        let text = res.text()?;
        Ok(Html::parse_document(&text))
    }
}

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }

    fn inner_text(&self) -> String {
        self.elem().text().fold(String::new(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }
}

impl Scrape for ElementRef<'_> {
    fn elem(&self) -> ElementRef {
        *self
    }
}
