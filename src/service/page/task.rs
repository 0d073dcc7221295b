use regex::Captures;
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::macros::{regex, select};
use crate::model::{Problem, TestCase};
use crate::service::scrape::{Fetch, Scrape};
use crate::Result;

/// Headings whose text marks a sample block instead of prose.
static SAMPLE_INPUT_LABELS: &[&str] = &["入力例", "Sample Input"];
static SAMPLE_OUTPUT_LABELS: &[&str] = &["出力例", "Sample Output"];

/// Separator between rendered blocks and between sections.
static SECTION_SEP: &str = "\n\n\n\n";

type BlockPredicate = fn(&ElementRef) -> bool;

/// Sibling blocks excluded from section content, checked in order:
/// copy/editorial buttons, sample io decoration, sample footers, and any
/// block with an embedded button.
static SKIP_RULES: &[BlockPredicate] = &[
    |elem| has_class(elem, "btn"),
    |elem| has_class(elem, "io-style"),
    |elem| has_class(elem, "sample-footer"),
    |elem| elem.select(select!(".btn")).next().is_some(),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPageBuilder<'a> {
    url: &'a Url,
}

impl<'a> TaskPageBuilder<'a> {
    pub fn new(url: &'a Url) -> Self {
        Self { url }
    }

    pub fn build(self, client: &Client) -> Result<TaskPage> {
        self.fetch(client).map(TaskPage::new)
    }
}

impl Fetch for TaskPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        Ok(self.url.clone())
    }
}

#[derive(Debug, Clone)]
pub struct TaskPage {
    content: Html,
}

impl TaskPage {
    fn new(content: Html) -> Self {
        Self { content }
    }

    /// Extracts a `Problem` from the page, best-effort.
    ///
    /// Fields that cannot be located come back empty instead of failing;
    /// the caller decides whether a degenerate problem is worth a warning.
    pub fn extract_problem(&self, url: &Url) -> Problem {
        let (id, title) = self.extract_id_title();
        let time_limit = self.extract_limit("Time Limit:");
        let memory_limit = self.extract_limit("Memory Limit:");
        let (statement, test_cases) = match self.find_first(select!("#task-statement")) {
            Some(root) => {
                let statement = StatementElem(root);
                (statement.extract_statement(), statement.extract_test_cases())
            }
            None => (String::new(), Vec::new()),
        };
        Problem::new(
            id,
            title,
            url.as_str(),
            time_limit,
            memory_limit,
            statement,
            test_cases,
        )
    }

    fn extract_id_title(&self) -> (String, String) {
        let title_text = self
            .find_first(select!("span.h2"))
            .map(|elem| elem.inner_text().trim().to_owned())
            .unwrap_or_default();
        let mut id_title = title_text.splitn(2, " - ");
        let id = id_title.next().unwrap_or("").trim().to_owned();
        let title = id_title.next().unwrap_or("").trim().to_owned();
        (id, title)
    }

    fn extract_limit(&self, label: &str) -> String {
        self.elem()
            .select(select!("p"))
            .map(|p| p.inner_text())
            .find(|text| text.contains(label))
            .map(|text| text.replacen(label, "", 1).trim().to_owned())
            .unwrap_or_default()
    }
}

impl Scrape for TaskPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

/// The `#task-statement` container holding the language variants.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatementElem<'a>(ElementRef<'a>);

impl StatementElem<'_> {
    /// Prefers the Japanese variant, then the English one, then the whole
    /// container. Contests without a translation only have the container.
    fn variant(&self) -> ElementRef {
        self.find_first(select!(".lang-ja"))
            .or_else(|| self.find_first(select!(".lang-en")))
            .unwrap_or(self.0)
    }

    fn extract_statement(&self) -> String {
        let mut sections = Vec::new();
        for heading in self.variant().select(select!("h3")) {
            let heading_text = heading.inner_text().trim().to_owned();
            if is_sample_heading(&heading_text) {
                continue;
            }
            let blocks = collect_section_blocks(heading);
            if blocks.is_empty() {
                continue;
            }
            sections.push(format!(
                "## {}\n\n{}",
                heading_text,
                blocks.join(SECTION_SEP)
            ));
        }
        sections.join(SECTION_SEP)
    }

    fn extract_test_cases(&self) -> Vec<TestCase> {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for part in self.variant().select(select!(".part")) {
            let heading = match part.select(select!("h3")).next() {
                Some(h3) => h3.inner_text(),
                None => continue,
            };
            let heading = heading.trim().to_owned();
            let pre_text = part
                .select(select!("pre"))
                .next()
                .map(|pre| pre.inner_text().trim().to_owned());
            if contains_any(&heading, SAMPLE_INPUT_LABELS) {
                if let Some(text) = pre_text.clone() {
                    inputs.push(text);
                }
            }
            if contains_any(&heading, SAMPLE_OUTPUT_LABELS) {
                if let Some(text) = pre_text {
                    outputs.push(text);
                }
            }
        }
        // strictly positional pairing; unmatched trailing samples are dropped
        inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, output)| TestCase::new(input, output))
            .collect()
    }
}

impl Scrape for StatementElem<'_> {
    fn elem(&self) -> ElementRef {
        self.0
    }
}

/// Accumulates the siblings of `heading` up to the next `h3`, excluding UI
/// affordances and noise-only text.
fn collect_section_blocks(heading: ElementRef) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut sibling = heading.next_sibling();
    while let Some(node) = sibling {
        if let Some(elem) = ElementRef::wrap(node) {
            if elem.value().name() == "h3" {
                break;
            }
            if !SKIP_RULES.iter().any(|applies| applies(&elem)) {
                let text = elem.inner_text();
                if !is_noise_text(text.trim()) {
                    blocks.push(render_block(elem));
                }
            }
        }
        sibling = node.next_sibling();
    }
    blocks
}

/// Renders one content block to text.
///
/// Tabular and preformatted blocks keep their markup (with `<var>` rewritten
/// to `$...$` math notation); ordinary blocks collapse to plain trimmed text.
fn render_block(elem: ElementRef) -> String {
    let name = elem.value().name();
    let html = convert_var_to_math(&elem.inner_html());
    if name == "table"
        || name == "center"
        || name == "pre"
        || elem.select(select!("table")).next().is_some()
    {
        return html;
    }
    let fragment = Html::parse_fragment(&html);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Rewrites `<var>x</var>` to `$x$`, undoing entity escapes inside the var.
fn convert_var_to_math(html: &str) -> String {
    regex!(r"(?s)<var>(.*?)</var>")
        .replace_all(html, |caps: &Captures| {
            let decoded = caps[1]
                .replace("&lt;", "<")
                .replace("&gt;", ">")
                .replace("&amp;", "&")
                .replace("&quot;", "\"")
                .replace("&#39;", "'");
            format!("${}$", decoded)
        })
        .into_owned()
}

fn is_sample_heading(text: &str) -> bool {
    contains_any(text, SAMPLE_INPUT_LABELS) || contains_any(text, SAMPLE_OUTPUT_LABELS)
}

fn is_noise_text(text: &str) -> bool {
    text.is_empty()
        || text == "Editorial"
        || text == "Copy"
        || regex!(r"(?i)^Editorial\s*$").is_match(text)
}

fn contains_any(text: &str, labels: &[&str]) -> bool {
    labels.iter().any(|label| text.contains(label))
}

fn has_class(elem: &ElementRef, class: &str) -> bool {
    elem.value().classes().any(|c| c == class)
}
