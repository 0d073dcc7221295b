use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use console::{style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::Result;

static PB_TICK_INTERVAL_MS: u64 = 50;
static PB_TEMPL_COUNT: &str =
    "{spinner:.green} {prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {per_sec} ETA {eta}";
static PB_PROGRESS_CHARS: &str = "#>-";

#[derive(Debug)]
enum Inner {
    Term(Term),
    Buf(Vec<u8>),
    Sink(io::Sink),
}

#[derive(Debug)]
pub struct Console {
    inner: Inner,
}

impl Console {
    pub fn term() -> Self {
        Self {
            inner: Inner::Term(Term::stderr()),
        }
    }

    pub fn buf() -> Self {
        Self {
            inner: Inner::Buf(Vec::new()),
        }
    }

    pub fn sink() -> Self {
        Self {
            inner: Inner::Sink(io::sink()),
        }
    }

    pub fn take_buf(self) -> Option<Vec<u8>> {
        match self.inner {
            Inner::Buf(buf) => Some(buf),
            _ => None,
        }
    }

    #[inline(always)]
    fn as_mut_write(&mut self) -> &mut dyn Write {
        match self.inner {
            Inner::Term(ref mut w) => w,
            Inner::Buf(ref mut w) => w,
            Inner::Sink(ref mut w) => w,
        }
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self, "WARN: {}", message)
    }

    pub fn build_pb_count(&self, len: u64) -> ProgressBar {
        let pb = ProgressBar::with_draw_target(len, self.to_pb_target());
        let style = ProgressStyle::default_bar()
            .progress_chars(PB_PROGRESS_CHARS)
            .template(PB_TEMPL_COUNT);
        pb.set_style(style);
        pb.enable_steady_tick(PB_TICK_INTERVAL_MS);
        pb
    }

    fn to_pb_target(&self) -> ProgressDrawTarget {
        match &self.inner {
            Inner::Term(_) => ProgressDrawTarget::stderr(),
            _ => ProgressDrawTarget::hidden(),
        }
    }
}

impl Write for Console {
    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.as_mut_write().write(buf)
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        self.as_mut_write().flush()
    }
}

/// Shares a console between concurrent fetches.
///
/// Fetches report through `&self` methods; output errors are swallowed the
/// same way direct console writes are.
#[derive(Debug)]
pub struct Reporter<'a> {
    cnsl: Mutex<&'a mut Console>,
}

impl<'a> Reporter<'a> {
    pub fn new(cnsl: &'a mut Console) -> Self {
        Self {
            cnsl: Mutex::new(cnsl),
        }
    }

    pub fn with_console<T>(&self, f: impl FnOnce(&mut Console) -> Result<T>) -> Result<T> {
        let mut cnsl = self.cnsl.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **cnsl)
    }

    pub fn info(&self, message: &str) {
        self.with_console(|cnsl| Ok(writeln!(cnsl, "{}", message)?))
            .unwrap_or(());
    }

    pub fn success(&self, message: &str) {
        self.with_console(|cnsl| Ok(writeln!(cnsl, "{} {}", style("✓").green(), message)?))
            .unwrap_or(());
    }

    pub fn warn(&self, message: &str) {
        self.with_console(|cnsl| Ok(cnsl.warn(message)?)).unwrap_or(());
    }

    pub fn progress(&self, done: usize, total: usize, message: &str) {
        self.success(&format!("[{}/{}] {}", done, total, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_writes_through_console() {
        let mut cnsl = Console::buf();
        {
            let reporter = Reporter::new(&mut cnsl);
            reporter.info("fetching");
            reporter.warn("retrying");
            reporter.success("saved");
            reporter.progress(2, 7, "b completed");
        }
        let out = String::from_utf8(cnsl.take_buf().unwrap()).unwrap();
        assert!(out.contains("fetching"));
        assert!(out.contains("WARN: retrying"));
        assert!(out.contains("saved"));
        assert!(out.contains("[2/7] b completed"));
        // success and progress lines both carry the mark
        assert_eq!(out.matches("✓").count(), 2);
    }
}
