use std::env::current_dir;
use std::fmt;
use std::fs;
use std::io::{self, Seek as _, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _};
use serde::Serialize;

use crate::Result;

/// An absolute (not necessarily canonicalized) path that may or may not exist.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbsPathBuf(PathBuf);

impl AbsPathBuf {
    /// Constructs an absolute path.
    ///
    /// Returns error if `path` is not absolute.
    pub fn try_new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(anyhow!("Path is not absolute : {}", path.display()));
        }
        Ok(Self(path.to_owned()))
    }

    /// Returns current directory as an absolute path.
    pub fn cwd() -> Result<Self> {
        Ok(Self(current_dir()?))
    }

    /// Joins path.
    pub fn join<P: AsRef<Path>>(&self, path: P) -> Self {
        Self(self.0.join(path))
    }

    pub fn save_pretty(
        &self,
        save: impl FnOnce(fs::File) -> Result<()>,
        overwrite: bool,
        base_dir: Option<&AbsPathBuf>,
        cnsl: &mut dyn Write,
    ) -> Result<Option<bool>> {
        write!(
            cnsl,
            "Saving {} ... ",
            self.strip_prefix_if(base_dir).display()
        )?;
        let result = self.save(save, overwrite);
        let msg = match result {
            Ok(Some(true)) => "overwritten",
            Ok(Some(false)) => "saved",
            Ok(None) => "already exists",
            Err(_) => "failed",
        };
        writeln!(cnsl, "{}", msg)?;
        result
    }

    // returns Some(true): overwritten, Some(false): created, None: skipped
    pub fn save(
        &self,
        save: impl FnOnce(fs::File) -> Result<()>,
        overwrite: bool,
    ) -> Result<Option<bool>> {
        let is_existed = self.as_ref().is_file();
        if !overwrite && is_existed {
            return Ok(None);
        }
        self.create_dir_all_and_open(false, true)
            .with_context(|| format!("Could not open file : {}", self))
            .and_then(|mut file| {
                // truncate file before write
                file.seek(SeekFrom::Start(0))?;
                file.set_len(0)?;
                Ok(file)
            })
            .and_then(save)?;
        Ok(Some(is_existed))
    }

    pub fn create_dir_all_and_open(&self, is_read: bool, is_write: bool) -> io::Result<fs::File> {
        if let Some(dir) = self.0.parent() {
            fs::create_dir_all(&dir)?;
        }
        fs::OpenOptions::new()
            .read(is_read)
            .write(is_write)
            .create(true)
            .open(&self.0)
    }

    pub fn strip_prefix_if(&self, base: Option<&AbsPathBuf>) -> &Path {
        match base {
            Some(base) => self
                .0
                .strip_prefix(&base.0)
                .unwrap_or_else(|_| self.0.as_path()),
            None => self.0.as_path(),
        }
    }
}

impl AsRef<Path> for AbsPathBuf {
    fn as_ref(&self) -> &Path {
        self.0.as_path()
    }
}

impl fmt::Display for AbsPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_relative_path() {
        assert!(AbsPathBuf::try_new("problems/abc/001").is_err());
    }

    #[test]
    fn save_respects_overwrite_flag() -> Result<()> {
        let tempdir = tempfile::tempdir()?;
        let path = AbsPathBuf::try_new(tempdir.path())?.join("dir").join("file.txt");

        let saved = path.save(|mut file| Ok(file.write_all(b"first")?), false)?;
        assert_eq!(saved, Some(false));
        assert_eq!(fs::read_to_string(&path)?, "first");

        let saved = path.save(|mut file| Ok(file.write_all(b"second")?), false)?;
        assert_eq!(saved, None);
        assert_eq!(fs::read_to_string(&path)?, "first");

        let saved = path.save(|mut file| Ok(file.write_all(b"third")?), true)?;
        assert_eq!(saved, Some(true));
        assert_eq!(fs::read_to_string(&path)?, "third");
        Ok(())
    }
}
