use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Error};
use tempfile::NamedTempFile;

pub const STDIN_STDOUT: &str = "-";

/// Writes to stdout or atomically to a file.
///
/// File output goes to a temporary file next to the target which replaces
/// the target on [`Output::commit`].  If rendering fails before that the
/// target is left untouched.
pub struct Output {
    temp: Option<(PathBuf, NamedTempFile)>,
}

impl Output {
    pub fn new(filename: &Path) -> Result<Output, Error> {
        let temp = if filename == Path::new(STDIN_STDOUT) {
            None
        } else {
            let filename = std::env::current_dir()?.join(filename);
            let parent = filename
                .parent()
                .ok_or_else(|| anyhow!("cannot write to root"))?;
            let ntf = NamedTempFile::new_in(parent)?;
            tracing::debug!(target = %filename.display(), "writing output through temp file");
            Some((filename, ntf))
        };
        Ok(Output { temp })
    }

    pub fn commit(&mut self) -> Result<(), Error> {
        if let Some((filename, temp)) = self.temp.take() {
            temp.persist(filename)?;
        }
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.temp {
            Some((_, ref mut out)) => out.write(buf),
            None => io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.temp {
            Some((_, ref mut out)) => out.flush(),
            None => io::stdout().flush(),
        }
    }
}
