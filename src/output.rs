//! Output files.
//!
//! The destination is opened for writing and truncated, the same as any
//! shell redirect: symlinks are followed, an existing file keeps its
//! permissions, and device paths such as `/dev/stdout` work.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConvertError, Result};

pub struct OutputFile {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl OutputFile {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Opening output {}", path.display());
        let file = File::create(&path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Flushes buffered content and closes the file.
    pub fn finish(self) -> Result<PathBuf> {
        self.writer
            .into_inner()
            .map_err(|e| ConvertError::Io(e.into_error()))?;
        Ok(self.path)
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
