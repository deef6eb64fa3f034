//! Seekable output stream with path-aware error reporting.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SprError};

/// Little-endian binary writer over any seekable sink.
///
/// I/O failures are reported as write failures against `path`.
pub struct SpriteWriter<W> {
    inner: W,
    path: PathBuf,
}

impl SpriteWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| SprError::CannotOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl<W: Write + Seek> SpriteWriter<W> {
    pub fn new(inner: W, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    fn fail(&self, e: std::io::Error) -> SprError {
        SprError::WriteFailure {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes).map_err(|e| self.fail(e))
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Current offset from the start of the stream.
    pub fn position(&mut self) -> Result<u64> {
        self.inner.stream_position().map_err(|e| self.fail(e))
    }

    pub fn seek_to(&mut self, position: u64) -> Result<()> {
        self.inner
            .seek(SeekFrom::Start(position))
            .map(|_| ())
            .map_err(|e| self.fail(e))
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush().map_err(|e| self.fail(e))?;
        Ok(self.inner)
    }
}
