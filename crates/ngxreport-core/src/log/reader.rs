use super::types::LogFileRef;
use crate::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Pulls lines one at a time from a plain or gzip-compressed log file.
///
/// Trailing `\n`/`\r\n` is removed and invalid UTF-8 is replaced rather than
/// rejected, so a damaged byte costs at most one line.
pub struct LineReader {
    inner: Box<dyn BufRead>,
    buf: Vec<u8>,
    done: bool,
}

impl LineReader {
    pub fn open(log_file: &LogFileRef) -> Result<Self> {
        Self::with_compression(&log_file.path, log_file.compressed)
    }

    /// Open `path`, decompressing when its extension is `gz`
    pub fn from_path(path: &Path) -> Result<Self> {
        let compressed = path.extension().is_some_and(|ext| ext == "gz");
        Self::with_compression(path, compressed)
    }

    fn with_compression(path: &Path, compressed: bool) -> Result<Self> {
        tracing::debug!(
            "Opening log file: {} (gzip: {})",
            path.display(),
            compressed
        );

        let file = File::open(path)?;
        let inner: Box<dyn BufRead> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(Self {
            inner,
            buf: Vec::new(),
            done: false,
        })
    }
}

impl Iterator for LineReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.inner.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}
