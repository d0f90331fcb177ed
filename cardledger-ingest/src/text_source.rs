//! Text extraction boundary: a document path goes in, layout-preserved lines
//! come out. Failures degrade to an empty line list.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use cardledger_core::Result;
use thiserror::Error;

/// Name of the intermediate file inside the scratch directory.
const SCRATCH_TEXT_FILE: &str = "tmp.txt";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub const DEFAULT_EXTRACT_COMMAND: &str = "pdftotext";
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

pub trait TextSource {
    /// Lines of the document in order, without line terminators. Empty when
    /// the document could not be read.
    fn extract(&self, path: &Path) -> Vec<String>;
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("`{command}` not found on PATH")]
    ToolMissing { command: String },

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("{command} exited with {status}")]
    Failed { command: String, status: ExitStatus },

    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run-scoped scratch directory for extractor output. Removed when dropped,
/// whichever way the run ends.
pub struct ScratchDir {
    dir: tempfile::TempDir,
}

impl ScratchDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("cardledger-")
            .tempdir()
            .map_err(|e| cardledger_core::Error::io(std::env::temp_dir(), e))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn text_file(&self) -> PathBuf {
        self.dir.path().join(SCRATCH_TEXT_FILE)
    }
}

/// `pdftotext -layout -enc UTF-8 <pdf> <scratch>/tmp.txt`
pub struct PdfToText<'a> {
    command: String,
    timeout: Duration,
    scratch: &'a ScratchDir,
}

impl<'a> PdfToText<'a> {
    pub fn new(scratch: &'a ScratchDir) -> Self {
        Self {
            command: DEFAULT_EXTRACT_COMMAND.to_string(),
            timeout: DEFAULT_EXTRACT_TIMEOUT,
            scratch,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn try_extract(&self, path: &Path) -> std::result::Result<Vec<String>, ExtractError> {
        let bin = which::which(&self.command).map_err(|_| ExtractError::ToolMissing {
            command: self.command.clone(),
        })?;

        let out = self.scratch.text_file();
        // stale output from the previous document must not leak into this one
        if out.exists() {
            fs::remove_file(&out).map_err(|source| ExtractError::Read {
                path: out.clone(),
                source,
            })?;
        }

        let mut child = Command::new(&bin)
            .args(["-layout", "-enc", "UTF-8"])
            .arg(path)
            .arg(&out)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExtractError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            let polled = child.try_wait().map_err(|source| ExtractError::Spawn {
                command: self.command.clone(),
                source,
            })?;
            if let Some(status) = polled {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExtractError::Timeout {
                    command: self.command.clone(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(ExtractError::Failed {
                command: self.command.clone(),
                status,
            });
        }

        read_lines(&out)
    }
}

impl TextSource for PdfToText<'_> {
    fn extract(&self, path: &Path) -> Vec<String> {
        match self.try_extract(path) {
            Ok(lines) => {
                log::debug!("extracted {} lines from {}", lines.len(), path.display());
                lines
            }
            Err(e) => {
                log::warn!("no text from {}: {e}", path.display());
                Vec::new()
            }
        }
    }
}

/// Already-extracted text on disk (e.g. saved `pdftotext -layout` output).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFile;

impl TextSource for PlainTextFile {
    fn extract(&self, path: &Path) -> Vec<String> {
        read_lines(path).unwrap_or_else(|e| {
            log::warn!("{e}");
            Vec::new()
        })
    }
}

fn read_lines(path: &Path) -> std::result::Result<Vec<String>, ExtractError> {
    let bytes = fs::read(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}
