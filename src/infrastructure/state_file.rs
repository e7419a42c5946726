use crate::error::Result;
use crate::infrastructure::in_memory::{ChainState, InMemoryChain};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// JSON snapshot of an [`InMemoryChain`] on disk.
///
/// Lets the command-line front end keep devnet state between invocations.
/// Saves go through a temporary file in the same directory and a rename, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, or starts an empty chain if the file does not exist.
    pub fn load(&self) -> Result<InMemoryChain> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file, starting empty chain");
            return Ok(InMemoryChain::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let state: ChainState = serde_json::from_reader(reader)?;
        Ok(InMemoryChain::with_state(state))
    }

    pub async fn save(&self, chain: &InMemoryChain) -> Result<()> {
        let state = chain.snapshot().await;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &state)?;
            writer.flush()?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), "saved chain state");
        Ok(())
    }
}
