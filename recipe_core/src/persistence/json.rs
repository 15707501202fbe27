//! Whole-store JSON file with file locking.
//!
//! The file is replaced atomically on every save, so a crash or failed
//! write leaves the previous file intact.

use crate::persistence::PersistenceAdapter;
use crate::{Error, Result, StoreState};
use fs2::FileExt;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON document adapter
#[derive(Clone, Debug)]
pub struct JsonFileAdapter {
    path: PathBuf,
}

impl JsonFileAdapter {
    /// Create an adapter for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceAdapter for JsonFileAdapter {
    /// Read the store with a shared lock
    ///
    /// A missing file means nothing has been saved yet. A file that exists
    /// but cannot be read or parsed is reported as an error and left alone.
    fn load(&mut self) -> Result<Option<StoreState>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No recipe file at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let state = serde_json::from_str::<StoreState>(&contents).map_err(|e| {
            Error::Persistence(format!("failed to parse recipe file {:?}: {}", self.path, e))
        })?;

        tracing::debug!("Loaded recipe file {:?}", self.path);
        Ok(Some(state))
    }

    /// Write the store atomically
    ///
    /// 1. Write to a temp file in the same directory
    /// 2. Sync to disk
    /// 3. Rename over the original
    fn save(&mut self, state: &StoreState) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;

        // Only this temp file is locked; readers see it after the rename
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, state)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} recipes to {:?}", state.recipes.len(), self.path);
        Ok(())
    }
}
