use crate::btree::BPlusTree;
use common::config::ServerConfig;
use common::prelude::*;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

/// Per-type primary-key index persistence.
///
/// Each type owns one flat file `B+<name>.txt` of `<key>-<locator>` lines
/// in insertion order. The file is the durable form; the B+ tree is rebuilt
/// from it on demand and never survives past a command.
pub struct IndexManager {
    data_dir: PathBuf,
}

impl IndexManager {
    pub fn new(config: &ServerConfig) -> Self {
        IndexManager {
            data_dir: config.data_dir.clone(),
        }
    }

    pub fn index_path(&self, type_name: &str) -> PathBuf {
        self.data_dir.join(format!("B+{}.txt", type_name))
    }

    pub fn exists(&self, type_name: &str) -> bool {
        self.index_path(type_name).is_file()
    }

    /// Create an empty index file for a freshly defined type. Leaves an
    /// existing file untouched.
    pub fn create(&self, type_name: &str) -> Result<(), HoradrimError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.index_path(type_name))?;
        debug!("created index file for type {}", type_name);
        Ok(())
    }

    /// Rebuild the in-memory tree from the index file. Each line splits on
    /// its first `-` into key and locator.
    pub fn load(&self, type_name: &str, key_dtype: DataType) -> Result<BPlusTree, HoradrimError> {
        let path = self.index_path(type_name);
        if !path.is_file() {
            return Err(HoradrimError::IndexMissing(type_name.to_string()));
        }
        let mut tree = BPlusTree::new(key_dtype);
        let reader = BufReader::new(File::open(&path)?);
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once('-').ok_or_else(|| {
                HoradrimError::StorageError(format!(
                    "malformed index line {:?} in {:?}",
                    line, path
                ))
            })?;
            tree.insert(key, value);
        }
        trace!("loaded {} keys for type {}", tree.len(), type_name);
        Ok(tree)
    }

    /// Record a new key: one appended line.
    pub fn append_entry(
        &self,
        type_name: &str,
        key: &str,
        loc: &Locator,
    ) -> Result<(), HoradrimError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.index_path(type_name))?;
        writeln!(file, "{}-{}", key, loc)?;
        file.flush()?;
        Ok(())
    }

    /// Drop a key: the file is rewritten without the key's lines.
    pub fn remove_key(&self, type_name: &str, key: &str) -> Result<(), HoradrimError> {
        let path = self.index_path(type_name);
        let reader = BufReader::new(File::open(&path)?);
        let mut kept = String::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if line.split_once('-').map(|(k, _)| k) != Some(key) {
                kept.push_str(&line);
                kept.push('\n');
            }
        }
        let mut file = File::create(&path)?;
        file.write_all(kept.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Remove the index file outright (type deletion).
    pub fn drop_index(&self, type_name: &str) -> Result<(), HoradrimError> {
        debug!("dropping index file for type {}", type_name);
        fs::remove_file(self.index_path(type_name))?;
        Ok(())
    }
}
