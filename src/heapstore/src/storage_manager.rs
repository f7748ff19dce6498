use crate::heap_file::HeapFile;
use crate::heap_page::{blank_slot, encode_slot};
use common::config::ServerConfig;
use common::prelude::*;
use common::PAGES_PER_FILE;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const SM_NAME: &str = "HeapStore";

/// The Heap Store: a pool of fixed-layout heap files under one data
/// directory, split into the catalog (`types`) and record (`records`)
/// families. Holds no open handles and no cached state between operations;
/// the directory itself is the source of truth.
pub struct StorageManager {
    data_dir: PathBuf,
}

impl StorageManager {
    pub fn get_name(&self) -> &'static str {
        SM_NAME
    }

    /// Create a new storage manager rooted at the configured data directory,
    /// creating the directory if needed. Existing heap files are picked up
    /// as-is, which is all the startup logic this store needs.
    pub fn new(config: &ServerConfig) -> Result<Self, HoradrimError> {
        fs::create_dir_all(&config.data_dir)?;
        debug!("storage manager rooted at {:?}", config.data_dir);
        Ok(StorageManager {
            data_dir: config.data_dir.clone(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Existing files of a family, in dense-index order.
    pub fn family_files(&self, family: FileFamily) -> Result<Vec<String>, HoradrimError> {
        let mut indexed = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = match name.to_str() {
                Some(n) => n,
                None => continue,
            };
            if let Some(idx) = family.parse_index(name) {
                indexed.push((idx, name.to_string()));
            }
        }
        indexed.sort();
        Ok(indexed.into_iter().map(|(_, name)| name).collect())
    }

    /// Name for the next file of a family: the lowest unused dense index.
    fn next_file_name(&self, family: FileFamily) -> Result<String, HoradrimError> {
        let used: BTreeSet<usize> = self
            .family_files(family)?
            .iter()
            .filter_map(|name| family.parse_index(name))
            .collect();
        let mut idx = 1;
        while used.contains(&idx) {
            idx += 1;
        }
        Ok(family.file_name(idx))
    }

    /// Reserve a slot for a subsequent `write_slot`. Scans the family's
    /// files in dense order and each file's pages in order, taking the head
    /// of the first non-full page's free list; creates a fresh file at the
    /// lowest unused index when every page is full.
    pub fn allocate(&self, family: FileFamily) -> Result<Locator, HoradrimError> {
        for name in self.family_files(family)? {
            let hf = HeapFile::open(&self.data_dir, &name);
            for page in 1..=PAGES_PER_FILE as PageId {
                let mut header = hf.read_header(page)?;
                if !header.has_space() {
                    continue;
                }
                let slot = header.take_free_slot().ok_or_else(|| {
                    HoradrimError::StorageError(format!(
                        "page {} of {} reports space but has no free slot",
                        page, name
                    ))
                })?;
                hf.write_header(&header)?;
                trace!("allocated {}:{}:{}", name, page, slot);
                return Ok(Locator::new(name, page, slot));
            }
        }

        let name = self.next_file_name(family)?;
        let hf = HeapFile::create(&self.data_dir, &name)?;
        let mut header = hf.read_header(1)?;
        let slot = header.take_free_slot().ok_or_else(|| {
            HoradrimError::StorageError(format!("fresh file {} has no free slot", name))
        })?;
        hf.write_header(&header)?;
        trace!("allocated {}:1:{} in fresh file", name, slot);
        Ok(Locator::new(name, 1, slot))
    }

    /// Fill a previously allocated slot. The body is the slot number (the
    /// in-band integrity tag) followed by the payload, padded to slot width.
    pub fn write_slot(&self, loc: &Locator, payload: &str) -> Result<(), HoradrimError> {
        let body = encode_slot(loc.slot, payload)?;
        HeapFile::open(&self.data_dir, &loc.file).write_slot_body(loc.page, loc.slot, &body)
    }

    /// The slot body with padding trimmed; empty iff the slot is free.
    pub fn read_slot(&self, loc: &Locator) -> Result<String, HoradrimError> {
        HeapFile::open(&self.data_dir, &loc.file).read_slot(loc.page, loc.slot)
    }

    /// Release a slot: re-insert it into the page's free list, blank the
    /// body, and remove the whole file once no page holds a live record.
    pub fn free_slot(&self, loc: &Locator) -> Result<(), HoradrimError> {
        let hf = HeapFile::open(&self.data_dir, &loc.file);
        let mut header = hf.read_header(loc.page)?;
        header.put_free_slot(loc.slot)?;
        hf.write_header(&header)?;
        hf.write_slot_body(loc.page, loc.slot, &blank_slot())?;

        if hf.is_empty()? {
            debug!("removing emptied heap file {}", loc.file);
            fs::remove_file(self.data_dir.join(&loc.file))?;
        }
        Ok(())
    }

    /// Every live slot of a family in file/page/slot order.
    pub fn scan(&self, family: FileFamily) -> Result<ScanIter, HoradrimError> {
        let mut items = Vec::new();
        for name in self.family_files(family)? {
            let hf = HeapFile::open(&self.data_dir, &name);
            for (page, slot, body) in hf.live_slots()? {
                items.push((Locator::new(name.clone(), page, slot), body));
            }
        }
        Ok(ScanIter {
            items: items.into_iter(),
        })
    }
}

/// Iterator over live slots returned by `StorageManager::scan`.
pub struct ScanIter {
    items: std::vec::IntoIter<(Locator, String)>,
}

impl Iterator for ScanIter {
    type Item = (Locator, String);

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}
