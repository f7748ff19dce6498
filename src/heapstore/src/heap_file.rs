use crate::heap_page::{blank_slot, PageHeader};
use common::prelude::*;
use common::{HEADER_WIDTH, PAGES_PER_FILE, PAGE_STRIDE, SLOTS_PER_PAGE, SLOT_WIDTH};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One fixed-layout heap file: `PAGES_PER_FILE` pages laid out contiguously,
/// each a padded header line followed by `SLOTS_PER_PAGE` padded slot lines.
///
/// No file handle outlives a single operation; every method opens, seeks,
/// reads or writes, and closes before returning.
pub struct HeapFile {
    path: PathBuf,
    name: String,
}

impl HeapFile {
    /// Wrap an existing file. Does not touch the filesystem.
    pub fn open(dir: &Path, name: &str) -> Self {
        HeapFile {
            path: dir.join(name),
            name: name.to_string(),
        }
    }

    /// Create the file with every page empty and every slot free.
    pub fn create(dir: &Path, name: &str) -> Result<Self, HoradrimError> {
        let hf = HeapFile::open(dir, name);
        let mut content = String::with_capacity(PAGES_PER_FILE * PAGE_STRIDE);
        for page_no in 1..=PAGES_PER_FILE {
            content.push_str(&PageHeader::new_empty(page_no as PageId).encode());
            content.push('\n');
            for _ in 0..SLOTS_PER_PAGE {
                content.push_str(&blank_slot());
                content.push('\n');
            }
        }
        let mut file = File::create(&hf.path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        debug!("created heap file {}", hf.name);
        Ok(hf)
    }

    fn header_offset(page: PageId) -> u64 {
        ((page as usize - 1) * PAGE_STRIDE) as u64
    }

    fn slot_offset(page: PageId, slot: SlotId) -> u64 {
        Self::header_offset(page) + (HEADER_WIDTH + 1) as u64
            + ((slot as usize - 1) * (SLOT_WIDTH + 1)) as u64
    }

    fn read_exact_at(&self, offset: u64, len: usize) -> Result<String, HoradrimError> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        String::from_utf8(buf).map_err(|_| {
            HoradrimError::StorageError(format!("heap file {} is not valid utf-8", self.name))
        })
    }

    fn write_all_at(&self, offset: u64, content: &str) -> Result<(), HoradrimError> {
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn read_header(&self, page: PageId) -> Result<PageHeader, HoradrimError> {
        let line = self.read_exact_at(Self::header_offset(page), HEADER_WIDTH)?;
        let header = PageHeader::parse(&line)?;
        if header.page_no != page {
            return Err(HoradrimError::StorageError(format!(
                "heap file {} page {} carries header for page {}",
                self.name, page, header.page_no
            )));
        }
        Ok(header)
    }

    pub fn write_header(&self, header: &PageHeader) -> Result<(), HoradrimError> {
        header.check()?;
        self.write_all_at(Self::header_offset(header.page_no), &header.encode())
    }

    /// The slot body with trailing padding trimmed; empty iff the slot is free.
    pub fn read_slot(&self, page: PageId, slot: SlotId) -> Result<String, HoradrimError> {
        let body = self.read_exact_at(Self::slot_offset(page, slot), SLOT_WIDTH)?;
        Ok(body.trim_end().to_string())
    }

    /// Write an already-encoded (padded) slot body.
    pub fn write_slot_body(
        &self,
        page: PageId,
        slot: SlotId,
        body: &str,
    ) -> Result<(), HoradrimError> {
        debug_assert_eq!(body.len(), SLOT_WIDTH);
        self.write_all_at(Self::slot_offset(page, slot), body)
    }

    /// Every live slot in page/slot order, read with a single open.
    pub fn live_slots(&self) -> Result<Vec<(PageId, SlotId, String)>, HoradrimError> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut out = Vec::new();
        for page in 1..=PAGES_PER_FILE as PageId {
            for slot in 1..=SLOTS_PER_PAGE as SlotId {
                let off = Self::slot_offset(page, slot) as usize;
                let body = content.get(off..off + SLOT_WIDTH).ok_or_else(|| {
                    HoradrimError::StorageError(format!("heap file {} is truncated", self.name))
                })?;
                let trimmed = body.trim_end();
                if !trimmed.is_empty() {
                    out.push((page, slot, trimmed.to_string()));
                }
            }
        }
        Ok(out)
    }

    /// Total live records across all pages.
    pub fn live_records(&self) -> Result<u32, HoradrimError> {
        let mut total = 0u32;
        for page in 1..=PAGES_PER_FILE as PageId {
            total += self.read_header(page)?.records as u32;
        }
        Ok(total)
    }

    pub fn is_empty(&self) -> Result<bool, HoradrimError> {
        Ok(self.live_records()? == 0)
    }
}
