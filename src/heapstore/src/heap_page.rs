use common::prelude::*;
use common::{HEADER_WIDTH, SLOTS_PER_PAGE, SLOT_WIDTH};
use itertools::Itertools;

/// The parsed form of a page header line.
///
/// On disk the header is `PAGE:<n>,Empty:<s1>-...-<sk>,Records:<r>`
/// space-padded to `HEADER_WIDTH` bytes and newline-terminated. The free
/// list is kept strictly ascending; an empty list encodes as `Empty:,`.
///
/// Invariant: `records as usize + free_slots.len() == SLOTS_PER_PAGE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    pub page_no: PageId,
    pub free_slots: Vec<SlotId>,
    pub records: u16,
}

impl PageHeader {
    /// Header of a freshly initialized page: every slot free.
    pub fn new_empty(page_no: PageId) -> Self {
        PageHeader {
            page_no,
            free_slots: (1..=SLOTS_PER_PAGE as SlotId).collect(),
            records: 0,
        }
    }

    /// True when at least one slot is free.
    pub fn has_space(&self) -> bool {
        (self.records as usize) < SLOTS_PER_PAGE
    }

    /// Reserve the head of the free list for an insert. The caller must
    /// write the slot body afterwards so a free slot never has content.
    pub fn take_free_slot(&mut self) -> Option<SlotId> {
        if self.free_slots.is_empty() {
            return None;
        }
        let slot = self.free_slots.remove(0);
        self.records += 1;
        Some(slot)
    }

    /// Return a slot to the free list, preserving ascending order.
    pub fn put_free_slot(&mut self, slot: SlotId) -> Result<(), HoradrimError> {
        if self.free_slots.contains(&slot) {
            return Err(HoradrimError::StorageError(format!(
                "slot {} of page {} is already free",
                slot, self.page_no
            )));
        }
        let pos = self.free_slots.partition_point(|&s| s < slot);
        self.free_slots.insert(pos, slot);
        self.records -= 1;
        Ok(())
    }

    /// Encode to the padded on-disk form, without the terminator.
    pub fn encode(&self) -> String {
        let empty = self.free_slots.iter().join("-");
        let header = format!(
            "PAGE:{},Empty:{},Records:{}",
            self.page_no, empty, self.records
        );
        format!("{:<width$}", header, width = HEADER_WIDTH)
    }

    /// Parse a header line (padding and terminator already stripped or not;
    /// trailing whitespace is ignored).
    pub fn parse(line: &str) -> Result<Self, HoradrimError> {
        let bad = || HoradrimError::StorageError(format!("malformed page header {:?}", line.trim_end()));
        let mut fields = line.trim_end().split(',');
        let page_no = fields
            .next()
            .and_then(|f| f.strip_prefix("PAGE:"))
            .and_then(|n| n.parse().ok())
            .ok_or_else(bad)?;
        let empty = fields
            .next()
            .and_then(|f| f.strip_prefix("Empty:"))
            .ok_or_else(bad)?;
        let records = fields
            .next()
            .and_then(|f| f.strip_prefix("Records:"))
            .and_then(|n| n.parse().ok())
            .ok_or_else(bad)?;
        if fields.next().is_some() {
            return Err(bad());
        }

        // An empty Empty field tokenizes to one empty token; normalize it
        // to the empty list rather than a slot "".
        let mut free_slots = Vec::new();
        for token in empty.split('-') {
            if token.is_empty() {
                continue;
            }
            free_slots.push(token.parse().map_err(|_| bad())?);
        }

        let header = PageHeader {
            page_no,
            free_slots,
            records,
        };
        header.check()?;
        Ok(header)
    }

    /// Verify the page-local invariants.
    pub fn check(&self) -> Result<(), HoradrimError> {
        if self.records as usize + self.free_slots.len() != SLOTS_PER_PAGE {
            return Err(HoradrimError::StorageError(format!(
                "page {}: {} live records and {} free slots do not cover {} slots",
                self.page_no,
                self.records,
                self.free_slots.len(),
                SLOTS_PER_PAGE
            )));
        }
        let ascending = self.free_slots.windows(2).all(|w| w[0] < w[1]);
        let in_range = self
            .free_slots
            .iter()
            .all(|&s| s >= 1 && s as usize <= SLOTS_PER_PAGE);
        if !ascending || !in_range {
            return Err(HoradrimError::StorageError(format!(
                "page {}: free list {:?} is not an ascending slot list",
                self.page_no, self.free_slots
            )));
        }
        Ok(())
    }
}

/// Encode a live slot body: the slot number as an in-band integrity tag,
/// the payload, then padding to `SLOT_WIDTH`. Fails when the payload would
/// not fit or embeds a terminator.
pub fn encode_slot(slot: SlotId, payload: &str) -> Result<String, HoradrimError> {
    if payload.contains('\n') {
        return Err(HoradrimError::StorageError(
            "payload embeds a line terminator".to_string(),
        ));
    }
    let body = format!("{} {}", slot, payload);
    if body.len() > SLOT_WIDTH {
        return Err(HoradrimError::StorageError(format!(
            "payload of {} bytes overflows a {}-byte slot",
            body.len(),
            SLOT_WIDTH
        )));
    }
    Ok(format!("{:<width$}", body, width = SLOT_WIDTH))
}

/// Whether a payload fits a slot regardless of which slot number tags it.
pub fn payload_fits(payload: &str) -> bool {
    let max_tag = SLOTS_PER_PAGE.to_string().len() + 1;
    !payload.contains('\n') && payload.len() + max_tag <= SLOT_WIDTH
}

/// A free slot's body: all spaces.
pub fn blank_slot() -> String {
    " ".repeat(SLOT_WIDTH)
}
