use crate::error::HoradrimError;
use std::fmt;
use std::str::FromStr;

/// The Id type for a page within a heap file. Pages are numbered from 1.
pub type PageId = u32;

/// The Id type for a record slot within a page. Slots are numbered from 1.
pub type SlotId = u16;

/// The two heap-file families. Catalog records live in `types<i>.txt`,
/// data records in `records<i>.txt`; `i` is a dense 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFamily {
    Types,
    Records,
}

impl FileFamily {
    pub fn prefix(&self) -> &'static str {
        match self {
            FileFamily::Types => "types",
            FileFamily::Records => "records",
        }
    }

    /// Name of the family file at dense index `idx` (1-based).
    pub fn file_name(&self, idx: usize) -> String {
        format!("{}{}.txt", self.prefix(), idx)
    }

    /// Reverse of `file_name`. None if the name does not belong to this family.
    pub fn parse_index(&self, name: &str) -> Option<usize> {
        let rest = name.strip_prefix(self.prefix())?;
        let digits = rest.strip_suffix(".txt")?;
        digits.parse().ok()
    }
}

/// Where a record physically lives: heap file name, page, slot.
/// Serialized as `file:page:slot`; this is the value stored in index files
/// and is opaque to users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub file: String,
    pub page: PageId,
    pub slot: SlotId,
}

impl Locator {
    pub fn new(file: String, page: PageId, slot: SlotId) -> Self {
        Locator { file, page, slot }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.page, self.slot)
    }
}

impl FromStr for Locator {
    type Err = HoradrimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let file = parts
            .next()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| bad_locator(s))?;
        let page = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| bad_locator(s))?;
        let slot = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| bad_locator(s))?;
        if parts.next().is_some() {
            return Err(bad_locator(s));
        }
        Ok(Locator::new(file.to_string(), page, slot))
    }
}

fn bad_locator(s: &str) -> HoradrimError {
    HoradrimError::StorageError(format!("malformed locator {:?}", s))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_family_names() {
        assert_eq!(FileFamily::Types.file_name(1), "types1.txt");
        assert_eq!(FileFamily::Records.file_name(12), "records12.txt");
        assert_eq!(FileFamily::Types.parse_index("types3.txt"), Some(3));
        assert_eq!(FileFamily::Records.parse_index("types3.txt"), None);
        assert_eq!(FileFamily::Records.parse_index("recordsx.txt"), None);
    }

    #[test]
    fn test_locator_round_trip() {
        let loc = Locator::new("records2.txt".to_string(), 3, 10);
        assert_eq!(loc.to_string(), "records2.txt:3:10");
        assert_eq!("records2.txt:3:10".parse::<Locator>().unwrap(), loc);
    }

    #[test]
    fn test_locator_malformed() {
        assert!("".parse::<Locator>().is_err());
        assert!("records1.txt:1".parse::<Locator>().is_err());
        assert!("records1.txt:a:1".parse::<Locator>().is_err());
        assert!("records1.txt:1:1:1".parse::<Locator>().is_err());
    }
}
