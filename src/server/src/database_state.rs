use common::config::ServerConfig;
use common::prelude::*;
use heapstore::StorageManager;
use index::IndexManager;

/// Everything a command needs: the heap store and the index manager, plus
/// the catalog operations layered over the `types` heap family.
///
/// The catalog has a single invariant of its own: type names are unique
/// across all catalog files. Lookups are full scans of the family, which is
/// bounded by the fixed page and slot counts.
pub struct DatabaseState {
    pub sm: StorageManager,
    pub im: IndexManager,
}

impl DatabaseState {
    pub fn new(config: &ServerConfig) -> Result<Self, HoradrimError> {
        let sm = StorageManager::new(config)?;
        info!("storage manager created: {}", sm.get_name());
        let im = IndexManager::new(config);
        Ok(DatabaseState { sm, im })
    }

    /// Find a type by name: its catalog locator and parsed definition.
    pub fn lookup_type(&self, name: &str) -> Result<Option<(Locator, TypeInfo)>, HoradrimError> {
        for (loc, body) in self.sm.scan(FileFamily::Types)? {
            let line = strip_slot_tag(&body)?;
            // Cheap name check before parsing the whole definition.
            if line.split_whitespace().next() != Some(name) {
                continue;
            }
            let info = TypeInfo::from_catalog_line(line)?;
            return Ok(Some((loc, info)));
        }
        Ok(None)
    }

    /// A type's definition, or the unknown-type failure.
    pub fn get_type(&self, name: &str) -> Result<(Locator, TypeInfo), HoradrimError> {
        self.lookup_type(name)?
            .ok_or_else(|| HoradrimError::UnknownType(name.to_string()))
    }

    /// Every type name in the catalog, in scan order.
    pub fn type_names(&self) -> Result<Vec<String>, HoradrimError> {
        let mut names = Vec::new();
        for (_, body) in self.sm.scan(FileFamily::Types)? {
            let line = strip_slot_tag(&body)?;
            if let Some(name) = line.split_whitespace().next() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Insert a catalog record for a new type.
    pub fn insert_type(&self, info: &TypeInfo) -> Result<Locator, HoradrimError> {
        let loc = self.sm.allocate(FileFamily::Types)?;
        self.sm.write_slot(&loc, &info.to_catalog_line())?;
        debug!("cataloged type {} at {}", info.name, loc);
        Ok(loc)
    }

    /// Read a data record and return its field values, stripping the slot
    /// tag and the leading type name.
    pub fn record_fields(&self, loc: &Locator) -> Result<Vec<String>, HoradrimError> {
        let body = self.sm.read_slot(loc)?;
        if body.is_empty() {
            return Err(HoradrimError::StorageError(format!(
                "record slot {} is blank",
                loc
            )));
        }
        Ok(body
            .split_whitespace()
            .skip(2)
            .map(|t| t.to_string())
            .collect())
    }
}

/// Drop a live slot body's leading slot-number tag.
fn strip_slot_tag(body: &str) -> Result<&str, HoradrimError> {
    body.split_once(' ')
        .map(|(_, rest)| rest)
        .ok_or_else(|| HoradrimError::StorageError(format!("untagged slot body {:?}", body)))
}
