#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub mod attribute;
pub mod commands;
pub mod config;
pub mod error;
pub mod ids;
pub mod table;
pub mod testutil;

pub use attribute::{Attribute, DataType};
pub use error::{h_err, HoradrimError};
pub use table::{TypeInfo, TypeSchema};

/// Number of pages in every heap file.
pub const PAGES_PER_FILE: usize = 3;
/// Number of record slots in every page.
pub const SLOTS_PER_PAGE: usize = 10;
/// Width of a slot body in bytes, excluding the terminator.
pub const SLOT_WIDTH: usize = 240;
/// Width of a page header in bytes, excluding the terminator.
pub const HEADER_WIDTH: usize = 89;
/// Byte stride from the start of one page to the start of the next.
pub const PAGE_STRIDE: usize = (HEADER_WIDTH + 1) + SLOTS_PER_PAGE * (SLOT_WIDTH + 1);

pub mod prelude {
    pub use crate::attribute::{Attribute, DataType};
    pub use crate::error::{h_err, HoradrimError};
    pub use crate::ids::{FileFamily, Locator, PageId, SlotId};
    pub use crate::table::{TypeInfo, TypeSchema};
}
