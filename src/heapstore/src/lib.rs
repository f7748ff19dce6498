#[macro_use]
extern crate log;

pub mod heap_file;
pub mod heap_page;
pub mod storage_manager;

mod heap_page_tests;

pub use storage_manager::{ScanIter, StorageManager};
