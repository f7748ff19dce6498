#[macro_use]
extern crate log;

pub mod btree;
pub mod index_manager;

pub use btree::{BPlusTree, Condition};
pub use index_manager::IndexManager;
