#[macro_use]
extern crate log;

pub mod database_state;
pub mod handler;
pub mod oplog;
pub mod server;

pub use server::Server;
