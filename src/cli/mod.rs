//! CLI command handlers

pub mod commands;
mod store;

pub use commands::{averages, download, init, locations, pivot, record, reset};
pub use store::{AnyStore, StorageArgs};
