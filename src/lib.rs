//! kittenfeed - assemble a syndication feed of dated artifacts from an
//! object store listing.
//!
//! # Module Structure
//!
//! - `store` - Object store trait plus filesystem and in-memory stores
//! - `feed` - Listing, filtering, concurrent fetch, fan-in and sorting
//! - `generator` - RSS 2.0 and Atom 1.0 rendering
//! - `core` - Cancellation tokens, task groups, clocks, Ctrl+C handling
//! - `config` - `kittenfeed.toml` loading and validation
//! - `cli` - Command-line definitions and commands
//! - `logger` - Injected `[module] message` logger

pub mod cli;
pub mod config;
pub mod core;
pub mod feed;
pub mod generator;
pub mod logger;
pub mod store;
pub mod utils;
