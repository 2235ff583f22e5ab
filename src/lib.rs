//! Cosboard - A command-line roster and live stage-flag board for cosplay competitions
//!
//! This library provides the core functionality for Cosboard, including:
//! - Database operations and migrations
//! - Data models for contestants and access keys
//! - Repository layer for data access
//! - The live flag broadcaster, its connection hub and TCP server
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use cosboard::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod repo;
pub mod guard;
pub mod live;
pub mod cli;
pub mod utils;
