//! SQLite persistence for the PnL cache.
//!
//! This module provides:
//! - Database initialization and schema setup
//! - SQLite pragma configuration
//! - Repository implementing the cache store

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
