//! Orchestration of collaborators, pure math and the cache store.

pub mod pnl;

pub use pnl::PnlEngine;
