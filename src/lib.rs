pub mod cache;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use cache::{CacheError, InMemoryPnlCache, PnlCache};
pub use config::Config;
pub use datasource::{
    FileDataSource, LedgerSource, MockDataSource, PoolStateSource, PositionSource, SourceError,
};
pub use db::{init_db, Repository};
pub use domain::{
    AprBreakdown, Decimal, LedgerEvent, LedgerEventKind, PnlBreakdown, PositionDescriptor,
    PositionId, TimeMs,
};
pub use error::{EngineError, MathError};
pub use orchestration::PnlEngine;
