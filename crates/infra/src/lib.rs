//! Infrastructure for the stockroom engine.
//!
//! This crate wires the pure inventory rules to a persistence collaborator:
//!
//! - [`repository`]: the `StockRepository` boundary and an in-memory store
//! - [`service`]: `StockService`, which serializes read-check-write per stock
//!   record and checks the stored revision before every write
//! - [`config`]: engine settings read from the environment

pub mod config;
pub mod repository;
pub mod service;


pub use config::EngineConfig;
pub use repository::{InMemoryStockRepository, RepositoryError, StockRepository};
pub use service::{StockObserver, StockService};
