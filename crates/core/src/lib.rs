//! `stockroom-core`: foundation types shared by every stockroom crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod concurrency;
pub mod entity;
pub mod error;
pub mod id;

pub use concurrency::ExpectedVersion;
pub use entity::{Entity, Versioned};
pub use error::{StockError, StockResult};
pub use id::{ProductId, StockId};
