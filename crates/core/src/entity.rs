//! Identity and revision traits for stock-domain entities.

/// Something with a stable identity (a product, a stock record).
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// An entity whose persisted state carries a revision counter.
///
/// The revision starts at 1 when the row is first stored and grows by one on
/// every accepted change. Persistence collaborators compare it against an
/// [`ExpectedVersion`](crate::ExpectedVersion) before writing.
pub trait Versioned: Entity {
    fn version(&self) -> u64;
}
