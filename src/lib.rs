//! CiteForge Reference Database
//!
//! An in-memory reference database for bibliographic publications keeping
//! four interdependent structures mutually consistent under mutation:
//! - Record table: the authoritative id -> publication map
//! - Author index: derived "A. Einstein"-style key -> id-set mapping
//! - Title-word index: derived lowercase word -> id-set mapping
//! - Citation graph: symmetric cites / cited-by relation with cycle-safe
//!   transitive closure
//!
//! [`db::ReferenceDatabase`] is the public surface and the sole writer of
//! all derived structures; every mutation of an indexed record routes
//! through it so the indexes can never drift stale.

pub mod config;
pub mod db;
pub mod errors;
pub mod graph;
pub mod index;
pub mod record;
pub mod table;

// Re-export commonly used types
pub use config::CitationWeights;
pub use db::{ConsistencyReport, ReferenceDatabase};
pub use errors::{ErrorCode, RefDbError, Result};
pub use record::{Name, Publication, PublicationKind, PublicationType};
pub use table::RecordId;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
