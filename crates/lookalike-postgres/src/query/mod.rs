//! Database query repositories.
//!
//! Repositories are implemented for [`PgConnection`](crate::PgConnection), so
//! they are available on every [`PgConn`](crate::PgConn) through `Deref`.

pub mod item_metadata;
pub mod vector_record;

pub use item_metadata::ItemMetadataRepository;
pub use vector_record::VectorRecordRepository;
