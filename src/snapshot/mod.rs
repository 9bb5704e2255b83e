//! Validated JSON snapshot format with atomic save and backup recovery.

pub mod codec;
pub mod persistence;

pub use codec::{SnapshotCodec, SnapshotDocument, SnapshotMetadata};
pub use persistence::PersistenceController;
