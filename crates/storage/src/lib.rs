//! Storage collaborators for the monetary leaderboard.
//!
//! Provides:
//! - Traits for the ledger, identity store and account bindings
//! - An in-memory store backed by JSON snapshots
//! - Identity tracking for observed chat messages
//! - Avatar fetching with timeout and fallback

pub mod avatar;
pub mod identity;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use avatar::{AvatarFetchStats, AvatarFetcher};
pub use identity::{record_author, IdentityUpdate, ObservedMessage};
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
pub use store::{BindingStore, IdentityStore, Ledger};
