// src/services/mod.rs
pub mod feed_sync;
pub mod reconcile;
pub mod session;
pub mod token_manager;

pub use feed_sync::{FeedSync, SyncOutcome};
pub use token_manager::TokenManager;
