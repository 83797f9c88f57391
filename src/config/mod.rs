//! Declaration document storage.
//!
//! The document is a JSON object on disk. [`ConfigStore`] loads it once,
//! lets callers edit it in memory, and writes it back after re-reading the
//! file so that unrelated edits made by someone else in the meantime survive.

mod merge;
mod store;

pub use merge::{MAX_MERGE_DEPTH, deep_merge};
pub use store::ConfigStore;
