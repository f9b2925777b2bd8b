//! # tagtree
//!
//! A two-level in-memory index for `name#tag` identities.
//!
//! The outer level is an AVL tree keyed by name. Each name owns a
//! [`TagTree`]: an ordered tree keyed by the numeric tag that deletes lazily
//! (interior nodes become vacant placeholders that later inserts may reuse)
//! and rebalances by subtree size, flattening and rebuilding a skewed subtree
//! in one pass.
//!
//! ## Example
//!
//! ```rust
//! use tagtree::{NameTree, Record};
//!
//! let mut index = NameTree::new();
//! assert!(index.insert(Record::new("alice", 1000, true, "gold", "online")));
//! assert!(index.insert(Record::new("alice", 42, false, "none", "idle")));
//! assert!(!index.insert(Record::new("alice", 42, true, "gold", "away")));
//!
//! assert_eq!(index.count_for_name("alice"), 2);
//! assert_eq!(index.get_record("alice", 42).map(|r| r.status()), Some("idle"));
//!
//! assert!(index.remove("alice", 1000).is_some());
//! assert!(index.get_record("alice", 1000).is_none());
//! ```

mod config;
mod debug;
mod error;
mod loader;
mod name_tree;
mod record;
mod tag_tree;

pub use config::{Config, MAX_MIN_REBALANCE_SIZE, MAX_SKEW_THRESHOLD};
pub use error::{ConfigError, LoadError};
pub use loader::{parse_line, parse_records, LoadMode, LoadSummary, FIELD_COUNT};
pub use name_tree::NameTree;
pub use record::{Record, Tag};
pub use tag_tree::TagTree;

/// Iterators returned by the index types.
pub mod iter {
    pub use crate::name_tree::{Iter as RecordIter, Names};
    pub use crate::tag_tree::Iter as TagIter;
}

#[cfg(test)]
mod proptests;
