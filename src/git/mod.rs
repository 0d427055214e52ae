//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads flow
//! through this interface. Direct parsing of `.git` internal files outside
//! this module is prohibited. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery (walking parent directories from a queried path)
//! - HEAD resolution
//! - Working-tree status summary (the dirty policy)
//! - Tag enumeration with peeled targets
//! - Commit-tree membership lookup by path component
//!
//! # Invariants
//!
//! - All operations return strong types ([`Oid`](crate::core::types::Oid))
//! - Handles are created per query and never cached across calls

mod interface;

pub use interface::{Git, GitError, TagEntry, WorktreeSummary};
