//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! gitstamp. All repository reads flow through this interface, which provides
//! structured results and normalizes errors into typed failure categories.
//!
//! # Architecture
//!
//! The `Git` struct is the only way to interact with a Git repository.
//! No other module should import `git2` directly. This ensures:
//!
//! - Consistent error handling across all Git operations
//! - Strong type guarantees at the boundary
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::BareRepo`]: Repository has no working tree
//! - [`GitError::PathNotFound`]: Queried path does not exist on disk
//! - [`GitError::ObjectNotFound`]: Requested object does not exist
//! - [`GitError::InvalidOid`]: Malformed object id
//!
//! # Example
//!
//! ```ignore
//! use gitstamp::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head_oid()?;
//! println!("HEAD is at {}", head.short(7));
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{Oid, TypeError};

/// Errors from Git operations.
///
/// These error types cover all categories of Git failures that gitstamp
/// needs to handle distinctly. The categorization enables the status layer
/// to map failures into its own error surface without string matching.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Queried path does not exist on disk.
    #[error("path does not exist: {path}")]
    PathNotFound {
        /// The path that was queried
        path: PathBuf,
    },

    /// Requested ref does not exist (including an unborn HEAD).
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::UnbornBranch => GitError::RefNotFound {
                refname: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
        }
    }
}

/// Summary of working tree status.
///
/// Provides counts of different types of changes in the working tree.
/// The dirty policy lives in [`WorktreeSummary::is_dirty`]: staged changes,
/// unstaged changes to tracked files, and unresolved conflicts count as
/// dirty; untracked files do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeSummary {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeSummary {
    /// Check if the repository counts as dirty.
    ///
    /// Untracked files are deliberately excluded: a new, never-added file
    /// does not change what HEAD recorded.
    pub fn is_dirty(&self) -> bool {
        self.staged > 0 || self.unstaged > 0 || self.has_conflicts
    }
}

/// A tag with its name and the commit it targets.
///
/// Annotated tags are peeled to their target commit.
#[derive(Debug, Clone)]
pub struct TagEntry {
    /// The tag name (without the `refs/tags/` prefix)
    pub name: String,
    /// The commit the tag points at
    pub target: Oid,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. All repository
/// reads flow through this interface. No other module should import `git2`.
///
/// A `Git` handle is created on demand per query and discarded afterwards;
/// the crate never caches repository state across calls.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Canonicalized working-tree root
    work_dir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("work_dir", &self.work_dir)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Discovery
    // =========================================================================

    /// Open the repository owning the given path.
    ///
    /// The path may be a file or a directory anywhere inside the working
    /// tree; discovery walks parent directories from the path's containing
    /// directory (`git2::Repository::discover`).
    ///
    /// # Errors
    ///
    /// - [`GitError::PathNotFound`] if the path does not exist on disk
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let resolved = path.canonicalize().map_err(|_| GitError::PathNotFound {
            path: path.to_path_buf(),
        })?;

        // Discovery starts from a directory; for files, use the parent.
        let start = if resolved.is_dir() {
            resolved.as_path()
        } else {
            resolved.parent().ok_or_else(|| GitError::NotARepo {
                path: resolved.clone(),
            })?
        };

        let repo = git2::Repository::discover(start).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        let work_dir = repo
            .workdir()
            .ok_or(GitError::BareRepo)?
            .canonicalize()
            .map_err(|e| GitError::Internal {
                message: format!("cannot resolve working directory: {e}"),
            })?;

        Ok(Self { repo, work_dir })
    }

    /// Canonicalized path of the working-tree root.
    pub fn workdir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the .git directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    // =========================================================================
    // HEAD Resolution
    // =========================================================================

    /// Get HEAD commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (new repository)
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        Oid::new(oid.to_string()).map_err(|e| e.into())
    }

    // =========================================================================
    // Working Tree Status
    // =========================================================================

    /// Get working tree status summary.
    ///
    /// Untracked files are counted but do not affect
    /// [`WorktreeSummary::is_dirty`]. Ignored files are skipped entirely.
    pub fn worktree_status(&self) -> Result<WorktreeSummary, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        let mut summary = WorktreeSummary::default();

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                summary.has_conflicts = true;
            }

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                summary.staged += 1;
            }

            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                summary.unstaged += 1;
            }

            if status.is_wt_new() {
                summary.untracked += 1;
            }
        }

        Ok(summary)
    }

    // =========================================================================
    // Tag Enumeration
    // =========================================================================

    /// List all tags with the commits they target.
    ///
    /// Annotated tags are peeled to their target commit. Tags that do not
    /// ultimately point at a commit (e.g., a tag of a blob) are skipped.
    /// Enumeration order is whatever git2 provides (sorted by ref name).
    pub fn tags(&self) -> Result<Vec<TagEntry>, GitError> {
        let names = self
            .repo
            .tag_names(None)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        let mut entries = Vec::new();
        for name in names.iter().flatten() {
            let refname = format!("refs/tags/{name}");
            let reference = match self.repo.find_reference(&refname) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let commit = match reference.peel_to_commit() {
                Ok(c) => c,
                Err(_) => continue, // tag does not target a commit
            };
            entries.push(TagEntry {
                name: name.to_string(),
                target: Oid::new(commit.id().to_string())?,
            });
        }

        Ok(entries)
    }

    // =========================================================================
    // Tree Membership
    // =========================================================================

    /// Return true if `path` belongs to the recorded tree of `commit`.
    ///
    /// The path is made relative to the working-tree root and looked up
    /// component by component in the commit's tree. The root itself always
    /// counts as in-tree. Paths outside the working tree, and paths the
    /// commit never recorded, are a normal `false`.
    ///
    /// This is pure with respect to the commit: working-directory state
    /// (staged or unstaged edits, untracked files) is never consulted.
    ///
    /// # Errors
    ///
    /// - [`GitError::PathNotFound`] if the path does not exist on disk
    /// - [`GitError::InvalidOid`] if the commit id is malformed
    /// - [`GitError::ObjectNotFound`] if the commit does not exist
    pub fn path_in_tree(&self, path: &Path, commit: &Oid) -> Result<bool, GitError> {
        let resolved = path.canonicalize().map_err(|_| GitError::PathNotFound {
            path: path.to_path_buf(),
        })?;

        let rel = match resolved.strip_prefix(&self.work_dir) {
            Ok(r) => r,
            Err(_) => return Ok(false), // outside this repository's working tree
        };

        if rel.as_os_str().is_empty() {
            return Ok(true); // the working-tree root itself
        }

        let git_oid = git2::Oid::from_str(commit.as_str()).map_err(|_| GitError::InvalidOid {
            oid: commit.to_string(),
        })?;
        let target = self
            .repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?;

        let mut tree = target.tree().map_err(|e| GitError::Internal {
            message: e.message().to_string(),
        })?;

        let mut components = rel.components().peekable();
        while let Some(component) = components.next() {
            let name = match component.as_os_str().to_str() {
                Some(n) => n,
                None => return Ok(false), // non-UTF8 name cannot be in the tree
            };

            let subtree_id = {
                let entry = match tree.get_name(name) {
                    Some(e) => e,
                    None => return Ok(false),
                };

                if components.peek().is_none() {
                    None // final component found, nothing left to descend into
                } else if entry.kind() == Some(git2::ObjectType::Tree) {
                    Some(entry.id())
                } else {
                    return Ok(false); // blob in the middle of the path
                }
            };

            if let Some(id) = subtree_id {
                tree = self.repo.find_tree(id).map_err(|e| GitError::Internal {
                    message: e.message().to_string(),
                })?;
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_error {
        use super::*;

        #[test]
        fn error_display_formatting() {
            let err = GitError::NotARepo {
                path: PathBuf::from("/tmp/nowhere"),
            };
            assert!(err.to_string().contains("not a git repository"));
            assert!(err.to_string().contains("/tmp/nowhere"));

            let err = GitError::InvalidOid {
                oid: "not-hex".to_string(),
            };
            assert!(err.to_string().contains("invalid object id"));
        }

        #[test]
        fn type_error_maps_to_invalid_oid() {
            let err: GitError = TypeError::InvalidOid("bad".into()).into();
            assert!(matches!(err, GitError::InvalidOid { .. }));
        }
    }

    mod worktree_summary {
        use super::*;

        #[test]
        fn default_is_clean() {
            assert!(!WorktreeSummary::default().is_dirty());
        }

        #[test]
        fn staged_changes_are_dirty() {
            let summary = WorktreeSummary {
                staged: 3,
                ..Default::default()
            };
            assert!(summary.is_dirty());
        }

        #[test]
        fn unstaged_changes_are_dirty() {
            let summary = WorktreeSummary {
                unstaged: 2,
                ..Default::default()
            };
            assert!(summary.is_dirty());
        }

        #[test]
        fn conflicts_are_dirty() {
            let summary = WorktreeSummary {
                has_conflicts: true,
                ..Default::default()
            };
            assert!(summary.is_dirty());
        }

        #[test]
        fn untracked_alone_is_clean() {
            // Untracked files don't change what HEAD recorded
            let summary = WorktreeSummary {
                untracked: 5,
                ..Default::default()
            };
            assert!(!summary.is_dirty());
        }
    }
}
