//! status
//!
//! The repository status resolver: HEAD hash, clean/dirty state, and tags
//! for the repository owning a filesystem path.
//!
//! Two entry points cover the two calling styles:
//!
//! - [`current_commit_hash`] is the raising surface: dirty state and
//!   tree membership become hard errors when the caller requires them.
//! - [`path_status`] is the non-raising surface: dirty state and tag absence
//!   are reported as data in the returned [`RepoStatus`]. Only the absence
//!   of any repository at all is an error, since there is no status to
//!   report in that case.
//!
//! Every call independently re-discovers and re-reads live repository
//! state; nothing is cached between calls.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Oid;
use crate::git::{Git, GitError};

/// Errors from status resolution.
#[derive(Debug, Error)]
pub enum StatusError {
    /// No repository owns the queried path.
    #[error("no git repository found for path: {path}")]
    NotARepository {
        /// The path that was queried
        path: PathBuf,
    },

    /// The repository has uncommitted changes and the caller required
    /// cleanliness.
    #[error("repository has uncommitted changes, please commit them first")]
    DirtyRepo,

    /// The path belongs to a repository but is not present in HEAD's
    /// recorded tree, and the caller required tree membership.
    #[error("path is not in the commit tree: {path}")]
    NotInTree {
        /// The path that was queried
        path: PathBuf,
    },

    /// Underlying Git failure.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Clean/dirty state of a repository's working tree.
///
/// Serialized as `"clean"` / `"dirty"` in the metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoState {
    Clean,
    Dirty,
}

impl std::fmt::Display for RepoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoState::Clean => write!(f, "clean"),
            RepoState::Dirty => write!(f, "dirty"),
        }
    }
}

/// Status of the repository owning a path, produced fresh on every query.
///
/// `tag` is populated only when some tag points exactly at the resolved
/// HEAD commit, and is omitted from the serialized form otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStatus {
    /// HEAD commit hash
    pub hash: Oid,
    /// Clean or dirty working tree
    pub status: RepoState,
    /// Tag pointing at HEAD, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl RepoStatus {
    /// Whether the repository was dirty at query time.
    pub fn is_dirty(&self) -> bool {
        self.status == RepoState::Dirty
    }
}

/// Policy flags for [`current_commit_hash`].
///
/// Both checks default to on: a clean repository whose tree records the
/// queried path is what reproducible output stamping wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitHashOptions {
    /// Fail with [`StatusError::DirtyRepo`] when the repository has
    /// uncommitted changes.
    pub check_dirty: bool,
    /// Fail with [`StatusError::NotInTree`] when the path is absent from
    /// HEAD's recorded tree.
    pub check_tree: bool,
}

impl Default for CommitHashOptions {
    fn default() -> Self {
        Self {
            check_dirty: true,
            check_tree: true,
        }
    }
}

/// Open the repository owning `path`, mapping discovery failures to the
/// status error surface.
fn resolve_repo(path: &Path) -> Result<Git, StatusError> {
    match Git::open(path) {
        Ok(git) => Ok(git),
        Err(GitError::NotARepo { path }) => Err(StatusError::NotARepository { path }),
        Err(e) => Err(e.into()),
    }
}

/// Return the HEAD commit hash of the repository owning `path`.
///
/// This is the raising surface: with [`CommitHashOptions::default`], a
/// dirty repository fails with [`StatusError::DirtyRepo`] and a path absent
/// from HEAD's tree fails with [`StatusError::NotInTree`]. A path owned by
/// no repository always fails with [`StatusError::NotARepository`],
/// regardless of the flags.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gitstamp::status::{current_commit_hash, CommitHashOptions};
///
/// let hash = current_commit_hash(Path::new("."), CommitHashOptions::default())?;
/// println!("running code at {}", hash.short(7));
/// # Ok::<(), gitstamp::status::StatusError>(())
/// ```
pub fn current_commit_hash(path: &Path, options: CommitHashOptions) -> Result<Oid, StatusError> {
    let git = resolve_repo(path)?;

    if options.check_dirty && git.worktree_status()?.is_dirty() {
        return Err(StatusError::DirtyRepo);
    }

    let head = git.head_oid()?;

    if options.check_tree && !git.path_in_tree(path, &head)? {
        return Err(StatusError::NotInTree {
            path: path.to_path_buf(),
        });
    }

    Ok(head)
}

/// Return all tags of the repository owning `path`, keyed by the commit
/// each tag targets.
///
/// When several tags target the same commit, the later one in enumeration
/// order overwrites the earlier one. git2 enumerates refs sorted by name,
/// so in practice the lexicographically greatest tag name wins; this is a
/// documented tie-break, not a stability guarantee.
pub fn repo_tags(path: &Path) -> Result<BTreeMap<Oid, String>, StatusError> {
    let git = resolve_repo(path)?;

    let mut tags = BTreeMap::new();
    for entry in git.tags()? {
        tags.insert(entry.target, entry.name);
    }

    Ok(tags)
}

/// Return the HEAD hash, clean/dirty state, and tag (if any) for the
/// repository owning `path`.
///
/// This is the non-raising surface: dirty state is encoded in
/// [`RepoStatus::status`] and tag absence in [`RepoStatus::tag`]. It still
/// fails with [`StatusError::NotARepository`] when no repository owns the
/// path at all.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gitstamp::status::path_status;
///
/// let status = path_status(Path::new("."))?;
/// println!("{} ({})", status.hash.short(7), status.status);
/// # Ok::<(), gitstamp::status::StatusError>(())
/// ```
pub fn path_status(path: &Path) -> Result<RepoStatus, StatusError> {
    let git = resolve_repo(path)?;

    let state = if git.worktree_status()?.is_dirty() {
        RepoState::Dirty
    } else {
        RepoState::Clean
    };

    let head = git.head_oid()?;

    let tag = git
        .tags()?
        .into_iter()
        .filter(|entry| entry.target == head)
        .map(|entry| entry.name)
        .last(); // last-wins, matching repo_tags

    Ok(RepoStatus {
        hash: head,
        status: state,
        tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod options {
        use super::*;

        #[test]
        fn default_requires_clean_and_in_tree() {
            let options = CommitHashOptions::default();
            assert!(options.check_dirty);
            assert!(options.check_tree);
        }
    }

    mod repo_status {
        use super::*;

        fn sample_oid() -> Oid {
            Oid::new("abc123def4567890abc123def4567890abc12345").unwrap()
        }

        #[test]
        fn tag_omitted_when_absent() {
            let status = RepoStatus {
                hash: sample_oid(),
                status: RepoState::Clean,
                tag: None,
            };
            let json = serde_json::to_value(&status).unwrap();
            assert_eq!(json["hash"], "abc123def4567890abc123def4567890abc12345");
            assert_eq!(json["status"], "clean");
            assert!(json.get("tag").is_none());
        }

        #[test]
        fn tag_present_when_set() {
            let status = RepoStatus {
                hash: sample_oid(),
                status: RepoState::Dirty,
                tag: Some("v1.2".to_string()),
            };
            let json = serde_json::to_value(&status).unwrap();
            assert_eq!(json["status"], "dirty");
            assert_eq!(json["tag"], "v1.2");
        }

        #[test]
        fn is_dirty_follows_state() {
            let clean = RepoStatus {
                hash: sample_oid(),
                status: RepoState::Clean,
                tag: None,
            };
            assert!(!clean.is_dirty());

            let dirty = RepoStatus {
                status: RepoState::Dirty,
                ..clean
            };
            assert!(dirty.is_dirty());
        }
    }

    mod repo_state {
        use super::*;

        #[test]
        fn display_lowercase() {
            assert_eq!(RepoState::Clean.to_string(), "clean");
            assert_eq!(RepoState::Dirty.to_string(), "dirty");
        }

        #[test]
        fn serde_roundtrip() {
            let json = serde_json::to_string(&RepoState::Dirty).unwrap();
            assert_eq!(json, "\"dirty\"");
            let parsed: RepoState = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, RepoState::Dirty);
        }
    }
}
