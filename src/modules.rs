//! modules
//!
//! Batch status aggregation over named code modules.
//!
//! A "module" here is anything with a name and an on-disk location whose
//! repository status is wanted: a crate checkout, a vendored analysis
//! script, a data-pipeline directory. The [`ModuleSource`] trait is the
//! explicit capability contract; [`ModuleRef`] is the plain owned
//! implementation for callers that just have a name and a path.

use std::path::{Path, PathBuf};

use crate::status::{path_status, RepoStatus, StatusError};

/// Ordered mapping from module name to its repository status.
pub type ModuleStatusMap = std::collections::BTreeMap<String, RepoStatus>;

/// A named entity with a resolvable filesystem location.
///
/// Implement this for whatever "module" means to the caller. The location
/// may be a file or a directory; repository discovery walks upward from it.
pub trait ModuleSource {
    /// The name to report the status under.
    fn name(&self) -> &str;

    /// The on-disk location whose repository status is wanted.
    fn location(&self) -> &Path;
}

impl<T: ModuleSource + ?Sized> ModuleSource for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn location(&self) -> &Path {
        (**self).location()
    }
}

/// A plain named location.
///
/// # Example
///
/// ```
/// use gitstamp::modules::{ModuleRef, ModuleSource};
///
/// let module = ModuleRef::new("analysis", "/home/lab/analysis/pipeline.py");
/// assert_eq!(module.name(), "analysis");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    name: String,
    location: PathBuf,
}

impl ModuleRef {
    /// Create a module reference from a name and a location.
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

impl ModuleSource for ModuleRef {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &Path {
        &self.location
    }
}

/// Resolve the repository status of each module in a batch.
///
/// Each module's location is queried independently through
/// [`path_status`](crate::status::path_status); the result maps module
/// names to their [`RepoStatus`]. A module outside any repository fails
/// the whole call, since there is no status to report for it.
///
/// When `warning` is set and any module is dirty, a single `log::warn!`
/// lists every dirty module name. The warning is non-fatal and never
/// interrupts the return of the full map.
///
/// # Example
///
/// ```no_run
/// use gitstamp::modules::{module_status, ModuleRef};
///
/// let modules = [
///     ModuleRef::new("pipeline", "./pipeline"),
///     ModuleRef::new("plotting", "./plotting"),
/// ];
/// let statuses = module_status(&modules, true)?;
/// for (name, status) in &statuses {
///     println!("{name}: {} ({})", status.hash.short(7), status.status);
/// }
/// # Ok::<(), gitstamp::status::StatusError>(())
/// ```
pub fn module_status<M: ModuleSource>(
    modules: &[M],
    warning: bool,
) -> Result<ModuleStatusMap, StatusError> {
    let mut statuses = ModuleStatusMap::new();

    for module in modules {
        let status = path_status(module.location())?;
        statuses.insert(module.name().to_string(), status);
    }

    if warning {
        let dirty: Vec<&str> = statuses
            .iter()
            .filter(|(_, status)| status.is_dirty())
            .map(|(name, _)| name.as_str())
            .collect();

        if !dirty.is_empty() {
            log::warn!(
                "the following modules have dirty git repositories: {}",
                dirty.join(", ")
            );
        }
    }

    Ok(statuses)
}
