//! metadata
//!
//! Assembly and persistence of the provenance record.
//!
//! The record is a single JSON object: caller-supplied keys at the top
//! level, a `"time (utc)"` key holding the current UTC time in
//! `YYYY-MM-DD HH:MM:SS` form, and a `"code version"` key mapping module
//! names to their repository status. Written indented, UTF-8, overwriting
//! any existing file at the destination. Write-only: there are no append
//! semantics, and concurrent writers to the same destination race at the
//! filesystem level.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::types::UtcTimestamp;
use crate::modules::{module_status, ModuleSource};
use crate::status::StatusError;

/// Key for the timestamp entry in the record.
pub const TIME_KEY: &str = "time (utc)";

/// Key for the module status map in the record.
pub const CODE_VERSION_KEY: &str = "code version";

/// Errors from metadata assembly and persistence.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Status resolution failed for one of the modules.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The destination could not be written.
    #[error("cannot write metadata file: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("cannot serialize metadata record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Assemble the provenance record without writing it.
///
/// For callers that embed the stamp in their own output files. The
/// caller's `info` keys land at the top level; [`TIME_KEY`] and
/// [`CODE_VERSION_KEY`] are added (overwriting caller keys of the same
/// name). With no modules, `"code version"` is an empty object.
pub fn record_metadata<M: ModuleSource>(
    info: Option<&Map<String, Value>>,
    modules: &[M],
    warning: bool,
) -> Result<Value, MetadataError> {
    let mut record = info.cloned().unwrap_or_default();

    record.insert(
        TIME_KEY.to_string(),
        Value::String(UtcTimestamp::now().stamp()),
    );

    let versions = module_status(modules, warning)?;
    record.insert(CODE_VERSION_KEY.to_string(), serde_json::to_value(&versions)?);

    Ok(Value::Object(record))
}

/// Assemble the provenance record and write it to `destination` as
/// indented JSON, overwriting any existing file.
///
/// # Errors
///
/// - [`MetadataError::Status`] when a module's repository cannot be resolved
/// - [`MetadataError::Io`] when the destination cannot be written
///   (permissions, missing parent directory)
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gitstamp::metadata::save_metadata;
/// use gitstamp::modules::ModuleRef;
/// use serde_json::{json, Map, Value};
///
/// let mut info = Map::new();
/// info.insert("sample".to_string(), json!("run-42"));
/// info.insert("temperature (K)".to_string(), json!(293.15));
///
/// let modules = [ModuleRef::new("pipeline", "./pipeline")];
/// save_metadata(Path::new("out/metadata.json"), Some(&info), &modules, true)?;
/// # Ok::<(), gitstamp::metadata::MetadataError>(())
/// ```
pub fn save_metadata<M: ModuleSource>(
    destination: &Path,
    info: Option<&Map<String, Value>>,
    modules: &[M],
    warning: bool,
) -> Result<(), MetadataError> {
    let record = record_metadata(info, modules, warning)?;

    let file = File::create(destination)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &record)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ModuleRef;

    #[test]
    fn record_without_modules_has_empty_code_version() {
        let modules: [ModuleRef; 0] = [];
        let record = record_metadata(None, &modules, false).unwrap();

        let object = record.as_object().unwrap();
        assert!(object.contains_key(TIME_KEY));
        assert_eq!(object[CODE_VERSION_KEY], serde_json::json!({}));
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn info_keys_land_at_top_level() {
        let mut info = Map::new();
        info.insert("sample".to_string(), Value::String("run-42".to_string()));

        let modules: [ModuleRef; 0] = [];
        let record = record_metadata(Some(&info), &modules, false).unwrap();

        assert_eq!(record["sample"], "run-42");
    }

    #[test]
    fn timestamp_has_stamp_shape() {
        let modules: [ModuleRef; 0] = [];
        let record = record_metadata(None, &modules, false).unwrap();

        let time = record[TIME_KEY].as_str().unwrap();
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(time.len(), 19);
        assert_eq!(&time[4..5], "-");
        assert_eq!(&time[10..11], " ");
        assert_eq!(&time[13..14], ":");
    }
}
