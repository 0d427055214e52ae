//! gitstamp - Stamp research output with the exact git version that produced it
//!
//! gitstamp queries the git repository owning a filesystem path for its HEAD
//! commit hash, clean/dirty working-tree status, and any tag pointing at
//! HEAD, and can write that information together with caller-supplied
//! metadata to an indented JSON file. It is meant for scientific and
//! research code that wants every output file to carry the code version
//! used to produce it.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`core`] - Domain types ([`Oid`](core::types::Oid), timestamps)
//! - [`git`] - Single interface for all Git operations
//! - [`status`] - Per-path status resolution (hash, clean/dirty, tag)
//! - [`modules`] - Batch aggregation over named code modules
//! - [`metadata`] - Provenance record assembly and JSON persistence
//!
//! # Correctness Invariants
//!
//! 1. Every query re-reads live repository state; nothing is cached
//! 2. All Git access flows through the single [`git`] doorway
//! 3. A reported tag always points exactly at the resolved HEAD commit
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use gitstamp::metadata::save_metadata;
//! use gitstamp::modules::ModuleRef;
//! use serde_json::{json, Map};
//!
//! let mut info = Map::new();
//! info.insert("sample".to_string(), json!("run-42"));
//!
//! let modules = [ModuleRef::new("pipeline", "./pipeline")];
//! save_metadata(Path::new("out/metadata.json"), Some(&info), &modules, true)?;
//! # Ok::<(), gitstamp::metadata::MetadataError>(())
//! ```

pub mod core;
pub mod git;
pub mod metadata;
pub mod modules;
pub mod status;
