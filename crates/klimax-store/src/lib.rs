//! Klimax Store — Record Persistence
//!
//! Persistence capability consumed by the rank registries: named JSON records
//! organized in collections under a single data root, with the ladder, player,
//! and journal collections nested below it.
//!
//! The contract is deliberately narrow — bulk load with per-record fault
//! reporting, single-record save, single-record delete — so the concrete
//! encoding stays swappable and the managers can be tested against the
//! in-memory backend.
//!
//! # Backends
//!
//! - [`JsonFileStore`] — file-per-record JSON under a data directory, atomic
//!   temp-file + rename writes
//! - [`MemoryStore`] — in-memory backend for tests and development

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod json_file;
pub mod memory;
pub mod store;

pub use error::{Error, Result};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{Collection, LoadFailure, LoadReport, Record, RecordStore};
