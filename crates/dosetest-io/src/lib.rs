//! # Dose-Test I/O
//!
//! GDS-II stream export (and the reader used to check exported files),
//! plus the JSON run configuration.

pub mod project;
pub mod gds;
pub mod verify;

pub use project::{ConfigError, RunConfig, CONFIG_FILE_NAME};
pub use gds::{read_gds_file, write_gds_file, GdsError, GdsOptions, GdsReader, GdsWriter};
pub use verify::{compare_libraries, Mismatch};
