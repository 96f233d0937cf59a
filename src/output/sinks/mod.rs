//! Corpus sink implementations

mod export_dir;
mod json;
mod sqlite;

pub use export_dir::{
    print_export_metadata, read_export_metadata, record_key, ExportDirSink, ExportedRecord,
};
pub use json::JsonCorpusSink;
pub use sqlite::SqliteSink;
