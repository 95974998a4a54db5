//! Stream plugins for DataSync.
//!
//! `streamreader` generates a fixed set of constant records per task and
//! `streamwriter` drains records, optionally printing them to stdout. Both
//! are useful for smoke-testing a job definition without external systems.

pub mod reader;
pub mod writer;

use datasync_plugin::prelude::*;

pub use reader::{StreamReaderJob, StreamReaderTask};
pub use writer::{StreamWriterJob, StreamWriterTask};

/// Implementation symbol of the stream reader.
pub const STREAM_READER_CLASS: &str = "datasync.plugin.stream.StreamReader";

/// Implementation symbol of the stream writer.
pub const STREAM_WRITER_CLASS: &str = "datasync.plugin.stream.StreamWriter";

/// Registers both stream plugins in `catalog`.
pub fn register(catalog: &mut PluginCatalog) -> AppResult<()> {
    register_plugins!(catalog;
        reader STREAM_READER_CLASS => StreamReaderJob, StreamReaderTask;
        writer STREAM_WRITER_CLASS => StreamWriterJob, StreamWriterTask;
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_both_plugins() {
        let mut catalog = PluginCatalog::new();
        register(&mut catalog).unwrap();
        assert_eq!(catalog.symbols(), vec![STREAM_READER_CLASS, STREAM_WRITER_CLASS]);

        let err = register(&mut catalog).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PluginLoad);
    }
}
