//! Convenience macros for plugin crates.

/// Registers default-constructible reader and writer implementations in a
/// [`PluginCatalog`](crate::catalog::PluginCatalog).
///
/// Evaluates to `AppResult<()>`, failing on the first duplicate symbol.
///
/// # Example
/// ```rust,ignore
/// register_plugins!(catalog;
///     reader "example.MysqlReader" => MysqlReaderJob, MysqlReaderTask;
///     writer "example.HdfsWriter" => HdfsWriterJob, HdfsWriterTask;
/// )
/// ```
#[macro_export]
macro_rules! register_plugins {
    (@entry $catalog:ident, reader, $symbol:expr, $job:ty, $task:ty) => {
        $catalog.register($crate::catalog::PluginEntry::reader::<$job, $task>($symbol))?
    };
    (@entry $catalog:ident, writer, $symbol:expr, $job:ty, $task:ty) => {
        $catalog.register($crate::catalog::PluginEntry::writer::<$job, $task>($symbol))?
    };
    ($catalog:expr; $( $kind:ident $symbol:expr => $job:ty, $task:ty; )* ) => {{
        let catalog: &mut $crate::catalog::PluginCatalog = $catalog;
        (|| -> $crate::prelude::AppResult<()> {
            $( $crate::register_plugins!(@entry catalog, $kind, $symbol, $job, $task); )*
            Ok(())
        })()
    }};
}
