//! Shared state handed to every handler.

use carebot_core::CacheConfig;
use carebot_dbops::DbOpsClient;
use carebot_resolve::EntityDirectory;
use std::sync::Arc;

/// Dependencies a handler needs: the backend client for pass-through calls
/// and the directory for name/phone resolution.
///
/// Built once at startup and shared via `Arc`; no process-wide singletons.
pub struct ToolContext {
    pub client: Arc<DbOpsClient>,
    pub directory: EntityDirectory,
}

impl ToolContext {
    /// Create a context over `client` with the configured cache TTLs.
    pub fn new(client: Arc<DbOpsClient>, cache: &CacheConfig) -> Self {
        let directory = EntityDirectory::new(Arc::clone(&client), cache);
        Self { client, directory }
    }
}
