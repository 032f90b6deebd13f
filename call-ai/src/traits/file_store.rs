//! Remote file store provider trait.

use crate::types::file::{FileQuery, RemoteFile};
use crate::Error;
use async_trait::async_trait;

/// Abstraction over a remote document store (Google Drive in production).
///
/// The transcript matcher's remote-search fallback and the Drive folder
/// sync both go through this trait. Content is always returned as extracted
/// plain text; format conversion (Docs export, Sheets CSV) is the
/// provider's concern.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// List files matching the query, in the provider's listing order.
    ///
    /// Order matters: the matcher's tie-break keeps the first-seen
    /// candidate, which is deterministic because provider listing order is.
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<RemoteFile>, Error>;

    /// Download a file's content as plain text.
    async fn get_content(&self, file_id: &str, mime_type: &str) -> Result<String, Error>;

    /// Unique lowercase identifier for this provider (e.g. "google_drive").
    fn provider_id(&self) -> &str;
}
