//! Types for remote file store operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a file as listed by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub modified_time: DateTime<Utc>,
}

/// Search terms for a remote file listing.
///
/// Providers translate this into their native query syntax (e.g. the Drive
/// `q` parameter). All criteria are ANDed; empty vectors mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    /// Name substrings, ORed together
    pub name_contains: Vec<String>,
    /// Acceptable mime types, ORed together
    pub mime_types: Vec<String>,
    /// Only files modified at or after this instant
    pub modified_after: Option<DateTime<Utc>>,
    /// Only files modified at or before this instant
    pub modified_before: Option<DateTime<Utc>>,
    /// Restrict to a folder (provider-native folder id)
    pub folder_id: Option<String>,
    /// Maximum number of results to return
    pub page_size: Option<u32>,
}
