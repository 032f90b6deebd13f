//! Google Drive API client.
//!
//! Implements the file store provider trait: listing via the Drive `q`
//! query syntax and content download with per-format conversion (Docs
//! export as plain text, Sheets as CSV, plain files via `alt=media`).

use async_trait::async_trait;
use call_ai::traits::file_store::Provider;
use call_ai::{Error, FileQuery, RemoteFile};
use chrono::{DateTime, Utc};
use log::*;
use serde::Deserialize;

const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
const GOOGLE_SHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const GOOGLE_APPS_PREFIX: &str = "application/vnd.google-apps.";

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFileMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileMetadata {
    id: String,
    name: String,
    mime_type: String,
    modified_time: DateTime<Utc>,
}

/// Google Drive API client
pub struct GoogleDriveClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleDriveClient {
    /// Create a new client with the given OAuth access token and base URL
    pub fn new(access_token: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", access_token);
        let mut header_value =
            reqwest::header::HeaderValue::from_str(&auth_value).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error::Configuration("Invalid access token format".to_string())
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn download_text(&self, url: &str) -> Result<String, Error> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Failed to reach Google Drive: {:?}", e);
            Error::Network(e.to_string())
        })?;

        match response.status() {
            status if status.is_success() => response
                .text()
                .await
                .map_err(|e| Error::MalformedResponse(e.to_string())),
            reqwest::StatusCode::NOT_FOUND => {
                Err(Error::NotFound("Drive file not found".to_string()))
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Err(
                Error::Authentication("Google Drive rejected the access token".to_string()),
            ),
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                warn!("Google Drive API error: {}", error_text);
                Err(Error::Provider(error_text))
            }
        }
    }
}

/// Escapes a value for use inside single quotes in a Drive `q` expression.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Translates a provider-agnostic query into the Drive `q` syntax.
fn build_drive_query(query: &FileQuery) -> String {
    let mut clauses = vec!["trashed = false".to_string()];

    if let Some(folder_id) = &query.folder_id {
        clauses.push(format!("'{}' in parents", escape_query_value(folder_id)));
    }

    if !query.name_contains.is_empty() {
        let names: Vec<String> = query
            .name_contains
            .iter()
            .map(|name| format!("name contains '{}'", escape_query_value(name)))
            .collect();
        clauses.push(format!("({})", names.join(" or ")));
    }

    if !query.mime_types.is_empty() {
        let mimes: Vec<String> = query
            .mime_types
            .iter()
            .map(|mime| format!("mimeType = '{}'", escape_query_value(mime)))
            .collect();
        clauses.push(format!("({})", mimes.join(" or ")));
    }

    if let Some(after) = query.modified_after {
        clauses.push(format!("modifiedTime >= '{}'", after.to_rfc3339()));
    }
    if let Some(before) = query.modified_before {
        clauses.push(format!("modifiedTime <= '{}'", before.to_rfc3339()));
    }

    clauses.join(" and ")
}

#[async_trait]
impl Provider for GoogleDriveClient {
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<RemoteFile>, Error> {
        let q = build_drive_query(query);
        let page_size = query.page_size.unwrap_or(100).to_string();

        debug!("Listing Drive files: {q}");

        let url = format!("{}/files", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", q.as_str()),
                ("fields", "files(id,name,mimeType,modifiedTime)"),
                ("orderBy", "modifiedTime desc"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Google Drive: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google Drive API error ({status}): {error_text}");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(Error::Authentication(
                    "Google Drive rejected the access token".to_string(),
                ));
            }
            return Err(Error::Provider(error_text));
        }

        let listing: FileListResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Drive listing: {:?}", e);
            Error::MalformedResponse("Invalid response from Google Drive".to_string())
        })?;

        Ok(listing
            .files
            .into_iter()
            .map(|file| RemoteFile {
                id: file.id,
                name: file.name,
                mime_type: file.mime_type,
                modified_time: file.modified_time,
            })
            .collect())
    }

    async fn get_content(&self, file_id: &str, mime_type: &str) -> Result<String, Error> {
        let encoded_id = urlencoding::encode(file_id);

        match mime_type {
            GOOGLE_DOC_MIME => {
                let url = format!(
                    "{}/files/{}/export?mimeType=text%2Fplain",
                    self.base_url, encoded_id
                );
                self.download_text(&url).await
            }
            GOOGLE_SHEET_MIME => {
                let url = format!(
                    "{}/files/{}/export?mimeType=text%2Fcsv",
                    self.base_url, encoded_id
                );
                self.download_text(&url).await
            }
            mime if mime.starts_with(GOOGLE_APPS_PREFIX) => Err(Error::Provider(format!(
                "Unsupported Google Workspace file type: {mime}"
            ))),
            _ => {
                let url = format!("{}/files/{}?alt=media", self.base_url, encoded_id);
                self.download_text(&url).await
            }
        }
    }

    fn provider_id(&self) -> &str {
        "google_drive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn drive_query_combines_all_clauses() {
        let query = FileQuery {
            name_contains: vec!["transcript".to_string(), "meeting".to_string()],
            mime_types: vec![GOOGLE_DOC_MIME.to_string()],
            modified_after: Some("2026-01-01T00:00:00Z".parse().unwrap()),
            modified_before: None,
            folder_id: Some("folder123".to_string()),
            page_size: None,
        };

        let q = build_drive_query(&query);
        assert!(q.starts_with("trashed = false and 'folder123' in parents"));
        assert!(q.contains("(name contains 'transcript' or name contains 'meeting')"));
        assert!(q.contains("mimeType = 'application/vnd.google-apps.document'"));
        assert!(q.contains("modifiedTime >= '2026-01-01T00:00:00+00:00'"));
    }

    #[test]
    fn query_values_with_quotes_are_escaped() {
        let query = FileQuery {
            name_contains: vec!["O'Brien sync".to_string()],
            ..Default::default()
        };
        assert!(build_drive_query(&query).contains("name contains 'O\\'Brien sync'"));
    }

    #[tokio::test]
    async fn list_files_parses_drive_metadata() -> Result<(), Error> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/files")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "files": [{
                        "id": "abc123",
                        "name": "Weekly sync - Transcript",
                        "mimeType": GOOGLE_DOC_MIME,
                        "modifiedTime": "2026-02-03T10:30:00Z"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GoogleDriveClient::new("token", &server.url())?;
        let files = client.list_files(&FileQuery::default()).await?;

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, "abc123");
        assert_eq!(files[0].mime_type, GOOGLE_DOC_MIME);
        mock.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn google_docs_are_exported_as_plain_text() -> Result<(), Error> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/files/abc123/export")
            .match_query(Matcher::UrlEncoded(
                "mimeType".to_string(),
                "text/plain".to_string(),
            ))
            .with_status(200)
            .with_body("Transcript text")
            .create_async()
            .await;

        let client = GoogleDriveClient::new("token", &server.url())?;
        let content = client.get_content("abc123", GOOGLE_DOC_MIME).await?;

        assert_eq!(content, "Transcript text");
        mock.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn unsupported_workspace_types_are_rejected() {
        let server = mockito::Server::new_async().await;
        let client = GoogleDriveClient::new("token", &server.url())
            .expect("client should build");

        let result = client
            .get_content("abc123", "application/vnd.google-apps.presentation")
            .await;

        assert!(matches!(result, Err(Error::Provider(_))));
    }

    #[tokio::test]
    async fn missing_files_map_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/files/gone")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = GoogleDriveClient::new("token", &server.url())
            .expect("client should build");
        let result = client.get_content("gone", "text/plain").await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
