//! Google Drive v3 adapter for listing folder contents.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{check_status, Authenticator, ChildLister, RemoteEntry, RemoteError};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const PAGE_SIZE: u32 = 1000;

/// Drive-backed `ChildLister`
pub struct DriveLister {
    auth: Arc<Authenticator>,
    client: reqwest::Client,
}

/// `files.list` response envelope
#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

impl From<DriveFile> for RemoteEntry {
    fn from(file: DriveFile) -> Self {
        RemoteEntry {
            id: file.id,
            title: file.name,
            mime_type: file.mime_type,
        }
    }
}

impl DriveLister {
    pub fn new(auth: Arc<Authenticator>) -> Self {
        Self {
            auth,
            client: reqwest::Client::new(),
        }
    }
}

/// Accumulate one page of results; returns the token of the next page
fn append_page(entries: &mut Vec<RemoteEntry>, page: FileListResponse) -> Option<String> {
    entries.extend(page.files.into_iter().map(RemoteEntry::from));
    page.next_page_token
}

#[async_trait]
impl ChildLister for DriveLister {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        let token = self.auth.access_token().await?;
        let query = format!("'{folder_id}' in parents and trashed=false");

        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(FILES_URL)
                .bearer_auth(&token)
                .query(&[
                    ("q", query.as_str()),
                    ("fields", "nextPageToken, files(id, name, mimeType)"),
                ])
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(ref next) = page_token {
                request = request.query(&[("pageToken", next.as_str())]);
            }

            let response = request.send().await?;
            let page: FileListResponse = check_status(response).await?.json().await?;

            match append_page(&mut entries, page) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(folder_id, count = entries.len(), "listed folder children");
        Ok(entries)
    }
}
