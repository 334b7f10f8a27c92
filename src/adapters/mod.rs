//! Adapters for the external Google collaborators.
//!
//! The core never talks to the network; these adapters produce its input
//! (the folder listing) and consume its output (the presence matrix).

pub mod auth;
pub mod drive;
pub mod sheets;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::core::PresenceMatrix;
use crate::domain::{FolderListing, ListingEntry, RemoteFile};

// Re-export the concrete adapters
pub use auth::Authenticator;
pub use drive::DriveLister;
pub use sheets::SheetsPublisher;

/// MIME type Drive uses to mark folders
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Descent guard for the remote traversal; the real tree is a couple of
/// levels deep
const MAX_DEPTH: usize = 16;

/// Errors surfaced by the remote collaborators
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Credentials missing, expired beyond refresh, or rejected
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network-level failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// API rate or usage quota exhausted
    #[error("quota exceeded: {0}")]
    Quota(String),

    /// Any other API rejection
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

/// One child entry returned by a folder listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub id: String,
    pub title: String,
    pub mime_type: String,
}

impl RemoteEntry {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }
}

/// Lists the direct children of one remote folder.
///
/// The seam between the tree traversal and the Drive API; tests drive the
/// traversal through an in-memory implementation.
#[async_trait]
pub trait ChildLister: Send + Sync {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, RemoteError>;
}

/// Publishes a presence matrix as a remote spreadsheet
#[async_trait]
pub trait SheetPublisher: Send + Sync {
    /// Returns the identifier of the published document
    async fn publish(
        &self,
        matrix: &PresenceMatrix,
        parent_folder_id: &str,
        title: &str,
    ) -> Result<String, RemoteError>;
}

/// Fetch the whole folder tree under `root_id`.
///
/// Iterative breadth-first descent, one listing call per folder, with a
/// visited set (the remote graph can alias folders) and a depth guard.
pub async fn list_folder_tree(
    lister: &dyn ChildLister,
    root_id: &str,
) -> Result<FolderListing, RemoteError> {
    let mut children: HashMap<String, Vec<RemoteEntry>> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(root_id.to_string());

    let mut frontier = vec![root_id.to_string()];
    let mut depth = 0;
    while !frontier.is_empty() {
        if depth > MAX_DEPTH {
            warn!(depth, "folder tree deeper than expected, truncating descent");
            break;
        }
        let mut next = Vec::new();
        for id in frontier {
            let entries = lister.list_children(&id).await?;
            for entry in &entries {
                if entry.is_folder() && visited.insert(entry.id.clone()) {
                    next.push(entry.id.clone());
                }
            }
            children.insert(id, entries);
        }
        frontier = next;
        depth += 1;
    }

    let mut expanded = HashSet::new();
    expanded.insert(root_id.to_string());
    Ok(assemble(root_id, &children, &mut expanded))
}

/// Assemble the fetched per-folder entries into a nested listing. A folder
/// reached through more than one path is attached in full only the first
/// time; later occurrences get an empty listing, which keeps this pass
/// acyclic.
fn assemble(
    id: &str,
    children: &HashMap<String, Vec<RemoteEntry>>,
    expanded: &mut HashSet<String>,
) -> FolderListing {
    let mut listing = FolderListing::default();
    let Some(entries) = children.get(id) else {
        return listing;
    };

    for entry in entries {
        let value = if entry.is_folder() {
            let sub = if expanded.insert(entry.id.clone()) {
                assemble(&entry.id, children, expanded)
            } else {
                FolderListing::default()
            };
            ListingEntry::Folder(sub)
        } else {
            ListingEntry::File(RemoteFile {
                id: entry.id.clone(),
                title: entry.title.clone(),
                mime_type: entry.mime_type.clone(),
            })
        };
        listing.entries.insert(entry.title.clone(), value);
    }
    listing
}

/// Map a non-success response to the matching `RemoteError` kind
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 => RemoteError::Auth(message),
        429 => RemoteError::Quota(message),
        // Google reports quota exhaustion as 403 with a rate/quota reason
        403 if message.contains("quota") || message.contains("ateLimit") => {
            RemoteError::Quota(message)
        }
        403 => RemoteError::Auth(message),
        s => RemoteError::Api { status: s, message },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLister {
        children: HashMap<String, Vec<RemoteEntry>>,
    }

    fn folder(id: &str, title: &str) -> RemoteEntry {
        RemoteEntry {
            id: id.to_string(),
            title: title.to_string(),
            mime_type: FOLDER_MIME.to_string(),
        }
    }

    fn file(id: &str, title: &str) -> RemoteEntry {
        RemoteEntry {
            id: id.to_string(),
            title: title.to_string(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[async_trait]
    impl ChildLister for FakeLister {
        async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
            Ok(self.children.get(folder_id).cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_nested_tree_assembled() {
        let lister = FakeLister {
            children: [
                (
                    "root".to_string(),
                    vec![folder("a", "Altos"), file("x", "readme.txt")],
                ),
                (
                    "a".to_string(),
                    vec![file("f1", "1 Song.pdf"), folder("b", "Old")],
                ),
                ("b".to_string(), vec![file("f2", "2 Other.pdf")]),
            ]
            .into_iter()
            .collect(),
        };

        let tree = list_folder_tree(&lister, "root").await.unwrap();
        assert_eq!(tree.total_files(), 3);

        let (name, altos) = tree.folders().next().unwrap();
        assert_eq!(name, "Altos");
        assert!(matches!(
            altos.entries.get("Old"),
            Some(ListingEntry::Folder(_))
        ));
    }

    #[tokio::test]
    async fn test_cyclic_listing_terminates() {
        // root -> a -> root: the cycle is cut by the visited set
        let lister = FakeLister {
            children: [
                ("root".to_string(), vec![folder("a", "A")]),
                (
                    "a".to_string(),
                    vec![folder("root", "Loop"), file("f", "1 Song.pdf")],
                ),
            ]
            .into_iter()
            .collect(),
        };

        let tree = list_folder_tree(&lister, "root").await.unwrap();
        assert_eq!(tree.total_files(), 1);

        let (_, a) = tree.folders().next().unwrap();
        // The back-edge is present but attached empty
        match a.entries.get("Loop") {
            Some(ListingEntry::Folder(sub)) => assert!(sub.is_empty()),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let lister = FakeLister {
            children: HashMap::new(),
        };
        let tree = list_folder_tree(&lister, "nope").await.unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remote_entry_folder_detection() {
        assert!(folder("a", "A").is_folder());
        assert!(!file("f", "x.pdf").is_folder());
    }
}
