//! The recursive folder listing model.
//!
//! A listing maps child names to entries, where an entry is either a leaf
//! file or another listing. Depth is small and bounded by the real folder
//! tree; the traversal in `adapters` enforces that bound.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A leaf file in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Remote file identifier
    pub id: String,
    /// Display title as stored remotely
    pub title: String,
    /// MIME type reported by the remote store
    pub mime_type: String,
}

/// One entry under a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingEntry {
    Folder(FolderListing),
    File(RemoteFile),
}

/// Contents of one folder, keyed by child name.
///
/// `BTreeMap` keeps iteration (and therefore matrix columns and rows)
/// deterministic. Duplicate names overwrite, matching the remote store's
/// last-listed-wins behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    pub entries: BTreeMap<String, ListingEntry>,
}

impl FolderListing {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level folders only, in name order
    pub fn folders(&self) -> impl Iterator<Item = (&str, &FolderListing)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            ListingEntry::Folder(sub) => Some((name.as_str(), sub)),
            ListingEntry::File(_) => None,
        })
    }

    /// Count every leaf file in the tree
    pub fn total_files(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(listing) = stack.pop() {
            for entry in listing.entries.values() {
                match entry {
                    ListingEntry::File(_) => count += 1,
                    ListingEntry::Folder(sub) => stack.push(sub),
                }
            }
        }
        count
    }
}
