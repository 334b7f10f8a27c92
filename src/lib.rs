//! filegrid - Drive folder inventory to formatted availability spreadsheet
//!
//! Inventories the files in a Google Drive folder tree, normalizes their
//! names into canonical keys, and publishes a presence matrix (which item
//! exists in which subfolder) as a formatted Google Sheet.
//!
//! # Architecture
//!
//! The core is two pure operations:
//! - name normalization: raw filename -> canonical key (or an explicit
//!   discard with a reason)
//! - matrix assembly: nested folder listing -> boolean presence table
//!
//! Everything else is an adapter over an external Google API.
//!
//! # Modules
//!
//! - `core`: normalization and matrix assembly (pure, no I/O)
//! - `domain`: the folder listing model shared between core and adapters
//! - `adapters`: Drive listing, Sheets publishing, OAuth credentials
//! - `config`: layered configuration (env > config file > defaults)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # First-time authorization
//! filegrid login
//!
//! # Publish the availability matrix for the configured folder
//! filegrid report
//!
//! # Inspect the matrix locally without publishing
//! filegrid matrix --csv
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::adapters::{list_folder_tree, ChildLister, RemoteEntry, RemoteError, SheetPublisher};
pub use crate::core::{normalize, DiscardReason, Normalized, PresenceMatrix};
pub use crate::domain::{FolderListing, ListingEntry, RemoteFile};
