//! Data structures shared between the core and the adapters.

pub mod listing;

pub use listing::{FolderListing, ListingEntry, RemoteFile};
