//! Presence matrix assembly.
//!
//! Rows are canonical keys, columns are the top-level folders of the
//! listing, and a cell answers "does this folder hold an item with this
//! key". Published cells are the literal strings `"yes"` / `"no"`.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::normalize::{normalize, Normalized};
use crate::domain::{FolderListing, ListingEntry};

/// Boolean presence table: canonical keys x folder names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceMatrix {
    columns: Vec<String>,
    rows: Vec<MatrixRow>,
}

/// One matrix row: a canonical key and its per-column presence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    /// Numeric prefix of the key; guaranteed by normalization, kept for
    /// sorting and reference in the published sheet
    pub number: u64,
    /// Canonical key identifying the item
    pub key: String,
    presence: Vec<bool>,
}

impl MatrixRow {
    /// Presence flags, aligned with the matrix columns
    pub fn presence(&self) -> &[bool] {
        &self.presence
    }
}

impl PresenceMatrix {
    /// Build the matrix from a folder listing.
    ///
    /// Only top-level folders become columns; a file sitting directly in
    /// the root is ignored. Within each folder, every child name (file or
    /// subfolder alike) is normalized; discards are dropped. Two raw names
    /// collapsing to one key within a folder collapse to one row.
    pub fn build(listing: &FolderListing) -> PresenceMatrix {
        let mut folders: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut numbers: BTreeMap<String, u64> = BTreeMap::new();

        for (name, entry) in &listing.entries {
            let ListingEntry::Folder(sub) = entry else {
                continue;
            };
            let mut keys = BTreeSet::new();
            for child_name in sub.entries.keys() {
                if let Normalized::Kept { number, key } = normalize(child_name) {
                    numbers.insert(key.clone(), number);
                    keys.insert(key);
                }
            }
            folders.insert(name.clone(), keys);
        }

        let columns: Vec<String> = folders.keys().cloned().collect();
        let all_keys: BTreeSet<&String> = folders.values().flatten().collect();

        let rows = all_keys
            .into_iter()
            .map(|key| MatrixRow {
                number: numbers[key],
                key: key.clone(),
                presence: columns.iter().map(|c| folders[c].contains(key)).collect(),
            })
            .collect();

        PresenceMatrix { columns, rows }
    }

    /// Drop the named columns (and their cells) from the matrix.
    ///
    /// Unknown names are ignored. Rows are kept even if every remaining
    /// cell is false.
    pub fn without_columns(mut self, exclude: &[String]) -> PresenceMatrix {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !exclude.contains(name))
            .map(|(i, _)| i)
            .collect();

        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            row.presence = keep.iter().map(|&i| row.presence[i]).collect();
        }
        self
    }

    /// Folder names, sorted, one per column
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, sorted by canonical key
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the publishable grid: a header row, then one row per key
    /// with `"yes"`/`"no"` cells.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut header = Vec::with_capacity(self.columns.len() + 2);
        header.push("Item".to_string());
        header.push("Number".to_string());
        header.extend(self.columns.iter().cloned());

        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(header);
        for row in &self.rows {
            let mut cells = Vec::with_capacity(self.columns.len() + 2);
            cells.push(row.key.clone());
            cells.push(row.number.to_string());
            cells.extend(
                row.presence
                    .iter()
                    .map(|&p| if p { "yes" } else { "no" }.to_string()),
            );
            grid.push(cells);
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RemoteFile;

    fn file(id: &str) -> ListingEntry {
        ListingEntry::File(RemoteFile {
            id: id.to_string(),
            title: String::new(),
            mime_type: "application/pdf".to_string(),
        })
    }

    fn folder(names: &[&str]) -> ListingEntry {
        let mut sub = FolderListing::default();
        for (i, name) in names.iter().enumerate() {
            sub.entries.insert(name.to_string(), file(&format!("f{i}")));
        }
        ListingEntry::Folder(sub)
    }

    fn listing(folders: &[(&str, &[&str])]) -> FolderListing {
        let mut root = FolderListing::default();
        for (name, files) in folders {
            root.entries.insert(name.to_string(), folder(files));
        }
        root
    }

    #[test]
    fn test_two_folder_scenario() {
        let root = listing(&[
            ("A", &["1 Song.mp3", "2 Other.mp3"][..]),
            ("B", &["1_song_alto.pdf"][..]),
        ]);

        let matrix = PresenceMatrix::build(&root);
        assert_eq!(matrix.columns(), &["A".to_string(), "B".to_string()]);

        let keys: Vec<&str> = matrix.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1 song", "2 other"]);

        assert_eq!(
            matrix.to_rows(),
            vec![
                vec!["Item", "Number", "A", "B"],
                vec!["1 song", "1", "yes", "yes"],
                vec!["2 other", "2", "yes", "no"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect::<Vec<_>>())
            .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_top_level_files_ignored() {
        let mut root = listing(&[("A", &["1 Song.mp3"][..])]);
        root.entries
            .insert("9 Stray File.mp3".to_string(), file("stray"));

        let matrix = PresenceMatrix::build(&root);
        assert_eq!(matrix.columns(), &["A".to_string()]);
        assert_eq!(matrix.rows().len(), 1);
    }

    #[test]
    fn test_empty_listing() {
        let matrix = PresenceMatrix::build(&FolderListing::default());
        assert!(matrix.is_empty());
        assert!(matrix.columns().is_empty());
        assert_eq!(matrix.to_rows().len(), 1); // header only
    }

    #[test]
    fn test_folder_without_recognizable_files_is_all_no() {
        let root = listing(&[
            ("A", &["1 Song.mp3"][..]),
            ("Unnumbered", &["notes.txt", "cover.jpg"][..]),
        ]);

        let matrix = PresenceMatrix::build(&root);
        assert_eq!(
            matrix.columns(),
            &["A".to_string(), "Unnumbered".to_string()]
        );
        for row in matrix.rows() {
            assert!(!row.presence()[1]);
        }
    }

    #[test]
    fn test_collapsing_keeps_row_count_bounded() {
        // Three raw spellings of the same item in one folder: one row
        let root = listing(&[(
            "A",
            &["1 Song.mp3", "1_song_alto.pdf", "01-Song (edit).wav"][..],
        )]);

        let matrix = PresenceMatrix::build(&root);
        assert_eq!(matrix.rows().len(), 1);
        assert_eq!(matrix.rows()[0].key, "1 song");
        assert_eq!(matrix.rows()[0].number, 1);
    }

    #[test]
    fn test_yes_count_matches_distinct_keys_per_folder() {
        let root = listing(&[
            ("A", &["1 Song.mp3", "2 Other.mp3", "junk.txt"][..]),
            ("B", &["1_song_alto.pdf", "1 Song (copy).pdf", "3 Third.pdf"][..]),
        ]);
        let matrix = PresenceMatrix::build(&root);

        for (idx, expected) in [(0usize, 2usize), (1, 2)] {
            let yes = matrix
                .rows()
                .iter()
                .filter(|row| row.presence()[idx])
                .count();
            assert_eq!(yes, expected, "column {idx}");
        }
    }

    #[test]
    fn test_without_columns() {
        let root = listing(&[
            ("A", &["1 Song.mp3"][..]),
            ("MISC", &["1 Song.mp3", "2 Other.mp3"][..]),
        ]);

        let matrix =
            PresenceMatrix::build(&root).without_columns(&["MISC".to_string()]);
        assert_eq!(matrix.columns(), &["A".to_string()]);
        // Rows survive even when only the excluded column held them
        let keys: Vec<&str> = matrix.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1 song", "2 other"]);
        assert_eq!(matrix.rows()[1].presence(), &[false]);
    }

    #[test]
    fn test_without_unknown_column_is_noop() {
        let root = listing(&[("A", &["1 Song.mp3"][..])]);
        let matrix = PresenceMatrix::build(&root);
        let filtered = matrix.clone().without_columns(&["Nope".to_string()]);
        assert_eq!(filtered, matrix);
    }
}
