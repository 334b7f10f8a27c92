//! End-to-end test of the reporting pipeline: an in-memory folder tree is
//! listed through the `ChildLister` seam, turned into a presence matrix,
//! and rendered into the grid that would be published.

use std::collections::HashMap;

use async_trait::async_trait;
use filegrid::{
    list_folder_tree, ChildLister, PresenceMatrix, RemoteEntry, RemoteError,
};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

struct FakeDrive {
    children: HashMap<String, Vec<RemoteEntry>>,
}

impl FakeDrive {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
        }
    }

    fn folder(mut self, parent: &str, id: &str, title: &str) -> Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(RemoteEntry {
                id: id.to_string(),
                title: title.to_string(),
                mime_type: FOLDER_MIME.to_string(),
            });
        self
    }

    fn file(mut self, parent: &str, id: &str, title: &str) -> Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(RemoteEntry {
                id: id.to_string(),
                title: title.to_string(),
                mime_type: "application/pdf".to_string(),
            });
        self
    }
}

#[async_trait]
impl ChildLister for FakeDrive {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        Ok(self.children.get(folder_id).cloned().unwrap_or_default())
    }
}

fn band_library() -> FakeDrive {
    FakeDrive::new()
        .folder("root", "altos", "ALTO PARTS")
        .folder("root", "audio", "REFERENCE AUDIO")
        .folder("root", "misc", "MISCELLANEOUS")
        .file("root", "stray", "9 Stray Chart.pdf")
        // Alto parts: underscore names, instrument suffixes
        .file("altos", "a1", "12_Song_Name_Alto.pdf")
        .file("altos", "a2", "03-Title (Live Version).pdf")
        .file("altos", "a3", "setlist.txt")
        // Audio: different raw spellings of the same items
        .file("audio", "b1", "12 Song Name.mp3")
        .file("audio", "b2", "7 O'Clock Shadow.wav")
        // Misc: a known-irrelevant category excluded by config
        .file("misc", "c1", "12 Song Name (old scan).pdf")
}

#[tokio::test]
async fn report_grid_from_fake_drive() {
    let drive = band_library();
    let listing = list_folder_tree(&drive, "root").await.unwrap();

    // The stray root-level file is listed but never becomes a row
    assert_eq!(listing.total_files(), 7);

    let matrix = PresenceMatrix::build(&listing);
    assert_eq!(
        matrix.columns(),
        &[
            "ALTO PARTS".to_string(),
            "MISCELLANEOUS".to_string(),
            "REFERENCE AUDIO".to_string(),
        ]
    );

    let expected: Vec<Vec<&str>> = vec![
        vec!["Item", "Number", "ALTO PARTS", "MISCELLANEOUS", "REFERENCE AUDIO"],
        vec!["12 song name", "12", "yes", "yes", "yes"],
        vec!["3 title", "3", "yes", "no", "no"],
        vec!["7 shadow", "7", "no", "no", "yes"],
    ];
    let grid = matrix.to_rows();
    assert_eq!(grid.len(), expected.len());
    for (row, expected_row) in grid.iter().zip(&expected) {
        let row: Vec<&str> = row.iter().map(String::as_str).collect();
        assert_eq!(&row, expected_row);
    }
}

#[tokio::test]
async fn excluded_column_is_dropped_before_publishing() {
    let drive = band_library();
    let listing = list_folder_tree(&drive, "root").await.unwrap();

    let matrix =
        PresenceMatrix::build(&listing).without_columns(&["MISCELLANEOUS".to_string()]);

    assert_eq!(
        matrix.columns(),
        &["ALTO PARTS".to_string(), "REFERENCE AUDIO".to_string()]
    );
    // Row count is unchanged; only the column and its cells disappear
    assert_eq!(matrix.rows().len(), 3);
    for row in matrix.to_rows() {
        assert_eq!(row.len(), 4);
    }
}

#[tokio::test]
async fn row_count_bounded_by_distinct_filenames() {
    let drive = band_library();
    let listing = list_folder_tree(&drive, "root").await.unwrap();
    let matrix = PresenceMatrix::build(&listing);

    assert!(matrix.rows().len() <= listing.total_files());
}

#[tokio::test]
async fn runaway_folder_chain_is_truncated() {
    // A 40-level folder chain, one numbered file per level. The descent
    // guard stops well before the bottom instead of walking it all.
    let mut drive = FakeDrive::new();
    let mut parent = "root".to_string();
    for level in 0..40 {
        let id = format!("c{level}");
        drive = drive
            .folder(&parent, &id, &format!("Level {level}"))
            .file(&id, &format!("f{level}"), "1 Song.pdf");
        parent = id;
    }

    let listing = list_folder_tree(&drive, "root").await.unwrap();
    let files = listing.total_files();
    assert!(files >= 16, "guard cut too early: {files} files");
    assert!(files < 40, "guard never fired: {files} files");
}

#[tokio::test]
async fn nested_subfolders_do_not_become_columns() {
    let drive = FakeDrive::new()
        .folder("root", "parts", "PARTS")
        .folder("parts", "old", "Archive")
        .file("parts", "p1", "1 Song.pdf")
        .file("old", "o1", "2 Other.pdf");

    let listing = list_folder_tree(&drive, "root").await.unwrap();
    let matrix = PresenceMatrix::build(&listing);

    // Only top-level folders are columns; the nested archive contributes
    // nothing of its own
    assert_eq!(matrix.columns(), &["PARTS".to_string()]);
    let keys: Vec<&str> = matrix.rows().iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["1 song"]);
}
