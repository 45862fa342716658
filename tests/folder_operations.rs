//! 目录复制、重命名、删除的集成测试

mod common;

use common::{config, filesystem, filesystem_with, MockStore};
use cos_fs::FsError;

fn tree() -> std::sync::Arc<MockStore> {
    let store = MockStore::new();
    store.insert("src/", "");
    store.insert("src/a.txt", "alpha");
    store.insert("src/sub/b.txt", "beta");
    store.insert("other/keep.txt", "keep");
    store
}

#[tokio::test]
async fn copy_preserves_relative_layout_and_contents() {
    let store = tree();
    let fs = filesystem(&store);

    fs.folder_copy("src", "dst").await.unwrap();

    assert_eq!(store.content("dst/a.txt").unwrap(), "alpha");
    assert_eq!(store.content("dst/sub/b.txt").unwrap(), "beta");
    assert!(store.contains("dst/"));
    // 模拟出来的目录没有对象，不会被复制
    assert!(!store.contains("dst/sub/"));
    assert!(store.contains("src/a.txt"));
    assert_eq!(MockStore::calls(&store.copy_calls), 3);
}

#[tokio::test]
async fn copy_into_existing_folder_is_refused() {
    let store = tree();
    store.insert("dst/x.txt", "x");
    let fs = filesystem(&store);

    let err = fs.folder_copy("src", "dst").await.unwrap_err();
    assert!(matches!(err, FsError::FolderExists { ref path } if path == "dst/"));
    assert!(err.is_precondition());
    assert_eq!(MockStore::calls(&store.copy_calls), 0);
}

#[tokio::test]
async fn rename_moves_everything() {
    let store = tree();
    let fs = filesystem(&store);

    fs.folder_rename("src", "dst").await.unwrap();

    assert_eq!(
        store.keys(),
        vec!["dst/", "dst/a.txt", "dst/sub/b.txt", "other/keep.txt"]
    );
    assert!(!fs.folder_exists("src").await.unwrap());
}

#[tokio::test]
async fn rename_of_missing_folder_changes_nothing() {
    let store = tree();
    let fs = filesystem(&store);
    let before = store.keys();

    let err = fs.folder_rename("nope", "dst").await.unwrap_err();
    assert!(matches!(err, FsError::FolderNotFound { ref path } if path == "nope/"));
    assert_eq!(store.keys(), before);
    assert_eq!(MockStore::calls(&store.copy_calls), 0);
    assert_eq!(MockStore::calls(&store.delete_calls), 0);
}

#[tokio::test]
async fn disabled_assertions_skip_presence_checks() {
    let store = tree();
    store.insert("dst/old.txt", "old");
    let mut config = config();
    config.disable_asserts = true;
    let fs = filesystem_with(config, &store);

    fs.folder_copy("missing", "dst").await.unwrap();
    assert_eq!(MockStore::calls(&store.copy_calls), 0);

    fs.folder_copy("src", "dst").await.unwrap();
    assert_eq!(store.content("dst/a.txt").unwrap(), "alpha");
    assert!(store.contains("dst/old.txt"));
}

#[tokio::test]
async fn partial_copy_failure_is_not_rolled_back() {
    let store = MockStore::new();
    store.insert("src/a.txt", "a");
    store.insert("src/b.txt", "b");
    store.insert("src/c.txt", "c");
    store.fail_copy_of("src/b.txt");
    let fs = filesystem(&store);

    let err = fs.folder_copy("src", "dst").await.unwrap_err();
    match &err {
        FsError::EntryFailed { path, .. } => assert_eq!(path, "src/b.txt"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.path(), Some("src/b.txt"));

    assert!(store.contains("dst/a.txt"));
    assert!(!store.contains("dst/c.txt"));
}

#[tokio::test]
async fn failed_rename_keeps_the_source() {
    let store = tree();
    store.fail_copy_of("src/sub/b.txt");
    let fs = filesystem(&store);

    let err = fs.folder_rename("src", "dst").await.unwrap_err();
    assert!(matches!(err, FsError::EntryFailed { .. }));
    assert!(store.contains("src/a.txt"));
    assert!(store.contains("src/sub/b.txt"));
    assert_eq!(MockStore::calls(&store.delete_calls), 0);
}

#[tokio::test]
async fn delete_dir_removes_only_the_folder() {
    let store = tree();
    let fs = filesystem(&store);

    fs.delete_dir("src").await.unwrap();
    assert_eq!(store.keys(), vec!["other/keep.txt"]);
}

#[tokio::test]
async fn delete_stops_at_first_failure_keeping_placeholder() {
    let store = tree();
    store.fail_delete_of("src/a.txt");
    let fs = filesystem(&store);

    let err = fs.delete_dir("src").await.unwrap_err();
    assert_eq!(err.path(), Some("src/a.txt"));
    // 深层条目先删除，目录占位对象仍在
    assert!(!store.contains("src/sub/b.txt"));
    assert!(store.contains("src/"));
}

#[tokio::test]
async fn delete_of_missing_folder_is_reported() {
    let store = tree();
    let fs = filesystem(&store);

    let err = fs.delete_dir("ghost").await.unwrap_err();
    assert!(matches!(err, FsError::FolderNotFound { .. }));
}

#[tokio::test]
async fn root_can_not_be_created_or_deleted() {
    let store = tree();
    let fs = filesystem(&store);

    assert!(matches!(
        fs.delete_dir("").await.unwrap_err(),
        FsError::RootViolation("deleted")
    ));
    assert!(matches!(
        fs.create_dir("").await.unwrap_err(),
        FsError::RootViolation("created")
    ));
    assert_eq!(store.keys().len(), 4);
}

#[tokio::test]
async fn rename_into_own_subfolder_is_refused() {
    let store = MockStore::new();
    store.insert("a/1.txt", "one");
    let fs = filesystem(&store);

    let err = fs.folder_rename("a", "a/b").await.unwrap_err();
    match &err {
        FsError::OverlappingFolders { path, destination } => {
            assert_eq!(path, "a/");
            assert_eq!(destination, "a/b/");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_precondition());
    assert_eq!(store.keys(), vec!["a/1.txt"]);
    assert_eq!(MockStore::calls(&store.copy_calls), 0);
}

#[tokio::test]
async fn overlapping_folders_are_refused_even_without_assertions() {
    let store = MockStore::new();
    store.insert("a/b/1.txt", "one");
    let mut config = config();
    config.disable_asserts = true;
    let fs = filesystem_with(config, &store);

    for (src, dst) in [("a/b", "a"), ("a", "a/b/c"), ("a", "a/"), ("", "x")] {
        let err = fs.folder_rename(src, dst).await.unwrap_err();
        assert!(matches!(err, FsError::OverlappingFolders { .. }), "{src} -> {dst}");
        let err = fs.folder_copy(src, dst).await.unwrap_err();
        assert!(matches!(err, FsError::OverlappingFolders { .. }), "{src} -> {dst}");
    }
    assert_eq!(store.keys(), vec!["a/b/1.txt"]);
    assert_eq!(MockStore::calls(&store.copy_calls), 0);
    assert_eq!(MockStore::calls(&store.delete_calls), 0);
}

#[tokio::test]
async fn rename_deletes_only_the_listed_source_objects() {
    let store = tree();
    let fs = filesystem(&store);

    fs.folder_rename("src", "srcx").await.unwrap();

    assert_eq!(
        store.keys(),
        vec!["other/keep.txt", "srcx/", "srcx/a.txt", "srcx/sub/b.txt"]
    );
    assert_eq!(MockStore::calls(&store.copy_calls), 3);
    assert_eq!(MockStore::calls(&store.delete_calls), 3);
}

#[tokio::test]
async fn root_exists_when_the_bucket_has_objects() {
    let store = MockStore::new();
    let fs = filesystem(&store);
    assert!(!fs.folder_exists("").await.unwrap());

    store.insert("a.txt", "a");
    assert!(fs.folder_exists("").await.unwrap());
    assert!(!fs.folder_exists("a.txt").await.unwrap());
}
