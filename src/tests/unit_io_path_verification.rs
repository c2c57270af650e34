use crate::io::local::LocalFileStorage;
use crate::io::{FileStorage, valid_filename, verify_relative_path};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinSet;

#[test]
fn test_verify_relative_path() {
    let root = Path::new("/srv/media");

    let cases = [
        ("hello.txt", true),
        ("docs/hello.txt", true),
        ("./hello.txt", true),
        ("docs/../hello.txt", true),
        ("../hello.txt", false),
        ("docs/../../hello.txt", false),
        ("/etc/passwd", false),
        ("", false),
        ("docs/..", false),
    ];

    for (name, allowed) in cases {
        let result = verify_relative_path(root, Path::new(name));
        assert_eq!(result.is_ok(), allowed, "Unexpected verdict for {:?}", name);
    }

    assert_eq!(
        verify_relative_path(root, Path::new("docs/hello.txt")).unwrap(),
        Path::new("/srv/media/docs/hello.txt")
    );
}

#[test]
fn test_valid_filename() {
    assert_eq!(valid_filename("hello.txt"), "hello.txt");
    assert_eq!(valid_filename("My Notes.txt"), "My_Notes.txt");
    assert_eq!(valid_filename("../../etc/passwd"), "passwd");
    assert_eq!(valid_filename("C:\\temp\\report.pdf"), "report.pdf");
    assert_eq!(valid_filename("a<b>c?.md"), "abc.md");
    assert_eq!(valid_filename(".hidden"), "hidden");
    assert_eq!(valid_filename("///"), "");
}

#[tokio::test]
async fn test_local_storage_save_and_read() {
    let media = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(media.path(), "/media/");

    let name = storage.save("hello world.txt", b"Hello").await.unwrap();
    assert_eq!(name, "hello_world.txt");
    assert!(storage.exists(&name).await.unwrap());
    assert_eq!(storage.read(&name).await.unwrap(), b"Hello");
    assert_eq!(storage.path(&name).unwrap(), media.path().join("hello_world.txt"));
    assert_eq!(storage.url(&name), "/media/hello_world.txt");
}

#[tokio::test]
async fn test_local_storage_name_collision() {
    let media = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(media.path(), "/media");

    let first = storage.save("hello.txt", b"one").await.unwrap();
    let second = storage.save("hello.txt", b"two").await.unwrap();

    assert_eq!(first, "hello.txt");
    assert_ne!(second, first);
    assert!(second.starts_with("hello_"));
    assert!(second.ends_with(".txt"));
    assert_eq!(second.len(), "hello_.txt".len() + 7);

    // the original is untouched
    assert_eq!(storage.read(&first).await.unwrap(), b"one");
    assert_eq!(storage.read(&second).await.unwrap(), b"two");
}

#[tokio::test]
async fn test_local_storage_rejects_unusable_names() {
    let media = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(media.path(), "/media");

    assert!(storage.save("...", b"x").await.is_err());
    assert!(!storage.exists("../outside.txt").await.unwrap_or(false));
    assert!(storage.read("../outside.txt").await.is_err());
}

// every simultaneous upload of one name must end up in its own file
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_local_storage_concurrent_same_name() {
    let media = TempDir::new().unwrap();
    let storage = Arc::new(LocalFileStorage::new(media.path(), "/media"));

    let mut uploads = JoinSet::new();
    for i in 0..8 {
        let storage = storage.clone();
        uploads.spawn(async move {
            let payload = format!("payload-{}", i);
            let name = storage.save("report.txt", payload.as_bytes()).await.unwrap();
            (name, payload)
        });
    }

    let mut names = HashSet::new();
    while let Some(result) = uploads.join_next().await {
        let (name, payload) = result.unwrap();
        assert_eq!(storage.read(&name).await.unwrap(), payload.as_bytes());
        names.insert(name);
    }

    assert_eq!(names.len(), 8);
    assert!(names.contains("report.txt"));
}
