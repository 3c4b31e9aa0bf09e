//! Image upload fan-out tests: concurrent batch upload and cleanup on
//! partial failure.

use system_design_api::services::image_service::{
    ImageStore, MemoryImageStore, UploadFile, upload_all,
};
use system_design_api::storage::ProblemError;

fn file(name: &str, len: usize) -> UploadFile {
    UploadFile {
        bytes: vec![0u8; len],
        original_name: name.to_string(),
    }
}

#[tokio::test]
async fn test_batch_upload_returns_descriptors_in_order() {
    let store = MemoryImageStore::new();

    let images = upload_all(
        &store,
        vec![file("arch.png", 120), file("flow.jpg", 64)],
    )
    .await
    .unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].original_name, "arch.png");
    assert_eq!(images[0].format, "png");
    assert_eq!(images[0].size, 120);
    assert_eq!(images[1].original_name, "flow.jpg");
    assert_eq!(images[1].format, "jpg");

    assert_eq!(store.stored_keys().await.len(), 2);
}

#[tokio::test]
async fn test_failed_batch_cleans_up_stored_images() {
    let store = MemoryImageStore::failing_on("bad");

    let result = upload_all(
        &store,
        vec![file("ok-1.png", 10), file("bad-2.png", 10), file("ok-3.png", 10)],
    )
    .await;

    assert!(matches!(result, Err(ProblemError::Upstream(_))));
    // No partial success: the uploads that went through were deleted again.
    assert!(store.stored_keys().await.is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let store = MemoryImageStore::new();
    let stored = store.upload(vec![1, 2, 3], "one.png").await.unwrap();

    store.delete(&stored.storage_key).await.unwrap();
    // Deleting again is fine; best-effort cleanup may race.
    store.delete(&stored.storage_key).await.unwrap();
    assert!(store.stored_keys().await.is_empty());
}
