//! Connection lifecycle tests: connect, status, disconnect

mod helpers;

use helpers::{connect_request, TestEnv, OWNER_KEY, POD_URL, USER_ID};
use lxp_ps::guard::ValidationError;
use lxp_ps::models::{PodProvider, SyncStatus};
use lxp_ps::pod::memory::PodOperation;
use lxp_ps::pod::CARD_PATH;
use lxp_ps::PodSyncError;

#[tokio::test]
async fn test_connect_provisions_and_persists_record() {
    let env = TestEnv::new().await;
    env.add_user(USER_ID).await;

    let status = env
        .service
        .connect(USER_ID, connect_request("external", POD_URL))
        .await
        .unwrap();

    assert!(status.connected);
    assert_eq!(status.provider, PodProvider::External);
    assert_eq!(status.pod_url.as_deref(), Some(POD_URL));
    assert_eq!(
        status.webid.as_deref(),
        Some("https://pod.example.org/user-email-com/profile/card#me")
    );
    assert_eq!(status.sync_status, SyncStatus::Connected);
    assert!(status.connected_at.is_some());
    assert!(status.last_synced_at.is_none());

    assert_eq!(env.client.containers().len(), 5);
    let card = env.client.document(&env.url(CARD_PATH)).unwrap();
    assert!(card.contains(&format!("foaf:name \"{}\"", OWNER_KEY)));
}

#[tokio::test]
async fn test_connect_defaults_to_managed_provider() {
    let env = TestEnv::new().await;
    env.add_user(USER_ID).await;

    let status = env.service.connect(USER_ID, connect_request("", POD_URL)).await.unwrap();

    assert_eq!(status.provider, PodProvider::Managed);
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed_from_pod_url() {
    let env = TestEnv::new().await;
    env.add_user(USER_ID).await;

    let status = env
        .service
        .connect(USER_ID, connect_request("external", "https://pod.example.org/"))
        .await
        .unwrap();

    assert_eq!(status.pod_url.as_deref(), Some(POD_URL));
    assert_eq!(
        status.webid.as_deref(),
        Some("https://pod.example.org/user-email-com/profile/card#me")
    );
}

#[tokio::test]
async fn test_second_connect_replaces_first() {
    let env = TestEnv::new().await;
    env.connected_user().await;

    let status = env
        .service
        .connect(USER_ID, connect_request("managed", "https://other.example.net"))
        .await
        .unwrap();

    assert_eq!(status.pod_url.as_deref(), Some("https://other.example.net"));
    assert_eq!(status.provider, PodProvider::Managed);

    let stored = env.service.status(USER_ID).await.unwrap();
    assert_eq!(stored, status);
}

#[tokio::test]
async fn test_provisioning_failure_persists_nothing() {
    let env = TestEnv::new().await;
    env.add_user(USER_ID).await;
    env.client.fail_on("/journal/");

    let err = env
        .service
        .connect(USER_ID, connect_request("external", POD_URL))
        .await
        .unwrap_err();

    match err {
        PodSyncError::Provisioning(e) => assert_eq!(e.path, "/journal"),
        other => panic!("expected provisioning error, got {:?}", other),
    }

    let status = env.service.status(USER_ID).await.unwrap();
    assert!(!status.connected);
    assert_eq!(status.provider, PodProvider::None);
    assert_eq!(status.sync_status, SyncStatus::None);
}

#[tokio::test]
async fn test_blocked_url_is_rejected_before_any_request() {
    let env = TestEnv::new().await;
    env.add_user(USER_ID).await;

    for url in [
        "http://169.254.169.254/latest/meta-data",
        "http://10.0.0.5",
        "ftp://pod.example.org",
        "https://pod.example.org/#x",
        "https://pod.example.org/?a=b",
        "",
    ] {
        let err = env
            .service
            .connect(USER_ID, connect_request("external", url))
            .await
            .unwrap_err();
        assert!(matches!(err, PodSyncError::Validation(_)), "{} was accepted", url);
    }

    assert!(env.client.operations().is_empty());
}

#[tokio::test]
async fn test_unknown_provider_is_rejected() {
    let env = TestEnv::new().await;
    env.add_user(USER_ID).await;

    let err = env
        .service
        .connect(USER_ID, connect_request("self-hosted", POD_URL))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PodSyncError::Validation(ValidationError::UnsupportedProvider(_))
    ));
}

#[tokio::test]
async fn test_connect_for_unknown_user_does_not_provision() {
    let env = TestEnv::new().await;

    let err = env
        .service
        .connect("ghost", connect_request("external", POD_URL))
        .await
        .unwrap_err();

    assert!(matches!(err, PodSyncError::UserNotFound));
    assert!(env.client.operations().is_empty());
}

#[tokio::test]
async fn test_disconnect_clears_record_and_leaves_pod_untouched() {
    let env = TestEnv::new().await;
    env.connected_user().await;
    let writes_before = env.client.write_count();

    let status = env.service.disconnect(USER_ID).await.unwrap();

    assert!(!status.connected);
    assert_eq!(status.provider, PodProvider::None);
    assert_eq!(status.sync_status, SyncStatus::None);
    assert!(status.pod_url.is_none());
    assert!(status.webid.is_none());

    let stored = env.service.status(USER_ID).await.unwrap();
    assert!(!stored.connected);
    assert!(stored.connected_at.is_none());
    assert!(stored.last_synced_at.is_none());

    assert_eq!(env.client.write_count(), writes_before);
    assert!(!env
        .client
        .operations()
        .iter()
        .any(|op| matches!(op, PodOperation::Delete(_))));
    assert!(env.client.document(&env.url(CARD_PATH)).is_some());
}

#[tokio::test]
async fn test_status_of_unknown_user_is_disconnected() {
    let env = TestEnv::new().await;

    let status = env.service.status("nobody").await.unwrap();

    assert!(!status.connected);
    assert_eq!(status.provider, PodProvider::None);
    assert_eq!(status.sync_status, SyncStatus::None);
}

#[tokio::test]
async fn test_pod_location_follows_record() {
    let env = TestEnv::new().await;
    env.add_user(USER_ID).await;
    assert!(env.service.pod_location(USER_ID).await.unwrap().is_none());

    env.service
        .connect(USER_ID, connect_request("external", POD_URL))
        .await
        .unwrap();
    let pod = env.service.pod_location(USER_ID).await.unwrap().unwrap();
    assert_eq!(pod.base(), POD_URL);
    assert_eq!(pod.owner_key(), OWNER_KEY);

    env.service.disconnect(USER_ID).await.unwrap();
    assert!(env.service.pod_location(USER_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_closed_store_is_storage_unavailable() {
    let env = TestEnv::new().await;
    env.pool.close().await;

    assert!(matches!(
        env.service.status(USER_ID).await,
        Err(PodSyncError::StorageUnavailable(_))
    ));
    assert!(matches!(
        env.service.disconnect(USER_ID).await,
        Err(PodSyncError::StorageUnavailable(_))
    ));
}
