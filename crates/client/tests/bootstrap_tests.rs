mod common;

use common::ScriptedMic;
use common::fixtures::user;
use jotpad_client::{AuthService, LocalAuth, SyncStatus};
use jotpad_core::config::{AppConfig, StorageConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_from_config_follows_sessions() {
    let auth = Arc::new(LocalAuth::new(user("u1")));
    let mic = Arc::new(ScriptedMic::new(&[b"x"]));
    let client = jotpad_client::from_config(&AppConfig::for_testing(), auth.clone(), mic)
        .await
        .unwrap();
    let mut sessions = client.subscribe_session();

    auth.sign_in().await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), sessions.wait_for(|u| u.is_some()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(client.status(), SyncStatus::connected());

    client.set_text("configured").await;
    let note = client.add_note().await.unwrap();
    assert_eq!(note.text, "configured");
}

#[tokio::test]
async fn test_from_config_rejects_invalid_config() {
    let mut config = AppConfig::for_testing();
    config.storage = StorageConfig::Memory {
        public_base_url: Some("ftp://media".to_string()),
    };

    let result = jotpad_client::from_config(
        &config,
        Arc::new(LocalAuth::new(user("u1"))),
        Arc::new(ScriptedMic::new(&[b"x"])),
    )
    .await;

    assert!(result.is_err());
}
