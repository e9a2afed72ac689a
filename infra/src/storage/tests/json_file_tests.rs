//! Tests for the JSON file OTP store

use chrono::{Duration, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use om_core::domain::entities::OtpRecord;
use om_core::errors::StorageError;
use om_core::services::clock::{Clock, ManualClock};
use om_core::services::verification::OtpStoreTrait;

use crate::storage::JsonFileOtpStore;

fn temp_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("om_infra_{}", uuid::Uuid::new_v4()))
        .join("otp_records.json")
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ))
}

async fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let path = temp_path();
    let clock = clock();

    let store = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();
    let record = OtpRecord::issue("a@x.com", "012345", clock.now(), Duration::seconds(300));
    store.upsert(&record).await.unwrap();
    drop(store);

    let reopened = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();
    assert_eq!(reopened.get("a@x.com").await.unwrap(), Some(record));

    cleanup(&path).await;
}

#[tokio::test]
async fn test_file_is_a_json_array_of_records() {
    let path = temp_path();
    let clock = clock();

    let store = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();
    store
        .upsert(&OtpRecord::issue("a@x.com", "111111", clock.now(), Duration::seconds(300)))
        .await
        .unwrap();

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["identity"], "a@x.com");
    assert_eq!(array[0]["code"], "111111");

    cleanup(&path).await;
}

#[tokio::test]
async fn test_upsert_prunes_stale_records() {
    let path = temp_path();
    let clock = clock();
    let store = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();

    store
        .upsert(&OtpRecord::issue("old@x.com", "111111", clock.now(), Duration::seconds(10)))
        .await
        .unwrap();
    clock.advance(Duration::seconds(30));
    store
        .upsert(&OtpRecord::issue("new@x.com", "222222", clock.now(), Duration::seconds(300)))
        .await
        .unwrap();

    assert!(store.load("old@x.com").await.unwrap().is_none());
    assert!(store.load("new@x.com").await.unwrap().is_some());
    assert_eq!(store.sweep_expired().await.unwrap(), 0);

    cleanup(&path).await;
}

#[tokio::test]
async fn test_expired_record_visible_to_load_until_evicted() {
    let path = temp_path();
    let clock = clock();
    let store = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();

    let record = OtpRecord::issue("a@x.com", "111111", clock.now(), Duration::seconds(300));
    store.upsert(&record).await.unwrap();
    clock.advance(Duration::seconds(301));

    assert_eq!(store.load("a@x.com").await.unwrap(), Some(record.clone()));
    assert!(store.consume(&record).await.unwrap());
    assert!(store.load("a@x.com").await.unwrap().is_none());

    cleanup(&path).await;
}

#[tokio::test]
async fn test_delete_and_consume() {
    let path = temp_path();
    let clock = clock();
    let store = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();

    let first = OtpRecord::issue("a@x.com", "111111", clock.now(), Duration::seconds(300));
    store.upsert(&first).await.unwrap();
    let second = OtpRecord::issue("a@x.com", "222222", clock.now(), Duration::seconds(300));
    store.upsert(&second).await.unwrap();

    assert!(!store.consume(&first).await.unwrap());
    store.delete("a@x.com").await.unwrap();
    store.delete("a@x.com").await.unwrap();
    assert!(store.get("a@x.com").await.unwrap().is_none());

    cleanup(&path).await;
}

#[tokio::test]
async fn test_corrupted_file_is_reported() {
    let path = temp_path();
    let clock = clock();
    let store = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();

    tokio::fs::write(&path, "{ not json").await.unwrap();
    let err = store.get("a@x.com").await.unwrap_err();
    assert!(matches!(err, StorageError::Corrupted { .. }));

    assert!(JsonFileOtpStore::open(&path, clock).await.is_err());

    cleanup(&path).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_leave_one_whole_record() {
    let path = temp_path();
    let clock = clock();
    let store = Arc::new(JsonFileOtpStore::open(&path, clock.clone()).await.unwrap());

    let records: Vec<OtpRecord> = (0..16)
        .map(|i| {
            OtpRecord::issue(
                "a@x.com",
                format!("{:06}", i),
                clock.now() + Duration::seconds(i),
                Duration::seconds(300),
            )
        })
        .collect();

    let handles: Vec<_> = records
        .iter()
        .cloned()
        .map(|record| {
            let store = store.clone();
            tokio::spawn(async move { store.upsert(&record).await.unwrap() })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = store.load("a@x.com").await.unwrap().unwrap();
    assert!(records.contains(&stored));

    let reopened = JsonFileOtpStore::open(&path, clock.clone()).await.unwrap();
    assert_eq!(reopened.load("a@x.com").await.unwrap(), Some(stored.clone()));

    let consumers: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let stored = stored.clone();
            tokio::spawn(async move { store.consume(&stored).await.unwrap() })
        })
        .collect();
    let mut removed = 0;
    for handle in consumers {
        if handle.await.unwrap() {
            removed += 1;
        }
    }
    assert_eq!(removed, 1);

    cleanup(&path).await;
}
