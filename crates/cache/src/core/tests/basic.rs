//! Plain read and write tests

use super::*;
use cachext_core::ErrorKind;

#[tokio::test]
async fn test_basic_operations() -> Result<()> {
    let (_, cache) = memory_cache();

    cache.set("key1", "value1", Expiry::Never).await?;
    let value: Option<String> = cache.get("key1").await?;
    assert_eq!(value, Some("value1".to_string()));

    assert!(cache.exists("key1").await?);
    assert!(!cache.exists("key2").await?);

    assert!(cache.remove("key1").await?);
    assert!(!cache.remove("key1").await?);
    assert_eq!(cache.get::<String>("key1").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_structured_values() -> Result<()> {
    let (_, cache) = memory_cache();
    let scores = vec![("ada".to_string(), 3u32), ("bob".to_string(), 5)];

    cache.set("scores", &scores, Expiry::Never).await?;
    let read: Vec<(String, u32)> = cache.get("scores").await?.unwrap_or_default();
    assert_eq!(read, scores);
    Ok(())
}

#[tokio::test]
async fn test_relative_and_absolute_expiry() -> Result<()> {
    let (_, cache) = memory_cache();

    cache.set_for("short", &1u8, Duration::from_millis(10)).await?;
    cache
        .set_until("long", &2u8, chrono::Utc::now() + chrono::Duration::hours(1))
        .await?;
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(!cache.exists("short").await?);
    assert_eq!(cache.get::<u8>("long").await?, Some(2));
    Ok(())
}

#[tokio::test]
async fn test_remove_many() -> Result<()> {
    let (store, cache) = memory_cache();
    for key in ["a", "b", "c"] {
        cache.set(key, key, Expiry::Never).await?;
    }

    assert_eq!(cache.remove_many(&["a", "c", "missing"]).await?, 2);
    assert_eq!(store.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_rejects_invalid_keys() {
    let (_, cache) = memory_cache();

    let err = cache.set("", &1u8, Expiry::Never).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = cache.get::<u8>("bad\nkey").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = cache.remove_many(&["ok", ""]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_get_with_wrong_type_fails_to_decode() {
    let (_, cache) = memory_cache();
    cache.set("k", "text", Expiry::Never).await.unwrap();

    let err = cache.get::<u64>("k").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
    assert_eq!(err.key(), Some("k"));
}
