//! Integration tests for the asynchronous facade and its cache overlay

use keystash::{
    AsyncAdapter, AsyncStorage, Blocking, MemoryAdapter, Serializer, StorageError, StorageOptions,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("backend rejected {0}")]
struct Rejected(String);

/// Async adapter that yields before every call and rejects chosen keys
#[derive(Default)]
struct Slow {
    items: MemoryAdapter,
    reject: Vec<String>,
    writes: Mutex<Vec<String>>,
}

impl AsyncAdapter for Slow {
    type Config = ();
    type Error = Rejected;

    async fn get_item(&self, key: &str) -> Result<Option<String>, Rejected> {
        tokio::task::yield_now().await;
        Ok(self.items.get_item(key))
    }

    async fn set_item(&self, key: &str, value: &str, _config: Option<&()>) -> Result<(), Rejected> {
        tokio::time::sleep(Duration::from_millis(1)).await;
        if self.reject.iter().any(|k| k == key) {
            return Err(Rejected(key.to_string()));
        }
        self.writes.lock().push(key.to_string());
        self.items.set_item(key, value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), Rejected> {
        tokio::task::yield_now().await;
        self.items.remove_item(key);
        Ok(())
    }
}

/// Serializer that cannot encode anything
struct Refusing;

impl Serializer for Refusing {
    type Error = Rejected;

    fn stringify(&self, _value: &Value) -> Result<String, Rejected> {
        Err(Rejected("value".to_string()))
    }

    fn parse(&self, raw: &str) -> Result<Value, Rejected> {
        Err(Rejected(raw.to_string()))
    }
}

#[tokio::test]
async fn test_round_trips() {
    let storage = AsyncStorage::new(Slow::default(), StorageOptions::new().prefix("app:"));

    assert!(storage.set("s", Some(&json!("plain text"))).await);
    assert!(storage.set("o", Some(&json!({"list": [1, 2]}))).await);
    assert!(storage.set("n", None).await);

    assert_eq!(storage.get("s").await.unwrap(), Some(json!("plain text")));
    assert_eq!(storage.get("o").await.unwrap(), Some(json!({"list": [1, 2]})));
    assert_eq!(storage.get("n").await.unwrap(), None);
    assert_eq!(storage.adapter().items.get_item("app:s").as_deref(), Some("plain text"));

    assert_eq!(storage.pop("o").await.unwrap(), Some(json!({"list": [1, 2]})));
    assert_eq!(storage.get("o").await.unwrap(), None);
}

#[tokio::test]
async fn test_rejected_write_returns_false() {
    let adapter = Slow {
        reject: vec!["k".to_string()],
        ..Slow::default()
    };
    let storage = AsyncStorage::new(adapter, StorageOptions::new());

    assert!(!storage.set("k", Some(&json!(1))).await);
    assert!(storage.set("other", Some(&json!(1))).await);
}

#[tokio::test]
async fn test_serializer_failure_returns_false() {
    let storage = AsyncStorage::new(Slow::default(), StorageOptions::new().serializer(Refusing));

    assert!(!storage.set("k", Some(&json!({"a": 1}))).await);
    assert!(!storage.define("d").set(Some(&json!([1]))).await);
    assert!(storage.adapter().writes.lock().is_empty());
    assert_eq!(storage.adapter().items.get_item("k"), None);

    assert!(storage.set("k", Some(&json!("raw"))).await);
    assert_eq!(storage.adapter().items.get_item("k").as_deref(), Some("raw"));
}

#[tokio::test]
async fn test_cache_visible_before_sync_backend_after() {
    let storage = AsyncStorage::new(Slow::default(), StorageOptions::new());

    storage.set_cache("k", Some(r#"{"v":1}"#));
    assert_eq!(storage.get_cache("k").as_deref(), Some(r#"{"v":1}"#));
    assert_eq!(storage.get("k").await.unwrap(), None);

    storage.sync_cache().await.unwrap();
    assert_eq!(storage.get("k").await.unwrap(), Some(json!({"v": 1})));
}

#[tokio::test]
async fn test_sync_writes_in_overlay_order() {
    let storage = AsyncStorage::new(Slow::default(), StorageOptions::new().prefix("p."));
    for key in ["c", "a", "b"] {
        storage.set_cache(key, Some("1"));
    }

    storage.sync_cache().await.unwrap();

    let writes = storage.adapter().writes.lock().clone();
    assert_eq!(writes, vec!["p.c", "p.a", "p.b"]);
}

#[tokio::test]
async fn test_sync_stops_at_first_failure() {
    let adapter = Slow {
        reject: vec!["b".to_string()],
        ..Slow::default()
    };
    let storage = AsyncStorage::new(adapter, StorageOptions::new());
    for key in ["a", "b", "c"] {
        storage.set_cache(key, Some("1"));
    }

    let result = storage.sync_cache().await;

    assert!(matches!(result, Err(StorageError::Adapter(_))));
    assert_eq!(storage.get("a").await.unwrap(), Some(json!(1)));
    assert_eq!(storage.get("c").await.unwrap(), None);
}

#[tokio::test]
async fn test_shared_facade_across_tasks() {
    let storage = Arc::new(AsyncStorage::new(
        Blocking::new(MemoryAdapter::new()),
        StorageOptions::new(),
    ));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let storage = Arc::clone(&storage);
        tasks.push(tokio::spawn(async move {
            storage.set(&format!("k{i}"), Some(&json!(i))).await
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap());
    }

    for i in 0..8 {
        assert_eq!(storage.get(&format!("k{i}")).await.unwrap(), Some(json!(i)));
    }
}

#[tokio::test]
async fn test_define_group_on_async_storage() {
    let storage = AsyncStorage::new(MemoryAdapter::new(), StorageOptions::new());
    let group = storage.define_group([("token", "refresh_token"), ("user", "user_info")]);

    assert!(group["token"].set(Some(&json!("x"))).await);
    assert_eq!(storage.get("refresh_token").await.unwrap(), Some(json!("x")));
    assert_eq!(group["user"].get().await.unwrap(), None);
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_behind_blocking_adapter() {
    use keystash::{SqliteAdapter, SqliteConfig};

    let db = SqliteAdapter::open_in_memory().unwrap();
    let storage = AsyncStorage::new(Blocking::new(db), StorageOptions::new().prefix("s:"));

    let short = storage.define_with("short", SqliteConfig::expires_in(Duration::ZERO));
    assert!(short.set(Some(&json!("gone"))).await);
    assert!(storage.set("long", Some(&json!([1]))).await);

    assert_eq!(short.get().await.unwrap(), None);
    assert_eq!(storage.get("long").await.unwrap(), Some(json!([1])));

    storage.set_cache("staged", Some("true"));
    storage.sync_cache().await.unwrap();
    assert_eq!(storage.get("staged").await.unwrap(), Some(json!(true)));
}
