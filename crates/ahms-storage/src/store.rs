//! 持久化存储
//!
//! 按键的整集合加载/保存契约：没有按记录访问，
//! 每次变更都是对整个集合的读-改-写。

use ahms_core::{AhmsError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// 存储后端特征
///
/// 每个键对应一个JSON编码的集合。
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// 读取键对应的原始字节，键不存在时返回None
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 写入键对应的原始字节，整体覆盖
    async fn write(&self, key: &str, data: &[u8]) -> Result<()>;
}

/// 内存存储后端
///
/// 用于测试和演示的隔离实例。
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let mut map = self.data.write().await;
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

/// 文件存储后端
///
/// 每个集合保存为数据目录下的一个 `<key>.json` 文件。
#[derive(Debug)]
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

#[async_trait::async_trait]
impl StorageBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.key_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AhmsError::Io(e)),
        }
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        tokio::fs::write(self.key_path(key), data).await?;
        Ok(())
    }
}

/// 数据存储句柄
///
/// 在后端之上提供类型化的JSON集合读写。通过依赖注入传递给
/// 引擎和看板，便于测试时实例化隔离的存储。
#[derive(Clone)]
pub struct DataStore {
    backend: Arc<dyn StorageBackend>,
}

impl DataStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// 创建内存存储实例
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// 加载键对应的值，键不存在时返回None
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.read(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// 加载键对应的集合，键不存在时返回空集合
    pub async fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.load(key).await?.unwrap_or_default())
    }

    /// 保存键对应的值，整体覆盖
    ///
    /// 集合粒度的后写覆盖：并发写入同一集合时后保存者胜出。
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<bool> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.write(key, &bytes).await?;
        tracing::debug!("Saved collection {} ({} bytes)", key, bytes.len());
        Ok(true)
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_roundtrip() {
        let store = DataStore::in_memory();

        let saved = store.save("numbers", &vec![1, 2, 3]).await.unwrap();
        assert!(saved);

        let loaded: Vec<i32> = store.load_collection("numbers").await.unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_key_degrades_to_empty() {
        let store = DataStore::in_memory();

        let loaded: Option<Vec<i32>> = store.load("absent").await.unwrap();
        assert!(loaded.is_none());

        let collection: Vec<i32> = store.load_collection("absent").await.unwrap();
        assert!(collection.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_collection() {
        let store = DataStore::in_memory();

        store.save("numbers", &vec![1, 2, 3]).await.unwrap();
        store.save("numbers", &vec![9]).await.unwrap();

        // 整集合覆盖：后写者胜出
        let loaded: Vec<i32> = store.load_collection("numbers").await.unwrap();
        assert_eq!(loaded, vec![9]);
    }

    #[tokio::test]
    async fn test_file_backend_roundtrip() {
        let dir = std::env::temp_dir().join(format!("ahms-store-{}", uuid()));
        let store = DataStore::new(Arc::new(FileBackend::new(&dir)));

        store.save("tasks", &vec!["a", "b"]).await.unwrap();
        let loaded: Vec<String> = store.load_collection("tasks").await.unwrap();
        assert_eq!(loaded, vec!["a".to_string(), "b".to_string()]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    fn uuid() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        format!("{}-{}", std::process::id(), nanos)
    }
}
