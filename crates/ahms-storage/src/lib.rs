//! # AHMS Storage
//!
//! 持久化存储契约与后端实现：按键的整集合JSON加载/保存，
//! 提供内存后端（测试隔离）和文件后端（本地数据目录）。

pub mod keys;
pub mod store;

pub use store::{DataStore, FileBackend, MemoryBackend, StorageBackend};
