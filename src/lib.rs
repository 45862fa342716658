//! 基于腾讯云 COS 的层级文件系统适配器
//!
//! COS 只提供扁平的键值存储，本库在其上模拟目录：列举时补齐祖先目录，
//! 目录的复制、重命名、删除都分解为逐个对象的操作；同时负责生成公共链接、
//! 原生预签名链接和 CDN 鉴权链接。

pub mod config;
pub mod error;
pub mod filesystem;
pub mod fs;
pub mod storage;
pub mod utils;

pub use config::CosConfig;
pub use error::FsError;
pub use filesystem::CosFilesystem;
pub use fs::{Entry, EntryKind, Expiry, TemporaryUrlOptions};
pub use storage::{ListingPage, ObjectMetadata, ObjectStore, StorageError, Visibility};
