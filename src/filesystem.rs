use bytes::Bytes;
use chrono::DateTime;
use std::sync::Arc;

use crate::config::CosConfig;
use crate::error::FsError;
use crate::fs::{
    Entry, Expiry, FolderOperationExecutor, PathSpec, PaginatedLister, TemporaryUrlOptions,
    UrlResolver,
};
use crate::storage::cos_client::CosClient;
use crate::storage::traits::{ByteStream, ObjectMetadata, ObjectStore, StorageError, Visibility};

/// 基于对象存储模拟的层级文件系统
///
/// 持有已校验的配置和一个存储客户端，可以廉价克隆并在多个任务间共享。
#[derive(Clone)]
pub struct CosFilesystem {
    store: Arc<dyn ObjectStore>,
    config: Arc<CosConfig>,
    default_domain: String,
}

impl CosFilesystem {
    pub fn new(config: CosConfig, store: Arc<dyn ObjectStore>) -> Result<Self, FsError> {
        config.validate()?;
        let default_domain = config.default_domain();

        Ok(Self {
            store,
            config: Arc::new(config),
            default_domain,
        })
    }

    /// 使用 HTTP 客户端连接腾讯云 COS
    pub fn connect(config: CosConfig) -> Result<Self, FsError> {
        config.validate()?;
        let client = CosClient::new(&config)?;
        Self::new(config, Arc::new(client))
    }

    pub fn config(&self) -> &CosConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    fn folders(&self) -> FolderOperationExecutor<'_> {
        FolderOperationExecutor::new(
            self.store.as_ref(),
            self.bucket(),
            &self.default_domain,
            self.config.disable_asserts,
        )
    }

    fn urls(&self) -> UrlResolver<'_> {
        UrlResolver::new(&self.config)
    }

    // ---- 文件操作 ----

    /// 写入文件，已存在时覆盖
    pub async fn write(&self, path: &str, contents: impl Into<Bytes>) -> Result<(), FsError> {
        let path = PathSpec::file(path);
        self.store
            .put_object(self.bucket(), path.as_str(), contents.into())
            .await?;
        Ok(())
    }

    pub async fn update(&self, path: &str, contents: impl Into<Bytes>) -> Result<(), FsError> {
        self.write(path, contents).await
    }

    pub async fn read(&self, path: &str) -> Result<Bytes, FsError> {
        Ok(self.store.get_object(self.bucket(), path).await?)
    }

    pub async fn read_stream(&self, path: &str) -> Result<ByteStream, FsError> {
        Ok(self.store.get_object_stream(self.bucket(), path).await?)
    }

    /// 文件是否存在
    pub async fn has(&self, path: &str) -> Result<bool, FsError> {
        match self.store.head_object(self.bucket(), path).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn metadata(&self, path: &str) -> Result<ObjectMetadata, FsError> {
        Ok(self.store.head_object(self.bucket(), path).await?)
    }

    /// MIME 类型（去掉 `; charset=...` 等参数）
    pub async fn mimetype(&self, path: &str) -> Result<String, FsError> {
        let metadata = self.metadata(path).await?;
        Ok(metadata
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_string())
            .unwrap_or_default())
    }

    /// 最后修改时间戳（秒），缺失时为 0
    pub async fn timestamp(&self, path: &str) -> Result<i64, FsError> {
        let metadata = self.metadata(path).await?;
        Ok(metadata
            .last_modified
            .as_deref()
            .and_then(|lm| DateTime::parse_from_rfc2822(lm).ok())
            .map(|dt| dt.timestamp())
            .unwrap_or(0))
    }

    pub async fn size(&self, path: &str) -> Result<u64, FsError> {
        Ok(self.metadata(path).await?.content_length)
    }

    pub async fn delete(&self, path: &str) -> Result<(), FsError> {
        self.store.delete_object(self.bucket(), path).await?;
        Ok(())
    }

    /// 服务端复制单个文件
    pub async fn copy(&self, from: &str, to: &str) -> Result<(), FsError> {
        let source_url = format!("{}/{}", self.default_domain, from);
        self.store.copy_object(self.bucket(), to, &source_url).await?;
        Ok(())
    }

    /// 重命名单个文件：复制成功后删除源文件
    pub async fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        self.copy(from, to).await?;
        self.delete(from).await
    }

    /// 创建目录，COS 本身不支持目录，用一个 0 字节对象模拟
    pub async fn create_dir(&self, path: &str) -> Result<(), FsError> {
        let directory = PathSpec::directory(path);
        if directory.is_root() {
            return Err(FsError::RootViolation("created"));
        }
        self.store
            .put_object(self.bucket(), directory.as_str(), Bytes::new())
            .await?;
        Ok(())
    }

    // ---- 列表与目录操作 ----

    /// 列出目录内容，目录由键前缀模拟
    pub async fn list_contents(
        &self,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<Entry>, FsError> {
        let directory = PathSpec::directory(directory);
        self.folders().entries(&directory, recursive).await
    }

    /// 列出目录下的原始对象键
    pub async fn list_keys(&self, directory: &str) -> Result<Vec<String>, FsError> {
        let directory = PathSpec::directory(directory);
        PaginatedLister::new(self.store.as_ref(), self.bucket())
            .list_keys(directory.as_str())
            .await
    }

    pub async fn folder_exists(&self, dirname: &str) -> Result<bool, FsError> {
        self.folders().exists(dirname).await
    }

    /// 复制目录，源目录必须存在、目标目录必须不存在
    pub async fn folder_copy(&self, dirname: &str, new_dirname: &str) -> Result<(), FsError> {
        self.folders().copy(dirname, new_dirname).await?;
        Ok(())
    }

    /// 重命名目录，复制失败时源目录保持不变
    pub async fn folder_rename(&self, dirname: &str, new_dirname: &str) -> Result<(), FsError> {
        self.folders().rename(dirname, new_dirname).await?;
        Ok(())
    }

    /// 删除目录及其下所有对象
    pub async fn delete_dir(&self, dirname: &str) -> Result<(), FsError> {
        if PathSpec::directory(dirname).is_root() {
            return Err(FsError::RootViolation("deleted"));
        }
        self.folders().delete(dirname).await?;
        Ok(())
    }

    // ---- 可见性与链接 ----

    /// 文件可见性，直接取配置中的默认 ACL
    pub fn visibility(&self, _path: &str) -> Visibility {
        self.config.acl
    }

    pub async fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FsError> {
        self.store.put_object_acl(self.bucket(), path, visibility).await?;
        Ok(())
    }

    /// 公共读文件返回固定链接，否则返回临时链接
    pub async fn url(&self, path: &str) -> Result<String, FsError> {
        self.assert_file_present(path).await?;
        self.urls().url(self.store.as_ref(), path, self.visibility(path))
    }

    /// 临时链接，`expiry` 缺省为一小时
    pub async fn temporary_url(
        &self,
        path: &str,
        expiry: Option<Expiry>,
        options: &TemporaryUrlOptions,
    ) -> Result<String, FsError> {
        self.assert_file_present(path).await?;
        self.urls()
            .temporary_url(self.store.as_ref(), path, expiry, options)
    }

    async fn assert_file_present(&self, path: &str) -> Result<(), FsError> {
        if !self.config.disable_asserts && !self.has(path).await? {
            return Err(FsError::FileNotFound {
                path: path.to_string(),
            });
        }
        Ok(())
    }
}
