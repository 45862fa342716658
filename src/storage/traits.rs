use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 对象流式读取的返回类型
pub type ByteStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// 一次列举请求返回的单页结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// 本页的原始对象键，按存储返回的顺序
    pub keys: Vec<String>,
    /// 续页标记，仅在 `truncated` 为 true 时有意义
    pub next_marker: Option<String>,
    pub truncated: bool,
}

/// HEAD 请求得到的对象元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    pub content_length: u64,
    /// 原始的 Last-Modified 头（RFC 2822 格式）
    pub last_modified: Option<String>,
    pub etag: Option<String>,
}

/// 对象可见性（ACL）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "public-read", alias = "public")]
    Public,
}

impl Visibility {
    /// COS ACL 头使用的取值
    pub fn as_acl(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public-read",
        }
    }
}

/// 存储客户端错误类型
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// 扁平对象存储的统一接口
///
/// 存储本身没有目录的概念，所有目录语义都由上层根据键前缀模拟。
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 上传对象（覆盖同名对象）
    async fn put_object(&self, bucket: &str, key: &str, content: Bytes)
        -> Result<(), StorageError>;

    /// 读取完整对象
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// 流式读取对象，默认实现退化为一次性读取
    async fn get_object_stream(&self, bucket: &str, key: &str) -> Result<ByteStream, StorageError> {
        let content = self.get_object(bucket, key).await?;
        Ok(Box::pin(stream::once(async move { Ok(content) })))
    }

    /// 获取对象元数据，不存在时返回 `StorageError::NotFound`
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StorageError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// 扁平列举，`marker` 为空字符串表示从头开始
    async fn list_objects(
        &self,
        bucket: &str,
        marker: &str,
        max_keys: u32,
        prefix: &str,
    ) -> Result<ListingPage, StorageError>;

    /// 服务端复制，`source_url` 形如 `bucket.cos.region.myqcloud.com/key`
    async fn copy_object(
        &self,
        bucket: &str,
        dest_key: &str,
        source_url: &str,
    ) -> Result<(), StorageError>;

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Visibility, StorageError>;

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError>;

    /// 生成存储原生的临时签名 URL
    ///
    /// `expires` 为格式化后的绝对过期时间（`%Y-%m-%d %H:%M:%S UTC`），
    /// `params` 为透传给签名的额外查询参数。
    fn temporary_url(
        &self,
        bucket: &str,
        key: &str,
        expires: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, StorageError>;
}
