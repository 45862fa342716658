use serde::{Deserialize, Serialize};

use crate::error::FsError;
use crate::storage::traits::Visibility;

/// HTTP 超时的默认值（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// COS 文件系统配置
///
/// 所有可识别的选项及其默认值都在这里列出，构造文件系统时统一校验一次。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosConfig {
    /// 地域，例如 `ap-guangzhou`
    pub region: String,
    /// 存储桶，格式 `name-appid`
    pub bucket: String,
    #[serde(default)]
    pub secret_id: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// 临时密钥的 session token
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_timeout")]
    pub connect_timeout: u64,
    /// 默认可见性，决定 `url()` 返回固定链接还是临时链接
    #[serde(default)]
    pub acl: Visibility,
    /// 是否走内网（内网访问时不使用 CDN）
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub ssl: bool,
    /// CDN 域名
    #[serde(default)]
    pub cdn: Option<String>,
    /// CDN 鉴权 token
    #[serde(default, alias = "cdnToken")]
    pub cdn_token: Option<String>,
    /// 跳过目录存在性断言
    #[serde(default, alias = "disableAssertions")]
    pub disable_asserts: bool,
}

impl CosConfig {
    pub fn new(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            bucket: bucket.into(),
            secret_id: None,
            secret_key: None,
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            connect_timeout: DEFAULT_TIMEOUT_SECS,
            acl: Visibility::Private,
            internal: false,
            ssl: false,
            cdn: None,
            cdn_token: None,
            disable_asserts: false,
        }
    }

    pub fn with_credentials(
        mut self,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.secret_id = Some(secret_id.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_cdn(mut self, host: impl Into<String>, token: Option<String>) -> Self {
        self.cdn = Some(host.into());
        self.cdn_token = token;
        self
    }

    /// 从 JSON 文本解析并校验配置
    pub fn from_json(json: &str) -> Result<Self, FsError> {
        let config: CosConfig = serde_json::from_str(json)
            .map_err(|e| FsError::InvalidConfig(format!("malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), FsError> {
        if self.region.trim().is_empty() {
            return Err(FsError::InvalidConfig("region is required".to_string()));
        }
        if self.bucket.trim().is_empty() {
            return Err(FsError::InvalidConfig("bucket can not be empty".to_string()));
        }
        if let Some(cdn) = &self.cdn {
            url::Host::parse(cdn).map_err(|e| {
                FsError::InvalidConfig(format!("cdn '{}' is not a valid domain: {}", cdn, e))
            })?;
        }
        Ok(())
    }

    pub fn scheme(&self) -> &'static str {
        if self.ssl {
            "https"
        } else {
            "http"
        }
    }

    /// 存储桶的默认虚拟主机域名
    pub fn default_domain(&self) -> String {
        format!("{}.cos.{}.myqcloud.com", self.bucket, self.region)
    }

    /// 存储桶的访问端点
    pub fn endpoint(&self) -> String {
        format!("{}://{}", self.scheme(), self.default_domain())
    }
}
