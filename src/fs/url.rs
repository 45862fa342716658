//! 访问链接生成
//!
//! 公共读文件返回固定链接；私有文件返回临时链接，
//! 临时链接优先走 CDN（可带鉴权签名），否则使用存储原生的预签名 URL。

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::config::CosConfig;
use crate::error::FsError;
use crate::storage::traits::{ObjectStore, Visibility};
use crate::utils::crypto::md5_hex;

use super::expiry::{format_expiry, Expiry, ExpirySpec};

/// 单次临时链接调用的选项，不会修改共享配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporaryUrlOptions {
    /// 本次调用是否走内网，None 表示沿用配置
    pub internal: Option<bool>,
    /// 透传给原生签名的查询参数
    pub params: BTreeMap<String, String>,
}

impl TemporaryUrlOptions {
    pub fn internal(internal: bool) -> Self {
        Self {
            internal: Some(internal),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

pub struct UrlResolver<'a> {
    config: &'a CosConfig,
}

impl<'a> UrlResolver<'a> {
    pub fn new(config: &'a CosConfig) -> Self {
        Self { config }
    }

    /// 不走内网且配置了 CDN 时返回 CDN 域名
    fn cdn_host(&self, internal: bool) -> Option<&'a str> {
        if internal {
            None
        } else {
            self.config.cdn.as_deref()
        }
    }

    pub fn domain(&self, internal: bool) -> String {
        match self.cdn_host(internal) {
            Some(cdn) => cdn.to_string(),
            None => self.config.default_domain(),
        }
    }

    /// 公共读文件的固定链接
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}://{}/{}",
            self.config.scheme(),
            self.domain(self.config.internal),
            path
        )
    }

    /// 按可见性选择固定链接或临时链接
    pub fn url(
        &self,
        store: &dyn ObjectStore,
        path: &str,
        visibility: Visibility,
    ) -> Result<String, FsError> {
        match visibility {
            Visibility::Public => Ok(self.public_url(path)),
            Visibility::Private => {
                self.temporary_url(store, path, None, &TemporaryUrlOptions::default())
            }
        }
    }

    pub fn temporary_url(
        &self,
        store: &dyn ObjectStore,
        path: &str,
        expiry: Option<Expiry>,
        options: &TemporaryUrlOptions,
    ) -> Result<String, FsError> {
        self.temporary_url_at(store, path, expiry, options, Utc::now())
    }

    pub fn temporary_url_at(
        &self,
        store: &dyn ObjectStore,
        path: &str,
        expiry: Option<Expiry>,
        options: &TemporaryUrlOptions,
        now: DateTime<Utc>,
    ) -> Result<String, FsError> {
        let expires = ExpirySpec::classify(expiry).resolve_at(now)?;
        let internal = options.internal.unwrap_or(self.config.internal);

        if let Some(cdn) = self.cdn_host(internal) {
            let url = format!("{}://{}/{}", self.config.scheme(), cdn, path);

            return Ok(match &self.config.cdn_token {
                Some(token) => {
                    let sign = md5_hex(&format!("{}/{}{}", token, path, expires));
                    format!("{}?sign={}&t={}", url, sign, expires)
                }
                None => url,
            });
        }

        let formatted = format_expiry(expires)?;
        Ok(store.temporary_url(&self.config.bucket, path, &formatted, &options.params)?)
    }
}
