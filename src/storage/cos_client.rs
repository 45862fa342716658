use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{Client, Method, Response, StatusCode};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::config::CosConfig;
use crate::fs::expiry::parse_expiry_text;
use crate::storage::cos::{
    build_cos_auth_headers, build_object_url, encode_object_key, generate_cos_presigned_url,
    parse_acl_response, parse_error_message, parse_list_objects_response,
};
use crate::storage::traits::{
    ByteStream, ListingPage, ObjectMetadata, ObjectStore, StorageError, Visibility,
};
use crate::utils::crypto::content_md5;

/// 腾讯云 COS 的 HTTP 客户端
///
/// 统一使用 XML API，签名算法为 q-sign-algorithm=sha1。
pub struct CosClient {
    client: Client,
    region: String,
    scheme: &'static str,
    secret_id: String,
    secret_key: String,
    token: Option<String>,
}

impl CosClient {
    pub fn new(config: &CosConfig) -> Result<Self, StorageError> {
        let secret_id = config
            .secret_id
            .clone()
            .ok_or_else(|| StorageError::InvalidConfig("COS secret id is required".to_string()))?;

        let secret_key = config
            .secret_key
            .clone()
            .ok_or_else(|| StorageError::InvalidConfig("COS secret key is required".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .build()
            .map_err(|e| {
                StorageError::ConnectionFailed(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            region: config.region.clone(),
            scheme: config.scheme(),
            secret_id,
            secret_key,
            token: config.token.clone(),
        })
    }

    /// 获取存储桶的主机名
    fn get_host(&self, bucket: &str) -> String {
        format!("{}.cos.{}.myqcloud.com", bucket, self.region)
    }

    fn get_endpoint(&self, bucket: &str) -> String {
        format!("{}://{}", self.scheme, self.get_host(bucket))
    }

    /// 发送签名请求并检查响应状态
    async fn send(
        &self,
        method: Method,
        bucket: &str,
        key: &str,
        params: BTreeMap<String, String>,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Result<Response, StorageError> {
        let host = self.get_host(bucket);
        let uri = format!("/{}", key);

        let mut url = build_object_url(&self.get_endpoint(bucket), key);
        if !params.is_empty() {
            let query_string = params
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        urlencoding::encode(k).to_string()
                    } else {
                        format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            url = format!("{}?{}", url, query_string);
        }

        log::debug!("COS {} {}", method, url);

        let auth_headers = build_cos_auth_headers(
            method.as_str(),
            &uri,
            &params,
            &headers,
            &self.secret_id,
            &self.secret_key,
            &host,
            self.token.as_deref(),
        );

        let mut req_builder = self.client.request(method.clone(), &url);
        for (key, value) in auth_headers {
            req_builder = req_builder.header(&key, &value);
        }
        if let Some(body) = body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await.map_err(|e| {
            StorageError::NetworkError(format!("{} request failed: {}", method, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_error_message(&body);
        log::debug!("COS {} {} failed with status {}: {}", method, key, status, message);

        match status {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(key.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(StorageError::AuthenticationFailed(message))
            }
            _ => Err(StorageError::RequestFailed(format!(
                "{} {} failed with status {}: {}",
                method, key, status, message
            ))),
        }
    }

    /// 把 `domain/key` 形式的复制源中的对象键编码
    fn encode_copy_source(source_url: &str) -> String {
        match source_url.split_once('/') {
            Some((domain, key)) => format!("{}/{}", domain, encode_object_key(key)),
            None => source_url.to_string(),
        }
    }
}

fn header_string(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

#[async_trait]
impl ObjectStore for CosClient {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
    ) -> Result<(), StorageError> {
        let mut headers = HashMap::new();
        headers.insert("Content-MD5".to_string(), content_md5(&content));

        self.send(Method::PUT, bucket, key, BTreeMap::new(), headers, Some(content))
            .await?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let response = self
            .send(Method::GET, bucket, key, BTreeMap::new(), HashMap::new(), None)
            .await?;

        response
            .bytes()
            .await
            .map_err(|e| {
                StorageError::NetworkError(format!("Failed to read object content: {}", e))
            })
    }

    async fn get_object_stream(&self, bucket: &str, key: &str) -> Result<ByteStream, StorageError> {
        let response = self
            .send(Method::GET, bucket, key, BTreeMap::new(), HashMap::new(), None)
            .await?;

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| StorageError::NetworkError(format!("Failed to read chunk: {}", e)))
        });
        Ok(Box::pin(stream))
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StorageError> {
        let response = self
            .send(Method::HEAD, bucket, key, BTreeMap::new(), HashMap::new(), None)
            .await?;

        Ok(ObjectMetadata {
            content_type: header_string(&response, "content-type"),
            content_length: header_string(&response, "content-length")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            last_modified: header_string(&response, "last-modified"),
            etag: header_string(&response, "etag").map(|s| s.trim_matches('"').to_string()),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.send(Method::DELETE, bucket, key, BTreeMap::new(), HashMap::new(), None)
            .await?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        marker: &str,
        max_keys: u32,
        prefix: &str,
    ) -> Result<ListingPage, StorageError> {
        let mut params = BTreeMap::new();
        params.insert("max-keys".to_string(), max_keys.to_string());
        if !prefix.is_empty() {
            params.insert("prefix".to_string(), prefix.to_string());
        }
        if !marker.is_empty() {
            params.insert("marker".to_string(), marker.to_string());
        }

        let response = self
            .send(Method::GET, bucket, "", params, HashMap::new(), None)
            .await?;

        let xml_content = response.text().await.map_err(|e| {
            StorageError::NetworkError(format!("Failed to read response body: {}", e))
        })?;

        let mut page = parse_list_objects_response(&xml_content)?;
        // 未指定 delimiter 时部分实现不返回 NextMarker，以本页最后一个键续页
        if page.truncated && page.next_marker.is_none() {
            page.next_marker = page.keys.last().cloned();
        }
        Ok(page)
    }

    async fn copy_object(
        &self,
        bucket: &str,
        dest_key: &str,
        source_url: &str,
    ) -> Result<(), StorageError> {
        let mut headers = HashMap::new();
        headers.insert(
            "x-cos-copy-source".to_string(),
            Self::encode_copy_source(source_url),
        );

        self.send(Method::PUT, bucket, dest_key, BTreeMap::new(), headers, None)
            .await?;
        Ok(())
    }

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Visibility, StorageError> {
        let mut params = BTreeMap::new();
        params.insert("acl".to_string(), String::new());

        let response = self
            .send(Method::GET, bucket, key, params, HashMap::new(), None)
            .await?;

        let xml_content = response.text().await.map_err(|e| {
            StorageError::NetworkError(format!("Failed to read response body: {}", e))
        })?;
        parse_acl_response(&xml_content)
    }

    async fn put_object_acl(
        &self,
        bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        let mut params = BTreeMap::new();
        params.insert("acl".to_string(), String::new());
        let mut headers = HashMap::new();
        headers.insert("x-cos-acl".to_string(), visibility.as_acl().to_string());

        self.send(Method::PUT, bucket, key, params, headers, None)
            .await?;
        Ok(())
    }

    fn temporary_url(
        &self,
        bucket: &str,
        key: &str,
        expires: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<String, StorageError> {
        let expires_at = parse_expiry_text(expires, chrono::Utc::now()).ok_or_else(|| {
            StorageError::RequestFailed(format!("Invalid expiry for presigned URL: {}", expires))
        })?;

        let host = self.get_host(bucket);
        let object_url = build_object_url(&self.get_endpoint(bucket), key);

        Ok(generate_cos_presigned_url(
            &object_url,
            &format!("/{}", key),
            &host,
            expires_at,
            params,
            &self.secret_id,
            &self.secret_key,
            self.token.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CosClient {
        let config =
            CosConfig::new("ap-guangzhou", "test-1250000000").with_credentials("id", "key");
        CosClient::new(&config).unwrap()
    }

    #[test]
    fn requires_credentials() {
        let config = CosConfig::new("ap-guangzhou", "test-1250000000");
        assert!(matches!(
            CosClient::new(&config),
            Err(StorageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn copy_source_encodes_key_only() {
        assert_eq!(
            CosClient::encode_copy_source("b.cos.ap-guangzhou.myqcloud.com/src/a b.txt"),
            "b.cos.ap-guangzhou.myqcloud.com/src/a%20b.txt"
        );
    }

    #[test]
    fn temporary_url_uses_bucket_domain() {
        let url = client()
            .temporary_url(
                "test-1250000000",
                "dir/1.txt",
                "2099-01-01 00:00:00 UTC",
                &BTreeMap::new(),
            )
            .unwrap();
        assert!(url.starts_with("http://test-1250000000.cos.ap-guangzhou.myqcloud.com/dir/1.txt?q-sign-algorithm=sha1"));
        assert!(url.contains(";4070908800&"));
    }

    #[test]
    fn temporary_url_rejects_garbage_expiry() {
        let result = client().temporary_url("b", "k", "not a date", &BTreeMap::new());
        assert!(matches!(result, Err(StorageError::RequestFailed(_))));
    }
}
