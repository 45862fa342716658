use base64::Engine;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::{Digest, Sha1};

/// SHA1 哈希函数（返回小写十六进制）
pub fn sha1_hex(data: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// HMAC-SHA1 计算函数（返回小写十六进制）
/// 用于腾讯云 COS 的 q-sign-algorithm=sha1 签名
pub fn hmac_sha1_hex(key: &str, data: &str) -> String {
    type HmacSha1 = Hmac<Sha1>;
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// MD5 哈希函数（返回小写十六进制）
/// 用于 CDN 鉴权 URL 的 sign 参数
pub fn md5_hex(data: &str) -> String {
    hex::encode(Md5::digest(data.as_bytes()))
}

/// 计算 Content-MD5 头（base64 编码的原始 MD5 摘要）
pub fn content_md5(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(Md5::digest(data))
}
