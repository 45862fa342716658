use crate::utils::crypto::{hmac_sha1_hex, sha1_hex};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

/// 普通请求签名的有效期（秒）
const REQUEST_SIGN_VALID_SECONDS: i64 = 600;

/// 把键值对规范化为 COS 签名需要的形式
///
/// 键转小写后 URL 编码，值 URL 编码，按键排序。
/// 返回 (`k1=v1&k2=v2`, `k1;k2`)。
fn canonicalize_pairs<'a, I>(pairs: I) -> (String, String)
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let sorted: BTreeMap<String, String> = pairs
        .into_iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(&k.to_lowercase()).to_string(),
                urlencoding::encode(v).to_string(),
            )
        })
        .collect();

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    let list = sorted.keys().cloned().collect::<Vec<_>>().join(";");
    (joined, list)
}

/// 计算 COS 签名（q-sign-algorithm=sha1）
///
/// 返回完整的授权字符串，可直接作为 Authorization 头，
/// 也可以拼接到 URL 查询串中作为预签名。
pub fn generate_cos_authorization(
    method: &str,
    uri: &str,
    params: &BTreeMap<String, String>,
    headers: &HashMap<String, String>,
    secret_id: &str,
    secret_key: &str,
    start: i64,
    end: i64,
) -> String {
    let key_time = format!("{};{}", start, end);
    let sign_key = hmac_sha1_hex(secret_key, &key_time);

    let (http_parameters, url_param_list) = canonicalize_pairs(params.iter());
    let (http_headers, header_list) = canonicalize_pairs(headers.iter());

    // 签名中的 URI 使用未编码的原始路径
    let http_string = format!(
        "{}\n{}\n{}\n{}\n",
        method.to_lowercase(),
        uri,
        http_parameters,
        http_headers
    );

    let string_to_sign = format!("sha1\n{}\n{}\n", key_time, sha1_hex(&http_string));
    let signature = hmac_sha1_hex(&sign_key, &string_to_sign);

    format!(
        "q-sign-algorithm=sha1&q-ak={}&q-sign-time={}&q-key-time={}&q-header-list={}&q-url-param-list={}&q-signature={}",
        secret_id, key_time, key_time, header_list, url_param_list, signature
    )
}

/// 构建腾讯云 COS 的认证头
pub fn build_cos_auth_headers(
    method: &str,
    uri: &str,
    params: &BTreeMap<String, String>,
    extra_headers: &HashMap<String, String>,
    secret_id: &str,
    secret_key: &str,
    host: &str,
    token: Option<&str>,
) -> HashMap<String, String> {
    let now = Utc::now().timestamp();

    let mut headers = extra_headers.clone();
    headers.insert("Host".to_string(), host.to_string());

    let authorization = generate_cos_authorization(
        method,
        uri,
        params,
        &headers,
        secret_id,
        secret_key,
        now,
        now + REQUEST_SIGN_VALID_SECONDS,
    );

    headers.insert("Authorization".to_string(), authorization);
    // 临时密钥的 token 不参与签名
    if let Some(token) = token {
        headers.insert("x-cos-security-token".to_string(), token.to_string());
    }
    headers
}

/// 生成 COS 预签名 URL
///
/// `expires_at` 为绝对过期时间戳，签名在 [now, expires_at] 区间内有效。
pub fn generate_cos_presigned_url(
    object_url: &str,
    uri: &str,
    host: &str,
    expires_at: i64,
    params: &BTreeMap<String, String>,
    secret_id: &str,
    secret_key: &str,
    token: Option<&str>,
) -> String {
    let now = Utc::now().timestamp();
    let start = now.min(expires_at);

    let mut headers = HashMap::new();
    headers.insert("host".to_string(), host.to_string());

    let authorization = generate_cos_authorization(
        "GET", uri, params, &headers, secret_id, secret_key, start, expires_at,
    );

    let mut query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>();
    query.push(authorization);
    if let Some(token) = token {
        query.push(format!("x-cos-security-token={}", urlencoding::encode(token)));
    }

    format!("{}?{}", object_url, query.join("&"))
}
