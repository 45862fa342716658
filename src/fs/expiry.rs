//! 过期时间解析
//!
//! 临时链接的过期时间可以是绝对时间戳、相对秒数、日期文本或者缺省，
//! 这里统一换算成绝对的 Unix 时间戳（秒）。

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::FsError;

/// 缺省的有效期（秒）
pub const DEFAULT_EXPIRY_SECONDS: i64 = 3600;

/// 传给原生签名接口的过期时间格式
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// 调用方传入的过期时间
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// 整数：10 位视为绝对时间戳，否则视为相对秒数
    Seconds(i64),
    /// 日期时间文本
    Text(String),
}

impl From<i64> for Expiry {
    fn from(value: i64) -> Self {
        Expiry::Seconds(value)
    }
}

impl From<i32> for Expiry {
    fn from(value: i32) -> Self {
        Expiry::Seconds(value as i64)
    }
}

impl From<u32> for Expiry {
    fn from(value: u32) -> Self {
        Expiry::Seconds(value as i64)
    }
}

impl From<&str> for Expiry {
    fn from(value: &str) -> Self {
        Expiry::Text(value.to_string())
    }
}

impl From<String> for Expiry {
    fn from(value: String) -> Self {
        Expiry::Text(value)
    }
}

/// 过期时间的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpirySpec {
    AbsoluteEpoch(i64),
    RelativeSeconds(i64),
    ParsedDate(String),
    DefaultOneHour,
}

impl ExpirySpec {
    pub fn classify(input: Option<Expiry>) -> Self {
        match input {
            None => ExpirySpec::DefaultOneHour,
            Some(Expiry::Seconds(n)) if is_epoch_like(n) => ExpirySpec::AbsoluteEpoch(n),
            Some(Expiry::Seconds(n)) => ExpirySpec::RelativeSeconds(n),
            Some(Expiry::Text(text)) => ExpirySpec::ParsedDate(text),
        }
    }

    /// 以给定的当前时间换算为绝对时间戳
    pub fn resolve_at(&self, now: DateTime<Utc>) -> Result<i64, FsError> {
        match self {
            ExpirySpec::DefaultOneHour => offset_from(now, DEFAULT_EXPIRY_SECONDS),
            ExpirySpec::AbsoluteEpoch(epoch) => Ok(*epoch),
            ExpirySpec::RelativeSeconds(offset) => offset_from(now, *offset),
            ExpirySpec::ParsedDate(text) => parse_expiry_text(text, now)
                .ok_or_else(|| FsError::InvalidExpiryFormat(text.clone())),
        }
    }
}

fn offset_from(now: DateTime<Utc>, offset: i64) -> Result<i64, FsError> {
    now.timestamp()
        .checked_add(offset)
        .ok_or_else(|| FsError::InvalidExpiryFormat(offset.to_string()))
}

/// 十进制位数恰好为 10 的非负整数视为绝对时间戳
fn is_epoch_like(n: i64) -> bool {
    n >= 0 && n.to_string().len() == 10
}

/// 解析过期时间，缺省为一小时后
pub fn resolve(input: Option<Expiry>) -> Result<i64, FsError> {
    resolve_at(input, Utc::now())
}

pub fn resolve_at(input: Option<Expiry>, now: DateTime<Utc>) -> Result<i64, FsError> {
    ExpirySpec::classify(input).resolve_at(now)
}

/// 把绝对时间戳格式化为 `EXPIRY_FORMAT`
pub fn format_expiry(epoch: i64) -> Result<String, FsError> {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format(EXPIRY_FORMAT).to_string())
        .ok_or_else(|| FsError::InvalidExpiryFormat(epoch.to_string()))
}

/// 解析日期时间文本，无法识别时返回 None
///
/// 支持 RFC 3339、RFC 2822、常见的 `年-月-日 时:分:秒` 写法（按 UTC 处理）、
/// 10 位时间戳、`now`、`today`、`tomorrow` 以及 `+1 day 2 hours` 形式的相对时间。
pub fn parse_expiry_text(text: &str, now: DateTime<Utc>) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match text.to_lowercase().as_str() {
        "now" => return Some(now.timestamp()),
        "today" | "midnight" => return midnight(now, 0),
        "tomorrow" => return midnight(now, 1),
        _ => {}
    }

    if text.len() == 10 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp());
    }

    let naive = text
        .strip_suffix(" UTC")
        .or_else(|| text.strip_suffix(" GMT"))
        .or_else(|| text.strip_suffix('Z'))
        .unwrap_or(text);

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        }
    }

    parse_relative(text).and_then(|offset| now.timestamp().checked_add(offset))
}

fn midnight(now: DateTime<Utc>, days: i64) -> Option<i64> {
    let date = now.date_naive() + Duration::days(days);
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp())
}

/// 解析 `+1 day 2 hours`、`-30 minutes`、`3600 seconds` 这类相对时间
fn parse_relative(text: &str) -> Option<i64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() % 2 != 0 {
        return None;
    }

    let mut total = 0i64;
    for pair in tokens.chunks(2) {
        let amount: i64 = pair[0].parse().ok()?;
        let unit = match pair[1].to_lowercase().as_str() {
            "sec" | "secs" | "second" | "seconds" => 1,
            "min" | "mins" | "minute" | "minutes" => 60,
            "hour" | "hours" => 3600,
            "day" | "days" => 86_400,
            "week" | "weeks" => 604_800,
            _ => return None,
        };
        total = total.checked_add(amount.checked_mul(unit)?)?;
    }
    Some(total)
}
