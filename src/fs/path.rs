//! 路径规范化
//!
//! 对象存储里没有目录，目录语义完全依赖键末尾的分隔符。

/// 路径分隔符
pub const SEPARATOR: char = '/';

/// 规范化后的路径
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSpec {
    pub path: String,
    pub is_directory_intent: bool,
}

impl PathSpec {
    /// 按目录意图规范化：非空路径保证以且仅以一个分隔符结尾
    pub fn directory(path: &str) -> Self {
        normalize(path, true)
    }

    /// 按文件意图规范化：路径原样保留
    pub fn file(path: &str) -> Self {
        normalize(path, false)
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// 是否为存储根
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl AsRef<str> for PathSpec {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

/// 规范化路径
///
/// 空字符串代表存储根，原样返回。
pub fn normalize(path: &str, is_directory_intent: bool) -> PathSpec {
    let mut path = path.to_string();
    if is_directory_intent && !path.is_empty() && !path.ends_with(SEPARATOR) {
        path.push(SEPARATOR);
    }
    PathSpec {
        path,
        is_directory_intent,
    }
}
