//! 分页列举
//!
//! 反复调用存储的扁平列举接口，直到没有下一页。

use crate::error::FsError;
use crate::storage::traits::ObjectStore;

/// 单页最多返回的键数量
pub const PAGE_SIZE: u32 = 1000;

pub struct PaginatedLister<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
}

impl<'a> PaginatedLister<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self { store, bucket }
    }

    /// 列出前缀下的全部原始键
    ///
    /// 截断的页必须带有续页标记，且标记必须严格递增，否则中止并返回 `ListingFailed`。
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, FsError> {
        let mut keys = Vec::new();
        let mut marker = String::new();
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .list_objects(self.bucket, &marker, PAGE_SIZE, prefix)
                .await
                .map_err(|e| FsError::ListingFailed {
                    prefix: prefix.to_string(),
                    reason: e.to_string(),
                })?;
            pages += 1;

            log::debug!(
                "Listed page {} under '{}': {} keys, truncated={}",
                pages,
                prefix,
                page.keys.len(),
                page.truncated
            );

            keys.extend(page.keys);

            if !page.truncated {
                break;
            }

            let next = match page.next_marker {
                Some(next) if !next.is_empty() => next,
                _ => {
                    log::warn!("Truncated listing page under '{}' has no marker", prefix);
                    return Err(FsError::ListingFailed {
                        prefix: prefix.to_string(),
                        reason: "truncated page without continuation marker".to_string(),
                    });
                }
            };

            if !marker.is_empty() && next.as_str() <= marker.as_str() {
                log::warn!(
                    "Listing marker under '{}' did not advance: '{}' -> '{}'",
                    prefix,
                    marker,
                    next
                );
                return Err(FsError::ListingFailed {
                    prefix: prefix.to_string(),
                    reason: format!("continuation marker did not advance past '{}'", marker),
                });
            }

            marker = next;
        }

        Ok(keys)
    }

    /// 前缀下是否至少存在一个对象（只取一条）
    pub async fn has_any(&self, prefix: &str) -> Result<bool, FsError> {
        let page = self
            .store
            .list_objects(self.bucket, "", 1, prefix)
            .await
            .map_err(|e| FsError::ListingFailed {
                prefix: prefix.to_string(),
                reason: e.to_string(),
            })?;
        Ok(!page.keys.is_empty())
    }
}
