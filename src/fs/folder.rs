//! 目录级操作
//!
//! 存储不支持目录，复制、重命名、删除目录都要先列出目录下的全部条目，
//! 再对每个条目逐一调用对象级接口。任一条目失败即中止，已完成的部分不回滚。

use crate::error::FsError;
use crate::storage::traits::ObjectStore;

use super::lister::PaginatedLister;
use super::path::PathSpec;
use super::tree::{build_entries, Entry};

pub struct FolderOperationExecutor<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
    /// 复制源使用的默认域名
    source_domain: &'a str,
    assertions_enabled: bool,
}

impl<'a> FolderOperationExecutor<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        bucket: &'a str,
        source_domain: &'a str,
        disable_asserts: bool,
    ) -> Self {
        Self {
            store,
            bucket,
            source_domain,
            assertions_enabled: !disable_asserts,
        }
    }

    fn lister(&self) -> PaginatedLister<'a> {
        PaginatedLister::new(self.store, self.bucket)
    }

    /// 列出目录下的条目（含模拟出的祖先目录）
    pub async fn entries(
        &self,
        directory: &PathSpec,
        recursive: bool,
    ) -> Result<Vec<Entry>, FsError> {
        let keys = self.lister().list_keys(directory.as_str()).await?;
        Ok(build_entries(&keys, directory.as_str(), recursive))
    }

    /// 目录下是否至少存在一个对象
    ///
    /// 根目录的前缀为空，等价于存储桶是否非空。
    pub async fn exists(&self, dirname: &str) -> Result<bool, FsError> {
        let directory = PathSpec::directory(dirname);
        self.lister().has_any(directory.as_str()).await
    }

    pub async fn assert_present(&self, dirname: &str) -> Result<(), FsError> {
        if self.assertions_enabled && !self.exists(dirname).await? {
            return Err(FsError::FolderNotFound {
                path: dirname.to_string(),
            });
        }
        Ok(())
    }

    pub async fn assert_absent(&self, dirname: &str) -> Result<(), FsError> {
        if self.assertions_enabled && self.exists(dirname).await? {
            return Err(FsError::FolderExists {
                path: dirname.to_string(),
            });
        }
        Ok(())
    }

    /// 复制目录，返回复制的对象数量
    pub async fn copy(&self, src: &str, dst: &str) -> Result<usize, FsError> {
        let src = PathSpec::directory(src);
        let dst = PathSpec::directory(dst);

        self.check_transfer(&src, &dst).await?;

        let members = self.members(&src).await?;
        self.copy_members(&members, &src, &dst).await
    }

    /// 删除目录，返回删除的对象数量
    pub async fn delete(&self, dirname: &str) -> Result<usize, FsError> {
        let directory = PathSpec::directory(dirname);

        self.assert_present(directory.as_str()).await?;

        let members = self.members(&directory).await?;
        self.delete_members(&members, &directory).await
    }

    /// 重命名目录：先完整复制，复制全部成功后再删除源目录
    ///
    /// 删除的是复制前列出的成员，复制出来的新对象不会被重新列入。
    pub async fn rename(&self, src: &str, dst: &str) -> Result<usize, FsError> {
        let src = PathSpec::directory(src);
        let dst = PathSpec::directory(dst);

        self.check_transfer(&src, &dst).await?;

        let members = self.members(&src).await?;
        let copied = self.copy_members(&members, &src, &dst).await?;
        self.delete_members(&members, &src).await?;

        log::info!(
            "Renamed folder '{}' to '{}' ({} objects)",
            src.as_str(),
            dst.as_str(),
            copied
        );
        Ok(copied)
    }

    /// 复制、重命名的前置检查，任何修改之前完成
    ///
    /// 源与目标互相包含时始终拒绝，不受 `disable_asserts` 影响。
    async fn check_transfer(&self, src: &PathSpec, dst: &PathSpec) -> Result<(), FsError> {
        if dst.as_str().starts_with(src.as_str()) || src.as_str().starts_with(dst.as_str()) {
            return Err(FsError::OverlappingFolders {
                path: src.as_str().to_string(),
                destination: dst.as_str().to_string(),
            });
        }

        self.assert_present(src.as_str()).await?;
        self.assert_absent(dst.as_str()).await
    }

    /// 目录下有实际对象的条目，模拟出来的目录没有对象可以操作
    async fn members(&self, directory: &PathSpec) -> Result<Vec<Entry>, FsError> {
        let entries = self.entries(directory, true).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.explicit && entry.path.starts_with(directory.as_str()))
            .collect())
    }

    async fn copy_members(
        &self,
        members: &[Entry],
        src: &PathSpec,
        dst: &PathSpec,
    ) -> Result<usize, FsError> {
        for entry in members {
            let suffix = &entry.path[src.as_str().len()..];
            let dest_key = format!("{}{}", dst.as_str(), suffix);
            let source_url = format!("{}/{}", self.source_domain, entry.path);

            if let Err(e) = self
                .store
                .copy_object(self.bucket, &dest_key, &source_url)
                .await
            {
                log::warn!(
                    "Folder copy '{}' -> '{}' aborted at '{}': {}",
                    src.as_str(),
                    dst.as_str(),
                    entry.path,
                    e
                );
                return Err(FsError::EntryFailed {
                    path: entry.path.clone(),
                    source: e,
                });
            }
        }

        log::info!(
            "Copied folder '{}' to '{}' ({} objects)",
            src.as_str(),
            dst.as_str(),
            members.len()
        );
        Ok(members.len())
    }

    async fn delete_members(
        &self,
        members: &[Entry],
        directory: &PathSpec,
    ) -> Result<usize, FsError> {
        // 先删深层条目，中途失败时上层的目录占位对象仍然保留
        for entry in members.iter().rev() {
            if let Err(e) = self.store.delete_object(self.bucket, &entry.path).await {
                log::warn!(
                    "Folder delete '{}' aborted at '{}': {}",
                    directory.as_str(),
                    entry.path,
                    e
                );
                return Err(FsError::EntryFailed {
                    path: entry.path.clone(),
                    source: e,
                });
            }
        }

        log::info!(
            "Deleted folder '{}' ({} objects)",
            directory.as_str(),
            members.len()
        );
        Ok(members.len())
    }
}
