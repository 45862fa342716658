//! 模拟目录树
//!
//! 存储返回的只是扁平的键，这里把每个键按分隔符拆成路径段，
//! 在一个以路径为索引的节点数组里补齐所有祖先目录。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::path::SEPARATOR;

/// 条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

/// 列表中的一个条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// 是否有实际存在的对象（目录占位对象或文件），false 表示由子路径推导出来
    #[serde(skip)]
    pub explicit: bool,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// 本节点对应的路径段
    pub name: String,
    /// 完整路径，目录以分隔符结尾
    pub path: String,
    pub kind: EntryKind,
    pub explicit: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// 以路径为索引的节点数组，节点顺序即首次出现的顺序
#[derive(Debug, Clone, Default)]
pub struct DirectoryTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, NodeId>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        self.index.get(path).map(|&id| &self.nodes[id])
    }

    /// 插入一个原始键，补齐它的全部祖先目录
    pub fn insert_key(&mut self, key: &str) {
        // 根目录下的文件
        if !key.contains(SEPARATOR) {
            self.ensure(key, key, EntryKind::File, None, true);
            return;
        }

        let segments: Vec<&str> = key.split(SEPARATOR).collect();
        let last = segments.len() - 1;
        let mut parent = None;

        for (i, segment) in segments.iter().enumerate().take(last) {
            if segment.is_empty() {
                continue;
            }
            let mut dir = segments[..=i].join("/");
            dir.push(SEPARATOR);
            parent = Some(self.ensure(&dir, segment, EntryKind::Directory, parent, false));
        }

        if key.ends_with(SEPARATOR) {
            // 零字节的目录占位对象
            if let Some(&id) = self.index.get(key) {
                self.nodes[id].explicit = true;
            }
        } else {
            self.ensure(key, segments[last], EntryKind::File, parent, true);
        }
    }

    /// 已存在则直接返回（先出现者优先，不覆盖）
    fn ensure(
        &mut self,
        path: &str,
        name: &str,
        kind: EntryKind,
        parent: Option<NodeId>,
        explicit: bool,
    ) -> NodeId {
        if let Some(&id) = self.index.get(path) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            name: name.to_string(),
            path: path.to_string(),
            kind,
            explicit,
            parent,
            children: Vec::new(),
        });
        self.index.insert(path.to_string(), id);
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    /// 直接子条目的路径
    pub fn children(&self, path: &str) -> Vec<&str> {
        match self.index.get(path) {
            Some(&id) => self.nodes[id]
                .children
                .iter()
                .map(|&child| self.nodes[child].path.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// 从近到远的祖先目录路径
    pub fn ancestors(&self, path: &str) -> Vec<&str> {
        let mut result = Vec::new();
        let mut current = self.index.get(path).and_then(|&id| self.nodes[id].parent);
        while let Some(id) = current {
            result.push(self.nodes[id].path.as_str());
            current = self.nodes[id].parent;
        }
        result
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.nodes
            .iter()
            .map(|node| Entry {
                path: node.path.clone(),
                kind: node.kind,
                explicit: node.explicit,
            })
            .collect()
    }
}

/// 非递归列举时判断键是否为前缀下的直接子项
///
/// 去掉前缀后的部分要么不含分隔符，要么唯一的分隔符在末尾。
pub fn is_direct_child(key: &str, prefix: &str) -> bool {
    let relative = key.strip_prefix(prefix).unwrap_or(key);
    match relative.find(SEPARATOR) {
        None => true,
        Some(i) => i == relative.len() - 1,
    }
}

/// 由原始键列表构建去重后的条目列表
pub fn build_entries<S: AsRef<str>>(keys: &[S], prefix: &str, recursive: bool) -> Vec<Entry> {
    let mut tree = DirectoryTree::new();
    for key in keys {
        let key = key.as_ref();
        if !recursive && !is_direct_child(key, prefix) {
            continue;
        }
        tree.insert_key(key);
    }
    tree.entries()
}
