//! 批次上下文
//!
//! 封装"我正在处理第几批、这批包含哪些题目"这一信息

use std::fmt::Display;

/// 批次上下文
///
/// 组内位置 `i` 对应文件中的第 `indices[i]` 题，分组只在运行时存在。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCtx {
    /// 批次编号（从1开始）
    pub number: usize,
    /// 批次总数
    pub total: usize,
    /// 本批题目在文件中的索引
    pub indices: Vec<usize>,
}

impl GroupCtx {
    pub fn new(number: usize, total: usize, indices: Vec<usize>) -> Self {
        Self {
            number,
            total,
            indices,
        }
    }

    pub fn size(&self) -> usize {
        self.indices.len()
    }

    /// 组内位置转换为文件索引
    pub fn global_index(&self, local: usize) -> Option<usize> {
        self.indices.get(local).copied()
    }

    pub fn is_last(&self) -> bool {
        self.number >= self.total
    }
}

impl Display for GroupCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Batch {}/{}", self.number, self.total)
    }
}

/// 把待处理索引按 `batch_size` 连续切分，最后一批可能更短
pub fn partition_groups(pending: &[usize], batch_size: usize) -> Vec<GroupCtx> {
    let chunks: Vec<&[usize]> = pending.chunks(batch_size.max(1)).collect();
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| GroupCtx::new(i + 1, total, chunk.to_vec()))
        .collect()
}
