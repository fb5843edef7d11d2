//! 批次计划 - 业务能力层
//!
//! 把整个文件的 `[0, total)` 按 `batch_size` 连续切块，预览每块是否还需要补全。
//! 只是一份预测：实际执行时的分组取自过滤后的待处理列表，两者不一定一致。

use std::collections::BTreeSet;
use tracing::info;

/// 单个连续块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChunk {
    /// 从 1 开始的块编号
    pub number: usize,
    pub start: usize,
    /// 包含
    pub end: usize,
    /// 块内待处理的题目索引
    pub pending: Vec<usize>,
}

impl PlannedChunk {
    /// 块内题目数
    pub fn size(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn needs_population(&self) -> bool {
        !self.pending.is_empty()
    }

    /// 预览行
    pub fn describe(&self, total_chunks: usize) -> String {
        let details = if self.needs_population() {
            let indices: Vec<String> = self.pending.iter().map(|i| i.to_string()).collect();
            format!(
                "待补全 · {}/{} 题 ({})",
                self.pending.len(),
                self.size(),
                indices.join(", ")
            )
        } else {
            format!("已完成 · {}/{} 题完整", self.size(), self.size())
        };
        format!(
            "Batch {}/{} [{}-{}]: {}",
            self.number, total_chunks, self.start, self.end, details
        )
    }
}

/// 批次计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub chunks: Vec<PlannedChunk>,
    /// 显示上限，负数表示不限
    pub display_limit: i64,
}

impl BatchPlan {
    /// 构建计划
    ///
    /// `batch_size` 必须大于 0（配置阶段已校验）。
    pub fn build(total: usize, batch_size: usize, pending: &[usize], display_limit: i64) -> Self {
        let batch_size = batch_size.max(1);
        let pending: BTreeSet<usize> = pending.iter().copied().collect();

        let chunks = (0..total)
            .step_by(batch_size)
            .enumerate()
            .map(|(i, start)| {
                let end = (start + batch_size).min(total) - 1;
                PlannedChunk {
                    number: i + 1,
                    start,
                    end,
                    pending: pending.range(start..=end).copied().collect(),
                }
            })
            .collect();

        Self {
            chunks,
            display_limit,
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn populate_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.needs_population()).count()
    }

    pub fn complete_chunks(&self) -> usize {
        self.total_chunks() - self.populate_chunks()
    }

    /// 受显示上限约束的预览行
    pub fn preview_lines(&self) -> Vec<String> {
        let total = self.total_chunks();
        let shown = usize::try_from(self.display_limit).map_or(total, |limit| limit.min(total));
        self.chunks
            .iter()
            .take(shown)
            .map(|c| c.describe(total))
            .collect()
    }

    /// 未显示的块数
    pub fn hidden_chunks(&self) -> usize {
        self.total_chunks() - self.preview_lines().len()
    }

    /// 输出计划
    pub fn log(&self) {
        info!("\n🧭 批次计划:");
        for line in self.preview_lines() {
            info!("  - {}", line);
        }
        let hidden = self.hidden_chunks();
        if hidden > 0 {
            info!(
                "  ... ({} 个批次未显示，使用 --plan-limit -1 查看全部)",
                hidden
            );
        }
        info!("📦 批次总数: {}", self.total_chunks());
        info!("✅ 已完成批次: {}", self.complete_chunks());
        info!("🛠️  待补全批次: {}", self.populate_chunks());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_cover_range_with_short_tail() {
        let plan = BatchPlan::build(12, 5, &[], -1);
        let bounds: Vec<(usize, usize)> = plan.chunks.iter().map(|c| (c.start, c.end)).collect();

        assert_eq!(bounds, vec![(0, 4), (5, 9), (10, 11)]);
        assert_eq!(plan.chunks[2].size(), 2);
        assert_eq!(plan.complete_chunks(), 3);
    }

    #[test]
    fn test_counts_populate_chunks() {
        let plan = BatchPlan::build(7, 3, &[1, 6], -1);

        assert_eq!(plan.total_chunks(), 3);
        assert_eq!(plan.populate_chunks(), 2);
        assert_eq!(plan.complete_chunks(), 1);
        assert_eq!(plan.chunks[0].pending, vec![1]);
        assert!(!plan.chunks[1].needs_population());
        assert_eq!(plan.chunks[2].pending, vec![6]);
    }

    #[test]
    fn test_preview_respects_limit() {
        let plan = BatchPlan::build(50, 5, &[0, 49], 3);

        let lines = plan.preview_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(plan.hidden_chunks(), 7);
        assert_eq!(lines[0], "Batch 1/10 [0-4]: 待补全 · 1/5 题 (0)");
        assert_eq!(lines[1], "Batch 2/10 [5-9]: 已完成 · 5/5 题完整");
    }

    #[test]
    fn test_negative_limit_shows_everything() {
        let plan = BatchPlan::build(50, 5, &[], -1);
        assert_eq!(plan.preview_lines().len(), 10);
        assert_eq!(plan.hidden_chunks(), 0);
    }

    #[test]
    fn test_zero_limit_hides_everything() {
        let plan = BatchPlan::build(8, 4, &[], 0);
        assert!(plan.preview_lines().is_empty());
        assert_eq!(plan.hidden_chunks(), 2);
    }

    #[test]
    fn test_empty_file() {
        let plan = BatchPlan::build(0, 5, &[], 20);
        assert_eq!(plan.total_chunks(), 0);
        assert!(plan.preview_lines().is_empty());
    }
}
