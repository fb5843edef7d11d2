use std::fmt::Display;
use std::path::PathBuf;

use crate::models::question::QuestionRecord;

/// 题库完成状态（由内容推导，不写入文件）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionStatus {
    /// 所有题目都有 explanation 和 hint
    Complete,
    /// 部分完成
    Incomplete,
    /// 没有任何题目有这两个字段（包括空题库）
    Pending,
}

impl CompletionStatus {
    /// 按完成度分类
    pub fn classify(total: usize, complete: usize, missing_both: usize) -> Self {
        if total == 0 {
            return CompletionStatus::Pending;
        }
        if complete == total {
            return CompletionStatus::Complete;
        }
        if missing_both == total {
            return CompletionStatus::Pending;
        }
        CompletionStatus::Incomplete
    }

    pub fn badge(&self) -> &'static str {
        match self {
            CompletionStatus::Complete => "🟢",
            CompletionStatus::Incomplete => "🟡",
            CompletionStatus::Pending => "🔴",
        }
    }
}

impl Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CompletionStatus::Complete => "complete",
            CompletionStatus::Incomplete => "incomplete",
            CompletionStatus::Pending => "pending",
        };
        f.write_str(name)
    }
}

/// 题目完成度计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionCounts {
    pub total: usize,
    pub complete: usize,
    /// 缺 explanation，有 hint
    pub missing_explanation: usize,
    /// 缺 hint，有 explanation
    pub missing_hint: usize,
    pub missing_both: usize,
}

impl CompletionCounts {
    pub fn from_records(records: &[QuestionRecord]) -> Self {
        let mut counts = CompletionCounts {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match (record.has_explanation(), record.has_hint()) {
                (true, true) => counts.complete += 1,
                (false, false) => counts.missing_both += 1,
                (false, true) => counts.missing_explanation += 1,
                (true, false) => counts.missing_hint += 1,
            }
        }
        counts
    }

    pub fn status(&self) -> CompletionStatus {
        CompletionStatus::classify(self.total, self.complete, self.missing_both)
    }
}

/// 单个题库文件的扫描结果
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusFileStats {
    pub path: PathBuf,
    /// 相对于题库根目录的路径
    pub rel: String,
    pub counts: CompletionCounts,
    pub status: CompletionStatus,
}

impl CorpusFileStats {
    /// 用于选择列表和扫描报告的标签
    pub fn label(&self) -> String {
        let c = &self.counts;
        format!(
            "{} [{}/{} | B: {} | E: {} | H: {}]",
            self.rel, c.complete, c.total, c.missing_both, c.missing_explanation, c.missing_hint
        )
    }

    pub fn badge_label(&self) -> String {
        format!("{} {}", self.status.badge(), self.label())
    }
}
