//! 题库扫描服务 - 业务能力层
//!
//! 递归查找题库根目录下的 JSON 文件，统计每个文件的完成度并分类。
//! 无法解析或顶层不是数组的文件直接跳过，不影响整次扫描。

use crate::error::CorpusError;
use crate::models::{load_corpus_file, CompletionCounts, CompletionStatus, CorpusFileStats};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// 扫描结果
#[derive(Debug, Clone, Default)]
pub struct CorpusScan {
    /// 所有有效题库，按相对路径排序
    pub stats: Vec<CorpusFileStats>,
}

impl CorpusScan {
    /// 指定状态的题库（保持路径顺序）
    pub fn by_status(&self, status: CompletionStatus) -> Vec<&CorpusFileStats> {
        self.stats.iter().filter(|s| s.status == status).collect()
    }

    pub fn count(&self, status: CompletionStatus) -> usize {
        self.stats.iter().filter(|s| s.status == status).count()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// 按路径查找题库，`quiz` 可以是相对于根目录的路径或绝对路径
    pub fn find(&self, corpus_root: &Path, quiz: &str) -> Option<&CorpusFileStats> {
        let candidate = Path::new(quiz);
        let candidate = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            corpus_root.join(candidate)
        };
        let candidate = normalize(&candidate);
        self.stats.iter().find(|s| normalize(&s.path) == candidate)
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// 扫描题库根目录
///
/// 根目录不存在时返回错误；没有有效文件时返回空结果，由调用方决定是否终止。
pub async fn scan_corpus(corpus_root: &Path) -> Result<CorpusScan, CorpusError> {
    if !corpus_root.is_dir() {
        return Err(CorpusError::RootNotFound(corpus_root.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(corpus_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    files.sort();

    let mut stats = Vec::with_capacity(files.len());
    for path in files {
        let records = match load_corpus_file(&path).await {
            Ok(records) => records,
            Err(e) => {
                debug!("跳过无效题库: {}", e);
                continue;
            }
        };

        let counts = CompletionCounts::from_records(&records);
        let rel = path
            .strip_prefix(corpus_root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        stats.push(CorpusFileStats {
            status: counts.status(),
            path,
            rel,
            counts,
        });
    }

    Ok(CorpusScan { stats })
}
