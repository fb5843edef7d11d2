//! 逐个题库处理 - 编排层
//!
//! 先处理未完成的题库，再处理待处理的，同类按路径排序，已完成的跳过。
//! 整个过程只用一个模型；每个题库之后询问是否继续，拒绝则停止。

use tracing::{error, info};

use crate::clients::ChatProvider;
use crate::models::{CompletionStatus, CorpusFileStats};
use crate::orchestrator::enrichment_engine::EnrichmentEngine;
use crate::services::{CorpusScan, Prompter};

/// 逐个处理的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// 处理完成的题库数
    pub processed: usize,
    pub enriched: usize,
    pub attempted: usize,
    /// 因读写错误未能处理的题库数
    pub failed_files: usize,
}

/// 构建处理队列
pub fn build_queue(scan: &CorpusScan) -> Vec<&CorpusFileStats> {
    let mut queue: Vec<&CorpusFileStats> = scan
        .stats
        .iter()
        .filter(|s| s.status != CompletionStatus::Complete)
        .collect();
    queue.sort_by(|a, b| {
        let rank = |s: &CorpusFileStats| u8::from(s.status != CompletionStatus::Incomplete);
        rank(a).cmp(&rank(b)).then_with(|| a.rel.cmp(&b.rel))
    });
    queue
}

/// 逐个处理控制器
pub struct WalkController<'a, P: ChatProvider + ?Sized, Q: Prompter + ?Sized> {
    engine: &'a EnrichmentEngine<'a, P>,
    prompter: &'a Q,
}

impl<'a, P: ChatProvider + ?Sized, Q: Prompter + ?Sized> WalkController<'a, P, Q> {
    pub fn new(engine: &'a EnrichmentEngine<'a, P>, prompter: &'a Q) -> Self {
        Self { engine, prompter }
    }

    /// 依次处理队列中的题库
    pub async fn run(&self, queue: &[&CorpusFileStats], model: &str) -> WalkSummary {
        let mut summary = WalkSummary::default();

        for (i, item) in queue.iter().enumerate() {
            info!(
                "\n➡️  题库 {}/{}: {} ({})",
                i + 1,
                queue.len(),
                item.rel,
                item.status
            );

            match self.engine.run(&item.path, model).await {
                Ok(outcome) => {
                    summary.processed += 1;
                    summary.enriched += outcome.enriched;
                    summary.attempted += outcome.attempted;
                }
                Err(e) => {
                    error!("❌ 题库 {} 处理失败: {}", item.rel, e);
                    summary.failed_files += 1;
                }
            }

            let is_last = i + 1 == queue.len();
            if !is_last && !self.prompter.confirm("是否继续处理下一个题库？", true) {
                break;
            }
        }

        summary
    }
}
