//! 单个题库处理器 - 编排层
//!
//! ## 职责
//!
//! 对一个题库文件跑完整的补全循环：
//!
//! 1. **加载与分类**：读取文件，统计完成度，找出待处理题目
//! 2. **计划预览**：输出整个文件的批次计划（`--plan-only` 到此为止）
//! 3. **分批执行**：待处理列表按批次大小切分，逐批请求模型
//! 4. **增量保存**：每批成功后立即把整个文件写回磁盘
//!
//! 单批失败只计数，不中断整个文件。中断时最多丢失正在进行的一批。

use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::clients::ChatProvider;
use crate::config::Config;
use crate::error::CorpusError;
use crate::models::{load_corpus_file, save_corpus_file, CompletionCounts, QuestionRecord};
use crate::services::{build_prompt, BatchPlan, ProgressReporter};
use crate::utils::logging::{log_file_loaded, log_file_summary, truncate_text};
use crate::workflow::{apply_items, partition_groups, GroupAttempts, GroupFlow, GroupResult};

/// 预览中题干的最大长度
const PREVIEW_LEN: usize = 70;

/// 引擎参数
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub force_all: bool,
    pub batch_size: usize,
    pub retries: usize,
    pub plan_only: bool,
    pub plan_limit: i64,
    pub retry_delay: Duration,
    pub group_delay: Duration,
    /// 仅用于日志
    pub base_url: String,
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            force_all: config.force_all,
            batch_size: config.batch_size,
            retries: config.retries,
            plan_only: config.plan_only,
            plan_limit: config.plan_limit,
            retry_delay: config.retry_delay,
            group_delay: config.group_delay,
            base_url: config.base_url.clone(),
        }
    }
}

/// 单个题库的处理结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOutcome {
    /// 实际更新的题目数
    pub enriched: usize,
    /// 待处理题目数
    pub attempted: usize,
    /// 彻底失败的批次数
    pub failed_groups: usize,
    /// 写回文件的次数
    pub checkpoints: usize,
}

/// 待处理题目的索引，保持原有顺序
pub fn pending_indices(records: &[QuestionRecord], force_all: bool) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.needs_enrichment(force_all))
        .map(|(i, _)| i)
        .collect()
}

/// 补全引擎
pub struct EnrichmentEngine<'a, P: ChatProvider + ?Sized> {
    provider: &'a P,
    options: EngineOptions,
    progress: &'a ProgressReporter,
}

impl<'a, P: ChatProvider + ?Sized> EnrichmentEngine<'a, P> {
    pub fn new(provider: &'a P, options: EngineOptions, progress: &'a ProgressReporter) -> Self {
        Self {
            provider,
            options,
            progress,
        }
    }

    /// 处理一个题库文件
    ///
    /// 只有文件读不出、解析失败或写回失败时返回错误。
    pub async fn run(&self, path: &Path, model: &str) -> Result<EnrichOutcome, CorpusError> {
        let opts = &self.options;
        let mut records = load_corpus_file(path).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let counts = CompletionCounts::from_records(&records);
        log_file_loaded(&name, &counts, opts.force_all);

        let pending = pending_indices(&records, opts.force_all);
        BatchPlan::build(records.len(), opts.batch_size, &pending, opts.plan_limit).log();

        if pending.is_empty() {
            info!("✅ 所有题目都已有 explanation 和 hint");
            return Ok(EnrichOutcome::default());
        }

        if opts.plan_only {
            info!("ℹ️  --plan-only 模式: 未调用模型");
            return Ok(EnrichOutcome {
                attempted: pending.len(),
                ..Default::default()
            });
        }

        info!("🔍 待补全题目: {}/{}", pending.len(), records.len());
        info!("\n🤖 模型: {}", model);
        info!("📦 批次大小: {}", opts.batch_size);
        info!("🔁 额外重试: {}", opts.retries);
        info!("🌐 URL: {}\n", opts.base_url);

        let flow = GroupFlow::new(self.provider, model, opts.retries, opts.retry_delay);
        let mut outcome = EnrichOutcome {
            attempted: pending.len(),
            ..Default::default()
        };

        for ctx in partition_groups(&pending, opts.batch_size) {
            let preview: Vec<String> = ctx
                .indices
                .iter()
                .map(|&i| truncate_text(&records[i].question, PREVIEW_LEN))
                .collect();
            self.progress
                .start(format!("{} — 正在处理 {} 题…", ctx, ctx.size()), preview);

            let prompt = build_prompt(ctx.indices.iter().map(|&i| &records[i]));
            let GroupAttempts { result, notes } = flow.request(&ctx, &prompt).await;

            self.progress.stop().await;
            for note in &notes {
                debug!("{}", note);
            }

            match result {
                GroupResult::Parsed(items) => {
                    let applied = apply_items(&mut records, &ctx, &items);
                    outcome.enriched += applied;
                    info!("✅ {}: {}/{} 题已更新", ctx, applied, ctx.size());

                    save_corpus_file(path, &records).await?;
                    outcome.checkpoints += 1;
                }
                GroupResult::Failed {
                    attempts,
                    last_error: Some(e),
                } => {
                    let kind = if e.is_timeout() { "超时" } else { "错误" };
                    error!("❌ {}: {} ({} 次尝试) — {}", ctx, kind, attempts, e);
                    outcome.failed_groups += 1;
                }
                GroupResult::Failed {
                    attempts,
                    last_error: None,
                } => {
                    warn!("⚠️  {}: {} 次尝试后响应仍无法解析", ctx, attempts);
                    outcome.failed_groups += 1;
                }
            }

            if !ctx.is_last() {
                tokio::time::sleep(opts.group_delay).await;
            }
        }

        log_file_summary(
            outcome.enriched,
            outcome.attempted,
            outcome.failed_groups,
            &path.display().to_string(),
        );

        Ok(outcome)
    }
}
