//! 批次处理流程 - 流程层
//!
//! 核心职责：定义"一批题目"的请求与结果写入
//!
//! 流程顺序：
//! 1. generate → parse_response
//! 2. 失败时按重试次数再试，每次之间固定等待
//! 3. 成功时把结果写回对应题目
//!
//! 请求期间进度动画占用终端，每次尝试的诊断信息先记在 `notes` 中，由调用方在动画停止后输出。

use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

use crate::clients::ChatProvider;
use crate::error::ProviderError;
use crate::models::{EnrichmentItem, QuestionRecord};
use crate::services::parse_response;
use crate::workflow::group_ctx::GroupCtx;

/// 一批请求的结果
#[derive(Debug)]
pub enum GroupResult {
    /// 得到可用的数组
    Parsed(Vec<EnrichmentItem>),
    /// 重试用尽
    Failed {
        attempts: usize,
        /// 最近一次网络错误（全是解析失败时为空）
        last_error: Option<ProviderError>,
    },
}

/// 一批请求的结果及各次尝试的诊断信息
#[derive(Debug)]
pub struct GroupAttempts {
    pub result: GroupResult,
    pub notes: Vec<String>,
}

/// 批次处理流程
///
/// - 不持有题库数据
/// - 不写文件
/// - 只依赖模型服务能力
pub struct GroupFlow<'a, P: ChatProvider + ?Sized> {
    provider: &'a P,
    model: &'a str,
    retries: usize,
    retry_delay: Duration,
}

impl<'a, P: ChatProvider + ?Sized> GroupFlow<'a, P> {
    pub fn new(provider: &'a P, model: &'a str, retries: usize, retry_delay: Duration) -> Self {
        Self {
            provider,
            model,
            retries,
            retry_delay,
        }
    }

    /// 请求并解析，最多 `1 + retries` 次
    pub async fn request(&self, ctx: &GroupCtx, prompt: &str) -> GroupAttempts {
        let mut last_error = None;
        let mut notes = Vec::new();

        for attempt in 0..=self.retries {
            match self.provider.generate(self.model, prompt).await {
                Ok(raw) => match parse_response(&raw) {
                    Some(items) => {
                        return GroupAttempts {
                            result: GroupResult::Parsed(items),
                            notes,
                        }
                    }
                    None => notes.push(format!("{} 第 {} 次响应无法解析", ctx, attempt + 1)),
                },
                Err(e) => {
                    notes.push(format!("{} 第 {} 次请求失败: {}", ctx, attempt + 1, e));
                    last_error = Some(e);
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        GroupAttempts {
            result: GroupResult::Failed {
                attempts: self.retries + 1,
                last_error,
            },
            notes,
        }
    }
}

/// 把解析结果写回题目，返回更新的题目数
///
/// 缺失或越界的组内索引直接忽略；缺失的字段写为空串。
pub fn apply_items(records: &mut [QuestionRecord], ctx: &GroupCtx, items: &[EnrichmentItem]) -> usize {
    let mut updated = BTreeSet::new();

    for item in items {
        let Some(global) = item
            .local_index(ctx.size())
            .and_then(|local| ctx.global_index(local))
        else {
            debug!("{} 忽略无效条目: index={:?}", ctx, item.index);
            continue;
        };
        let Some(record) = records.get_mut(global) else {
            continue;
        };

        record.explanation = item.explanation.trim().to_string();
        record.hint = item.hint.trim().to_string();
        updated.insert(global);
    }

    updated.len()
}
