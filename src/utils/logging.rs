/// 日志工具模块
///
/// 提供日志初始化和报告输出的辅助函数
use crate::models::{CompletionCounts, CompletionStatus, CorpusFileStats};
use crate::services::corpus_scanner::CorpusScan;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则 verbose 时为 debug，默认 info。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(corpus_root: &str) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 题库补全 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📁 题库目录: {}", corpus_root);
    info!("{}", "=".repeat(60));
}

/// 打印扫描报告
pub fn log_scan_report(scan: &CorpusScan) {
    info!("\n🔎 题库扫描完成");
    info!("📚 题库数量: {}", scan.stats.len());
    info!("✅ 已完成: {}", scan.count(CompletionStatus::Complete));
    info!("🛠️  未完成: {}", scan.count(CompletionStatus::Incomplete));
    info!("🆕 待处理: {}", scan.count(CompletionStatus::Pending));

    log_status_group("✅ 已完成", &scan.by_status(CompletionStatus::Complete), 10);
    log_status_group("🛠️  未完成", &scan.by_status(CompletionStatus::Incomplete), 10);
    log_status_group("🆕 待处理", &scan.by_status(CompletionStatus::Pending), 10);
}

fn log_status_group(title: &str, items: &[&CorpusFileStats], limit: usize) {
    info!("\n{} ({}):", title, items.len());
    if items.is_empty() {
        info!("  - 无");
        return;
    }
    for item in items.iter().take(limit) {
        info!("  - {}", item.label());
    }
    if items.len() > limit {
        info!("  ... 另有 {} 个", items.len() - limit);
    }
}

/// 记录题库加载信息
pub fn log_file_loaded(name: &str, counts: &CompletionCounts, force_all: bool) {
    info!("\n📋 题库已加载: {} ({} 题)", name, counts.total);
    info!("✅ 已完成题目: {}/{}", counts.complete, counts.total);
    info!(
        "🧩 两项都缺: {} | 只缺 explanation: {} | 只缺 hint: {}",
        counts.missing_both, counts.missing_explanation, counts.missing_hint
    );
    if force_all {
        info!("⚠️  --force 已开启: 所有题目都会重新处理");
    }
}

/// 打印单个题库的最终统计
pub fn log_file_summary(enriched: usize, attempted: usize, failed_groups: usize, path: &str) {
    info!("\n{}", "=".repeat(50));
    info!("✅ 完成: {}/{} 题已补全", enriched, attempted);
    if failed_groups > 0 {
        info!("⚠️  失败批次: {}", failed_groups);
    }
    info!("💾 文件已保存: {}", path);
}

/// 打印逐个处理模式的最终统计
pub fn log_walk_summary(processed: usize, enriched: usize, attempted: usize, failed_files: usize) {
    info!("\n{}", "=".repeat(60));
    info!(
        "🏁 会话结束 ({}): 处理题库 {} 个，补全 {}/{} 题",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        processed,
        enriched,
        attempted
    );
    if failed_files > 0 {
        info!("⚠️  处理失败的题库: {}", failed_files);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "…"
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("breve", 70), "breve");
        assert_eq!(truncate_text("abcdef", 3), "abc…");
        assert_eq!(truncate_text("调度器的作用", 2), "调度…");
    }
}
