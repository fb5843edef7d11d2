//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **列出模型**：`--list-models` 时打印模型列表后退出
//! 2. **扫描题库**：没有任何有效题库时终止
//! 3. **选择题库与模型**：来自命令行，或交互选择
//! 4. **连通性检查**：真正执行前确认模型服务可达（`--plan-only` 跳过）
//! 5. **执行**：单个题库交给引擎，`--walk-incomplete` 交给逐个处理控制器

use std::path::PathBuf;
use tracing::{info, warn};

use crate::clients::{ChatProvider, EnrichmentClient};
use crate::config::Config;
use crate::error::{AppResult, CorpusError, ProviderError};
use crate::orchestrator::enrichment_engine::{EngineOptions, EnrichmentEngine};
use crate::orchestrator::walk_controller::{build_queue, WalkController};
use crate::services::{scan_corpus, CorpusScan, ProgressReporter, Prompter, TerminalPrompter};
use crate::utils::logging::{log_scan_report, log_startup, log_walk_summary};

/// `--plan-only` 未指定模型时的占位名
pub const PLAN_ONLY_MODEL: &str = "<plan-only>";

/// 应用主结构
pub struct App {
    config: Config,
    client: EnrichmentClient,
    prompter: TerminalPrompter,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let client = EnrichmentClient::new(&config);
        Self {
            config,
            client,
            prompter: TerminalPrompter,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<()> {
        if self.config.list_models {
            return self.list_models().await;
        }

        log_startup(&self.config.corpus_root.display().to_string());

        let scan = scan_corpus(&self.config.corpus_root).await?;
        if scan.is_empty() {
            return Err(CorpusError::NoCorpusFiles(self.config.corpus_root.clone()).into());
        }
        log_scan_report(&scan);

        let progress = ProgressReporter::for_stdout();
        let result = if self.config.walk_incomplete {
            self.run_walk(&scan, &progress).await
        } else {
            self.run_single(&scan, &progress).await
        };
        progress.shutdown().await;

        result
    }

    async fn list_models(&self) -> AppResult<()> {
        let models = self.client.discover_models().await;
        if models.is_empty() {
            return Err(ProviderError::NoModels.into());
        }
        info!("\n可用模型:");
        for model in models {
            info!("- {}", model);
        }
        Ok(())
    }

    /// 选择模型并确认服务可达，用户退出时返回 `None`
    async fn prepare_model(&self) -> AppResult<Option<String>> {
        if self.config.plan_only {
            return Ok(Some(
                self.config
                    .model
                    .clone()
                    .unwrap_or_else(|| PLAN_ONLY_MODEL.to_string()),
            ));
        }

        let Some(model) = pick_model(&self.client, &self.config, &self.prompter).await? else {
            return Ok(None);
        };
        self.client.verify_connection(&self.config.base_url).await?;
        Ok(Some(model))
    }

    async fn run_walk(&self, scan: &CorpusScan, progress: &ProgressReporter) -> AppResult<()> {
        let Some(model) = self.prepare_model().await? else {
            info!("已退出。");
            return Ok(());
        };

        let queue = build_queue(scan);
        if queue.is_empty() {
            info!("✅ 没有未完成或待处理的题库");
            return Ok(());
        }

        let engine = EnrichmentEngine::new(&self.client, EngineOptions::from(&self.config), progress);
        let summary = WalkController::new(&engine, &self.prompter)
            .run(&queue, &model)
            .await;

        log_walk_summary(
            summary.processed,
            summary.enriched,
            summary.attempted,
            summary.failed_files,
        );
        Ok(())
    }

    async fn run_single(&self, scan: &CorpusScan, progress: &ProgressReporter) -> AppResult<()> {
        let Some(path) = resolve_quiz(scan, &self.config, &self.prompter)? else {
            info!("已退出。");
            return Ok(());
        };
        let Some(model) = self.prepare_model().await? else {
            info!("已退出。");
            return Ok(());
        };

        let engine = EnrichmentEngine::new(&self.client, EngineOptions::from(&self.config), progress);
        engine.run(&path, &model).await?;
        Ok(())
    }
}

/// 选择模型
///
/// 指定了模型时直接使用（列表中没有也只是警告）；否则从列表中交互选择，列表为空时报错。
pub async fn pick_model<P, Q>(provider: &P, config: &Config, prompter: &Q) -> AppResult<Option<String>>
where
    P: ChatProvider + ?Sized,
    Q: Prompter + ?Sized,
{
    let models = provider.discover_models().await;

    if let Some(model) = &config.model {
        if !models.is_empty() && !models.contains(model) {
            warn!("⚠️  模型 '{}' 不在模型列表中，仍然尝试使用", model);
        }
        return Ok(Some(model.clone()));
    }

    if models.is_empty() {
        return Err(ProviderError::NoModels.into());
    }

    Ok(prompter
        .select("选择模型", &models)
        .and_then(|i| models.get(i).cloned()))
}

/// 确定要处理的题库
///
/// 指定 `--quiz` 时必须在扫描结果中；否则交互选择，用户退出时返回 `None`。
pub fn resolve_quiz<Q: Prompter + ?Sized>(
    scan: &CorpusScan,
    config: &Config,
    prompter: &Q,
) -> AppResult<Option<PathBuf>> {
    if let Some(quiz) = &config.quiz {
        return match scan.find(&config.corpus_root, quiz) {
            Some(stats) => Ok(Some(stats.path.clone())),
            None => Err(CorpusError::QuizNotFound(quiz.clone()).into()),
        };
    }

    let labels: Vec<String> = scan.stats.iter().map(|s| s.badge_label()).collect();
    Ok(prompter
        .select("选择题库", &labels)
        .and_then(|i| scan.stats.get(i))
        .map(|s| s.path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::orchestrator::test_support::{question, write_corpus, ScriptedPrompter, ScriptedProvider};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_explicit_model_used_even_if_unknown() {
        let provider = ScriptedProvider::new(Vec::new()).with_models(&["llama3.2"]);
        let config = Config {
            model: Some("mistral".to_string()),
            ..Default::default()
        };
        let prompter = ScriptedPrompter::default();

        let model = pick_model(&provider, &config, &prompter).await.unwrap();
        assert_eq!(model.as_deref(), Some("mistral"));
    }

    #[tokio::test]
    async fn test_no_models_without_explicit_name_is_fatal() {
        let provider = ScriptedProvider::new(Vec::new());
        let prompter = ScriptedPrompter::default();

        let err = pick_model(&provider, &Config::default(), &prompter)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Provider(ProviderError::NoModels)));
    }

    #[tokio::test]
    async fn test_interactive_model_selection() {
        let provider = ScriptedProvider::new(Vec::new()).with_models(&["gemma", "llama3.2"]);
        let prompter = ScriptedPrompter::new(vec![Some(1)], Vec::new());

        let model = pick_model(&provider, &Config::default(), &prompter).await.unwrap();
        assert_eq!(model.as_deref(), Some("llama3.2"));
    }

    #[tokio::test]
    async fn test_resolve_quiz() {
        let dir = TempDir::new().unwrap();
        write_corpus(dir.path(), "os/so1.json", &json!([question("", "")]));
        write_corpus(dir.path(), "reti/r1.json", &json!([question("E", "H")]));
        let scan = scan_corpus(dir.path()).await.unwrap();

        let config = Config {
            corpus_root: dir.path().to_path_buf(),
            quiz: Some("reti/r1.json".to_string()),
            ..Default::default()
        };
        let path = resolve_quiz(&scan, &config, &ScriptedPrompter::default())
            .unwrap()
            .unwrap();
        assert!(path.ends_with("reti/r1.json"));

        let missing = Config {
            quiz: Some("reti/r9.json".to_string()),
            ..config.clone()
        };
        assert!(matches!(
            resolve_quiz(&scan, &missing, &ScriptedPrompter::default()),
            Err(AppError::Corpus(CorpusError::QuizNotFound(_)))
        ));

        let interactive = Config {
            quiz: None,
            ..config
        };
        let prompter = ScriptedPrompter::new(vec![Some(0)], Vec::new());
        let path = resolve_quiz(&scan, &interactive, &prompter).unwrap().unwrap();
        assert!(path.ends_with("os/so1.json"));

        let quit = ScriptedPrompter::new(vec![None], Vec::new());
        assert!(resolve_quiz(&scan, &interactive, &quit).unwrap().is_none());
    }
}
