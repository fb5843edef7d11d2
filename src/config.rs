use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_RETRIES: usize = 1;
pub const DEFAULT_PLAN_LIMIT: i64 = 20;

/// 程序配置
///
/// 启动时构建一次，之后以引用方式传给各组件。
#[derive(Clone, Debug)]
pub struct Config {
    /// 题库根目录
    pub corpus_root: PathBuf,
    /// 指定题库（相对于根目录）
    pub quiz: Option<String>,
    /// 每批题目数量
    pub batch_size: usize,
    /// 每批额外重试次数
    pub retries: usize,
    /// 已完成的题目也重新生成
    pub force_all: bool,
    /// 只显示计划
    pub plan_only: bool,
    /// 计划显示上限，负数表示不限
    pub plan_limit: i64,
    /// 逐个处理未完成的题库
    pub walk_incomplete: bool,
    /// 列出模型后退出
    pub list_models: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 模型服务配置 ---
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub models_path: String,
    pub chat_path: String,
    /// 单次生成请求超时
    pub request_timeout: Duration,
    /// 获取模型列表超时
    pub discovery_timeout: Duration,
    /// 连通性检查超时
    pub connect_check_timeout: Duration,
    /// 重试之间的等待
    pub retry_delay: Duration,
    /// 两批之间的等待
    pub group_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("quizzes"),
            quiz: None,
            batch_size: DEFAULT_BATCH_SIZE,
            retries: DEFAULT_RETRIES,
            force_all: false,
            plan_only: false,
            plan_limit: DEFAULT_PLAN_LIMIT,
            walk_incomplete: false,
            list_models: false,
            verbose_logging: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: None,
            models_path: "/api/tags".to_string(),
            chat_path: "/api/chat".to_string(),
            request_timeout: Duration::from_secs(120),
            discovery_timeout: Duration::from_secs(8),
            connect_check_timeout: Duration::from_secs(5),
            retry_delay: Duration::from_secs(1),
            group_delay: Duration::from_secs(1),
        }
    }
}

/// 可选配置层（TOML 文件、环境变量、命令行各一层）
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub corpus_root: Option<PathBuf>,
    pub quiz: Option<String>,
    pub batch_size: Option<i64>,
    pub retries: Option<i64>,
    pub force_all: Option<bool>,
    pub plan_only: Option<bool>,
    pub plan_limit: Option<i64>,
    pub walk_incomplete: Option<bool>,
    pub list_models: Option<bool>,
    pub verbose_logging: Option<bool>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub models_path: Option<String>,
    pub chat_path: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub retry_delay_ms: Option<u64>,
    pub group_delay_ms: Option<u64>,
}

impl ConfigLayer {
    /// 读取 TOML 配置文件
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 从环境变量读取
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            corpus_root: lookup("CORPUS_ROOT").map(PathBuf::from),
            batch_size: parse_var(&lookup, "ENRICH_BATCH_SIZE", "integer")?,
            retries: parse_var(&lookup, "ENRICH_RETRIES", "integer")?,
            plan_limit: parse_var(&lookup, "ENRICH_PLAN_LIMIT", "integer")?,
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?,
            base_url: lookup("ENRICH_BASE_URL"),
            api_key: lookup("ENRICH_API_KEY"),
            model: lookup("ENRICH_MODEL"),
            ..Default::default()
        })
    }

    /// 命令行参数层（未出现的开关不覆盖下层）
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            corpus_root: cli.root.clone(),
            quiz: cli.quiz.clone(),
            batch_size: cli.batch_size,
            retries: cli.retries,
            force_all: cli.force.then_some(true),
            plan_only: cli.plan_only.then_some(true),
            plan_limit: cli.plan_limit,
            walk_incomplete: cli.walk_incomplete.then_some(true),
            list_models: cli.list_models.then_some(true),
            verbose_logging: cli.verbose.then_some(true),
            base_url: cli.base_url.clone(),
            api_key: cli.api_key.clone(),
            model: cli.model.clone(),
            ..Default::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

impl Config {
    /// 按 默认值 < 配置文件 < 环境变量 < 命令行 的顺序合并
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let file = cli
            .config
            .clone()
            .or_else(|| std::env::var("ENRICH_CONFIG").ok().map(PathBuf::from));
        if let Some(path) = file {
            layers.push(ConfigLayer::from_file(&path)?);
        }
        layers.push(ConfigLayer::from_env()?);
        layers.push(ConfigLayer::from_cli(cli));
        Self::from_layers(layers)
    }

    /// 依次叠加配置层并校验
    pub fn from_layers(layers: impl IntoIterator<Item = ConfigLayer>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        let mut batch_size = DEFAULT_BATCH_SIZE as i64;
        let mut retries = DEFAULT_RETRIES as i64;

        for layer in layers {
            if let Some(v) = layer.batch_size {
                batch_size = v;
            }
            if let Some(v) = layer.retries {
                retries = v;
            }
            config.apply(layer);
        }

        if batch_size <= 0 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        if retries < 0 {
            return Err(ConfigError::InvalidRetries(retries));
        }
        config.batch_size = batch_size as usize;
        config.retries = retries as usize;
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(config)
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.corpus_root {
            self.corpus_root = v;
        }
        if let Some(v) = layer.quiz {
            self.quiz = Some(v);
        }
        if let Some(v) = layer.force_all {
            self.force_all = v;
        }
        if let Some(v) = layer.plan_only {
            self.plan_only = v;
        }
        if let Some(v) = layer.plan_limit {
            self.plan_limit = v;
        }
        if let Some(v) = layer.walk_incomplete {
            self.walk_incomplete = v;
        }
        if let Some(v) = layer.list_models {
            self.list_models = v;
        }
        if let Some(v) = layer.verbose_logging {
            self.verbose_logging = v;
        }
        if let Some(v) = layer.base_url {
            self.base_url = v;
        }
        if let Some(v) = layer.api_key.filter(|k| !k.is_empty()) {
            self.api_key = Some(v);
        }
        if let Some(v) = layer.model.filter(|m| !m.is_empty()) {
            self.model = Some(v);
        }
        if let Some(v) = layer.models_path {
            self.models_path = v;
        }
        if let Some(v) = layer.chat_path {
            self.chat_path = v;
        }
        if let Some(v) = layer.request_timeout_secs {
            self.request_timeout = Duration::from_secs(v);
        }
        if let Some(v) = layer.retry_delay_ms {
            self.retry_delay = Duration::from_millis(v);
        }
        if let Some(v) = layer.group_delay_ms {
            self.group_delay = Duration::from_millis(v);
        }
    }

    /// 模型列表接口地址
    pub fn models_url(&self) -> String {
        format!("{}{}", self.base_url, self.models_path)
    }

    /// 对话接口地址
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_layers(Vec::new()).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.retries, 1);
        assert_eq!(config.plan_limit, 20);
        assert_eq!(config.chat_url(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_rejects_non_positive_batch_size() {
        let layer = ConfigLayer {
            batch_size: Some(0),
            ..Default::default()
        };
        let err = Config::from_layers([layer]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBatchSize(0)));
    }

    #[test]
    fn test_rejects_negative_retries() {
        let layer = ConfigLayer {
            retries: Some(-1),
            ..Default::default()
        };
        let err = Config::from_layers([layer]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRetries(-1)));
    }

    #[test]
    fn test_later_layer_wins() {
        let file = ConfigLayer {
            batch_size: Some(10),
            base_url: Some("http://gpu-box:11434/".to_string()),
            model: Some("llama3.2".to_string()),
            ..Default::default()
        };
        let cli = ConfigLayer {
            batch_size: Some(3),
            ..Default::default()
        };
        let config = Config::from_layers([file, cli]).unwrap();

        assert_eq!(config.batch_size, 3);
        assert_eq!(config.base_url, "http://gpu-box:11434");
        assert_eq!(config.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn test_env_layer_parse_error() {
        let vars: HashMap<&str, &str> = [("ENRICH_BATCH_SIZE", "five")].into_iter().collect();
        let err = ConfigLayer::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { .. }));
    }

    #[test]
    fn test_toml_layer() {
        let layer: ConfigLayer = toml::from_str(
            r#"
            base_url = "http://localhost:8080"
            chat_path = "/chat"
            models_path = "/models-list"
            retries = 2
            group_delay_ms = 0
            "#,
        )
        .unwrap();
        let config = Config::from_layers([layer]).unwrap();

        assert_eq!(config.retries, 2);
        assert_eq!(config.models_url(), "http://localhost:8080/models-list");
        assert_eq!(config.group_delay, Duration::ZERO);
    }

    #[test]
    fn test_cli_layer_keeps_unset_flags() {
        let cli = Cli {
            plan_only: true,
            ..Default::default()
        };
        let layer = ConfigLayer::from_cli(&cli);
        assert_eq!(layer.plan_only, Some(true));
        assert_eq!(layer.force_all, None);
    }
}
