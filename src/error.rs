use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（启动阶段即终止）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 题库文件错误（只影响当前文件）
    #[error("题库错误: {0}")]
    Corpus(#[from] CorpusError),
    /// 模型服务错误
    #[error("模型服务错误: {0}")]
    Provider(#[from] ProviderError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 批大小必须为正数
    #[error("--batch-size 必须大于 0 (当前值: {0})")]
    InvalidBatchSize(i64),
    /// 重试次数不能为负
    #[error("--retries 必须大于等于 0 (当前值: {0})")]
    InvalidRetries(i64),
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件 TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 题库文件错误
#[derive(Debug, Error)]
pub enum CorpusError {
    /// 题库根目录不存在
    #[error("题库目录不存在: {0}")]
    RootNotFound(PathBuf),
    /// 根目录下没有任何有效题库文件
    #[error("在 {0} 中没有找到有效的 JSON 题库文件")]
    NoCorpusFiles(PathBuf),
    /// 指定的题库不在扫描结果中
    #[error("题库未找到: {0}（请使用相对于题库根目录的路径）")]
    QuizNotFound(String),
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 文件不是合法 JSON 或者顶层不是数组
    #[error("JSON 解析失败 ({path}): {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// 写回文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 模型服务错误
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 网络请求失败（包括连接失败和超时）
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回非成功状态码
    #[error("服务返回错误响应 ({endpoint}): status={status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 响应体不符合预期格式
    #[error("响应格式错误 ({endpoint}): {message}")]
    MalformedBody { endpoint: String, message: String },
    /// 服务不可达
    #[error("无法连接到 {base_url}，模型服务是否在运行？")]
    Unreachable { base_url: String },
    /// 没有可用模型
    #[error("没有找到可用模型，请确认模型服务正在运行，或使用 --model 指定")]
    NoModels,
}

impl ProviderError {
    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ProviderError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 是否为超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::RequestFailed { source, .. } if source.is_timeout())
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
