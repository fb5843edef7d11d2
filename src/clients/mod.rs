pub mod llm_client;

pub use llm_client::EnrichmentClient;

use crate::error::ProviderError;
use async_trait::async_trait;

/// 模型服务能力
///
/// 引擎只依赖这个 trait，测试时可以替换为内存实现。
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// 获取可用模型，失败时返回空列表
    async fn discover_models(&self) -> Vec<String>;

    /// 单次生成请求
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}
