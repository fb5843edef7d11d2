/// 模型服务客户端
///
/// 封装所有与模型服务 HTTP 接口相关的调用逻辑
use crate::clients::ChatProvider;
use crate::config::Config;
use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// 生成时的采样温度
const TEMPERATURE: f64 = 0.2;

/// 模型服务客户端
#[derive(Debug, Clone)]
pub struct EnrichmentClient {
    http: Client,
    models_url: String,
    chat_url: String,
    api_key: Option<String>,
    request_timeout: Duration,
    discovery_timeout: Duration,
    connect_check_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl EnrichmentClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            models_url: config.models_url(),
            chat_url: config.chat_url(),
            api_key: config.api_key.clone(),
            request_timeout: config.request_timeout,
            discovery_timeout: config.discovery_timeout,
            connect_check_timeout: config.connect_check_timeout,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn fetch_models(&self) -> Result<Vec<String>, ProviderError> {
        let endpoint = self.models_url.as_str();
        let response = self
            .authorized(self.http.get(endpoint))
            .timeout(self.discovery_timeout)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed(endpoint, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::BadStatus {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: ModelsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedBody {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let mut names: Vec<String> = body
            .models
            .into_iter()
            .map(|m| m.name)
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        Ok(names)
    }

    /// 连通性检查
    pub async fn verify_connection(&self, base_url: &str) -> Result<(), ProviderError> {
        let unreachable = || ProviderError::Unreachable {
            base_url: base_url.to_string(),
        };
        let response = self
            .authorized(self.http.get(&self.models_url))
            .timeout(self.connect_check_timeout)
            .send()
            .await
            .map_err(|_| unreachable())?;
        if !response.status().is_success() {
            return Err(unreachable());
        }
        Ok(())
    }
}

#[async_trait]
impl ChatProvider for EnrichmentClient {
    /// 获取可用模型列表，任何失败都返回空列表
    async fn discover_models(&self) -> Vec<String> {
        match self.fetch_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("⚠️  无法获取模型列表: {}", e);
                Vec::new()
            }
        }
    }

    /// 发送一次生成请求，不在内部重试
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let endpoint = self.chat_url.as_str();
        debug!("调用模型服务，模型: {}，提示词长度: {} 字符", model, prompt.len());

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: json!({ "temperature": TEMPERATURE }),
        };

        let response = self
            .authorized(self.http.post(endpoint))
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::request_failed(endpoint, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::BadStatus {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedBody {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        debug!("模型服务调用成功");
        Ok(body.message.content.trim().to_string())
    }
}
