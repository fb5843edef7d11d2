//! 编排层测试用的内存实现

use crate::clients::ChatProvider;
use crate::error::ProviderError;
use crate::services::Prompter;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 按顺序返回预设响应的模型服务，`Err(())` 表示一次网络错误
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, ()>>>,
    models: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, ()>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            models: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn discover_models(&self) -> Vec<String> {
        self.models.clone()
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or(Err(())).map_err(|_| ProviderError::BadStatus {
            endpoint: "/api/chat".to_string(),
            status: 503,
        })
    }
}

/// 按脚本回答的交互实现
#[derive(Default)]
pub struct ScriptedPrompter {
    pub selections: RefCell<VecDeque<Option<usize>>>,
    pub confirms: RefCell<VecDeque<bool>>,
    pub confirm_calls: RefCell<usize>,
}

impl ScriptedPrompter {
    pub fn new(selections: Vec<Option<usize>>, confirms: Vec<bool>) -> Self {
        Self {
            selections: RefCell::new(selections.into()),
            confirms: RefCell::new(confirms.into()),
            confirm_calls: RefCell::new(0),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, _label: &str, _items: &[String]) -> Option<usize> {
        self.selections.borrow_mut().pop_front().flatten()
    }

    fn confirm(&self, _question: &str, default_yes: bool) -> bool {
        *self.confirm_calls.borrow_mut() += 1;
        self.confirms.borrow_mut().pop_front().unwrap_or(default_yes)
    }
}

pub fn question(explanation: &str, hint: &str) -> serde_json::Value {
    serde_json::json!({
        "question": "Quale struttura dati usa lo scheduler?",
        "options": [{"text": "Coda", "image": ""}, {"text": "Pila", "image": ""}],
        "correctIndex": 0,
        "explanation": explanation,
        "hint": hint
    })
}

pub fn write_corpus(dir: &Path, rel: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}
