//! # Quiz Enrich
//!
//! 用模型服务为题库 JSON 补全 `explanation` 和 `hint` 字段
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 题目记录、完成度统计、JSON 读写
//!
//! ### ② 客户端层（Clients）
//! - `EnrichmentClient` - 模型列表、单次生成请求
//!
//! ### ③ 业务能力层（Services）
//! - `corpus_scanner` - 扫描题库并分类
//! - `batch_planner` - 批次计划预览
//! - `prompt_builder` / `response_parser` - 提示词与响应解析
//! - `progress` - 独立任务中的进度显示
//! - `interaction` - 终端交互
//!
//! ### ④ 流程层（Workflow）
//! - `GroupFlow` - 一批题目的请求、重试、结果写入
//!
//! ### ⑤ 编排层（Orchestration）
//! - `EnrichmentEngine` - 单个题库的分批处理与增量保存
//! - `WalkController` - 逐个处理多个题库
//! - `App` - 应用入口

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ChatProvider, EnrichmentClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CompletionStatus, QuestionRecord};
pub use orchestrator::{App, EnrichmentEngine, WalkController};
