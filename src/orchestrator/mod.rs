//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 扫描题库、选择题库和模型、连通性检查
//! - 根据配置选择单个题库模式或逐个处理模式
//!
//! ### `enrichment_engine` - 单个题库处理器
//! - 找出待处理题目，输出批次计划
//! - 逐批调用 workflow::GroupFlow，每批成功后写回文件
//! - 输出单个题库的统计
//!
//! ### `walk_controller` - 逐个题库处理
//! - 未完成的在前、待处理的在后
//! - 每个题库之后询问是否继续
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! walk_controller (处理 Vec<题库>)
//!     ↓
//! enrichment_engine (处理一个题库的 Vec<QuestionRecord>)
//!     ↓
//! workflow::GroupFlow (处理一批题目)
//!     ↓
//! services / clients (能力层：prompt / parse / provider)
//! ```

pub mod app;
pub mod enrichment_engine;
pub mod walk_controller;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::App;
pub use enrichment_engine::{EngineOptions, EnrichOutcome, EnrichmentEngine};
pub use walk_controller::{build_queue, WalkController, WalkSummary};
