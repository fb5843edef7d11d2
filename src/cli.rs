//! 命令行参数
use clap::Parser;
use std::path::PathBuf;

/// 用模型服务补全题库中的 explanation 和 hint 字段
#[derive(Parser, Debug, Default)]
#[command(
    name = "quiz-enrich",
    version,
    about = "用模型服务补全题库 JSON 中的 explanation / hint 字段",
    allow_negative_numbers = true,
    after_help = "Examples:\n  quiz-enrich --quiz os/so1.json --plan-only\n  quiz-enrich --quiz os/so1.json --model llama3.2 --retries 2\n  quiz-enrich --walk-incomplete --model llama3.2\n  quiz-enrich --list-models"
)]
pub struct Cli {
    /// 每批题目数量 (默认: 5)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<i64>,

    /// 模型服务地址 (默认: http://localhost:11434)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// 使用的模型（省略时交互选择）
    #[arg(long)]
    pub model: Option<String>,

    /// 题库路径，相对于题库根目录（省略时交互选择）
    #[arg(long, value_name = "PATH")]
    pub quiz: Option<String>,

    /// 可选 API key（需要鉴权的服务）
    #[arg(long)]
    pub api_key: Option<String>,

    /// 已有 explanation/hint 的题目也重新生成
    #[arg(long)]
    pub force: bool,

    /// 列出可用模型后退出
    #[arg(long)]
    pub list_models: bool,

    /// 每批解析失败或出错时的额外重试次数 (默认: 1)
    #[arg(long, value_name = "N")]
    pub retries: Option<i64>,

    /// 只显示批次计划，不调用模型
    #[arg(long)]
    pub plan_only: bool,

    /// 计划中最多显示的批次数 (默认: 20, -1 = 全部)
    #[arg(long, value_name = "N")]
    pub plan_limit: Option<i64>,

    /// 逐个处理未完成的题库，每个之后询问是否继续
    #[arg(long)]
    pub walk_incomplete: bool,

    /// 题库根目录 (默认: quizzes)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_negative_plan_limit() {
        let cli = Cli::parse_from(["quiz-enrich", "--plan-limit", "-1", "--plan-only"]);
        assert_eq!(cli.plan_limit, Some(-1));
        assert!(cli.plan_only);
    }

    #[test]
    fn test_parse_walk_flags() {
        let cli = Cli::parse_from([
            "quiz-enrich",
            "--walk-incomplete",
            "--model",
            "llama3.2",
            "--batch-size",
            "3",
        ]);
        assert!(cli.walk_incomplete);
        assert_eq!(cli.model.as_deref(), Some("llama3.2"));
        assert_eq!(cli.batch_size, Some(3));
    }
}
