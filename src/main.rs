use anyhow::Result;
use clap::Parser;
use quiz_enrich::cli::Cli;
use quiz_enrich::utils::logging;
use quiz_enrich::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载并校验配置
    let config = Config::load(&cli)?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).run().await?;

    Ok(())
}
