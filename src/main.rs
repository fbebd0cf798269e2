use analytics_jobs::models::load_comparison_request;
use analytics_jobs::utils::logging;
use analytics_jobs::{AnalyticsOrchestrator, Config, LogProgress, StaticToken};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：优先使用 ANALYTICS_CONFIG 指向的 TOML 文件
    let config = match std::env::var("ANALYTICS_CONFIG") {
        Ok(path) => Config::from_toml_file(Path::new(&path)).await?,
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    let request_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("用法: analytics_jobs <request.toml>")?;
    let request = load_comparison_request(&request_path).await?;

    let orchestrator =
        AnalyticsOrchestrator::new(&config, Arc::new(StaticToken::new(&config.api_token)))?
            .with_progress(Arc::new(LogProgress));

    let result = orchestrator
        .compute_similarity(
            &request.task_name,
            &request.set_a,
            &request.set_b,
            &request.options,
        )
        .await?;

    println!("{}", serde_json::to_string(&result)?);

    Ok(())
}
