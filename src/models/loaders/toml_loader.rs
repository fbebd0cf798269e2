use crate::models::batch::SimilarityOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 命令行使用的比较请求文件
///
/// ```toml
/// task_name = "Survey similarity"
/// set_a = ["first", "second"]
/// set_b = ["alpha", "beta", "gamma"]
/// fast = false
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default = "default_task_name")]
    pub task_name: String,
    pub set_a: Vec<String>,
    pub set_b: Vec<String>,
    #[serde(flatten)]
    pub options: SimilarityOptions,
}

fn default_task_name() -> String {
    "Similarity".to_string()
}

/// 从 TOML 文件加载比较请求
pub async fn load_comparison_request(toml_file_path: &Path) -> Result<ComparisonRequest> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let request: ComparisonRequest = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "成功加载请求 {}: {} × {}",
        request.task_name,
        request.set_a.len(),
        request.set_b.len()
    );

    Ok(request)
}
