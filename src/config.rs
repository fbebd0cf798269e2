use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{JobError, JobResult};
use crate::orchestrator::DEFAULT_CONCURRENCY;
use crate::services::batch_planner::{DEFAULT_MAX_BATCH_CELLS, DEFAULT_SPLIT_THRESHOLD};

/// 程序配置
///
/// 取代全局的 baseUrl / token 单例，由 `ApiClient` 和编排器显式持有。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 分析服务地址（不含 `/v1`）
    pub api_base_url: String,
    /// 静态访问令牌（命令行使用）
    pub api_token: String,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 同时执行的批次数量
    pub max_concurrent_batches: usize,
    /// 超过该单元格数才拆分（严格大于）
    pub split_threshold: usize,
    /// 单个批次允许的最大单元格数
    pub max_batch_cells: usize,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 轮询最长等待时间（秒），为空则不限制
    pub poll_timeout_secs: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: String::new(),
            poll_interval_ms: 2000,
            max_concurrent_batches: DEFAULT_CONCURRENCY,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            max_batch_cells: DEFAULT_MAX_BATCH_CELLS,
            request_timeout_secs: 120,
            poll_timeout_secs: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("ANALYTICS_API_BASE_URL").unwrap_or(default.api_base_url),
            api_token: std::env::var("ANALYTICS_API_TOKEN").unwrap_or(default.api_token),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            max_concurrent_batches: std::env::var("MAX_CONCURRENT_BATCHES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_batches),
            split_threshold: std::env::var("SPLIT_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.split_threshold),
            max_batch_cells: std::env::var("MAX_BATCH_CELLS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_batch_cells),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            poll_timeout_secs: std::env::var("POLL_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).or(default.poll_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，缺失字段使用默认值
    pub async fn from_toml_file(path: &Path) -> JobResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| JobError::Config(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> JobResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| JobError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 检查数值配置是否可用
    pub fn validate(&self) -> JobResult<()> {
        if self.max_concurrent_batches == 0 {
            return Err(JobError::Config("max_concurrent_batches 必须大于 0".into()));
        }
        if self.max_batch_cells == 0 {
            return Err(JobError::Config("max_batch_cells 必须大于 0".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_secs.map(Duration::from_secs)
    }
}
