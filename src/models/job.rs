//! 任务模型
//!
//! 描述一次提交（`JobRequest`）、服务端返回的任务句柄（`JobHandle`）和轮询状态（`JobStatus`）

use serde::Deserialize;
use serde_json::Value;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use crate::services::progress::ProgressSink;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// 一次任务提交
///
/// 提交后不再修改，`JobRunner` 只借用它。
#[derive(Clone)]
pub struct JobRequest {
    /// 完整的操作地址，例如 `{base}/v1/similarity`
    pub url: String,
    /// JSON 请求体
    pub body: Value,
    /// 轮询间隔
    pub interval: Duration,
    /// 任务名称（用于进度消息和日志）
    pub task_name: String,
    /// 批次编号（从 1 开始）
    pub batch_number: Option<usize>,
    /// 批次总数
    pub batch_count: Option<usize>,
    /// 该任务自己的进度回调
    pub on_progress: Option<Arc<dyn ProgressSink>>,
}

impl JobRequest {
    pub fn new(url: impl Into<String>, body: Value, task_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body,
            interval: DEFAULT_POLL_INTERVAL,
            task_name: task_name.into(),
            batch_number: None,
            batch_count: None,
            on_progress: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_batch(mut self, batch_number: usize, batch_count: usize) -> Self {
        self.batch_number = Some(batch_number);
        self.batch_count = Some(batch_count);
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.on_progress = Some(sink);
        self
    }

    /// 带批次信息的显示名称
    pub fn display_name(&self) -> String {
        match (self.batch_number, self.batch_count) {
            (Some(n), Some(total)) => format!("{} (batch {}/{})", self.task_name, n, total),
            _ => self.task_name.clone(),
        }
    }
}

impl fmt::Debug for JobRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRequest")
            .field("url", &self.url)
            .field("interval", &self.interval)
            .field("task_name", &self.task_name)
            .field("batch_number", &self.batch_number)
            .field("batch_count", &self.batch_count)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// 服务端分配的任务 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 提交后的首个响应
#[derive(Debug, Clone)]
pub enum SubmitResponse {
    /// HTTP 200，直接返回最终结果
    Immediate(Value),
    /// HTTP 202，进入排队
    Queued(JobHandle),
}

/// 轮询接口的原始响应体
#[derive(Debug, Deserialize)]
pub struct JobStatusBody {
    pub status: String,
    #[serde(default, alias = "resultUrl")]
    pub result_url: Option<String>,
}

/// 任务状态
///
/// `Completed` / `Failed` / `Other` 都是终止状态，不会回到 `Pending`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed { result_url: Option<String> },
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    /// 状态原始名称
    pub fn name(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Completed { .. } => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(status) => status,
        }
    }
}

impl From<JobStatusBody> for JobStatus {
    fn from(body: JobStatusBody) -> Self {
        match body.status.as_str() {
            "pending" => JobStatus::Pending,
            // 空字符串与缺失等价
            "completed" => JobStatus::Completed {
                result_url: body.result_url.filter(|url| !url.is_empty()),
            },
            "failed" => JobStatus::Failed,
            _ => JobStatus::Other(body.status),
        }
    }
}
