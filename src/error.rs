use thiserror::Error;

/// 任务编排错误类型
///
/// 覆盖提交、轮询、取结果以及批量执行中所有可能的终止性失败。
#[derive(Debug, Error)]
pub enum JobError {
    /// 网络请求失败（提交、轮询、取结果阶段均可能发生）
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP 成功但响应体结构无法识别
    #[error("unexpected response ({reason}): {body}")]
    UnexpectedResponse { reason: String, body: String },

    /// 非 2xx 响应
    #[error("{status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    /// 任务进入了 completed 以外的终止状态
    #[error("Job failed with status: {status}")]
    JobFailed { status: String },

    /// 一个或多个批次失败
    #[error("{failed} of {total} batches failed: {}", summarize(.errors))]
    AggregateBatch {
        failed: usize,
        total: usize,
        errors: Vec<JobError>,
    },

    /// 获取访问令牌失败
    #[error("failed to acquire bearer token: {0}")]
    Auth(String),

    /// 轮询超过配置的最长等待时间
    #[error("job {job_id} still pending after {waited}")]
    PollTimeout { job_id: String, waited: String },

    /// 批次任务被中止（panic 或调度器关闭）
    #[error("batch task aborted: {0}")]
    Task(String),

    /// 配置或输入错误
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn summarize(errors: &[JobError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ========== 便捷构造函数 ==========

impl JobError {
    /// 创建网络错误
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        JobError::Transport {
            url: url.into(),
            source,
        }
    }

    /// 创建响应结构错误
    pub fn unexpected(reason: impl Into<String>, body: impl Into<String>) -> Self {
        JobError::UnexpectedResponse {
            reason: reason.into(),
            body: body.into(),
        }
    }

    /// 根据状态码创建 HTTP 错误
    pub fn http(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        JobError::Http {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string()),
            body: body.into(),
        }
    }

    /// 汇总批次错误
    pub fn aggregate(total: usize, errors: Vec<JobError>) -> Self {
        JobError::AggregateBatch {
            failed: errors.len(),
            total,
            errors,
        }
    }
}

// ========== Result 类型别名 ==========

/// 任务编排结果类型
pub type JobResult<T> = Result<T, JobError>;
